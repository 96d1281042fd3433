//! Writing chapter bodies as xhtml.
//!
//! The markup dialect is line-oriented, so consecutive list-item tokens
//! arrive without any enclosing container; xhtml needs one. The writer
//! keeps track of the currently open list container and closes it
//! exactly once when the list kind switches, a non-list token arrives,
//! or the body ends.

use linemark::{parse_spans, Inline, MarkupToken, Span};
use luminapress_common::escape_to_xml;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListKind {
    Bulleted,
    Numbered,
}

impl ListKind {
    fn open_tag(self) -> &'static str {
        match self {
            ListKind::Bulleted => "<ul>\n",
            ListKind::Numbered => "<ol>\n",
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            ListKind::Bulleted => "</ul>\n",
            ListKind::Numbered => "</ol>\n",
        }
    }
}

/// Incremental writer for the body of one xhtml page.
#[derive(Debug, Default)]
pub(crate) struct XhtmlWriter {
    target: String,
    open_list: Option<ListKind>,
}

impl XhtmlWriter {
    pub(crate) fn new() -> Self {
        XhtmlWriter::default()
    }

    /// Append raw, already well-formed markup.
    pub(crate) fn push_raw(&mut self, markup: &str) {
        self.close_list();
        self.target.push_str(markup);
    }

    pub(crate) fn push_token(&mut self, token: &MarkupToken<'_>) {
        match token {
            MarkupToken::Blank => {}
            MarkupToken::Heading { level, text } => {
                self.close_list();
                // one level below the chapter title's h1
                let tag = match level {
                    1 => "h2",
                    2 => "h3",
                    3 => "h4",
                    _ => "h5",
                };
                self.target.push('<');
                self.target.push_str(tag);
                self.target.push('>');
                self.push_inlines(text);
                self.target.push_str("</");
                self.target.push_str(tag);
                self.target.push_str(">\n");
            }
            MarkupToken::BulletItem { text, .. } => {
                self.ensure_list(ListKind::Bulleted);
                self.push_item(text);
            }
            MarkupToken::NumberedItem { text, .. } => {
                self.ensure_list(ListKind::Numbered);
                self.push_item(text);
            }
            MarkupToken::Rule => {
                self.close_list();
                self.target.push_str("<hr/>\n");
            }
            MarkupToken::Paragraph { text } => {
                self.close_list();
                self.target.push_str("<p>");
                self.push_inlines(text);
                self.target.push_str("</p>\n");
            }
        }
    }

    /// Render inline markup into the target, escaping text content
    /// before any tags are inserted around it.
    pub(crate) fn push_inlines(&mut self, text: &str) {
        for event in parse_spans(text) {
            match event {
                Inline::Text(t) => self.target.push_str(&escape_to_xml(t.as_ref())),
                Inline::Start(Span::Strong) => self.target.push_str("<strong>"),
                Inline::End(Span::Strong) => self.target.push_str("</strong>"),
                Inline::Start(Span::Emphasis) => self.target.push_str("<em>"),
                Inline::End(Span::Emphasis) => self.target.push_str("</em>"),
                Inline::Start(Span::Code) => self.target.push_str("<code>"),
                Inline::End(Span::Code) => self.target.push_str("</code>"),
                Inline::Start(Span::Link(url)) => {
                    self.target.push_str("<a href=\"");
                    self.target.push_str(&escape_to_xml(url.as_ref()));
                    self.target.push_str("\">");
                }
                Inline::End(Span::Link(_)) => self.target.push_str("</a>"),
            }
        }
    }

    fn push_item(&mut self, text: &str) {
        self.target.push_str("<li>");
        self.push_inlines(text);
        self.target.push_str("</li>\n");
    }

    fn ensure_list(&mut self, kind: ListKind) {
        if self.open_list == Some(kind) {
            return;
        }
        self.close_list();
        self.target.push_str(kind.open_tag());
        self.open_list = Some(kind);
    }

    fn close_list(&mut self) {
        if let Some(kind) = self.open_list.take() {
            self.target.push_str(kind.close_tag());
        }
    }

    /// Close any open container and return the finished body markup.
    pub(crate) fn finish(mut self) -> String {
        self.close_list();
        self.target
    }
}

/// Wrap a page body in the xhtml document frame.
pub(crate) fn xhtml_page(title: &str, lang: &str, body: &str) -> String {
    let mut page = String::with_capacity(body.len() + 512);
    page.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#);
    page.push('\n');
    page.push_str(&format!(
        r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="{}">"#,
        lang
    ));
    page.push_str("\n<head>\n\t<title>");
    page.push_str(&escape_to_xml(title));
    page.push_str("</title>\n\t<link rel=\"stylesheet\" type=\"text/css\" href=\"style/default.css\"></link>\n</head>\n<body>\n");
    page.push_str(body);
    page.push_str("</body>\n</html>");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use linemark::tokenize;

    fn render(content: &str) -> String {
        let mut writer = XhtmlWriter::new();
        for token in tokenize(content) {
            writer.push_token(&token);
        }
        writer.finish()
    }

    #[test]
    fn consecutive_items_share_one_container() {
        let body = render("- one\n- two\n- three");
        assert_eq!(body.matches("<ul>").count(), 1);
        assert_eq!(body.matches("</ul>").count(), 1);
        assert_eq!(body.matches("<li>").count(), 3);
    }

    #[test]
    fn non_list_token_closes_the_container_exactly_once() {
        let body = render("- one\n- two\nAfterwards.");
        assert_eq!(body.matches("</ul>").count(), 1);
        let close = body.find("</ul>").unwrap();
        let para = body.find("<p>Afterwards.").unwrap();
        assert!(close < para);
    }

    #[test]
    fn switching_list_kind_closes_the_previous_container() {
        let body = render("- bullet\n1. numbered");
        let ul_close = body.find("</ul>").unwrap();
        let ol_open = body.find("<ol>").unwrap();
        assert!(ul_close < ol_open);
        assert_eq!(body.matches("</ol>").count(), 1);
    }

    #[test]
    fn trailing_list_is_closed_at_finish() {
        let body = render("Intro.\n- only item");
        assert!(body.ends_with("</ul>\n"));
    }

    #[test]
    fn inline_markup_and_escaping() {
        let body = render("Some **bold** text & a <tag>.");
        assert!(body.contains("<strong>bold</strong>"));
        assert!(body.contains("&amp; a &lt;tag&gt;."));
    }

    #[test]
    fn headings_map_one_level_down() {
        let body = render("# Top\n#### Minor");
        assert!(body.contains("<h2>Top</h2>"));
        assert!(body.contains("<h5>Minor</h5>"));
    }

    #[test]
    fn links_become_anchors() {
        let body = render("See [the guide](https://example.com/a?b=1&c=2).");
        assert!(body.contains("<a href=\"https://example.com/a?b=1&amp;c=2\">the guide</a>"));
    }
}
