//! Building the main WordprocessingML document part.
//!
//! Everything here is direct formatting pushed onto a `String`; the
//! formats involved are fixed (one trim size, one type scale), so style
//! indirection would buy nothing. Measurements are in twentieths of a
//! point (twips) for page geometry, half-points for font sizes, and
//! EMUs for drawing extents.

use linemark::{parse_spans, Inline, MarkupToken, Span};
use luminapress_common::escape_to_xml;
use luminapress_ast::Language;

/// 5.5in × 8.5in trim, in twips
const PAGE_WIDTH: u32 = 7920;
const PAGE_HEIGHT: u32 = 12240;
/// margins: 0.75in top/bottom/left, 0.5in right
const MARGIN_TOP: u32 = 1080;
const MARGIN_BOTTOM: u32 = 1080;
const MARGIN_LEFT: u32 = 1080;
const MARGIN_RIGHT: u32 = 720;
/// the text column width, where the contents' right tab stop sits
const TEXT_WIDTH: u32 = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;

/// EMUs per inch, for drawing extents
const EMU_PER_INCH: u64 = 914_400;
/// chapter images render 3.5in wide
const IMAGE_WIDTH_EMU: u64 = (35 * EMU_PER_INCH) / 10;
/// and at most 2.5in tall
const IMAGE_MAX_HEIGHT_EMU: u64 = (25 * EMU_PER_INCH) / 10;

/// body text: 11pt on 16pt leading, 6pt after
const BODY_SIZE: u32 = 22;
const BODY_LINE: u32 = 320;
const BODY_AFTER: u32 = 120;
/// in-body heading sizes by token level, half-points
const HEADING_SIZES: [u32; 4] = [26, 24, 23, 22];
const CHAPTER_TITLE_SIZE: u32 = 36;
const BOOK_TITLE_SIZE: u32 = 56;
const SUBTITLE_SIZE: u32 = 28;

/// An image relationship to be registered in the package
#[derive(Debug)]
pub(crate) struct ImageRel {
    /// relationship id within the document part
    pub(crate) rel_id: String,
    /// media path within the package
    pub(crate) path: String,
    pub(crate) data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListKind {
    Bulleted,
    Numbered,
}

/// Incremental writer for the document part body.
///
/// Ordered lists each get their own numbering instance so that their
/// numbering restarts at one; the writer hands out instance ids as it
/// goes and reports how many it used, which sizes the numbering part.
#[derive(Debug)]
pub(crate) struct DocxWriter {
    body: String,
    language: Language,
    /// the numbering instance of the list currently being written, with
    /// its kind; `None` outside any list
    open_list: Option<(ListKind, u32)>,
    /// instances handed out so far to ordered lists; instance 1 is the
    /// shared bullet list
    ordered_instances: u32,
    images: Vec<ImageRel>,
}

impl DocxWriter {
    pub(crate) fn new(language: Language) -> Self {
        DocxWriter {
            body: String::with_capacity(16 * 1024),
            language,
            open_list: None,
            ordered_instances: 0,
            images: Vec::new(),
        }
    }

    /// how many ordered-list numbering instances the body used
    pub(crate) fn ordered_instances(&self) -> u32 {
        self.ordered_instances
    }

    pub(crate) fn into_parts(self) -> (String, Vec<ImageRel>) {
        (self.body, self.images)
    }

    /// The full document part around the accumulated body.
    pub(crate) fn document_xml(body: &str) -> String {
        let mut xml = String::with_capacity(body.len() + 2048);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(concat!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
            r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
            r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
            r#" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
            r#" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#
        ));
        xml.push_str("\n<w:body>\n");
        xml.push_str(body);
        // the section: trim size, margins, the page-number footer, and
        // a distinct (absent) first-page footer so the title page stays
        // unnumbered
        xml.push_str(&format!(
            concat!(
                "<w:sectPr>",
                "<w:footerReference w:type=\"default\" r:id=\"rIdFooter\"/>",
                "<w:pgSz w:w=\"{}\" w:h=\"{}\"/>",
                "<w:pgMar w:top=\"{}\" w:right=\"{}\" w:bottom=\"{}\" w:left=\"{}\" w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/>",
                "<w:titlePg/>",
                "</w:sectPr>\n"
            ),
            PAGE_WIDTH, PAGE_HEIGHT, MARGIN_TOP, MARGIN_RIGHT, MARGIN_BOTTOM, MARGIN_LEFT
        ));
        xml.push_str("</w:body>\n</w:document>");
        xml
    }

    pub(crate) fn page_break(&mut self) {
        self.end_list();
        self.body
            .push_str("<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>\n");
    }

    pub(crate) fn empty_paragraph(&mut self) {
        self.end_list();
        self.body.push_str("<w:p/>\n");
    }

    /// A centred display paragraph, as used on title pages.
    pub(crate) fn display_paragraph(&mut self, text: &str, size: u32, bold: bool, color: Option<&str>) {
        self.end_list();
        self.body.push_str("<w:p><w:pPr><w:jc w:val=\"center\"/></w:pPr>");
        let mut props = format!("<w:sz w:val=\"{}\"/>", size);
        if bold {
            props.push_str("<w:b/>");
        }
        if let Some(color) = color {
            props.push_str(&format!("<w:color w:val=\"{}\"/>", color));
        }
        self.push_runs(text, &props);
        self.body.push_str("</w:p>\n");
    }

    /// The book title page: vertical space, title, optional subtitle.
    pub(crate) fn title_page(&mut self, title: &str, subtitle: Option<&str>) {
        for _ in 0..6 {
            self.empty_paragraph();
        }
        self.display_paragraph(title, BOOK_TITLE_SIZE, true, None);
        if let Some(subtitle) = subtitle {
            self.display_paragraph(subtitle, SUBTITLE_SIZE, false, Some("808080"));
        }
        self.page_break();
    }

    /// The contents page: two columns faked with a right tab stop at the
    /// text edge; the page numbers are estimates injected as literal
    /// text, since the flow-document format's live page fields cannot be
    /// cross-referenced from here.
    pub(crate) fn contents(&mut self, entries: &[(String, u32)]) {
        self.end_list();
        self.body.push_str(&format!(
            "<w:p><w:pPr><w:spacing w:after=\"240\"/></w:pPr><w:r><w:rPr><w:b/><w:sz w:val=\"{}\"/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>\n",
            CHAPTER_TITLE_SIZE,
            escape_to_xml(self.language.contents_title())
        ));
        for (line, page) in entries {
            self.body.push_str(&format!(
                concat!(
                    "<w:p><w:pPr><w:tabs><w:tab w:val=\"right\" w:pos=\"{}\"/></w:tabs>",
                    "<w:spacing w:after=\"{}\"/></w:pPr>",
                    "<w:r><w:rPr><w:sz w:val=\"{}\"/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r>",
                    "<w:r><w:tab/></w:r>",
                    "<w:r><w:rPr><w:sz w:val=\"{}\"/></w:rPr><w:t>{}</w:t></w:r></w:p>\n"
                ),
                TEXT_WIDTH,
                BODY_AFTER,
                BODY_SIZE,
                escape_to_xml(line.as_str()),
                BODY_SIZE,
                page
            ));
        }
        self.page_break();
    }

    /// The opening of a chapter: label above title.
    pub(crate) fn chapter_heading(&mut self, number: u32, title: &str) {
        let label = self.language.chapter_label(number).to_uppercase();
        self.end_list();
        self.body.push_str(&format!(
            "<w:p><w:pPr><w:jc w:val=\"center\"/><w:spacing w:before=\"720\"/></w:pPr><w:r><w:rPr><w:sz w:val=\"24\"/></w:rPr><w:t>{}</w:t></w:r></w:p>\n",
            escape_to_xml(label.as_str())
        ));
        self.display_paragraph(title, CHAPTER_TITLE_SIZE, true, None);
    }

    /// An inline image drawing, centred, 3.5in wide with the height
    /// following the pixel aspect ratio up to 2.5in.
    pub(crate) fn image(&mut self, chapter_number: u32, jpeg: Vec<u8>, dimensions: (u32, u32)) {
        self.end_list();
        let (px_w, px_h) = dimensions;
        let mut cx = IMAGE_WIDTH_EMU;
        let mut cy = if px_w > 0 {
            (IMAGE_WIDTH_EMU * u64::from(px_h)) / u64::from(px_w)
        } else {
            IMAGE_MAX_HEIGHT_EMU
        };
        if cy > IMAGE_MAX_HEIGHT_EMU {
            cx = (cx * IMAGE_MAX_HEIGHT_EMU) / cy;
            cy = IMAGE_MAX_HEIGHT_EMU;
        }
        let rel_id = format!("rIdImage{}", chapter_number);
        let path = format!("media/chapter_{}.jpg", chapter_number);
        self.body.push_str(&format!(
            concat!(
                "<w:p><w:pPr><w:jc w:val=\"center\"/></w:pPr><w:r><w:drawing>",
                "<wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">",
                "<wp:extent cx=\"{cx}\" cy=\"{cy}\"/>",
                "<wp:docPr id=\"{n}\" name=\"chapter_{n}_image\"/>",
                "<a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">",
                "<pic:pic>",
                "<pic:nvPicPr><pic:cNvPr id=\"{n}\" name=\"chapter_{n}.jpg\"/><pic:cNvPicPr/></pic:nvPicPr>",
                "<pic:blipFill><a:blip r:embed=\"{rel}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>",
                "<pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>",
                "<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>",
                "</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>\n"
            ),
            cx = cx,
            cy = cy,
            n = chapter_number,
            rel = rel_id
        ));
        self.images.push(ImageRel {
            rel_id,
            path,
            data: jpeg,
        });
    }

    pub(crate) fn push_token(&mut self, token: &MarkupToken<'_>) {
        match token {
            // paragraph spacing already separates blocks
            MarkupToken::Blank => {}
            MarkupToken::Heading { level, text } => {
                self.end_list();
                let size = HEADING_SIZES[(level - 1).min(3) as usize];
                self.body
                    .push_str("<w:p><w:pPr><w:spacing w:before=\"240\" w:after=\"120\"/></w:pPr>");
                let props = format!("<w:b/><w:sz w:val=\"{}\"/>", size);
                self.push_runs(text, &props);
                self.body.push_str("</w:p>\n");
            }
            MarkupToken::BulletItem { depth, text } => {
                self.list_item(ListKind::Bulleted, *depth, text);
            }
            MarkupToken::NumberedItem { depth, text } => {
                self.list_item(ListKind::Numbered, *depth, text);
            }
            MarkupToken::Rule => {
                self.end_list();
                self.body.push_str(concat!(
                    "<w:p><w:pPr><w:pBdr>",
                    "<w:bottom w:val=\"single\" w:sz=\"6\" w:space=\"1\" w:color=\"888888\"/>",
                    "</w:pBdr><w:spacing w:after=\"240\"/></w:pPr></w:p>\n"
                ));
            }
            MarkupToken::Paragraph { text } => {
                self.end_list();
                self.body.push_str(&format!(
                    "<w:p><w:pPr><w:jc w:val=\"both\"/><w:spacing w:after=\"{}\" w:line=\"{}\" w:lineRule=\"auto\"/></w:pPr>",
                    BODY_AFTER, BODY_LINE
                ));
                let props = format!("<w:sz w:val=\"{}\"/>", BODY_SIZE);
                self.push_runs(text, &props);
                self.body.push_str("</w:p>\n");
            }
        }
    }

    fn list_item(&mut self, kind: ListKind, depth: u8, text: &str) {
        let instance = match self.open_list {
            Some((open_kind, instance)) if open_kind == kind => instance,
            _ => {
                let instance = match kind {
                    ListKind::Bulleted => 1,
                    ListKind::Numbered => {
                        self.ordered_instances += 1;
                        1 + self.ordered_instances
                    }
                };
                self.open_list = Some((kind, instance));
                instance
            }
        };
        self.body.push_str(&format!(
            "<w:p><w:pPr><w:numPr><w:ilvl w:val=\"{}\"/><w:numId w:val=\"{}\"/></w:numPr><w:spacing w:after=\"60\"/></w:pPr>",
            depth, instance
        ));
        let props = format!("<w:sz w:val=\"{}\"/>", BODY_SIZE);
        self.push_runs(text, &props);
        self.body.push_str("</w:p>\n");
    }

    /// Leave any list being written. Word has no container element for
    /// lists, so this only resets the numbering-instance tracking.
    fn end_list(&mut self) {
        self.open_list = None;
    }

    /// Render inline markup as runs carrying `base_props` plus whatever
    /// span formatting is active. Text content is escaped as it is
    /// written, never after.
    fn push_runs(&mut self, text: &str, base_props: &str) {
        let mut bold = 0u32;
        let mut italic = 0u32;
        let mut code = 0u32;
        let mut link = 0u32;
        for event in parse_spans(text) {
            match event {
                Inline::Start(Span::Strong) => bold += 1,
                Inline::End(Span::Strong) => bold -= 1,
                Inline::Start(Span::Emphasis) => italic += 1,
                Inline::End(Span::Emphasis) => italic -= 1,
                Inline::Start(Span::Code) => code += 1,
                Inline::End(Span::Code) => code -= 1,
                // the target url has nowhere to go in this format; the
                // label keeps only its underline
                Inline::Start(Span::Link(_)) => link += 1,
                Inline::End(Span::Link(_)) => link -= 1,
                Inline::Text(t) => {
                    self.body.push_str("<w:r><w:rPr>");
                    self.body.push_str(base_props);
                    if bold > 0 {
                        self.body.push_str("<w:b/>");
                    }
                    if italic > 0 {
                        self.body.push_str("<w:i/>");
                    }
                    if code > 0 {
                        self.body
                            .push_str("<w:rFonts w:ascii=\"Courier New\" w:hAnsi=\"Courier New\"/>");
                    }
                    if link > 0 {
                        self.body.push_str("<w:u w:val=\"single\"/>");
                    }
                    self.body.push_str("</w:rPr><w:t xml:space=\"preserve\">");
                    self.body.push_str(&escape_to_xml(t.as_ref()));
                    self.body.push_str("</w:t></w:r>");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linemark::tokenize;

    fn body_of(content: &str) -> (String, u32) {
        let mut writer = DocxWriter::new(Language::En);
        for token in tokenize(content) {
            writer.push_token(&token);
        }
        let ordered = writer.ordered_instances();
        let (body, _) = writer.into_parts();
        (body, ordered)
    }

    #[test]
    fn body_paragraphs_are_justified() {
        let (body, _) = body_of("A plain paragraph.");
        assert!(body.contains("<w:jc w:val=\"both\"/>"));
        assert!(body.contains("A plain paragraph."));
    }

    #[test]
    fn each_ordered_list_restarts_numbering() {
        let (body, ordered) = body_of("1. a\n2. b\n\nBetween.\n\n1. c\n2. d");
        assert_eq!(ordered, 2);
        // the two lists use distinct numbering instances
        assert!(body.contains("<w:numId w:val=\"2\"/>"));
        assert!(body.contains("<w:numId w:val=\"3\"/>"));
    }

    #[test]
    fn bullets_share_one_instance() {
        let (body, ordered) = body_of("- a\n- b\n\nText.\n\n- c");
        assert_eq!(ordered, 0);
        assert!(body.contains("<w:numId w:val=\"1\"/>"));
        assert!(!body.contains("<w:numId w:val=\"2\"/>"));
    }

    #[test]
    fn inline_formatting_becomes_run_properties() {
        let (body, _) = body_of("Some **bold** and `mono` and [linked](https://x) text.");
        assert!(body.contains("<w:b/>"));
        assert!(body.contains("Courier New"));
        assert!(body.contains("<w:u w:val=\"single\"/>"));
        // the url is discarded
        assert!(!body.contains("https://x"));
    }

    #[test]
    fn text_is_escaped() {
        let (body, _) = body_of("Fish & chips <cheap>.");
        assert!(body.contains("Fish &amp; chips &lt;cheap&gt;."));
    }
}
