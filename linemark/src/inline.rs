//! Inline markup within a single token's text.
//!
//! The scanner walks the text left to right and emits a flat event stream
//! of plain text and span boundaries. Spans are recognised in a fixed
//! precedence order:
//!
//! 1. bold-italic — `***text***` or `___text___`
//! 2. bold — `**text**` or `__text__`
//! 3. italic — single `*text*` or `_text_`, where the markers are not
//!    part of a longer marker run
//! 4. inline code — `` `text` ``
//! 5. link — `[label](url)`
//!
//! A marker with no closing partner is ordinary text; nothing here can
//! fail. The interior of a span is re-scanned for the other span kinds
//! (so `**a *b* c**` nests), except inline code, whose interior is
//! always literal.
//!
//! Output targets each render this event stream into their own inline
//! representation; [`strip_markup`] is the shared plain-text mode.

use std::borrow::Cow;

/// A kind of inline span
#[derive(Debug, Clone, PartialEq)]
pub enum Span<'a> {
    /// Bold text
    Strong,
    /// Italicised text
    Emphasis,
    /// Monospaced inline code
    Code,
    /// A link; the target is dropped by output formats with no
    /// navigation concept
    Link(Cow<'a, str>),
}

/// One event in a parsed inline stream
#[derive(Debug, Clone, PartialEq)]
pub enum Inline<'a> {
    /// A run of plain text
    Text(Cow<'a, str>),
    /// The opening of a span
    Start(Span<'a>),
    /// The closing of a span
    End(Span<'a>),
}

// Which span kinds the scanner may open at the current nesting position;
// a span never reopens inside itself.
#[derive(Debug, Clone, Copy)]
struct Allowed {
    strong: bool,
    emphasis: bool,
    code: bool,
    link: bool,
}

impl Allowed {
    const ALL: Allowed = Allowed {
        strong: true,
        emphasis: true,
        code: true,
        link: true,
    };
}

/// Parse the inline markup of `text` into an event stream.
///
/// ```
/// use linemark::inline::{parse_spans, Inline, Span};
///
/// let events = parse_spans("Some **bold** text.");
/// assert_eq!(
///     events,
///     vec![
///         Inline::Text("Some ".into()),
///         Inline::Start(Span::Strong),
///         Inline::Text("bold".into()),
///         Inline::End(Span::Strong),
///         Inline::Text(" text.".into()),
///     ]
/// );
/// ```
pub fn parse_spans(text: &str) -> Vec<Inline<'_>> {
    let mut out = Vec::new();
    scan(text, &mut out, Allowed::ALL);
    out
}

/// Remove all inline markup, leaving plain text.
///
/// Borrows the input when it contains no marker characters at all.
pub fn strip_markup(text: &str) -> Cow<'_, str> {
    if !text.contains(&['*', '_', '`', '['][..]) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for event in parse_spans(text) {
        if let Inline::Text(t) = event {
            out.push_str(&t);
        }
    }
    Cow::Owned(out)
}

fn run_length(bytes: &[u8], from: usize, marker: u8) -> usize {
    bytes[from..].iter().take_while(|&&b| b == marker).count()
}

/// Find the start of the next run of exactly `width` or more `marker`
/// bytes at or after `from`; runs shorter than `width` are skipped.
fn find_run(bytes: &[u8], from: usize, marker: u8, width: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == marker {
            let run = run_length(bytes, i, marker);
            if run >= width {
                return Some(i);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

/// Find a lone closing marker for an italic span opened at `open`:
/// a single `marker` byte not part of a longer run, with at least one
/// byte of content before it.
fn find_single(bytes: &[u8], open: usize, marker: u8) -> Option<usize> {
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == marker {
            let run = run_length(bytes, i, marker);
            if run == 1 && i > open + 1 {
                return Some(i);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

fn flush<'a>(text: &'a str, from: usize, to: usize, out: &mut Vec<Inline<'a>>) {
    if from < to {
        out.push(Inline::Text(Cow::Borrowed(&text[from..to])));
    }
}

fn scan<'a>(text: &'a str, out: &mut Vec<Inline<'a>>, allowed: Allowed) {
    let bytes = text.as_bytes();
    let mut plain = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            m @ b'*' | m @ b'_' if allowed.strong || allowed.emphasis => {
                let run = run_length(bytes, i, m);
                if run >= 3 && allowed.strong && allowed.emphasis {
                    if let Some(close) = find_run(bytes, i + 3, m, 3) {
                        flush(text, plain, i, out);
                        out.push(Inline::Start(Span::Strong));
                        out.push(Inline::Start(Span::Emphasis));
                        scan(
                            &text[i + 3..close],
                            out,
                            Allowed {
                                strong: false,
                                emphasis: false,
                                ..allowed
                            },
                        );
                        out.push(Inline::End(Span::Emphasis));
                        out.push(Inline::End(Span::Strong));
                        i = close + 3;
                        plain = i;
                        continue;
                    }
                }
                if run >= 2 && allowed.strong {
                    if let Some(close) = find_run(bytes, i + 2, m, 2) {
                        flush(text, plain, i, out);
                        out.push(Inline::Start(Span::Strong));
                        scan(
                            &text[i + 2..close],
                            out,
                            Allowed {
                                strong: false,
                                ..allowed
                            },
                        );
                        out.push(Inline::End(Span::Strong));
                        i = close + 2;
                        plain = i;
                        continue;
                    }
                }
                if run == 1 && allowed.emphasis {
                    if let Some(close) = find_single(bytes, i, m) {
                        flush(text, plain, i, out);
                        out.push(Inline::Start(Span::Emphasis));
                        scan(
                            &text[i + 1..close],
                            out,
                            Allowed {
                                emphasis: false,
                                ..allowed
                            },
                        );
                        out.push(Inline::End(Span::Emphasis));
                        i = close + 1;
                        plain = i;
                        continue;
                    }
                }
                // unmatched markers are literal
                i += run;
            }
            b'`' if allowed.code => {
                if let Some(close) = bytes[i + 1..].iter().position(|&b| b == b'`') {
                    let close = i + 1 + close;
                    flush(text, plain, i, out);
                    out.push(Inline::Start(Span::Code));
                    if close > i + 1 {
                        out.push(Inline::Text(Cow::Borrowed(&text[i + 1..close])));
                    }
                    out.push(Inline::End(Span::Code));
                    i = close + 1;
                    plain = i;
                    continue;
                }
                i += 1;
            }
            b'[' if allowed.link => {
                if let Some((label, url, after)) = try_link(text, i) {
                    flush(text, plain, i, out);
                    let span = Span::Link(Cow::Borrowed(url));
                    out.push(Inline::Start(span.clone()));
                    scan(
                        label,
                        out,
                        Allowed {
                            link: false,
                            ..allowed
                        },
                    );
                    out.push(Inline::End(span));
                    i = after;
                    plain = i;
                    continue;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    flush(text, plain, bytes.len(), out);
}

/// Try to read `[label](url)` starting at the `[` at `open`.
/// Returns the label, the url and the index just past the closing `)`.
fn try_link(text: &str, open: usize) -> Option<(&str, &str, usize)> {
    let bytes = text.as_bytes();
    let label_end = open + 1 + bytes[open + 1..].iter().position(|&b| b == b']')?;
    if bytes.get(label_end + 1) != Some(&b'(') {
        return None;
    }
    let url_end = label_end + 2 + bytes[label_end + 2..].iter().position(|&b| b == b')')?;
    Some((
        &text[open + 1..label_end],
        &text[label_end + 2..url_end],
        url_end + 1,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use Inline::*;

    fn text(s: &str) -> Inline<'_> {
        Text(s.into())
    }

    #[test]
    fn bold_italic_takes_precedence() {
        let events = parse_spans("***loud***");
        assert_eq!(
            events,
            vec![
                Start(Span::Strong),
                Start(Span::Emphasis),
                text("loud"),
                End(Span::Emphasis),
                End(Span::Strong),
            ]
        );
    }

    #[test]
    fn underscore_variants() {
        assert_eq!(
            parse_spans("__bold__ and _quiet_"),
            vec![
                Start(Span::Strong),
                text("bold"),
                End(Span::Strong),
                text(" and "),
                Start(Span::Emphasis),
                text("quiet"),
                End(Span::Emphasis),
            ]
        );
    }

    #[test]
    fn italic_does_not_consume_bold_markers() {
        // the leading `*` of `**` must never close a single-`*` span
        assert_eq!(
            parse_spans("*a* **b**"),
            vec![
                Start(Span::Emphasis),
                text("a"),
                End(Span::Emphasis),
                text(" "),
                Start(Span::Strong),
                text("b"),
                End(Span::Strong),
            ]
        );
    }

    #[test]
    fn nesting() {
        assert_eq!(
            parse_spans("**a *b* c**"),
            vec![
                Start(Span::Strong),
                text("a "),
                Start(Span::Emphasis),
                text("b"),
                End(Span::Emphasis),
                text(" c"),
                End(Span::Strong),
            ]
        );
    }

    #[test]
    fn code_interior_is_literal() {
        assert_eq!(
            parse_spans("run `cargo *build*` now"),
            vec![
                text("run "),
                Start(Span::Code),
                text("cargo *build*"),
                End(Span::Code),
                text(" now"),
            ]
        );
    }

    #[test]
    fn links() {
        let events = parse_spans("see [the site](https://example.com) today");
        assert_eq!(
            events,
            vec![
                text("see "),
                Start(Span::Link("https://example.com".into())),
                text("the site"),
                End(Span::Link("https://example.com".into())),
                text(" today"),
            ]
        );
        // missing url part degrades to literal text
        assert_eq!(parse_spans("[not a link]"), vec![text("[not a link]")]);
    }

    #[test]
    fn unmatched_markers_degrade() {
        assert_eq!(parse_spans("2 * 3 = 6"), vec![text("2 * 3 = 6")]);
        assert_eq!(
            parse_spans("**never closed"),
            vec![text("**never closed")]
        );
        assert_eq!(parse_spans("`tick"), vec![text("`tick")]);
    }

    #[test]
    fn strip_is_plain_text() {
        assert_eq!(
            strip_markup("Some ***very* important** `code` [here](https://x)"),
            "Some very important code here"
        );
        // no markers: borrowed through
        assert!(matches!(
            strip_markup("untouched text"),
            Cow::Borrowed("untouched text")
        ));
    }

    #[test]
    fn strip_keeps_literal_unmatched_markers() {
        assert_eq!(strip_markup("a * b"), "a * b");
        assert_eq!(strip_markup("snake_case"), "snake_case");
    }
}
