//! This crate parses the constrained markup dialect found in generated
//! chapter text.
//!
//! The dialect is line-oriented, not block-oriented: every line classifies
//! on its own, without reference to its neighbours, as exactly one of
//!
//! - a blank line
//! - a heading of level 1–4 (`## Subheading`)
//! - a bullet list item (`- item` or `* item`)
//! - a numbered list item (`1. item` or `1) item`)
//! - a horizontal rule (`---`, `***` or `___`)
//! - a paragraph (anything else)
//!
//! There is no error case; a line which matches nothing above is a
//! paragraph. This makes the parser safe to run over arbitrary model
//! output — a half-formed heading degrades to visible text rather than
//! poisoning the chapter.
//!
//! Inline markup within a token's text (`**bold**`, `*italic*`,
//! `` `code` ``, `[label](url)`) is handled separately by the [`inline`]
//! module, which also provides a strip mode for plain-text contexts.
//!
//! ```
//! use linemark::{classify_line, MarkupToken};
//!
//! assert_eq!(
//!     classify_line("## Getting Started"),
//!     MarkupToken::Heading { level: 2, text: "Getting Started".into() }
//! );
//! assert_eq!(
//!     classify_line("- a point"),
//!     MarkupToken::BulletItem { depth: 0, text: "a point".into() }
//! );
//! assert_eq!(classify_line("   "), MarkupToken::Blank);
//! ```

#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

pub mod inline;
pub use inline::{parse_spans, strip_markup, Inline, Span};

lazy_static! {
    static ref HEADING: Regex = Regex::new(r"^(#{1,4})[ \t]+(.+)$").unwrap();
    static ref BULLET: Regex = Regex::new(r"^[-*][ \t]+(.+)$").unwrap();
    static ref NUMBERED: Regex = Regex::new(r"^\d+[.)][ \t]+(.+)$").unwrap();
    static ref RULE: Regex = Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").unwrap();
}

/// A single classified line of chapter markup.
///
/// Token text is borrowed from the input line wherever possible and still
/// carries any inline markup; run it through [`inline::parse_spans`] or
/// [`inline::strip_markup`] before display.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupToken<'a> {
    /// A blank or whitespace-only line
    Blank,
    /// A heading; `level` is the number of leading `#` characters (1–4)
    Heading {
        /// heading level, 1–4
        level: u8,
        /// heading text, trimmed
        text: Cow<'a, str>,
    },
    /// An item in a bullet list
    BulletItem {
        /// nesting depth derived from indentation (0 for a top-level item)
        depth: u8,
        /// item text, trimmed
        text: Cow<'a, str>,
    },
    /// An item in a numbered list
    NumberedItem {
        /// nesting depth derived from indentation (0 for a top-level item)
        depth: u8,
        /// item text, trimmed
        text: Cow<'a, str>,
    },
    /// A horizontal rule
    Rule,
    /// A paragraph of body text
    Paragraph {
        /// paragraph text, trimmed
        text: Cow<'a, str>,
    },
}

impl<'a> MarkupToken<'a> {
    /// Whether this token is a list item of either kind
    pub fn is_list_item(&self) -> bool {
        matches!(
            self,
            MarkupToken::BulletItem { .. } | MarkupToken::NumberedItem { .. }
        )
    }
}

/// Nesting depth of a list item, from the indentation of the raw line:
/// two columns per level, a tab counting as four, capped at three levels.
fn list_depth(line: &str) -> u8 {
    let mut cols = 0usize;
    for c in line.chars() {
        match c {
            ' ' => cols += 1,
            '\t' => cols += 4,
            _ => break,
        }
    }
    (cols / 2).min(3) as u8
}

/// Classify one line of markup.
///
/// Classification precedence is heading, then list items, then rule;
/// anything unmatched is a paragraph. The heading check runs first so a
/// line can never classify as two kinds.
pub fn classify_line(line: &str) -> MarkupToken<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return MarkupToken::Blank;
    }
    if let Some(caps) = HEADING.captures(trimmed) {
        let level = caps.get(1).unwrap().as_str().len() as u8;
        let text = caps.get(2).unwrap().as_str().trim_end();
        return MarkupToken::Heading {
            level,
            text: Cow::Borrowed(text),
        };
    }
    if let Some(caps) = BULLET.captures(trimmed) {
        return MarkupToken::BulletItem {
            depth: list_depth(line),
            text: Cow::Borrowed(caps.get(1).unwrap().as_str().trim_end()),
        };
    }
    if let Some(caps) = NUMBERED.captures(trimmed) {
        return MarkupToken::NumberedItem {
            depth: list_depth(line),
            text: Cow::Borrowed(caps.get(1).unwrap().as_str().trim_end()),
        };
    }
    if RULE.is_match(trimmed) {
        return MarkupToken::Rule;
    }
    MarkupToken::Paragraph {
        text: Cow::Borrowed(trimmed),
    }
}

/// Tokenize a whole chapter body, line by line.
pub fn tokenize(content: &str) -> Vec<MarkupToken<'_>> {
    content.lines().map(classify_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str) -> MarkupToken<'_> {
        MarkupToken::Paragraph { text: text.into() }
    }

    #[test]
    fn headings() {
        assert_eq!(
            classify_line("# Top"),
            MarkupToken::Heading {
                level: 1,
                text: "Top".into()
            }
        );
        assert_eq!(
            classify_line("#### Minor"),
            MarkupToken::Heading {
                level: 4,
                text: "Minor".into()
            }
        );
        // five hashes is not a heading
        assert_eq!(classify_line("##### Too deep"), para("##### Too deep"));
        // the whitespace after the hashes is required
        assert_eq!(classify_line("#hashtag"), para("#hashtag"));
        // and so is the text
        assert_eq!(classify_line("## "), para("##"));
    }

    #[test]
    fn list_items() {
        assert_eq!(
            classify_line("- first"),
            MarkupToken::BulletItem {
                depth: 0,
                text: "first".into()
            }
        );
        assert_eq!(
            classify_line("* second"),
            MarkupToken::BulletItem {
                depth: 0,
                text: "second".into()
            }
        );
        assert_eq!(
            classify_line("12. twelfth"),
            MarkupToken::NumberedItem {
                depth: 0,
                text: "twelfth".into()
            }
        );
        assert_eq!(
            classify_line("3) third"),
            MarkupToken::NumberedItem {
                depth: 0,
                text: "third".into()
            }
        );
        assert_eq!(
            classify_line("    - nested"),
            MarkupToken::BulletItem {
                depth: 2,
                text: "nested".into()
            }
        );
        // a dash with no following text is just a paragraph
        assert_eq!(classify_line("-dashed"), para("-dashed"));
    }

    #[test]
    fn rules() {
        assert_eq!(classify_line("---"), MarkupToken::Rule);
        assert_eq!(classify_line("*****"), MarkupToken::Rule);
        assert_eq!(classify_line("___"), MarkupToken::Rule);
        // mixed characters are not a rule
        assert_eq!(classify_line("--*"), para("--*"));
        assert_eq!(classify_line("--"), para("--"));
    }

    #[test]
    fn blanks_and_fallthrough() {
        assert_eq!(classify_line(""), MarkupToken::Blank);
        assert_eq!(classify_line(" \t "), MarkupToken::Blank);
        assert_eq!(
            classify_line("Plain text with **markup**."),
            para("Plain text with **markup**.")
        );
    }

    #[test]
    fn heading_wins_over_list_lookalikes() {
        // `# - item` is a heading whose text happens to start with a dash
        assert_eq!(
            classify_line("# - item"),
            MarkupToken::Heading {
                level: 1,
                text: "- item".into()
            }
        );
    }

    #[test]
    fn tokenize_splits_lines() {
        let tokens = tokenize("# Title\n\nBody text.\n- one\n- two");
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[1], MarkupToken::Blank);
        assert!(tokens[3].is_list_item());
    }

    #[test]
    fn every_line_classifies() {
        // arbitrary junk never fails to classify
        for line in &["<<<>>>", "][", "*", "1.", "# ", "\u{feff}"] {
            let _ = classify_line(line);
        }
    }
}
