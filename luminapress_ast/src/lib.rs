//! This crate sets out the abstract representation of a generated book
//! which the format backends render.
//!
//! A [`Book`] is the immutable snapshot handed over by the book store at
//! export time: metadata, the approved outline, and the generated
//! chapters. The core never writes back to it. From a snapshot,
//! [`BookDocument::assemble`] produces the shared renderable document —
//! ordered chapter sections with their markup already tokenized and any
//! duplicated chapter-title heading stripped — which each backend
//! consumes through one narrow interface.
//!
//! ```
//! use luminapress_ast::{Book, BookDocument, Chapter};
//!
//! let book = Book {
//!     id: "b1".into(),
//!     title: "A Book".into(),
//!     chapters: vec![Chapter {
//!         chapter_number: 1,
//!         title: "Beginnings".into(),
//!         content: "# Beginnings\n\nIt began...".into(),
//!         ..Chapter::default()
//!     }],
//!     ..Book::default()
//! };
//! let doc = BookDocument::assemble(&book);
//! assert_eq!(doc.chapters.len(), 1);
//! // the duplicate heading has been stripped from the body
//! assert_eq!(doc.chapters[0].tokens.len(), 1);
//! ```

#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod assemble;
mod contents;
mod estimate;
pub use assemble::{strip_duplicate_title, BookDocument, ChapterSection};
pub use contents::ContentsEntry;
pub use estimate::{estimate_chapter_pages, estimate_page_map, PageCalibration, PageMap};

/// One of the two locales a book can be written in.
///
/// The locale drives every label string a backend emits: the chapter
/// label, the contents title, and the punctuation joining them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    En,
    /// French
    Fr,
}

impl Default for Language {
    fn default() -> Self {
        Language::Fr
    }
}

impl Language {
    /// The BCP 47 tag of this locale
    pub const fn tag(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// The label of a chapter: `Chapter 3` / `Chapitre 3`
    pub fn chapter_label(self, number: u32) -> String {
        match self {
            Language::En => format!("Chapter {}", number),
            Language::Fr => format!("Chapitre {}", number),
        }
    }

    /// A chapter label joined with its title. French typography sets a
    /// space before the colon: `Chapitre 1 : Titre`.
    pub fn joined_heading(self, number: u32, title: &str) -> String {
        match self {
            Language::En => format!("Chapter {}: {}", number, title),
            Language::Fr => format!("Chapitre {} : {}", number, title),
        }
    }

    /// The title of the table of contents
    pub const fn contents_title(self) -> &'static str {
        match self {
            Language::En => "Table of Contents",
            Language::Fr => "Table des matières",
        }
    }
}

/// One entry of the approved outline. Outline entries are produced by the
/// content generator before chapters are written; a chapter may exist
/// without one, or diverge from its entry. The core consults the outline
/// only for contents labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// the number of the chapter this entry plans
    pub chapter_number: u32,
    /// planned chapter title
    pub title: String,
    /// planned content summary
    #[serde(default)]
    pub summary: String,
    /// key points the chapter should cover
    #[serde(default)]
    pub key_points: Vec<String>,
    /// the generator's own page estimate for the chapter
    #[serde(default)]
    pub estimated_pages: u32,
    /// a suggestion for an illustrative image
    #[serde(default)]
    pub image_suggestion: String,
}

/// A generated chapter: owned by the content generator, rendered as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chapter {
    /// unique positive chapter number; need not be contiguous
    pub chapter_number: u32,
    /// chapter title as declared by the generator
    pub title: String,
    /// body text in the line-oriented markup dialect
    pub content: String,
    /// locally-resolvable path of the chapter image, if one was produced.
    /// A path that no longer resolves is skipped at render time, not an
    /// error.
    #[serde(default)]
    pub image_path: Option<PathBuf>,
    /// RFC 3339 timestamp of generation, recorded by the generator
    #[serde(default)]
    pub generated_at: String,
}

/// An immutable snapshot of a book record at export time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Book {
    /// the book identifier, which also keys the export artifact
    pub id: String,
    /// book title
    pub title: String,
    /// optional subtitle
    #[serde(default)]
    pub subtitle: Option<String>,
    /// free-text description
    #[serde(default)]
    pub description: String,
    /// category, e.g. `guide` or `recipe`
    #[serde(default)]
    pub category: String,
    /// the locale driving label strings
    #[serde(default)]
    pub language: Language,
    /// the page count the book was commissioned at; informational only
    #[serde(default)]
    pub target_pages: u32,
    /// the approved outline, in outline order
    #[serde(default)]
    pub outline: Vec<OutlineEntry>,
    /// the generated chapters, in record order
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl Book {
    /// The chapters in chapter-number order, whatever order the record
    /// holds them in.
    pub fn chapters_in_order(&self) -> Vec<&Chapter> {
        let mut chapters: Vec<&Chapter> = self.chapters.iter().collect();
        chapters.sort_by_key(|c| c.chapter_number);
        chapters
    }

    /// The outline title for a chapter number, if the outline has an
    /// entry for it.
    pub fn outline_title(&self, chapter_number: u32) -> Option<&str> {
        self.outline
            .iter()
            .find(|e| e.chapter_number == chapter_number)
            .map(|e| e.title.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapters_sort_by_number() {
        let book = Book {
            chapters: vec![
                Chapter {
                    chapter_number: 3,
                    ..Chapter::default()
                },
                Chapter {
                    chapter_number: 1,
                    ..Chapter::default()
                },
                Chapter {
                    chapter_number: 2,
                    ..Chapter::default()
                },
            ],
            ..Book::default()
        };
        let numbers: Vec<u32> = book
            .chapters_in_order()
            .iter()
            .map(|c| c.chapter_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn labels_per_language() {
        assert_eq!(Language::En.chapter_label(2), "Chapter 2");
        assert_eq!(Language::Fr.chapter_label(2), "Chapitre 2");
        assert_eq!(Language::En.joined_heading(1, "Intro"), "Chapter 1: Intro");
        assert_eq!(
            Language::Fr.joined_heading(1, "Intro"),
            "Chapitre 1 : Intro"
        );
        assert_eq!(Language::Fr.contents_title(), "Table des matières");
    }

    #[test]
    fn language_deserializes_from_tag() {
        let l: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(l, Language::En);
    }
}
