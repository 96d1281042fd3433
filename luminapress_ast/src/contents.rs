//! Table-of-contents entries, shared by every backend.
//!
//! Entries are produced in chapter-number order, one per rendered
//! chapter. The entry label prefers the approved outline's title for the
//! chapter number — the outline is what the user signed off on — and
//! falls back to the chapter's own title; either way the text is reduced
//! to plain form, since contents lines are plain-text contexts.

use crate::{Book, Language};
use linemark::strip_markup;

/// One line of the table of contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentsEntry {
    /// the chapter this entry points at
    pub chapter_number: u32,
    /// chapter title in plain text
    pub title: String,
    /// the anchor naming the chapter's start in targets with navigation
    pub anchor: String,
}

impl ContentsEntry {
    /// The full entry line: label joined with title,
    /// e.g. `Chapter 2: Getting Started`.
    pub fn line(&self, language: Language) -> String {
        language.joined_heading(self.chapter_number, &self.title)
    }
}

/// Build the contents entries for a book, in chapter-number order.
/// An empty chapter list produces no entries.
pub fn contents_entries(book: &Book) -> Vec<ContentsEntry> {
    book.chapters_in_order()
        .into_iter()
        .map(|chapter| {
            let title = book
                .outline_title(chapter.chapter_number)
                .unwrap_or(&chapter.title);
            ContentsEntry {
                chapter_number: chapter.chapter_number,
                title: strip_markup(title).trim().to_string(),
                anchor: format!("chapter_{}", chapter.chapter_number),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Chapter, OutlineEntry};

    #[test]
    fn entries_follow_chapter_order_and_prefer_outline_titles() {
        let book = Book {
            outline: vec![OutlineEntry {
                chapter_number: 2,
                title: "The Approved Title".into(),
                ..OutlineEntry::default()
            }],
            chapters: vec![
                Chapter {
                    chapter_number: 2,
                    title: "A Diverged Title".into(),
                    ..Chapter::default()
                },
                Chapter {
                    chapter_number: 1,
                    title: "**First**".into(),
                    ..Chapter::default()
                },
            ],
            ..Book::default()
        };
        let entries = contents_entries(&book);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].chapter_number, 1);
        // markup is stripped for the plain-text contents line
        assert_eq!(entries[0].title, "First");
        assert_eq!(entries[1].title, "The Approved Title");
        assert_eq!(entries[1].anchor, "chapter_2");
        assert_eq!(entries[1].line(Language::En), "Chapter 2: The Approved Title");
    }

    #[test]
    fn no_entries_for_no_chapters() {
        assert!(contents_entries(&Book::default()).is_empty());
    }
}
