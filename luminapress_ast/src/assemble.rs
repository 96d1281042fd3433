//! Assembly of a book snapshot into the shared renderable document.
//!
//! All three backends consume the same structure: the book's metadata,
//! its contents entries, and one [`ChapterSection`] per chapter in
//! chapter-number order, each holding the chapter's tokenized body with
//! any duplicated title heading already removed.

use crate::contents::{contents_entries, ContentsEntry};
use crate::{Book, Language};
use linemark::{strip_markup, tokenize, MarkupToken};
use std::path::Path;

/// A chapter prepared for rendering.
#[derive(Debug)]
pub struct ChapterSection<'a> {
    /// the chapter number
    pub number: u32,
    /// the declared chapter title, as raw markup text
    pub title: &'a str,
    /// the chapter image, if the record carries one
    pub image: Option<&'a Path>,
    /// the tokenized body, title-stripped
    pub tokens: Vec<MarkupToken<'a>>,
}

/// The renderable document each backend consumes: title page data,
/// contents entries and chapter sections, in order.
#[derive(Debug)]
pub struct BookDocument<'a> {
    /// the book identifier
    pub id: &'a str,
    /// book title
    pub title: &'a str,
    /// optional subtitle
    pub subtitle: Option<&'a str>,
    /// the locale for label strings
    pub language: Language,
    /// contents entries, one per chapter, in chapter order
    pub contents: Vec<ContentsEntry>,
    /// chapter sections in chapter-number order
    pub chapters: Vec<ChapterSection<'a>>,
    /// the newest chapter generation timestamp, used where a package
    /// format wants a modification date; never the wall clock
    pub generated_at: Option<&'a str>,
}

impl<'a> BookDocument<'a> {
    /// Assemble the renderable document from a book snapshot.
    pub fn assemble(book: &'a Book) -> BookDocument<'a> {
        let mut chapters = Vec::with_capacity(book.chapters.len());
        for chapter in book.chapters_in_order() {
            let mut tokens = tokenize(&chapter.content);
            strip_duplicate_title(&mut tokens, &chapter.title);
            chapters.push(ChapterSection {
                number: chapter.chapter_number,
                title: chapter.title.as_str(),
                image: chapter.image_path.as_deref(),
                tokens,
            });
        }
        let generated_at = book
            .chapters
            .iter()
            .map(|c| c.generated_at.as_str())
            .filter(|s| !s.is_empty())
            .max();
        BookDocument {
            id: &book.id,
            title: &book.title,
            subtitle: book.subtitle.as_deref(),
            language: book.language,
            contents: contents_entries(book),
            chapters,
            generated_at,
        }
    }
}

/// Remove a leading heading which duplicates the chapter's declared
/// title, so the title is not displayed twice.
///
/// Leading blank lines are skipped; if the first non-blank token is a
/// heading whose plain text and the plain title match — case-insensitive
/// containment in either direction — that heading is dropped along with
/// at most one blank line following it. Nothing past the first non-blank
/// token is ever considered.
///
/// The containment match deliberately reproduces the generator-facing
/// behaviour of the deployed system: titles truncated or reworded by the
/// generator still match, but near-misses (`&` against `and`) do not.
pub fn strip_duplicate_title(tokens: &mut Vec<MarkupToken<'_>>, title: &str) {
    let first_non_blank = match tokens
        .iter()
        .position(|t| !matches!(t, MarkupToken::Blank))
    {
        Some(i) => i,
        None => return,
    };
    let heading_text = match &tokens[first_non_blank] {
        MarkupToken::Heading { text, .. } => strip_markup(text.as_ref()).trim().to_lowercase(),
        _ => return,
    };
    let title_text = strip_markup(title).trim().to_lowercase();
    // an empty side would contain-match anything
    if heading_text.is_empty() || title_text.is_empty() {
        return;
    }
    if heading_text.contains(&title_text) || title_text.contains(&heading_text) {
        tokens.remove(first_non_blank);
        if matches!(tokens.get(first_non_blank), Some(MarkupToken::Blank)) {
            tokens.remove(first_non_blank);
        }
    }
}
