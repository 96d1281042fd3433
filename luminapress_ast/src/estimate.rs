//! Prediction of how many physical pages a rendered chapter flow will
//! occupy, so a table of contents can carry page numbers in formats
//! where the real numbers cannot be observed.
//!
//! The costs here are empirical: they were tuned by comparing estimates
//! against rendered output at the fixed trim size, not derived from font
//! metrics. Treat them as configuration. The estimator's only hard
//! contract is that chapter start pages never decrease in chapter order
//! and land within the same order of magnitude as the rendered result;
//! the print backend observes real page numbers instead (two-pass build)
//! and uses these estimates only for its discarded first pass.

use crate::BookDocument;
use linemark::{strip_markup, MarkupToken};
use std::collections::BTreeMap;

/// Calibrated per-token line costs and the page line budget.
///
/// The defaults correspond to the fixed 5.5in × 8.5in trim at an 11pt
/// body face: 28 text lines per page at around 10 words per line, i.e.
/// roughly 280 words per page.
#[derive(Debug, Clone, Copy)]
pub struct PageCalibration {
    /// text lines that fit one page
    pub lines_per_page: f32,
    /// average words per justified body line
    pub words_per_line: f32,
    /// lines consumed by a heading and its surrounding space
    pub heading_lines: f32,
    /// lines consumed by one list item
    pub list_item_lines: f32,
    /// lines consumed by a horizontal rule and its space
    pub rule_lines: f32,
    /// lines consumed by a blank line
    pub blank_lines: f32,
    /// lines consumed by a chapter image
    pub image_lines: f32,
    /// lines one contents entry occupies, used to seed the running page
    /// position with the size of the contents itself
    pub contents_lines_per_entry: f32,
}

impl Default for PageCalibration {
    fn default() -> Self {
        PageCalibration {
            lines_per_page: 28.0,
            words_per_line: 10.0,
            heading_lines: 2.5,
            list_item_lines: 1.25,
            rule_lines: 2.0,
            blank_lines: 0.5,
            image_lines: 12.0,
            contents_lines_per_entry: 1.5,
        }
    }
}

impl PageCalibration {
    /// The line cost of one token.
    fn token_lines(&self, token: &MarkupToken<'_>) -> f32 {
        match token {
            MarkupToken::Blank => self.blank_lines,
            MarkupToken::Heading { .. } => self.heading_lines,
            MarkupToken::BulletItem { .. } | MarkupToken::NumberedItem { .. } => {
                self.list_item_lines
            }
            MarkupToken::Rule => self.rule_lines,
            MarkupToken::Paragraph { text } => {
                let words = strip_markup(text.as_ref()).split_whitespace().count();
                (words as f32 / self.words_per_line).max(1.0)
            }
        }
    }

    /// Pages the contents itself occupies, from its entry count.
    /// A rendered contents always takes at least one page.
    pub fn contents_pages(&self, entry_count: usize) -> u32 {
        let lines = entry_count as f32 * self.contents_lines_per_entry;
        (lines / self.lines_per_page).ceil().max(1.0) as u32
    }
}

/// Predicted page count of one chapter: its body lines divided by the
/// page budget and rounded up (at least one page), plus one page for the
/// chapter's opening page.
pub fn estimate_chapter_pages(
    tokens: &[MarkupToken<'_>],
    has_image: bool,
    calibration: &PageCalibration,
) -> u32 {
    let mut lines = 0.0f32;
    if has_image {
        lines += calibration.image_lines;
    }
    for token in tokens {
        lines += calibration.token_lines(token);
    }
    let body_pages = (lines / calibration.lines_per_page).ceil().max(1.0) as u32;
    body_pages + 1
}

/// A mapping from chapter number to the page its rendering starts on,
/// predicted or observed.
///
/// Recording clamps each value to the running maximum, so iteration
/// order always yields non-decreasing page numbers: no chapter can start
/// before the one preceding it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMap {
    pages: BTreeMap<u32, u32>,
}

impl PageMap {
    /// An empty map
    pub fn new() -> Self {
        PageMap::default()
    }

    /// Record the starting page of a chapter. A page earlier than one
    /// already recorded is clamped up to preserve monotonicity.
    pub fn record(&mut self, chapter_number: u32, page: u32) {
        let floor = self
            .pages
            .values()
            .next_back()
            .copied()
            .unwrap_or(1);
        self.pages.insert(chapter_number, page.max(floor));
    }

    /// The starting page of a chapter, if recorded
    pub fn get(&self, chapter_number: u32) -> Option<u32> {
        self.pages.get(&chapter_number).copied()
    }

    /// Iterate entries in chapter-number order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.pages.iter().map(|(&c, &p)| (c, p))
    }

    /// Number of recorded chapters
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Predict the starting page of every chapter in a document.
///
/// The running position is threaded through the fold as an explicit
/// accumulator: page one is the book title page, the contents follow,
/// and each chapter starts where the previous one ended.
pub fn estimate_page_map(document: &BookDocument<'_>, calibration: &PageCalibration) -> PageMap {
    let mut map = PageMap::new();
    let title_pages = 1;
    let mut next_start = title_pages + calibration.contents_pages(document.contents.len()) + 1;
    for chapter in &document.chapters {
        map.record(chapter.number, next_start);
        next_start += estimate_chapter_pages(&chapter.tokens, chapter.image.is_some(), calibration);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Book, BookDocument, Chapter};
    use linemark::tokenize;

    #[test]
    fn long_chapter_never_underestimates_word_count() {
        // a 3000-word chapter with an image and two headings, at the
        // default ~280 words-per-page equivalent
        let mut content = String::from("# Heading One\n\n## Heading Two\n\n");
        let para = "word ".repeat(3000);
        content.push_str(&para);
        let tokens = tokenize(&content);
        let pages = estimate_chapter_pages(&tokens, true, &PageCalibration::default());
        let unadorned = (3000.0f32 / 280.0).ceil() as u32;
        assert!(pages >= unadorned, "{} < {}", pages, unadorned);
    }

    #[test]
    fn empty_chapter_still_occupies_pages() {
        let pages = estimate_chapter_pages(&[], false, &PageCalibration::default());
        assert_eq!(pages, 2); // opening page + minimum one body page
    }

    #[test]
    fn page_map_is_monotonic_even_under_bad_input() {
        let mut map = PageMap::new();
        map.record(1, 5);
        map.record(2, 3); // clamped up
        map.record(3, 9);
        let pages: Vec<u32> = map.iter().map(|(_, p)| p).collect();
        assert_eq!(pages, vec![5, 5, 9]);
    }

    #[test]
    fn start_pages_increase_in_chapter_order() {
        let chapters = (1..=4)
            .map(|n| Chapter {
                chapter_number: n,
                title: format!("Chapter {}", n),
                content: "One paragraph.\n\nAnother paragraph.".into(),
                ..Chapter::default()
            })
            .collect();
        let book = Book {
            id: "b".into(),
            title: "T".into(),
            chapters,
            ..Book::default()
        };
        let doc = BookDocument::assemble(&book);
        let map = estimate_page_map(&doc, &PageCalibration::default());
        let starts: Vec<u32> = map.iter().map(|(_, p)| p).collect();
        assert_eq!(starts.len(), 4);
        // strictly increasing here, since every chapter costs pages
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
        // seeded past the title page and contents
        assert!(starts[0] >= 3);
    }

    #[test]
    fn contents_pages_scale_with_entries() {
        let cal = PageCalibration::default();
        assert_eq!(cal.contents_pages(0), 1);
        assert_eq!(cal.contents_pages(10), 1);
        // 30 entries at 1.5 lines each is 45 lines: two pages
        assert_eq!(cal.contents_pages(30), 2);
    }
}
