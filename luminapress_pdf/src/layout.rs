//! The page-flow layout engine for the print target.
//!
//! Content flows down a fixed 5.5in × 8.5in trim one line at a time;
//! when a line no longer fits above the bottom margin the engine starts
//! a new page, drawing the running page-number footer on the page it
//! closes (every page except the book title page). Body paragraphs are
//! justified by distributing the leftover line width across the spaces
//! of every line but a paragraph's last.
//!
//! Chapter starts are zero-size markers in the flow: they consume no
//! vertical space and record the number of the page the following
//! content lands on. The two-pass build relies on the marker seeing the
//! engine's real pagination decisions — the table of contents rendered
//! by the first pass has the same line count as the final one, so the
//! observed positions stay valid when the second pass substitutes the
//! real numbers.

use crate::metrics::{encode_winansi, text_width, FontStyle};
use linemark::{parse_spans, Inline, MarkupToken, Span};
use lopdf::content::Operation;
use lopdf::{Object, StringFormat};
use luminapress_ast::{Language, PageMap};

pub(crate) const PAGE_WIDTH: f32 = 396.0;
pub(crate) const PAGE_HEIGHT: f32 = 612.0;
const MARGIN_LEFT: f32 = 54.0;
const MARGIN_RIGHT: f32 = 36.0;
const MARGIN_TOP: f32 = 54.0;
const MARGIN_BOTTOM: f32 = 54.0;
const TEXT_WIDTH: f32 = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
const FOOTER_BASELINE: f32 = 32.0;
const FOOTER_SIZE: f32 = 10.0;

const BODY_SIZE: f32 = 11.0;
const BODY_LEADING: f32 = 16.0;
const PARA_SPACE_AFTER: f32 = 8.0;
const BLANK_SPACE: f32 = 8.0;
const HEADING_SIZES: [f32; 4] = [13.0, 12.0, 11.5, 11.0];
const HEADING_SPACE_BEFORE: f32 = 12.0;
const HEADING_SPACE_AFTER: f32 = 8.0;
const CHAPTER_TITLE_SIZE: f32 = 18.0;
const CHAPTER_LABEL_SIZE: f32 = 11.0;
const BOOK_TITLE_SIZE: f32 = 24.0;
const SUBTITLE_SIZE: f32 = 14.0;
const CONTENTS_TITLE_SIZE: f32 = 18.0;
/// width reserved for the page-number column of a contents line
const CONTENTS_NUMBER_COLUMN: f32 = 40.0;
const LIST_INDENT: f32 = 14.0;
const LIST_TEXT_GAP: f32 = 16.0;
const LIST_ITEM_SPACE_AFTER: f32 = 3.0;
const RULE_SPACE: f32 = 14.0;
const IMAGE_SPACE_AFTER: f32 = 12.0;

/// One laid-out page: its content operations and the names of the image
/// resources it uses.
#[derive(Debug)]
pub(crate) struct Page {
    pub(crate) ops: Vec<Operation>,
}

/// A run of identically-styled text
#[derive(Debug, Clone)]
struct Run {
    text: String,
    style: FontStyle,
    underline: bool,
}

/// A word or single collapsed space, ready for line filling
#[derive(Debug, Clone)]
struct Frag {
    text: String,
    style: FontStyle,
    underline: bool,
    is_space: bool,
}

impl Frag {
    fn width(&self, size: f32) -> f32 {
        text_width(&self.text, self.style, size)
    }
}

#[derive(Debug)]
struct Line {
    frags: Vec<Frag>,
    width: f32,
    spaces: usize,
}

/// Map inline events onto styled runs. Links have no navigation target
/// on paper; their label keeps an underline.
fn runs_from_markup(text: &str) -> Vec<Run> {
    let mut runs = Vec::new();
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
            Inline::Start(Span::Link(_)) => link += 1,
            Inline::End(Span::Link(_)) => link -= 1,
            Inline::Text(t) => {
                let style = if code > 0 {
                    FontStyle::Mono
                } else {
                    match (bold > 0, italic > 0) {
                        (true, true) => FontStyle::BoldItalic,
                        (true, false) => FontStyle::Bold,
                        (false, true) => FontStyle::Italic,
                        (false, false) => FontStyle::Regular,
                    }
                };
                runs.push(Run {
                    text: t.into_owned(),
                    style,
                    underline: link > 0,
                });
            }
        }
    }
    runs
}

/// Set every run in its bold variant, for headings and titles
fn embolden(runs: &mut [Run]) {
    for run in runs.iter_mut() {
        run.style = match run.style {
            FontStyle::Regular | FontStyle::Bold => FontStyle::Bold,
            FontStyle::Italic | FontStyle::BoldItalic => FontStyle::BoldItalic,
            FontStyle::Mono => FontStyle::Mono,
        };
    }
}

/// Split runs into word and space fragments, collapsing space runs.
fn fragment(runs: &[Run]) -> Vec<Frag> {
    let mut frags: Vec<Frag> = Vec::new();
    for run in runs {
        for piece in split_words(&run.text) {
            match piece {
                WordOrSpace::Space => {
                    if !matches!(frags.last(), Some(f) if f.is_space) {
                        frags.push(Frag {
                            text: " ".to_string(),
                            style: run.style,
                            underline: false,
                            is_space: true,
                        });
                    }
                }
                WordOrSpace::Word(word) => frags.push(Frag {
                    text: word.to_string(),
                    style: run.style,
                    underline: run.underline,
                    is_space: false,
                }),
            }
        }
    }
    frags
}

enum WordOrSpace<'a> {
    Word(&'a str),
    Space,
}

fn split_words(text: &str) -> Vec<WordOrSpace<'_>> {
    let mut out = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        if rest.starts_with(' ') {
            out.push(WordOrSpace::Space);
            rest = rest.trim_start_matches(' ');
        } else {
            let end = rest.find(' ').unwrap_or(rest.len());
            out.push(WordOrSpace::Word(&rest[..end]));
            rest = &rest[end..];
        }
    }
    out
}

/// Greedy line filling. A word wider than the measure gets a line of
/// its own rather than failing.
fn wrap(runs: &[Run], size: f32, measure: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current: Vec<Frag> = Vec::new();
    let mut current_width = 0.0f32;
    let mut pending_space: Option<Frag> = None;

    for frag in fragment(runs) {
        if frag.is_space {
            if !current.is_empty() {
                pending_space = Some(frag);
            }
            continue;
        }
        let frag_width = frag.width(size);
        let space_width = pending_space
            .as_ref()
            .map(|s| s.width(size))
            .unwrap_or(0.0);
        if !current.is_empty() && current_width + space_width + frag_width > measure {
            lines.push(make_line(std::mem::take(&mut current), current_width));
            current_width = 0.0;
            pending_space = None;
            current.push(frag);
            current_width += frag_width;
        } else {
            if let Some(space) = pending_space.take() {
                current_width += space_width;
                current.push(space);
            }
            current.push(frag);
            current_width += frag_width;
        }
    }
    if !current.is_empty() {
        lines.push(make_line(current, current_width));
    }
    lines
}

fn make_line(frags: Vec<Frag>, width: f32) -> Line {
    let spaces = frags.iter().filter(|f| f.is_space).count();
    Line {
        frags,
        width,
        spaces,
    }
}

// Real's precision differs across lopdf versions; the cast adapts.
#[allow(clippy::unnecessary_cast)]
fn real(v: f32) -> Object {
    Object::Real(v as _)
}

fn name(n: &str) -> Object {
    Object::Name(n.as_bytes().to_vec())
}

fn text_object(t: &str) -> Object {
    Object::String(encode_winansi(t), StringFormat::Literal)
}

/// The flow engine. One instance lays out one complete pass over the
/// document; the observed chapter positions come back from [`finish`].
#[derive(Debug)]
pub(crate) struct LayoutEngine {
    language: Language,
    pages: Vec<Page>,
    current: Vec<Operation>,
    /// y of the top of the remaining space on the current page
    cursor: f32,
    page_no: u32,
    page_has_content: bool,
    numbered_counter: u32,
    observed: PageMap,
}

impl LayoutEngine {
    pub(crate) fn new(language: Language) -> Self {
        LayoutEngine {
            language,
            pages: Vec::new(),
            current: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN_TOP,
            page_no: 1,
            page_has_content: false,
            numbered_counter: 0,
            observed: PageMap::new(),
        }
    }

    /// Close the current page and start the next.
    fn new_page(&mut self) {
        self.finalize_page();
        self.cursor = PAGE_HEIGHT - MARGIN_TOP;
        self.page_no += 1;
        self.page_has_content = false;
        self.numbered_counter = 0;
    }

    fn finalize_page(&mut self) {
        let mut ops = std::mem::take(&mut self.current);
        // the running footer appears on every page except the title page
        if self.page_no != 1 {
            let label = self.page_no.to_string();
            let width = text_width(&label, FontStyle::Regular, FOOTER_SIZE);
            let x = MARGIN_LEFT + (TEXT_WIDTH - width) / 2.0;
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![name(FontStyle::Regular.resource_name()), real(FOOTER_SIZE)],
            ));
            ops.push(Operation::new(
                "Tm",
                vec![
                    real(1.0),
                    real(0.0),
                    real(0.0),
                    real(1.0),
                    real(x),
                    real(FOOTER_BASELINE),
                ],
            ));
            ops.push(Operation::new("Tj", vec![text_object(&label)]));
            ops.push(Operation::new("ET", vec![]));
        }
        self.pages.push(Page { ops });
    }

    /// Start a fresh page unless the current one is still untouched.
    fn break_page(&mut self) {
        if self.page_has_content {
            self.new_page();
        }
    }

    fn ensure_room(&mut self, needed: f32) {
        if self.cursor - needed < MARGIN_BOTTOM {
            self.new_page();
        }
    }

    /// The zero-size chapter marker: records which page the chapter's
    /// content is about to land on, consuming no space itself.
    fn chapter_marker(&mut self, chapter_number: u32) {
        self.observed.record(chapter_number, self.page_no);
    }

    /// Emit one line of frags at `x`, advancing the cursor by `leading`.
    /// `justify_to` stretches the line's spaces to the given measure.
    fn emit_line(&mut self, line: &Line, x: f32, size: f32, leading: f32, justify_to: Option<f32>) {
        self.cursor -= leading;
        let baseline = self.cursor + leading * 0.25;

        let extra = match justify_to {
            Some(measure) if line.spaces > 0 && measure > line.width => {
                let extra = (measure - line.width) / line.spaces as f32;
                // a nearly-empty forced break reads better ragged
                if extra > size * 1.5 {
                    0.0
                } else {
                    extra
                }
            }
            _ => 0.0,
        };

        let mut underlines: Vec<(f32, f32)> = Vec::new();
        let mut x_cursor = x;
        let mut current_font: Option<FontStyle> = None;

        self.current.push(Operation::new("BT", vec![]));
        for frag in line.frags.iter() {
            if current_font != Some(frag.style) {
                self.current.push(Operation::new(
                    "Tf",
                    vec![name(frag.style.resource_name()), real(size)],
                ));
                current_font = Some(frag.style);
            }
            self.current.push(Operation::new(
                "Tm",
                vec![
                    real(1.0),
                    real(0.0),
                    real(0.0),
                    real(1.0),
                    real(x_cursor),
                    real(baseline),
                ],
            ));
            self.current
                .push(Operation::new("Tj", vec![text_object(&frag.text)]));
            let advance = frag.width(size) + if frag.is_space { extra } else { 0.0 };
            if frag.underline && !frag.is_space {
                underlines.push((x_cursor, x_cursor + frag.width(size)));
            }
            x_cursor += advance;
        }
        self.current.push(Operation::new("ET", vec![]));

        for (x1, x2) in underlines {
            self.current.push(Operation::new("q", vec![]));
            self.current
                .push(Operation::new("w", vec![real(0.5)]));
            self.current.push(Operation::new(
                "m",
                vec![real(x1), real(baseline - 1.5)],
            ));
            self.current.push(Operation::new(
                "l",
                vec![real(x2), real(baseline - 1.5)],
            ));
            self.current.push(Operation::new("S", vec![]));
            self.current.push(Operation::new("Q", vec![]));
        }
        self.page_has_content = true;
    }

    /// A block of wrapped lines starting at the left margin.
    fn text_block(&mut self, runs: &[Run], size: f32, leading: f32, justified: bool) {
        let lines = wrap(runs, size, TEXT_WIDTH);
        let last = lines.len().saturating_sub(1);
        for (i, line) in lines.iter().enumerate() {
            self.ensure_room(leading);
            let justify_to = if justified && i != last {
                Some(TEXT_WIDTH)
            } else {
                None
            };
            self.emit_line(line, MARGIN_LEFT, size, leading, justify_to);
        }
    }

    /// A block of wrapped lines, each centred on the measure.
    fn centred_block(&mut self, runs: &[Run], size: f32, leading: f32) {
        let lines = wrap(runs, size, TEXT_WIDTH);
        for line in lines.iter() {
            self.ensure_room(leading);
            let x = MARGIN_LEFT + (TEXT_WIDTH - line.width).max(0.0) / 2.0;
            self.emit_line(line, x, size, leading, None);
        }
    }

    fn set_grey(&mut self) {
        self.current.push(Operation::new(
            "rg",
            vec![real(0.5), real(0.5), real(0.5)],
        ));
    }

    fn set_black(&mut self) {
        self.current.push(Operation::new(
            "rg",
            vec![real(0.0), real(0.0), real(0.0)],
        ));
    }

    /// The book title page: no footer, vertical drop, centred title and
    /// subtitle.
    pub(crate) fn title_page(&mut self, title: &str, subtitle: Option<&str>) {
        self.cursor -= 144.0;
        let mut title_runs = runs_from_markup(title);
        embolden(&mut title_runs);
        self.centred_block(&title_runs, BOOK_TITLE_SIZE, BOOK_TITLE_SIZE + 8.0);
        if let Some(subtitle) = subtitle {
            self.cursor -= 18.0;
            self.set_grey();
            let subtitle_runs = runs_from_markup(subtitle);
            self.centred_block(&subtitle_runs, SUBTITLE_SIZE, SUBTITLE_SIZE + 6.0);
            self.set_black();
        }
        self.page_has_content = true;
    }

    /// The contents page: one line per entry, page number right-aligned
    /// in its own column. The entries' numbers arrive as strings so the
    /// caller decides whether they are estimates or observations.
    pub(crate) fn contents_page(&mut self, entries: &[(String, String)]) {
        self.break_page();
        let title_runs = vec![Run {
            text: self.language.contents_title().to_string(),
            style: FontStyle::Bold,
            underline: false,
        }];
        self.text_block(&title_runs, CONTENTS_TITLE_SIZE, CONTENTS_TITLE_SIZE + 6.0, false);
        self.cursor -= 14.0;

        let measure = TEXT_WIDTH - CONTENTS_NUMBER_COLUMN;
        for (line_text, number) in entries {
            let runs = vec![Run {
                text: line_text.clone(),
                style: FontStyle::Regular,
                underline: false,
            }];
            let lines = wrap(&runs, BODY_SIZE, measure);
            for (i, line) in lines.iter().enumerate() {
                self.ensure_room(BODY_LEADING);
                self.emit_line(line, MARGIN_LEFT, BODY_SIZE, BODY_LEADING, None);
                if i == 0 {
                    // the number shares the entry's first baseline
                    let number_width = text_width(number, FontStyle::Regular, BODY_SIZE);
                    let number_line = make_line(
                        vec![Frag {
                            text: number.clone(),
                            style: FontStyle::Regular,
                            underline: false,
                            is_space: false,
                        }],
                        number_width,
                    );
                    self.cursor += BODY_LEADING;
                    self.emit_line(
                        &number_line,
                        MARGIN_LEFT + TEXT_WIDTH - number_width,
                        BODY_SIZE,
                        BODY_LEADING,
                        None,
                    );
                }
            }
            self.cursor -= 2.0;
        }
    }

    /// Open a chapter: fresh page, zero-size marker, label above title.
    pub(crate) fn begin_chapter(&mut self, number: u32, title: &str) {
        self.break_page();
        self.chapter_marker(number);
        self.cursor -= 36.0;
        let label = self.language.chapter_label(number).to_uppercase();
        let label_runs = vec![Run {
            text: label,
            style: FontStyle::Regular,
            underline: false,
        }];
        self.centred_block(&label_runs, CHAPTER_LABEL_SIZE, CHAPTER_LABEL_SIZE + 4.0);
        self.cursor -= 6.0;
        let mut title_runs = runs_from_markup(title);
        embolden(&mut title_runs);
        self.centred_block(&title_runs, CHAPTER_TITLE_SIZE, CHAPTER_TITLE_SIZE + 6.0);
        self.cursor -= 18.0;
    }

    /// Draw a chapter image centred at its display size.
    pub(crate) fn image(&mut self, resource_name: &str, width: f32, height: f32) {
        self.ensure_room(height + IMAGE_SPACE_AFTER);
        let x = MARGIN_LEFT + (TEXT_WIDTH - width) / 2.0;
        let y = self.cursor - height;
        self.current.push(Operation::new("q", vec![]));
        self.current.push(Operation::new(
            "cm",
            vec![
                real(width),
                real(0.0),
                real(0.0),
                real(height),
                real(x),
                real(y),
            ],
        ));
        self.current
            .push(Operation::new("Do", vec![name(resource_name)]));
        self.current.push(Operation::new("Q", vec![]));
        self.cursor -= height + IMAGE_SPACE_AFTER;
        self.page_has_content = true;
    }

    /// Flow one body token.
    pub(crate) fn push_token(&mut self, token: &MarkupToken<'_>) {
        if !matches!(token, MarkupToken::NumberedItem { .. }) {
            self.numbered_counter = 0;
        }
        match token {
            MarkupToken::Blank => {
                self.cursor -= BLANK_SPACE;
            }
            MarkupToken::Heading { level, text } => {
                let size = HEADING_SIZES[(level - 1).min(3) as usize];
                if self.page_has_content {
                    self.cursor -= HEADING_SPACE_BEFORE;
                }
                // keep the heading with at least one following body line
                self.ensure_room(size + 5.0 + BODY_LEADING);
                let mut runs = runs_from_markup(text);
                embolden(&mut runs);
                self.text_block(&runs, size, size + 5.0, false);
                self.cursor -= HEADING_SPACE_AFTER;
            }
            MarkupToken::BulletItem { depth, text } => {
                self.list_item("•", *depth, text);
            }
            MarkupToken::NumberedItem { depth, text } => {
                self.numbered_counter += 1;
                let marker = format!("{}.", self.numbered_counter);
                self.list_item(&marker, *depth, text);
            }
            MarkupToken::Rule => {
                self.ensure_room(RULE_SPACE);
                self.cursor -= RULE_SPACE / 2.0;
                let rule_width = TEXT_WIDTH * 0.3;
                let x1 = MARGIN_LEFT + (TEXT_WIDTH - rule_width) / 2.0;
                self.current.push(Operation::new("q", vec![]));
                self.current.push(Operation::new("w", vec![real(0.75)]));
                self.current
                    .push(Operation::new("m", vec![real(x1), real(self.cursor)]));
                self.current.push(Operation::new(
                    "l",
                    vec![real(x1 + rule_width), real(self.cursor)],
                ));
                self.current.push(Operation::new("S", vec![]));
                self.current.push(Operation::new("Q", vec![]));
                self.cursor -= RULE_SPACE / 2.0;
                self.page_has_content = true;
            }
            MarkupToken::Paragraph { text } => {
                let runs = runs_from_markup(text);
                self.text_block(&runs, BODY_SIZE, BODY_LEADING, true);
                self.cursor -= PARA_SPACE_AFTER;
            }
        }
    }

    fn list_item(&mut self, marker: &str, depth: u8, text: &str) {
        let indent = MARGIN_LEFT + LIST_INDENT * (1.0 + f32::from(depth));
        let text_x = indent + LIST_TEXT_GAP;
        let measure = TEXT_WIDTH - (text_x - MARGIN_LEFT);
        let runs = runs_from_markup(text);
        let lines = wrap(&runs, BODY_SIZE, measure);
        for (i, line) in lines.iter().enumerate() {
            self.ensure_room(BODY_LEADING);
            if i == 0 {
                let marker_line = make_line(
                    vec![Frag {
                        text: marker.to_string(),
                        style: FontStyle::Regular,
                        underline: false,
                        is_space: false,
                    }],
                    text_width(marker, FontStyle::Regular, BODY_SIZE),
                );
                self.emit_line(&marker_line, indent, BODY_SIZE, BODY_LEADING, None);
                self.cursor += BODY_LEADING;
            }
            self.emit_line(line, text_x, BODY_SIZE, BODY_LEADING, None);
        }
        if lines.is_empty() {
            // an item that is pure markup noise still shows its marker
            let marker_line = make_line(
                vec![Frag {
                    text: marker.to_string(),
                    style: FontStyle::Regular,
                    underline: false,
                    is_space: false,
                }],
                text_width(marker, FontStyle::Regular, BODY_SIZE),
            );
            self.ensure_room(BODY_LEADING);
            self.emit_line(&marker_line, indent, BODY_SIZE, BODY_LEADING, None);
        }
        self.cursor -= LIST_ITEM_SPACE_AFTER;
    }

    /// Close the pass: finalize the last page and hand back the laid-out
    /// pages with the chapter positions the markers observed.
    pub(crate) fn finish(mut self) -> (Vec<Page>, PageMap) {
        self.finalize_page();
        (self.pages, self.observed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular(text: &str) -> Vec<Run> {
        vec![Run {
            text: text.to_string(),
            style: FontStyle::Regular,
            underline: false,
        }]
    }

    #[test]
    fn wrap_fills_greedily() {
        let text = "one two three four five six seven eight nine ten ".repeat(5);
        let lines = wrap(&regular(&text), 11.0, 306.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width <= 306.0 + 0.01);
        }
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let lines = wrap(&regular("a reallyreallyreallylongunbreakableword b"), 11.0, 40.0);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn wrap_preserves_all_words() {
        let text = "alpha beta gamma delta epsilon zeta";
        let lines = wrap(&regular(text), 11.0, 80.0);
        let rejoined: Vec<String> = lines
            .iter()
            .map(|l| {
                l.frags
                    .iter()
                    .map(|f| f.text.as_str())
                    .collect::<String>()
            })
            .collect();
        assert_eq!(rejoined.join(" ").split_whitespace().count(), 6);
    }

    #[test]
    fn styled_runs_map_to_faces() {
        let runs = runs_from_markup("plain ***loud*** `mono`");
        let styles: Vec<FontStyle> = runs.iter().map(|r| r.style).collect();
        assert!(styles.contains(&FontStyle::BoldItalic));
        assert!(styles.contains(&FontStyle::Mono));
    }

    #[test]
    fn long_flow_breaks_pages_and_numbers_them() {
        let mut engine = LayoutEngine::new(Language::En);
        engine.title_page("A Book", None);
        engine.begin_chapter(1, "One");
        let para = MarkupToken::Paragraph {
            text: "these are some words that repeat and repeat to fill lines and pages "
                .repeat(40)
                .into(),
        };
        for _ in 0..6 {
            engine.push_token(&para);
        }
        let (pages, observed) = engine.finish();
        assert!(pages.len() > 2, "expected several pages, got {}", pages.len());
        assert_eq!(observed.get(1), Some(2));
        // footers: the title page has none, later pages do
        assert!(pages[0].ops.iter().all(|op| op.operator != "Tf"
            || op.operands != vec![name("F1"), real(FOOTER_SIZE)]));
    }

    #[test]
    fn chapter_markers_are_monotonic() {
        let mut engine = LayoutEngine::new(Language::En);
        engine.title_page("A Book", None);
        for n in 1..=3 {
            engine.begin_chapter(n, "Chapter");
            engine.push_token(&MarkupToken::Paragraph {
                text: "a few words of body text".into(),
            });
        }
        let (_, observed) = engine.finish();
        let starts: Vec<u32> = observed.iter().map(|(_, p)| p).collect();
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(starts[0], 2);
    }
}
