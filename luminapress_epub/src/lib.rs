//! This crate renders a generated book document into an epub 3 file.
//!
//! The e-book target has no page concept: the table of contents is a
//! dedicated page of links to each chapter's start, placed first in the
//! spine after the title page and first in the navigation document, and
//! nothing carries a page number. Chapter bodies are restructured into
//! valid tag nesting — consecutive list items share one list container —
//! by the [`xhtml`] writer.

#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

use linemark::strip_markup;
use luminapress_ast::BookDocument;
use luminapress_common::escape_to_xml;
use std::error::Error;
use std::path::{Path, PathBuf};

mod bundle;
mod xhtml;
use bundle::{EpubContent, EpubResource, EpubSource, CSS_MEDIA_TYPE, JPEG_MEDIA_TYPE};
pub use bundle::EpubBundlingError;
use xhtml::{xhtml_page, XhtmlWriter};

static DEFAULT_CSS: &str = include_str!("default_css.css");

/// The `dcterms:modified` value used when no chapter carries a
/// generation timestamp.
static FALLBACK_MODIFIED: &str = "2024-01-01T00:00:00Z";

/// Options for rendering as an epub
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Custom css to use instead of the built-in stylesheet
    pub css: Option<PathBuf>,
}

impl Options {
    /// Set custom css to use
    pub fn css<P: Into<PathBuf>>(&mut self, css: P) -> &mut Self {
        self.css = Some(css.into());
        self
    }
}

/// Errors possible while creating an epub
#[derive(Debug)]
pub enum RenderingError {
    /// The css file specified could not be read
    MissingCss(PathBuf),
    /// A chapter image existed but could not be read or converted
    ImageConversionError(PathBuf),
    /// There was an error bundling the epub
    BundlingError(EpubBundlingError),
}

impl std::fmt::Display for RenderingError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        formatter.write_fmt(format_args!("{:?}", self))
    }
}

impl Error for RenderingError {}

impl From<EpubBundlingError> for RenderingError {
    fn from(src: EpubBundlingError) -> Self {
        RenderingError::BundlingError(src)
    }
}

/// Support for rendering to an epub
pub trait EpubRenderer {
    /// render to an epub with the given options
    fn render_to_epub(&self, options: &Options) -> Result<Vec<u8>, RenderingError>;
    /// render to an epub with default options
    fn render_to_epub_default(&self) -> Result<Vec<u8>, RenderingError> {
        self.render_to_epub(&Options::default())
    }
}

impl EpubRenderer for BookDocument<'_> {
    fn render_to_epub(&self, options: &Options) -> Result<Vec<u8>, RenderingError> {
        let lang = self.language.tag();
        let mut contents = Vec::with_capacity(self.chapters.len() + 2);
        let mut resources = Vec::new();

        let css = match options.css {
            Some(ref path) => std::fs::read_to_string(path)
                .map_err(|_| RenderingError::MissingCss(path.clone()))?,
            None => DEFAULT_CSS.to_string(),
        };
        resources.push(EpubResource {
            path: "style/default.css".into(),
            media_type: CSS_MEDIA_TYPE,
            data: css.into_bytes(),
        });

        contents.push(EpubContent {
            path: "titlepage.xhtml".into(),
            xhtml: xhtml_page(self.title, lang, &self.titlepage_body()),
            nav_title: None,
        });

        // the contents page is the first navigation entry
        contents.push(EpubContent {
            path: "contents.xhtml".into(),
            xhtml: xhtml_page(self.language.contents_title(), lang, &self.contents_body()),
            nav_title: Some(self.language.contents_title().to_string()),
        });

        for (chapter, entry) in self.chapters.iter().zip(self.contents.iter()) {
            let mut writer = XhtmlWriter::new();
            writer.push_raw(&format!(
                "<section epub:type=\"chapter\" id=\"{}\">\n",
                entry.anchor
            ));
            writer.push_raw(&format!(
                "<p class=\"chapter_label\">{}</p>\n",
                escape_to_xml(
                    self.language
                        .chapter_label(chapter.number)
                        .to_uppercase()
                        .as_str()
                )
            ));
            writer.push_raw("<h1 class=\"chapter_title\">");
            writer.push_inlines(chapter.title);
            writer.push_raw("</h1>\n");

            if let Some(image) = chapter.image {
                if let Some(jpeg) = load_jpeg(image)? {
                    let image_path = format!("images/chapter_{}.jpg", chapter.number);
                    writer.push_raw(&format!(
                        "<img class=\"chapter_image\" src=\"{}\" alt=\"{}\"/>\n",
                        image_path,
                        escape_to_xml(strip_markup(chapter.title).as_ref())
                    ));
                    resources.push(EpubResource {
                        path: image_path,
                        media_type: JPEG_MEDIA_TYPE,
                        data: jpeg,
                    });
                }
            }

            for token in chapter.tokens.iter() {
                writer.push_token(token);
            }
            writer.push_raw("</section>\n");

            contents.push(EpubContent {
                path: format!("{}.xhtml", entry.anchor),
                xhtml: xhtml_page(&entry.title, lang, &writer.finish()),
                nav_title: Some(entry.line(self.language)),
            });
        }

        let source = EpubSource {
            identifier: self.id.to_string(),
            title: strip_markup(self.title).into_owned(),
            language_tag: lang,
            modified: modified_stamp(self.generated_at),
            contents,
            resources,
        };
        Ok(source.bundle()?)
    }
}

trait EpubPages {
    fn titlepage_body(&self) -> String;
    fn contents_body(&self) -> String;
}

impl EpubPages for BookDocument<'_> {
    fn titlepage_body(&self) -> String {
        let mut writer = XhtmlWriter::new();
        writer.push_raw("<h1 class=\"book_title\">");
        writer.push_inlines(self.title);
        writer.push_raw("</h1>\n");
        if let Some(subtitle) = self.subtitle {
            writer.push_raw("<p class=\"book_subtitle\">");
            writer.push_inlines(subtitle);
            writer.push_raw("</p>\n");
        }
        writer.finish()
    }

    fn contents_body(&self) -> String {
        let mut body = String::new();
        body.push_str("<section class=\"contents_list\">\n<h1>");
        body.push_str(&escape_to_xml(self.language.contents_title()));
        body.push_str("</h1>\n<ol>\n");
        for entry in self.contents.iter() {
            body.push_str(&format!(
                "\t<li><a href=\"{anchor}.xhtml\">{line}</a></li>\n",
                anchor = entry.anchor,
                line = escape_to_xml(entry.line(self.language).as_str())
            ));
        }
        body.push_str("</ol>\n</section>\n");
        body
    }
}

/// Reduce an RFC 3339 timestamp from the book record to the
/// `CCYY-MM-DDThh:mm:ssZ` form the package format wants.
fn modified_stamp(generated_at: Option<&str>) -> String {
    match generated_at {
        Some(stamp) if stamp.len() >= 19 && stamp.is_ascii() => format!("{}Z", &stamp[..19]),
        _ => FALLBACK_MODIFIED.to_string(),
    }
}

/// Read a chapter image as jpeg data, converting other raster formats.
/// A missing file is skipped with a warning; an unreadable one is an
/// error.
fn load_jpeg(path: &Path) -> Result<Option<Vec<u8>>, RenderingError> {
    if !path.is_file() {
        log::warn!("chapter image {} is missing; skipping it", path.display());
        return Ok(None);
    }
    luminapress_common::images::convert_to_jpg(path)
        .map(|(data, _)| Some(data))
        .map_err(|_| RenderingError::ImageConversionError(path.to_path_buf()))
}
