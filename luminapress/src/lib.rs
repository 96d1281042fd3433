//! Create pdf, docx or epub books from generated book records.
//!
//! This crate is a thin facade over the rendering core: `luminapress_ast`
//! turns a book-store snapshot into a renderable document, and the three
//! backend crates — `luminapress_pdf`, `luminapress_docx` and
//! `luminapress_epub` — each turn that document into one artifact. What
//! the backends share (the markup dialect, the duplicate-title stripper,
//! the page estimator and the contents builder) lives behind the
//! document; what they cannot share (pagination, page-number fields,
//! navigation structure) lives in the backend.
//!
//! # Basic example
//!
//! ```
//! use luminapress::{render_to_vec, Book, Chapter, OutputFormat};
//!
//! let book = Book {
//!     id: "demo".into(),
//!     title: "A Book".into(),
//!     chapters: vec![Chapter {
//!         chapter_number: 1,
//!         title: "Greetings".into(),
//!         content: "# Greetings\n\nHello world...".into(),
//!         ..Chapter::default()
//!     }],
//!     ..Book::default()
//! };
//!
//! let epub = render_to_vec(&book, OutputFormat::Epub)
//!     .expect("Error producing epub");
//! let pdf = render_to_vec(&book, OutputFormat::Pdf)
//!     .expect("Error producing pdf");
//! ```
//!
//! # The export contract
//!
//! [`render`] writes exactly one artifact per `(book, format)` pair at a
//! deterministic path under the exports directory, overwriting any prior
//! artifact for the pair. An unsupported format string or an empty
//! chapter list is rejected before any rendering work begins. Exports
//! are synchronous, independent and idempotent: rendering the same
//! snapshot twice produces byte-identical artifacts, so a failed export
//! can simply be retried by the caller.

#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use luminapress_ast::{
    Book, BookDocument, Chapter, Language, OutlineEntry, PageCalibration, PageMap,
};
pub use luminapress_docx::{DocxRenderer, Options as DocxOptions};
pub use luminapress_epub::{EpubRenderer, Options as EpubOptions};
pub use luminapress_pdf::{Options as PdfOptions, PdfRenderer};

pub mod deserialization;
pub use deserialization::{book_from_json, export_from_json};

/// The output formats an export can be requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// print-ready pdf, two-pass paginated
    Pdf,
    /// flow document with native page-number fields
    Docx,
    /// reflowable e-book
    Epub,
}

impl OutputFormat {
    /// The artifact file extension
    pub const fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
            OutputFormat::Epub => "epub",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "docx" => Ok(OutputFormat::Docx),
            "epub" => Ok(OutputFormat::Epub),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// The single failure signal an export surfaces.
#[derive(Debug)]
pub enum ExportError {
    /// The requested format is not one of `pdf`, `docx`, `epub`;
    /// rejected before any rendering work begins
    UnsupportedFormat(String),
    /// The book has no chapters; rejected before any rendering work
    /// begins
    NoChapters,
    /// The book record could not be deserialized
    InvalidBookRecord(serde_json::Error),
    /// The artifact could not be written
    Io(std::io::Error),
    /// The pdf backend failed
    Pdf(luminapress_pdf::RenderingError),
    /// The docx backend failed
    Docx(luminapress_docx::RenderingError),
    /// The epub backend failed
    Epub(luminapress_epub::RenderingError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::UnsupportedFormat(requested) => {
                write!(f, "Unsupported format: {}", requested)
            }
            ExportError::NoChapters => write!(f, "Book has no chapters"),
            ExportError::InvalidBookRecord(e) => write!(f, "Invalid book record: {}", e),
            ExportError::Io(e) => write!(f, "Error writing artifact: {}", e),
            ExportError::Pdf(e) => write!(f, "Error producing pdf: {}", e),
            ExportError::Docx(e) => write!(f, "Error producing docx: {}", e),
            ExportError::Epub(e) => write!(f, "Error producing epub: {}", e),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExportError::InvalidBookRecord(e) => Some(e),
            ExportError::Io(e) => Some(e),
            ExportError::Pdf(e) => Some(e),
            ExportError::Docx(e) => Some(e),
            ExportError::Epub(e) => Some(e),
            _ => None,
        }
    }
}

macro_rules! error_conv {
    ($from:ty, $to:ident) => {
        impl From<$from> for ExportError {
            fn from(src: $from) -> Self {
                ExportError::$to(src)
            }
        }
    };
}

error_conv!(serde_json::Error, InvalidBookRecord);
error_conv!(std::io::Error, Io);
error_conv!(luminapress_pdf::RenderingError, Pdf);
error_conv!(luminapress_docx::RenderingError, Docx);
error_conv!(luminapress_epub::RenderingError, Epub);

/// Render a book snapshot into artifact bytes.
///
/// An empty chapter list is rejected before any chapter is touched.
pub fn render_to_vec(book: &Book, format: OutputFormat) -> Result<Vec<u8>, ExportError> {
    if book.chapters.is_empty() {
        return Err(ExportError::NoChapters);
    }
    let document = BookDocument::assemble(book);
    let bytes = match format {
        OutputFormat::Pdf => document.render_to_pdf_default()?,
        OutputFormat::Docx => document.render_to_docx_default()?,
        OutputFormat::Epub => document.render_to_epub_default()?,
    };
    log::info!(
        "rendered {} bytes of {} for book {}",
        bytes.len(),
        format.extension(),
        book.id
    );
    Ok(bytes)
}

/// Render a book snapshot and write the artifact at its deterministic
/// path, `<exports_dir>/<book id>.<extension>`, overwriting any earlier
/// artifact for the pair. On failure no artifact path is returned; a
/// partially-written file is the caller's to clean up.
pub fn render<P: AsRef<Path>>(
    book: &Book,
    format: OutputFormat,
    exports_dir: P,
) -> Result<PathBuf, ExportError> {
    let bytes = render_to_vec(book, format)?;
    std::fs::create_dir_all(exports_dir.as_ref())?;
    let path = luminapress_common::artifact_path(exports_dir, &book.id, format.extension());
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// The filename offered for download, derived from the book title and
/// identifier: `A_Book_Title_0a1b2c3d.pdf`.
pub fn download_filename(book: &Book, format: OutputFormat) -> String {
    luminapress_common::download_filename(&book.title, &book.id, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!("pdf".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!("EPUB".parse::<OutputFormat>().unwrap(), OutputFormat::Epub);
        assert!(matches!(
            "xml".parse::<OutputFormat>(),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn empty_chapter_list_is_rejected_before_rendering() {
        let book = Book {
            id: "b".into(),
            title: "T".into(),
            ..Book::default()
        };
        assert!(matches!(
            render_to_vec(&book, OutputFormat::Epub),
            Err(ExportError::NoChapters)
        ));
    }

    #[test]
    fn errors_read_as_reasons() {
        let err = ExportError::UnsupportedFormat("xml".into());
        assert_eq!(err.to_string(), "Unsupported format: xml");
        assert_eq!(ExportError::NoChapters.to_string(), "Book has no chapters");
    }
}
