//! This crate renders a generated book document into a docx file.
//!
//! The flow-document target delivers its running page-number footer as a
//! native `PAGE` field, so no pagination needs to be simulated for the
//! footer; the table of contents, however, shows literal page numbers,
//! and those come from the page estimator — the format offers no way to
//! cross-reference the field values from body text at build time.

#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

use luminapress_ast::{estimate_page_map, BookDocument, PageCalibration};
use std::error::Error;
use std::path::PathBuf;

mod document;
mod package;
use document::DocxWriter;

/// Options for rendering as a docx
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// The page-estimation calibration used for the literal page numbers
    /// in the table of contents
    pub calibration: PageCalibration,
}

impl Options {
    /// Use a custom page-estimation calibration
    pub fn calibration(&mut self, calibration: PageCalibration) -> &mut Self {
        self.calibration = calibration;
        self
    }
}

/// Errors possible while creating a docx
#[derive(Debug)]
pub enum RenderingError {
    /// A chapter image existed but could not be read or converted
    ImageConversionError(PathBuf),
    /// There was an error assembling the package
    PackagingError(std::io::Error),
}

impl std::fmt::Display for RenderingError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        formatter.write_fmt(format_args!("{:?}", self))
    }
}

impl Error for RenderingError {}

impl From<std::io::Error> for RenderingError {
    fn from(src: std::io::Error) -> Self {
        RenderingError::PackagingError(src)
    }
}

/// Support for rendering to a docx
pub trait DocxRenderer {
    /// render to a docx with the given options
    fn render_to_docx(&self, options: &Options) -> Result<Vec<u8>, RenderingError>;
    /// render to a docx with default options
    fn render_to_docx_default(&self) -> Result<Vec<u8>, RenderingError> {
        self.render_to_docx(&Options::default())
    }
}

impl DocxRenderer for BookDocument<'_> {
    fn render_to_docx(&self, options: &Options) -> Result<Vec<u8>, RenderingError> {
        let page_map = estimate_page_map(self, &options.calibration);
        let mut writer = DocxWriter::new(self.language);

        writer.title_page(self.title, self.subtitle);

        let entries: Vec<(String, u32)> = self
            .contents
            .iter()
            .map(|entry| {
                (
                    entry.line(self.language),
                    page_map.get(entry.chapter_number).unwrap_or(1),
                )
            })
            .collect();
        writer.contents(&entries);

        let last = self.chapters.len().saturating_sub(1);
        for (i, chapter) in self.chapters.iter().enumerate() {
            writer.chapter_heading(chapter.number, chapter.title);
            if let Some(image) = chapter.image {
                if image.is_file() {
                    let (jpeg, dimensions) = luminapress_common::images::convert_to_jpg(image)
                        .map_err(|_| RenderingError::ImageConversionError(image.to_path_buf()))?;
                    writer.image(chapter.number, jpeg, dimensions);
                } else {
                    log::warn!(
                        "chapter image {} is missing; skipping it",
                        image.display()
                    );
                }
            }
            for token in chapter.tokens.iter() {
                writer.push_token(token);
            }
            if i != last {
                writer.page_break();
            }
        }

        let ordered_instances = writer.ordered_instances();
        let (body, images) = writer.into_parts();
        let document_xml = DocxWriter::document_xml(&body);
        Ok(package::bundle(&document_xml, ordered_instances, images)?)
    }
}
