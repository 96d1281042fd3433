//! Deterministic locations for export artifacts.
//!
//! An export writes exactly one artifact per `(book identifier, format)`
//! pair; callers can reconstruct the path from the same data without
//! having to record it, and re-exporting overwrites the prior artifact.

use std::path::{Path, PathBuf};

/// The canonical path of the artifact for a book and format extension,
/// inside `exports_dir`: `<exports_dir>/<book_id>.<ext>`.
pub fn artifact_path<P: AsRef<Path>>(exports_dir: P, book_id: &str, ext: &str) -> PathBuf {
    exports_dir.as_ref().join(format!("{}.{}", book_id, ext))
}

/// The filename offered to an end user downloading an artifact,
/// derived from the book title and a prefix of its identifier:
/// `A_Book_Title_0a1b2c3d.pdf`.
pub fn download_filename(title: &str, book_id: &str, ext: &str) -> String {
    let id_prefix: String = book_id.chars().take(8).collect();
    format!("{}_{}.{}", title.replace(' ', "_"), id_prefix, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_path() {
        let p = artifact_path("/tmp/exports", "abc-123", "epub");
        assert_eq!(p, PathBuf::from("/tmp/exports/abc-123.epub"));
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(
            download_filename("A Book Title", "0a1b2c3d-ffff-eeee", "pdf"),
            "A_Book_Title_0a1b2c3d.pdf"
        );
        // short identifiers are used whole
        assert_eq!(download_filename("T", "xy", "docx"), "T_xy.docx");
    }
}
