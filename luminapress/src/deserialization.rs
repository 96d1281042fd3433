//! Deserializing book-store snapshots and exporting straight from json.
//!
//! The json here is the record shape the book store keeps: identifier,
//! metadata, the approved outline and the generated chapters. Unknown
//! fields are ignored so the core does not have to track every field
//! the surrounding system writes into its records.

use crate::{render_to_vec, Book, ExportError, OutputFormat};

/// Deserialize a book snapshot from its json record.
pub fn book_from_json(src: &str) -> Result<Book, ExportError> {
    Ok(serde_json::from_str(src)?)
}

/// Create an artifact from a json representation of a book snapshot.
pub fn export_from_json(src: &str, format: OutputFormat) -> Result<Vec<u8>, ExportError> {
    let book = book_from_json(src)?;
    render_to_vec(&book, format)
}
