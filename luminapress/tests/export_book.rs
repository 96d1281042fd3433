use luminapress::{
    book_from_json, download_filename, render, render_to_vec, ExportError, OutputFormat,
};
use std::io::Read;

static GUIDE_BOOK: &str = include_str!("guide_book.json");

fn docx_document_xml(docx: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(docx.to_vec())).unwrap();
    let mut out = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut out)
        .unwrap();
    out
}

#[test]
fn exports_every_format_at_the_deterministic_path() {
    let book = book_from_json(GUIDE_BOOK).unwrap();
    let exports = tempfile::tempdir().unwrap();

    for format in [OutputFormat::Pdf, OutputFormat::Docx, OutputFormat::Epub].iter() {
        let path = render(&book, *format, exports.path()).unwrap();
        assert_eq!(
            path,
            exports
                .path()
                .join(format!("{}.{}", book.id, format.extension()))
        );
        assert!(path.is_file());
    }
    assert_eq!(std::fs::read_dir(exports.path()).unwrap().count(), 3);
}

#[test]
fn reexporting_overwrites_with_identical_bytes() {
    let book = book_from_json(GUIDE_BOOK).unwrap();
    let exports = tempfile::tempdir().unwrap();

    for format in [OutputFormat::Pdf, OutputFormat::Docx, OutputFormat::Epub].iter() {
        let first = std::fs::read(render(&book, *format, exports.path()).unwrap()).unwrap();
        let second = std::fs::read(render(&book, *format, exports.path()).unwrap()).unwrap();
        assert_eq!(first, second, "{} artifact changed between runs", format.extension());
    }
}

#[test]
fn unsupported_format_is_rejected_before_any_rendering() {
    let err = "xml".parse::<OutputFormat>().unwrap_err();
    assert!(matches!(err, ExportError::UnsupportedFormat(_)));
    assert_eq!(err.to_string(), "Unsupported format: xml");
}

#[test]
fn empty_book_is_rejected() {
    let mut book = book_from_json(GUIDE_BOOK).unwrap();
    book.chapters.clear();
    let exports = tempfile::tempdir().unwrap();
    assert!(matches!(
        render(&book, OutputFormat::Pdf, exports.path()),
        Err(ExportError::NoChapters)
    ));
    // nothing was written
    assert_eq!(std::fs::read_dir(exports.path()).into_iter().flatten().count(), 0);
}

#[test]
fn pdf_is_a_paginated_document() {
    let book = book_from_json(GUIDE_BOOK).unwrap();
    let pdf = render_to_vec(&book, OutputFormat::Pdf).unwrap();
    let document = lopdf::Document::load_mem(&pdf).unwrap();
    // a title page, a contents page, and three chapters each opening on
    // a fresh page
    assert!(document.get_pages().len() >= 5);
}

#[test]
fn docx_contents_lists_chapters_in_order() {
    let book = book_from_json(GUIDE_BOOK).unwrap();
    let docx = render_to_vec(&book, OutputFormat::Docx).unwrap();
    let document = docx_document_xml(&docx);

    let first = document.find("Chapter 1: Choosing Your Containers").unwrap();
    let second = document.find("Chapter 2: Light and Water").unwrap();
    let third = document.find("Chapter 3: Your First Harvest").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn epub_navigation_reaches_every_chapter() {
    let book = book_from_json(GUIDE_BOOK).unwrap();
    let epub = render_to_vec(&book, OutputFormat::Epub).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(epub)).unwrap();
    let mut nav = String::new();
    archive
        .by_name("OEBPS/nav.xhtml")
        .unwrap()
        .read_to_string(&mut nav)
        .unwrap();
    for n in 1..=3 {
        assert!(nav.contains(&format!("chapter_{}.xhtml", n)));
    }
}

#[test]
fn download_filenames_derive_from_title_and_id() {
    let book = book_from_json(GUIDE_BOOK).unwrap();
    assert_eq!(
        download_filename(&book, OutputFormat::Pdf),
        "The_Window_Garden_9b2f1c3a.pdf"
    );
}
