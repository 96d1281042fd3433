//! Emission of laid-out pages as a pdf document.
//!
//! The object graph is the minimal one: a catalog, a pages tree whose
//! shared resource dictionary carries the five built-in fonts and every
//! chapter image, and one content stream per page. Nothing here depends
//! on the wall clock or on randomness, so writing the same pages twice
//! yields identical bytes.

use crate::layout::{Page, PAGE_HEIGHT, PAGE_WIDTH};
use crate::metrics::FontStyle;
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

// Real's precision differs across lopdf versions; the cast adapts.
#[allow(clippy::unnecessary_cast)]
fn real(v: f32) -> Object {
    Object::Real(v as _)
}

/// A chapter image prepared for embedding: jpeg data, pixel size, and
/// the display box the layout reserves for it. The display box is fixed
/// before layout so both passes of the two-pass build see identical
/// geometry.
#[derive(Debug)]
pub(crate) struct LoadedImage {
    pub(crate) chapter_number: u32,
    /// resource name in the shared dictionary, `Im<chapter>`
    pub(crate) resource_name: String,
    pub(crate) jpeg: Vec<u8>,
    pub(crate) pixel_size: (u32, u32),
    /// display width in points
    pub(crate) display_width: f32,
    /// display height in points
    pub(crate) display_height: f32,
}

/// Serialize pages and images into pdf bytes.
pub(crate) fn write_pdf(pages: Vec<Page>, images: &[LoadedImage]) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font_dict = Dictionary::new();
    for style in FontStyle::all().iter() {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => style.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        font_dict.set(style.resource_name(), Object::Reference(font_id));
    }

    let mut xobject_dict = Dictionary::new();
    for image in images.iter() {
        let (width, height) = image.pixel_size;
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            image.jpeg.clone(),
        );
        let image_id = doc.add_object(stream);
        xobject_dict.set(image.resource_name.as_bytes(), Object::Reference(image_id));
    }

    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(font_dict));
    if !images.is_empty() {
        resources.set("XObject", Object::Dictionary(xobject_dict));
    }
    let resources_id = doc.add_object(Object::Dictionary(resources));

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages.into_iter() {
        let content = Content {
            operations: page.ops,
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "MediaBox" => vec![real(0.0), real(0.0), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
            "Resources" => Object::Reference(resources_id),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_document_reloads_with_the_right_page_count() {
        let pages = vec![
            Page { ops: Vec::new() },
            Page { ops: Vec::new() },
            Page { ops: Vec::new() },
        ];
        let bytes = write_pdf(pages, &[]).unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 3);
    }

    #[test]
    fn writing_is_deterministic() {
        let a = write_pdf(vec![Page { ops: Vec::new() }], &[]).unwrap();
        let b = write_pdf(vec![Page { ops: Vec::new() }], &[]).unwrap();
        assert_eq!(a, b);
    }
}
