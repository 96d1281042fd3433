//! Packaging the document parts into the OPC zip container.
//!
//! The layout is the minimal WordprocessingML package: content types,
//! package relationships, the document part with its own relationships,
//! a styles part, a numbering part sized to the lists the document
//! actually used, and the footer carrying the page-number field. All
//! entries are stored, in a fixed order, so packaging is deterministic.

use crate::document::ImageRel;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

static DOCUMENT_PATH: &str = "word/document.xml";

static XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

static RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
static REL_TYPE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
static REL_TYPE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
static REL_TYPE_NUMBERING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
static REL_TYPE_FOOTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
static REL_TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

static W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn content_types() -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(concat!(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Default Extension="jpg" ContentType="image/jpeg"/>"#,
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
        r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#,
        r#"<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#,
    ));
    xml.push_str("</Types>");
    xml
}

fn package_rels() -> String {
    format!(
        concat!(
            "{}",
            r#"<Relationships xmlns="{}">"#,
            r#"<Relationship Id="rId1" Type="{}" Target="word/document.xml"/>"#,
            "</Relationships>"
        ),
        XML_DECL, RELS_NS, REL_TYPE_DOCUMENT
    )
}

fn document_rels(images: &[ImageRel]) -> String {
    let mut xml = format!("{}<Relationships xmlns=\"{}\">", XML_DECL, RELS_NS);
    xml.push_str(&format!(
        r#"<Relationship Id="rIdStyles" Type="{}" Target="styles.xml"/>"#,
        REL_TYPE_STYLES
    ));
    xml.push_str(&format!(
        r#"<Relationship Id="rIdNumbering" Type="{}" Target="numbering.xml"/>"#,
        REL_TYPE_NUMBERING
    ));
    xml.push_str(&format!(
        r#"<Relationship Id="rIdFooter" Type="{}" Target="footer1.xml"/>"#,
        REL_TYPE_FOOTER
    ));
    for image in images {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            image.rel_id, REL_TYPE_IMAGE, image.path
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn styles() -> String {
    format!(
        concat!(
            "{}",
            r#"<w:styles xmlns:w="{}">"#,
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal">"#,
            r#"<w:name w:val="Normal"/>"#,
            r#"<w:rPr><w:rFonts w:ascii="Georgia" w:hAnsi="Georgia"/><w:sz w:val="22"/></w:rPr>"#,
            "</w:style></w:styles>"
        ),
        XML_DECL, W_NS
    )
}

/// The numbering part: one bullet definition shared by every bullet
/// list, one decimal definition, and a numbering instance per ordered
/// list the document used, each restarting at one.
fn numbering(ordered_instances: u32) -> String {
    let mut xml = format!("{}<w:numbering xmlns:w=\"{}\">", XML_DECL, W_NS);

    for (abstract_id, (fmt, text, font)) in [
        ("bullet", "•", Some("Symbol")),
        ("decimal", "%1.", None),
    ]
    .iter()
    .enumerate()
    {
        xml.push_str(&format!(
            "<w:abstractNum w:abstractNumId=\"{}\">",
            abstract_id
        ));
        for level in 0..4u32 {
            let indent = 720 + 360 * level;
            xml.push_str(&format!(
                concat!(
                    "<w:lvl w:ilvl=\"{lvl}\">",
                    "<w:start w:val=\"1\"/>",
                    "<w:numFmt w:val=\"{fmt}\"/>",
                    "<w:lvlText w:val=\"{text}\"/>",
                    "<w:lvlJc w:val=\"left\"/>",
                    "<w:pPr><w:ind w:left=\"{indent}\" w:hanging=\"360\"/></w:pPr>",
                    "{font}",
                    "</w:lvl>"
                ),
                lvl = level,
                fmt = fmt,
                text = if *fmt == "decimal" {
                    // each level numbers itself: %1., %2., ...
                    format!("%{}.", level + 1)
                } else {
                    (*text).to_string()
                },
                indent = indent,
                font = match font {
                    Some(f) => format!(
                        "<w:rPr><w:rFonts w:ascii=\"{f}\" w:hAnsi=\"{f}\"/></w:rPr>",
                        f = f
                    ),
                    None => String::new(),
                }
            ));
        }
        xml.push_str("</w:abstractNum>");
    }

    // instance 1: the shared bullet list
    xml.push_str("<w:num w:numId=\"1\"><w:abstractNumId w:val=\"0\"/></w:num>");
    // instances 2..: one per ordered list, restarting at one
    for i in 0..ordered_instances {
        xml.push_str(&format!(
            concat!(
                "<w:num w:numId=\"{}\"><w:abstractNumId w:val=\"1\"/>",
                "<w:lvlOverride w:ilvl=\"0\"><w:startOverride w:val=\"1\"/></w:lvlOverride>",
                "</w:num>"
            ),
            2 + i
        ));
    }
    xml.push_str("</w:numbering>");
    xml
}

/// The footer part: a centred native page-number field.
fn footer() -> String {
    format!(
        concat!(
            "{}",
            r#"<w:ftr xmlns:w="{}">"#,
            "<w:p><w:pPr><w:jc w:val=\"center\"/></w:pPr>",
            r#"<w:fldSimple w:instr=" PAGE "><w:r><w:t>1</w:t></w:r></w:fldSimple>"#,
            "</w:p></w:ftr>"
        ),
        XML_DECL, W_NS
    )
}

/// Assemble the package.
pub(crate) fn bundle(
    document_xml: &str,
    ordered_instances: u32,
    images: Vec<ImageRel>,
) -> Result<Vec<u8>, std::io::Error> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);

    let text_parts: [(&str, String); 6] = [
        ("[Content_Types].xml", content_types()),
        ("_rels/.rels", package_rels()),
        (DOCUMENT_PATH, document_xml.to_string()),
        ("word/_rels/document.xml.rels", document_rels(&images)),
        ("word/styles.xml", styles()),
        ("word/numbering.xml", numbering(ordered_instances)),
    ];

    for (path, content) in text_parts.iter() {
        zip.start_file(*path, stored)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.start_file("word/footer1.xml", stored)?;
    zip.write_all(footer().as_bytes())?;
    for image in images.iter() {
        zip.start_file(format!("word/{}", image.path), stored)?;
        zip.write_all(&image.data)?;
    }

    let cursor = zip.finish().map_err(|e| match e {
        zip::result::ZipError::Io(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
    })?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_has_one_instance_per_ordered_list() {
        let xml = numbering(3);
        assert!(xml.contains("w:numId=\"1\""));
        assert!(xml.contains("w:numId=\"4\""));
        assert!(!xml.contains("w:numId=\"5\""));
        assert_eq!(xml.matches("<w:startOverride w:val=\"1\"/>").count(), 3);
    }

    #[test]
    fn footer_carries_a_native_page_field() {
        assert!(footer().contains(r#"<w:fldSimple w:instr=" PAGE ">"#));
    }

    #[test]
    fn bundle_is_deterministic() {
        let a = bundle("<w:body/>", 1, Vec::new()).unwrap();
        let b = bundle("<w:body/>", 1, Vec::new()).unwrap();
        assert_eq!(a, b);
    }
}
