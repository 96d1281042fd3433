//! Bundling xhtml pages and resources into a standards-compliant epub.
//!
//! The container layout is fixed: the `mimetype` entry first and stored
//! uncompressed, then `META-INF/container.xml`, then the package under
//! `OEBPS/`. Entry order, identifiers and timestamps are all functions
//! of the input, so bundling the same source twice yields identical
//! bytes.

use std::error::Error;
use std::fmt;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

static CONTAINER_PATH: &str = "META-INF/container.xml";
static OPF_PATH: &str = "OEBPS/document.opf";
static NAV_PATH: &str = "nav.xhtml";

pub(crate) static XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
pub(crate) static CSS_MEDIA_TYPE: &str = "text/css";
pub(crate) static JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// Errors possible while bundling an epub
#[derive(Debug)]
pub enum EpubBundlingError {
    /// An underlying zip error
    Zip(zip::result::ZipError),
    /// An io error while assembling the container
    Io(std::io::Error),
    /// No content documents were provided
    EmptySpine,
}

impl fmt::Display for EpubBundlingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for EpubBundlingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EpubBundlingError::Zip(e) => Some(e),
            EpubBundlingError::Io(e) => Some(e),
            _ => None,
        }
    }
}

macro_rules! error_conv {
    ($from:ty, $to:ident) => {
        impl From<$from> for EpubBundlingError {
            fn from(src: $from) -> Self {
                EpubBundlingError::$to(src)
            }
        }
    };
}

error_conv!(zip::result::ZipError, Zip);
error_conv!(std::io::Error, Io);

/// An xhtml document in the spine
#[derive(Debug)]
pub(crate) struct EpubContent {
    /// path within `OEBPS/`
    pub(crate) path: String,
    pub(crate) xhtml: String,
    /// title shown in the navigation document, if the page should appear
    /// there
    pub(crate) nav_title: Option<String>,
}

/// A binary resource, such as a stylesheet or image
#[derive(Debug)]
pub(crate) struct EpubResource {
    /// path within `OEBPS/`
    pub(crate) path: String,
    pub(crate) media_type: &'static str,
    pub(crate) data: Vec<u8>,
}

/// Everything needed to bundle one epub
#[derive(Debug)]
pub(crate) struct EpubSource {
    pub(crate) identifier: String,
    pub(crate) title: String,
    pub(crate) language_tag: &'static str,
    /// `dcterms:modified`, derived from the book record rather than the
    /// wall clock so that bundling is deterministic
    pub(crate) modified: String,
    pub(crate) contents: Vec<EpubContent>,
    pub(crate) resources: Vec<EpubResource>,
}

impl EpubSource {
    fn opf(&self) -> String {
        let mut opf = String::with_capacity(1024);
        opf.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        opf.push('\n');
        opf.push_str(r#"<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="main_identifier">"#);
        opf.push_str("\n\t<metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n");
        opf.push_str(&format!(
            "\t\t<dc:identifier id=\"main_identifier\">{}</dc:identifier>\n",
            luminapress_common::escape_to_xml(self.identifier.as_str())
        ));
        opf.push_str(&format!(
            "\t\t<dc:title>{}</dc:title>\n",
            luminapress_common::escape_to_xml(self.title.as_str())
        ));
        opf.push_str(&format!(
            "\t\t<dc:language>{}</dc:language>\n",
            self.language_tag
        ));
        opf.push_str(&format!(
            "\t\t<meta property=\"dcterms:modified\">{}</meta>\n",
            self.modified
        ));
        opf.push_str("\t</metadata>\n\t<manifest>\n");
        opf.push_str(&format!(
            "\t\t<item href=\"{}\" id=\"mainnav\" media-type=\"{}\" properties=\"nav\"/>\n",
            NAV_PATH, XHTML_MEDIA_TYPE
        ));
        for (i, content) in self.contents.iter().enumerate() {
            opf.push_str(&format!(
                "\t\t<item href=\"{}\" id=\"contents_{}\" media-type=\"{}\"/>\n",
                content.path, i, XHTML_MEDIA_TYPE
            ));
        }
        for (i, resource) in self.resources.iter().enumerate() {
            opf.push_str(&format!(
                "\t\t<item href=\"{}\" id=\"resource_{}\" media-type=\"{}\"/>\n",
                resource.path, i, resource.media_type
            ));
        }
        opf.push_str("\t</manifest>\n\t<spine>\n");
        for i in 0..self.contents.len() {
            opf.push_str(&format!("\t\t<itemref idref=\"contents_{}\"/>\n", i));
        }
        opf.push_str("\t</spine>\n</package>");
        opf
    }

    fn nav(&self) -> String {
        let mut items = String::new();
        for content in self.contents.iter() {
            if let Some(ref title) = content.nav_title {
                items.push_str(&format!(
                    "\t\t\t<li><a href=\"{}\">{}</a></li>\n",
                    content.path,
                    luminapress_common::escape_to_xml(title.as_str())
                ));
            }
        }
        let mut nav = String::with_capacity(items.len() + 512);
        nav.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#);
        nav.push('\n');
        nav.push_str(r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">"#);
        nav.push_str("\n<head>\n\t<title>");
        nav.push_str(&luminapress_common::escape_to_xml(self.title.as_str()));
        nav.push_str("</title>\n</head>\n<body>\n");
        nav.push_str("\t<nav epub:type=\"toc\" id=\"contents\">\n\t\t<ol>\n");
        nav.push_str(&items);
        nav.push_str("\t\t</ol>\n\t</nav>\n</body>\n</html>");
        nav
    }

    /// Bundle into epub bytes.
    pub(crate) fn bundle(self) -> Result<Vec<u8>, EpubBundlingError> {
        if self.contents.is_empty() {
            return Err(EpubBundlingError::EmptySpine);
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = FileOptions::default().compression_method(CompressionMethod::Stored);

        // the mimetype entry must come first and be uncompressed
        zip.start_file("mimetype", stored)?;
        zip.write_all(b"application/epub+zip")?;

        zip.start_file(CONTAINER_PATH, stored)?;
        zip.write_all(
            format!(
                concat!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                    "\n",
                    r#"<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">"#,
                    "\n\t<rootfiles>\n\t\t",
                    r#"<rootfile full-path="{}" media-type="application/oebps-package+xml"/>"#,
                    "\n\t</rootfiles>\n</container>"
                ),
                OPF_PATH
            )
            .as_bytes(),
        )?;

        zip.start_file(OPF_PATH, stored)?;
        zip.write_all(self.opf().as_bytes())?;

        zip.start_file(format!("OEBPS/{}", NAV_PATH), stored)?;
        zip.write_all(self.nav().as_bytes())?;

        for content in self.contents.iter() {
            zip.start_file(format!("OEBPS/{}", content.path), stored)?;
            zip.write_all(content.xhtml.as_bytes())?;
        }
        for resource in self.resources.iter() {
            zip.start_file(format!("OEBPS/{}", resource.path), stored)?;
            zip.write_all(&resource.data)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_source() -> EpubSource {
        EpubSource {
            identifier: "book-1".into(),
            title: "A Book".into(),
            language_tag: "en",
            modified: "2024-01-01T00:00:00Z".into(),
            contents: vec![EpubContent {
                path: "chapter_1.xhtml".into(),
                xhtml: "<html/>".into(),
                nav_title: Some("Chapter 1: One".into()),
            }],
            resources: Vec::new(),
        }
    }

    #[test]
    fn mimetype_is_the_first_entry() {
        let bytes = minimal_source().bundle().unwrap();
        // local file header: the name of the first entry starts at offset 30
        assert_eq!(&bytes[30..38], b"mimetype");
    }

    #[test]
    fn bundling_is_deterministic() {
        let a = minimal_source().bundle().unwrap();
        let b = minimal_source().bundle().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_spine_is_rejected() {
        let mut source = minimal_source();
        source.contents.clear();
        assert!(matches!(
            source.bundle(),
            Err(EpubBundlingError::EmptySpine)
        ));
    }

    #[test]
    fn opf_lists_manifest_and_spine() {
        let opf = minimal_source().opf();
        assert!(opf.contains("<dc:identifier id=\"main_identifier\">book-1</dc:identifier>"));
        assert!(opf.contains("<item href=\"chapter_1.xhtml\" id=\"contents_0\""));
        assert!(opf.contains("<itemref idref=\"contents_0\"/>"));
        assert!(opf.contains("properties=\"nav\""));
    }
}
