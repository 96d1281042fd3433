#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! A small set of utilities shared by the export backends:
//! escaping text for XML-like targets, and deriving the paths and
//! filenames of export artifacts.

use aho_corasick::AhoCorasick;
use lazy_static::lazy_static;
use std::borrow::Cow;

pub mod images;
mod paths;
pub use paths::{artifact_path, download_filename};

lazy_static! {
    static ref XML_FINDER: AhoCorasick = AhoCorasick::new(&XML_TARGET_CHARS);
}

static XML_TARGET_CHARS: [&str; 4] = ["&", "<", ">", "\""];

static XML_REPLACEMENTS: [&str; 4] = ["&amp;", "&lt;", "&gt;", "&quot;"];

/// Escape `input` for xml or xhtml output.
///
/// The replacement is a single simultaneous pass, so escaping is safe to
/// apply exactly once to text content before any markup tags are inserted
/// around it; the inserted tags themselves must never pass through here.
pub fn escape_to_xml<'a, S: Into<Cow<'a, str>>>(input: S) -> Cow<'a, str> {
    let input = input.into();
    let input_bytes = input.as_bytes();
    if XML_FINDER.is_match(input_bytes) {
        let mut wtr = Vec::with_capacity(input.len());
        XML_FINDER
            .stream_replace_all(input_bytes, &mut wtr, &XML_REPLACEMENTS)
            .expect("Aho-Corasick error");
        unsafe { Cow::Owned(String::from_utf8_unchecked(wtr)) }
    } else {
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_escapes() {
        let escapes = [
            ("&", "&amp;"),
            ("<em>", "&lt;em&gt;"),
            ("say \"hi\"", "say &quot;hi&quot;"),
            ("a & b < c", "a &amp; b &lt; c"),
        ];
        for (input, expected) in escapes.iter() {
            let out = escape_to_xml(*input);
            assert_eq!(out.as_ref(), *expected);
        }
    }

    #[test]
    fn test_no_double_escaping() {
        // one pass leaves already-escaped entities alone only insofar as
        // their ampersand is escaped once more; callers escape exactly once
        assert_eq!(escape_to_xml("&amp;").as_ref(), "&amp;amp;");
    }

    #[test]
    fn test_borrows_when_clean() {
        let input = "nothing to do here";
        assert!(matches!(escape_to_xml(input), Cow::Borrowed(_)));
    }
}
