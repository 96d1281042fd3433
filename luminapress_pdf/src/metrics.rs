//! Approximate metrics for the built-in Type1 faces.
//!
//! The print target promises only an estimate of where lines break, not
//! glyph-level fidelity, so widths come from a small character-class
//! table rather than embedded font metrics. Values are per-mille of the
//! font size, in the region of the real Helvetica metrics.

/// The face variants a run of text can be set in, each mapped to one of
/// the standard built-in fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
    Mono,
}

impl FontStyle {
    /// The resource name of the font in every page's resource dictionary
    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Italic => "F3",
            FontStyle::BoldItalic => "F4",
            FontStyle::Mono => "F5",
        }
    }

    /// The PostScript base font the resource refers to
    pub(crate) fn base_font(self) -> &'static str {
        match self {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Italic => "Helvetica-Oblique",
            FontStyle::BoldItalic => "Helvetica-BoldOblique",
            FontStyle::Mono => "Courier",
        }
    }

    /// All variants, for building the shared resource dictionary
    pub(crate) fn all() -> [FontStyle; 5] {
        [
            FontStyle::Regular,
            FontStyle::Bold,
            FontStyle::Italic,
            FontStyle::BoldItalic,
            FontStyle::Mono,
        ]
    }
}

/// Width of one character in per-mille of the font size
fn char_units(c: char, style: FontStyle) -> f32 {
    if style == FontStyle::Mono {
        return 600.0;
    }
    let base = match c {
        'i' | 'j' | 'l' | '!' | ',' | '.' | '\'' | '|' | ';' | ':' => 222.0,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | '/' => 333.0,
        ' ' => 278.0,
        'm' | 'w' => 778.0,
        'M' | 'W' => 889.0,
        'A'..='Z' => 667.0,
        '0'..='9' => 556.0,
        _ => 500.0,
    };
    match style {
        FontStyle::Bold | FontStyle::BoldItalic => base * 1.05,
        _ => base,
    }
}

/// Approximate width of `text` set in `style` at `size` points
pub(crate) fn text_width(text: &str, style: FontStyle, size: f32) -> f32 {
    let units: f32 = text.chars().map(|c| char_units(c, style)).sum();
    units * size / 1000.0
}

/// Encode text for the built-in fonts' WinAnsi encoding. Characters
/// outside the encoding degrade to `?` rather than failing; both
/// supported locales fit entirely.
pub(crate) fn encode_winansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        let byte = match c {
            _ if (0x20..0x7f).contains(&code) => code as u8,
            _ if (0xa0..=0xff).contains(&code) => code as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            '‰' => 0x89,
            'Š' => 0x8a,
            '‹' => 0x8b,
            'Œ' => 0x8c,
            'Ž' => 0x8e,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            'š' => 0x9a,
            '›' => 0x9b,
            'œ' => 0x9c,
            'ž' => 0x9e,
            'Ÿ' => 0x9f,
            _ => b'?',
        };
        out.push(byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wider_text_measures_wider() {
        let narrow = text_width("ill", FontStyle::Regular, 11.0);
        let wide = text_width("MMM", FontStyle::Regular, 11.0);
        assert!(narrow < wide);
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let regular = text_width("hello world", FontStyle::Regular, 11.0);
        let bold = text_width("hello world", FontStyle::Bold, 11.0);
        assert!(regular < bold);
    }

    #[test]
    fn mono_is_fixed_pitch() {
        let a = text_width("iii", FontStyle::Mono, 10.0);
        let b = text_width("MMM", FontStyle::Mono, 10.0);
        assert!((a - b).abs() < f32::EPSILON);
    }

    #[test]
    fn french_text_encodes_without_loss() {
        let encoded = encode_winansi("Chapitre 1 : Départ — l'été");
        assert!(!encoded.contains(&b'?'));
        assert_eq!(encoded.len(), "Chapitre 1 : Départ — l'été".chars().count());
    }

    #[test]
    fn unsupported_characters_degrade() {
        assert_eq!(encode_winansi("漢"), vec![b'?']);
    }
}
