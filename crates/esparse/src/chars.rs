//! Character classification.
//!
//! ASCII is answered from a lookup table; everything else falls through to
//! the Unicode `XID_Start`/`XID_Continue` tables, widened back to
//! `ID_Start`/`ID_Continue` by the code points NFKC closure removes, and the
//! short list of non-ASCII whitespace code points.

use unicode_ident::{is_xid_continue, is_xid_start};

/// The lexical class of a code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    IdentifierStart,
    IdentifierContinue,
    Whitespace,
    LineTerminator,
    Other,
}

const ID_START: u8 = 1 << 0;
const ID_PART: u8 = 1 << 1;
const WHITESPACE: u8 = 1 << 2;
const LINE_TERMINATOR: u8 = 1 << 3;

static ASCII: [u8; 128] = build_ascii_table();

const fn build_ascii_table() -> [u8; 128] {
    let mut table = [0u8; 128];
    let mut i = 0;
    while i < 128 {
        let c = i as u8;
        table[i] = if c.is_ascii_alphabetic() || c == b'$' || c == b'_' {
            ID_START | ID_PART
        } else if c.is_ascii_digit() {
            ID_PART
        } else if c == b' ' || c == b'\t' || c == 0x0B || c == 0x0C {
            WHITESPACE
        } else if c == b'\n' || c == b'\r' {
            LINE_TERMINATOR
        } else {
            0
        };
        i += 1;
    }
    table
}

/// Zero width non-joiner, legal inside identifiers.
pub const ZWNJ: char = '\u{200C}';
/// Zero width joiner, legal inside identifiers.
pub const ZWJ: char = '\u{200D}';

/// In `ID_Start` but not `XID_Start`: NFKC-unstable code points that
/// ECMAScript identifiers still accept (U+309B and U+309C are also
/// `Other_ID_Start`).
#[inline]
fn is_nfkc_exception(c: char) -> bool {
    matches!(
        c,
        '\u{037A}'
            | '\u{0E33}'
            | '\u{0EB3}'
            | '\u{309B}'
            | '\u{309C}'
            | '\u{FC5E}'..='\u{FC63}'
            | '\u{FDFA}'
            | '\u{FDFB}'
            | '\u{FE70}'
            | '\u{FE72}'
            | '\u{FE74}'
            | '\u{FE76}'
            | '\u{FE78}'
            | '\u{FE7A}'
            | '\u{FE7C}'
            | '\u{FE7E}'
            | '\u{FF9E}'
            | '\u{FF9F}'
    )
}

/// Check the ASCII table for a byte.
#[inline]
pub fn ascii_is_id_start(b: u8) -> bool {
    b < 128 && ASCII[b as usize] & ID_START != 0
}

#[inline]
pub fn ascii_is_id_part(b: u8) -> bool {
    b < 128 && ASCII[b as usize] & ID_PART != 0
}

/// Can `c` begin an identifier?
#[inline]
pub fn is_id_start(c: char) -> bool {
    if c.is_ascii() {
        ASCII[c as usize] & ID_START != 0
    } else {
        is_xid_start(c) || is_nfkc_exception(c)
    }
}

/// Can `c` appear after the first character of an identifier?
#[inline]
pub fn is_id_continue(c: char) -> bool {
    if c.is_ascii() {
        ASCII[c as usize] & ID_PART != 0
    } else {
        is_xid_continue(c) || is_nfkc_exception(c) || c == ZWNJ || c == ZWJ
    }
}

#[inline]
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// ECMAScript `WhiteSpace`: tab, vertical tab, form feed, space, NBSP,
/// BOM and the `Zs` category.
#[inline]
pub fn is_whitespace(c: char) -> bool {
    if c.is_ascii() {
        return ASCII[c as usize] & WHITESPACE != 0;
    }
    matches!(
        c,
        '\u{00A0}'
            | '\u{FEFF}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// Classify a code point.
pub fn classify(c: char) -> CharClass {
    if is_line_terminator(c) {
        CharClass::LineTerminator
    } else if is_whitespace(c) {
        CharClass::Whitespace
    } else if is_id_start(c) {
        CharClass::IdentifierStart
    } else if is_id_continue(c) {
        CharClass::IdentifierContinue
    } else {
        CharClass::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_classes() {
        assert_eq!(classify('a'), CharClass::IdentifierStart);
        assert_eq!(classify('$'), CharClass::IdentifierStart);
        assert_eq!(classify('_'), CharClass::IdentifierStart);
        assert_eq!(classify('7'), CharClass::IdentifierContinue);
        assert_eq!(classify('\t'), CharClass::Whitespace);
        assert_eq!(classify('\r'), CharClass::LineTerminator);
        assert_eq!(classify('+'), CharClass::Other);
    }

    #[test]
    fn test_unicode_classes() {
        assert_eq!(classify('ü'), CharClass::IdentifierStart);
        assert_eq!(classify('\u{2029}'), CharClass::LineTerminator);
        assert_eq!(classify('\u{3000}'), CharClass::Whitespace);
        assert_eq!(classify('\u{FEFF}'), CharClass::Whitespace);
        assert_eq!(classify(ZWJ), CharClass::IdentifierContinue);
        // Supplementary plane: MATHEMATICAL BOLD CAPITAL A
        assert_eq!(classify('\u{1D400}'), CharClass::IdentifierStart);
    }

    #[test]
    fn test_nfkc_unstable_identifier_chars() {
        for c in ['\u{037A}', '\u{309B}', '\u{309C}', '\u{FC5E}', '\u{FE7E}', '\u{FF9E}', '\u{FF9F}'] {
            assert!(is_id_start(c), "{:?}", c.escape_unicode().to_string());
            assert!(is_id_continue(c), "{:?}", c.escape_unicode().to_string());
        }
        // Math symbols are still rejected.
        assert!(!is_id_start('\u{00D7}'));
        assert!(!is_id_continue('\u{00D7}'));
        assert_eq!(classify('\u{00B7}'), CharClass::IdentifierContinue);
    }
}
