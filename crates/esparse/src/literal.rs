//! Literal scanning: numbers, strings, templates and regular expressions.
//!
//! These are `Lexer` methods split out of `lexer.rs`; they run with the
//! cursor on the first character of the literal (or just past an opening
//! delimiter for template chunks).

use crate::chars::{self, ascii_is_id_part, ascii_is_id_start};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{TemplatePart, TokenKind};

/// One decoded escape sequence.
enum Escape {
    Char(char),
    /// Backslash followed by a line terminator.
    LineContinuation,
    /// Not a valid escape. Fatal in strings, tolerated in tagged templates.
    Invalid(&'static str),
}

impl<'a> Lexer<'a> {
    // === Numbers ===

    pub(crate) fn scan_number(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;

        // Handle different number formats
        if self.current() == b'0' {
            match self.peek_byte() {
                b'x' | b'X' => return self.scan_radix_number(16),
                b'o' | b'O' => return self.scan_radix_number(8),
                b'b' | b'B' => return self.scan_radix_number(2),
                b'0'..=b'9' => return self.scan_legacy_octal_like(),
                b'_' => {
                    self.advance();
                    return Err(self.error_here("Numeric separator can not be used after leading 0"));
                }
                _ => {}
            }
        }

        let mut is_integer = true;

        // Decimal integer part (absent for `.5`)
        if self.current() != b'.' {
            self.scan_digits(10)?;
        }

        // Decimal part
        if self.current() == b'.' {
            is_integer = false;
            self.advance();
            self.scan_digits(10)?;
        }

        // Exponent part
        if matches!(self.current(), b'e' | b'E') {
            is_integer = false;
            self.advance();
            if matches!(self.current(), b'+' | b'-') {
                self.advance();
            }
            if self.scan_digits(10)? == 0 {
                return Err(self.error("Invalid number: missing exponent"));
            }
        }

        // BigInt suffix
        if self.current() == b'n' {
            if !is_integer {
                return Err(self.error("Invalid BigInt syntax"));
            }
            let digits = self.slice(start, self.pos).replace('_', "");
            self.advance();
            self.check_after_numeric()?;
            return Ok(TokenKind::BigInt(digits));
        }

        self.check_after_numeric()?;
        let text = self.slice(start, self.pos).replace('_', "");
        let value = text
            .parse::<f64>()
            .map_err(|_| self.error("Invalid number"))?;
        Ok(TokenKind::Number(value))
    }

    /// `0x`, `0o` and `0b` literals.
    fn scan_radix_number(&mut self, radix: u32) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.advance_n(2); // Skip prefix
        let digits_start = self.pos;
        if self.scan_digits(radix)? == 0 {
            return Err(self.error_here(format!("Expected number in radix {radix}")));
        }
        let digits = self.slice(digits_start, self.pos);

        if self.current() == b'n' {
            let text = self.slice(start, self.pos).replace('_', "");
            self.advance();
            self.check_after_numeric()?;
            return Ok(TokenKind::BigInt(text));
        }

        self.check_after_numeric()?;
        let value = digits
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0f64, |acc, d| acc * radix as f64 + d as f64);
        Ok(TokenKind::Number(value))
    }

    /// `0` followed by more digits: a legacy octal literal (`017`) or a
    /// non-octal decimal (`019`, `08.5`). Both are strict mode errors,
    /// reported by the parser through the token flag.
    fn scan_legacy_octal_like(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.advance(); // Skip 0
        let mut octal = true;
        while self.current().is_ascii_digit() {
            if self.current() >= b'8' {
                octal = false;
            }
            self.advance();
        }
        if self.current() == b'_' {
            return Err(self.error_here("Numeric separators are not allowed in legacy octal literals"));
        }
        self.legacy_octal = true;

        if octal {
            if self.current() == b'n' {
                return Err(self.error("Invalid BigInt syntax"));
            }
            self.check_after_numeric()?;
            let value = self
                .slice(start + 1, self.pos)
                .bytes()
                .fold(0f64, |acc, b| acc * 8.0 + (b - b'0') as f64);
            return Ok(TokenKind::Number(value));
        }

        if self.current() == b'.' {
            self.advance();
            self.scan_digits(10)?;
        }
        if matches!(self.current(), b'e' | b'E') {
            self.advance();
            if matches!(self.current(), b'+' | b'-') {
                self.advance();
            }
            if self.scan_digits(10)? == 0 {
                return Err(self.error("Invalid number: missing exponent"));
            }
        }
        if self.current() == b'n' {
            return Err(self.error("Invalid BigInt syntax"));
        }
        self.check_after_numeric()?;
        let value = self
            .slice(start, self.pos)
            .parse::<f64>()
            .map_err(|_| self.error("Invalid number"))?;
        Ok(TokenKind::Number(value))
    }

    /// Consume digits of `radix` with `_` separators. Returns the digit count.
    fn scan_digits(&mut self, radix: u32) -> Result<usize, ParseError> {
        let mut count = 0;
        let mut after_separator = false;
        loop {
            let ch = self.current();
            if ch == b'_' {
                if count == 0 || after_separator {
                    return Err(self.error_here("Numeric separators are not allowed here"));
                }
                after_separator = true;
                self.advance();
            } else if (ch as char).is_digit(radix) {
                count += 1;
                after_separator = false;
                self.advance();
            } else {
                break;
            }
        }
        if after_separator {
            return Err(self.error_here("Numeric separator can not be used at the end of a number"));
        }
        Ok(count)
    }

    fn check_after_numeric(&self) -> Result<(), ParseError> {
        let ch = self.current();
        if ch.is_ascii_digit()
            || ascii_is_id_start(ch)
            || ch == b'\\'
            || (ch >= 0x80 && chars::is_id_start(self.current_char()))
        {
            return Err(self.error_here("Identifier starts immediately after numeric literal"));
        }
        Ok(())
    }

    // === Strings ===

    pub(crate) fn scan_string(&mut self, quote: u8) -> Result<TokenKind, ParseError> {
        self.advance(); // Skip opening quote
        let mut value = String::new();
        let mut chunk_start = self.pos;

        loop {
            if self.is_eof() {
                return Err(self.error("Unterminated string constant"));
            }
            let ch = self.current();
            match ch {
                _ if ch == quote => {
                    value.push_str(self.slice(chunk_start, self.pos));
                    self.advance(); // Skip closing quote
                    return Ok(TokenKind::String(value));
                }
                b'\\' => {
                    value.push_str(self.slice(chunk_start, self.pos));
                    self.advance();
                    match self.scan_escape(false) {
                        Escape::Char(c) => value.push(c),
                        Escape::LineContinuation => {}
                        Escape::Invalid(message) => return Err(self.error(message)),
                    }
                    chunk_start = self.pos;
                }
                b'\n' | b'\r' => return Err(self.error("Unterminated string constant")),
                // U+2028 and U+2029 are allowed unescaped in strings
                _ if ch >= 0x80 => {
                    self.advance_char();
                }
                _ => self.advance(),
            }
        }
    }

    /// Decode the escape after a backslash.
    fn scan_escape(&mut self, in_template: bool) -> Escape {
        if self.is_eof() {
            return Escape::Invalid("Unterminated escape sequence");
        }
        let ch = self.current();
        match ch {
            b'n' => { self.advance(); Escape::Char('\n') }
            b't' => { self.advance(); Escape::Char('\t') }
            b'r' => { self.advance(); Escape::Char('\r') }
            b'b' => { self.advance(); Escape::Char('\u{8}') }
            b'f' => { self.advance(); Escape::Char('\u{C}') }
            b'v' => { self.advance(); Escape::Char('\u{B}') }
            b'\r' => {
                self.advance();
                if self.current() == b'\n' {
                    self.advance();
                }
                Escape::LineContinuation
            }
            b'\n' => { self.advance(); Escape::LineContinuation }
            b'0' if !self.peek_byte().is_ascii_digit() => {
                self.advance();
                Escape::Char('\0')
            }
            b'0'..=b'7' => {
                if in_template {
                    return Escape::Invalid("Octal escape sequences are not allowed in template strings");
                }
                self.advance();
                let mut value = (ch - b'0') as u32;
                let max_len = if ch <= b'3' { 3 } else { 2 };
                let mut len = 1;
                while len < max_len && matches!(self.current(), b'0'..=b'7') {
                    value = value * 8 + (self.current() - b'0') as u32;
                    self.advance();
                    len += 1;
                }
                self.legacy_octal = true;
                Escape::Char(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER))
            }
            b'8' | b'9' => {
                if in_template {
                    return Escape::Invalid("\\8 and \\9 are not allowed in template strings");
                }
                self.advance();
                self.legacy_octal = true;
                Escape::Char(ch as char)
            }
            b'x' => {
                self.advance();
                match self.scan_hex_digits(2).and_then(char::from_u32) {
                    Some(c) => Escape::Char(c),
                    None => Escape::Invalid("Invalid hexadecimal escape sequence"),
                }
            }
            b'u' => {
                self.advance();
                self.scan_unicode_escape_in_literal()
            }
            _ => {
                let c = self.advance_char();
                if c == '\u{2028}' || c == '\u{2029}' {
                    Escape::LineContinuation
                } else {
                    Escape::Char(c)
                }
            }
        }
    }

    /// `\u` escape inside a string or template. Surrogate pairs written as
    /// two escapes are combined; a lone surrogate decodes to U+FFFD.
    fn scan_unicode_escape_in_literal(&mut self) -> Escape {
        match self.scan_unicode_escape_value() {
            None => Escape::Invalid("Invalid Unicode escape sequence"),
            Some(high @ 0xD800..=0xDBFF) => {
                if self.current() == b'\\' && self.peek_byte() == b'u' {
                    let saved = self.pos;
                    self.advance_n(2);
                    if let Some(low @ 0xDC00..=0xDFFF) = self.scan_unicode_escape_value() {
                        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                        return Escape::Char(
                            char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
                        );
                    }
                    self.pos = saved;
                }
                Escape::Char(char::REPLACEMENT_CHARACTER)
            }
            Some(code) => Escape::Char(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)),
        }
    }

    /// The value of `XXXX` or `{X...}` following `\u`.
    pub(crate) fn scan_unicode_escape_value(&mut self) -> Option<u32> {
        if self.current() != b'{' {
            return self.scan_hex_digits(4);
        }
        self.advance(); // Skip {
        let mut value = 0u32;
        let mut digits = 0;
        while let Some(digit) = (self.current() as char).to_digit(16) {
            value = value * 16 + digit;
            if value > 0x10FFFF {
                return None;
            }
            digits += 1;
            self.advance();
        }
        if digits == 0 || self.current() != b'}' {
            return None;
        }
        self.advance(); // Skip }
        Some(value)
    }

    fn scan_hex_digits(&mut self, len: usize) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..len {
            let digit = (self.current() as char).to_digit(16)?;
            value = value * 16 + digit;
            self.advance();
        }
        Some(value)
    }

    // === Templates ===

    /// Scan template characters up to and including the next `` ` `` or
    /// `${`. `head` is true right after the opening backtick.
    pub(crate) fn scan_template_chunk(&mut self, head: bool) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        let mut cooked = Some(String::new());
        let mut chunk_start = self.pos;

        loop {
            if self.is_eof() {
                return Err(self.error("Unterminated template"));
            }
            let ch = self.current();
            let tail = ch == b'`';
            if tail || (ch == b'$' && self.peek_byte() == b'{') {
                if let Some(cooked) = cooked.as_mut() {
                    cooked.push_str(self.slice(chunk_start, self.pos));
                }
                let raw = normalize_newlines(self.slice(start, self.pos));
                self.advance_n(if tail { 1 } else { 2 });
                let part = TemplatePart { cooked, raw };
                return Ok(match (head, tail) {
                    (true, true) => TokenKind::TemplateNoSub(part),
                    (true, false) => TokenKind::TemplateHead(part),
                    (false, false) => TokenKind::TemplateMiddle(part),
                    (false, true) => TokenKind::TemplateTail(part),
                });
            }
            match ch {
                b'\\' => {
                    if let Some(cooked) = cooked.as_mut() {
                        cooked.push_str(self.slice(chunk_start, self.pos));
                    }
                    self.advance();
                    match self.scan_escape(true) {
                        Escape::Char(c) => {
                            if let Some(cooked) = cooked.as_mut() {
                                cooked.push(c);
                            }
                        }
                        Escape::LineContinuation => {}
                        Escape::Invalid(_) => cooked = None,
                    }
                    chunk_start = self.pos;
                }
                b'\r' => {
                    if let Some(cooked) = cooked.as_mut() {
                        cooked.push_str(self.slice(chunk_start, self.pos));
                        cooked.push('\n');
                    }
                    self.advance();
                    if self.current() == b'\n' {
                        self.advance();
                    }
                    chunk_start = self.pos;
                }
                _ if ch >= 0x80 => {
                    self.advance_char();
                }
                _ => self.advance(),
            }
        }
    }

    // === Regular expressions ===

    pub(crate) fn scan_regex(&mut self) -> Result<TokenKind, ParseError> {
        self.advance(); // Skip opening /
        let pattern_start = self.pos;

        // Scan pattern; `/` inside a class does not terminate it
        let mut in_class = false;
        loop {
            if self.is_eof() {
                return Err(self.error("Unterminated regular expression"));
            }
            match self.current() {
                b'/' if !in_class => break,
                b'[' => {
                    in_class = true;
                    self.advance();
                }
                b']' => {
                    in_class = false;
                    self.advance();
                }
                b'\\' => {
                    self.advance();
                    if self.is_eof() || chars::is_line_terminator(self.current_char()) {
                        return Err(self.error("Unterminated regular expression"));
                    }
                    self.advance_char();
                }
                b'\n' | b'\r' => return Err(self.error("Unterminated regular expression")),
                ch if ch >= 0x80 => {
                    if chars::is_line_terminator(self.advance_char()) {
                        return Err(self.error("Unterminated regular expression"));
                    }
                }
                _ => self.advance(),
            }
        }

        let pattern = self.slice(pattern_start, self.pos).to_string();
        self.advance(); // Skip closing /

        // Scan flags
        let flags_start = self.pos;
        loop {
            let ch = self.current();
            if ascii_is_id_part(ch) {
                self.advance();
            } else if ch == b'\\' || (ch >= 0x80 && chars::is_id_continue(self.current_char())) {
                return Err(self.error_here("Invalid regular expression flags"));
            } else {
                break;
            }
        }
        let flags = self.slice(flags_start, self.pos);
        validate_regex_flags(flags).map_err(|message| self.error(message))?;

        Ok(TokenKind::Regex {
            pattern,
            flags: flags.to_string(),
        })
    }
}

fn validate_regex_flags(flags: &str) -> Result<(), &'static str> {
    let mut seen = 0u32;
    for c in flags.chars() {
        let bit = match c {
            'd' => 1 << 0,
            'g' => 1 << 1,
            'i' => 1 << 2,
            'm' => 1 << 3,
            's' => 1 << 4,
            'u' => 1 << 5,
            'y' => 1 << 6,
            'v' => 1 << 7,
            _ => return Err("Invalid regular expression flags"),
        };
        if seen & bit != 0 {
            return Err("Duplicate regular expression flag");
        }
        seen |= bit;
    }
    if seen & (1 << 5) != 0 && seen & (1 << 7) != 0 {
        return Err("Regular expression flags 'u' and 'v' are mutually exclusive");
    }
    Ok(())
}

/// Template raw values see CR LF and lone CR as LF.
fn normalize_newlines(raw: &str) -> String {
    if raw.contains('\r') {
        raw.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::lexer::Lexer;
    use crate::token::{TemplatePart, Token, TokenKind};

    fn lex(source: &str) -> Token {
        Lexer::new(source).next_token(true).unwrap()
    }

    fn lex_err(source: &str) -> ErrorKind {
        Lexer::new(source).next_token(true).unwrap_err().kind
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lex("42").kind, TokenKind::Number(42.0));
        assert_eq!(lex("3.14").kind, TokenKind::Number(3.14));
        assert_eq!(lex(".5").kind, TokenKind::Number(0.5));
        assert_eq!(lex("1.").kind, TokenKind::Number(1.0));
        assert_eq!(lex("1e3").kind, TokenKind::Number(1000.0));
        assert_eq!(lex("2.5E-1").kind, TokenKind::Number(0.25));
        assert_eq!(lex("0xff").kind, TokenKind::Number(255.0));
        assert_eq!(lex("0b101").kind, TokenKind::Number(5.0));
        assert_eq!(lex("0O77").kind, TokenKind::Number(63.0));
    }

    #[test]
    fn test_numeric_separators() {
        assert_eq!(lex("1_000_000").kind, TokenKind::Number(1_000_000.0));
        assert_eq!(lex("0xFF_FF").kind, TokenKind::Number(65535.0));
        assert_eq!(lex("1_0.2_5").kind, TokenKind::Number(10.25));
        assert_eq!(lex_err("1__0"), ErrorKind::Lexical);
        assert_eq!(lex_err("1_"), ErrorKind::Lexical);
        assert_eq!(lex_err("0_1"), ErrorKind::Lexical);
        assert_eq!(lex_err("1._5"), ErrorKind::Lexical);
        assert_eq!(lex_err("0x_1"), ErrorKind::Lexical);
        assert_eq!(lex_err("017_1"), ErrorKind::Lexical);
    }

    #[test]
    fn test_legacy_octal() {
        let tok = lex("017");
        assert_eq!(tok.kind, TokenKind::Number(15.0));
        assert!(tok.legacy_octal);

        let tok = lex("019");
        assert_eq!(tok.kind, TokenKind::Number(19.0));
        assert!(tok.legacy_octal);

        let tok = lex("08.5");
        assert_eq!(tok.kind, TokenKind::Number(8.5));

        assert!(!lex("0.5").legacy_octal);
        assert!(!lex("0").legacy_octal);
    }

    #[test]
    fn test_bigint() {
        assert_eq!(lex("10n").kind, TokenKind::BigInt("10".into()));
        assert_eq!(lex("0x1_Fn").kind, TokenKind::BigInt("0x1F".into()));
        assert_eq!(lex("0n").kind, TokenKind::BigInt("0".into()));
        assert_eq!(lex_err("1.5n"), ErrorKind::Lexical);
        assert_eq!(lex_err("1e3n"), ErrorKind::Lexical);
        assert_eq!(lex_err("07n"), ErrorKind::Lexical);
    }

    #[test]
    fn test_identifier_after_number() {
        assert_eq!(lex_err("3in x"), ErrorKind::Lexical);
        assert_eq!(lex_err("0b12"), ErrorKind::Lexical);
        assert_eq!(lex_err("0x"), ErrorKind::Lexical);
        assert_eq!(lex_err("1e"), ErrorKind::Lexical);
    }

    #[test]
    fn test_strings() {
        assert_eq!(lex(r#""hello""#).kind, TokenKind::String("hello".into()));
        assert_eq!(lex("'world'").kind, TokenKind::String("world".into()));
        assert_eq!(
            lex(r#""a\n\t\x41B\u{43}\'""#).kind,
            TokenKind::String("a\n\tABC'".into())
        );
        assert_eq!(lex("'a\\\nb'").kind, TokenKind::String("ab".into()));
        assert_eq!(lex("'a\\\r\nb'").kind, TokenKind::String("ab".into()));
        assert_eq!(lex("'\u{2028}'").kind, TokenKind::String("\u{2028}".into()));
    }

    #[test]
    fn test_string_surrogates() {
        assert_eq!(lex(r#""😀""#).kind, TokenKind::String("😀".into()));
        assert_eq!(
            lex(r#""\uD83Dx""#).kind,
            TokenKind::String("\u{FFFD}x".into())
        );
    }

    #[test]
    fn test_string_errors() {
        assert_eq!(lex_err("'abc"), ErrorKind::Lexical);
        assert_eq!(lex_err("'a\nb'"), ErrorKind::Lexical);
        assert_eq!(lex_err(r#""\x4""#), ErrorKind::Lexical);
        assert_eq!(lex_err(r#""\u{110000}""#), ErrorKind::Lexical);
        assert_eq!(lex_err(r#""\u12""#), ErrorKind::Lexical);
    }

    #[test]
    fn test_string_legacy_escapes() {
        let tok = lex(r#""\101""#);
        assert_eq!(tok.kind, TokenKind::String("A".into()));
        assert!(tok.legacy_octal);
        assert!(lex(r#""\8""#).legacy_octal);
        assert!(!lex(r#""\0""#).legacy_octal);
        assert!(lex(r#""\08""#).legacy_octal);
    }

    #[test]
    fn test_template_no_sub() {
        assert_eq!(
            lex("`hello world`").kind,
            TokenKind::TemplateNoSub(TemplatePart {
                cooked: Some("hello world".into()),
                raw: "hello world".into(),
            })
        );
    }

    #[test]
    fn test_template_cooked_and_raw() {
        let tok = lex("`a\\nb\r\nc${");
        assert_eq!(
            tok.kind,
            TokenKind::TemplateHead(TemplatePart {
                cooked: Some("a\nb\nc".into()),
                raw: "a\\nb\nc".into(),
            })
        );
    }

    #[test]
    fn test_template_invalid_escape() {
        let tok = lex("`\\unicode`");
        assert_eq!(
            tok.kind,
            TokenKind::TemplateNoSub(TemplatePart {
                cooked: None,
                raw: "\\unicode".into(),
            })
        );
        assert!(matches!(
            lex("`\\01`").kind,
            TokenKind::TemplateNoSub(TemplatePart { cooked: None, .. })
        ));
        assert_eq!(lex_err("`abc"), ErrorKind::Lexical);
    }

    #[test]
    fn test_template_continuation() {
        let source = "`a${x}b${y}c`";
        let mut lexer = Lexer::new(source);
        assert!(matches!(lexer.next_token(false).unwrap().kind, TokenKind::TemplateHead(_)));
        lexer.next_token(false).unwrap(); // x
        let close = lexer.next_token(false).unwrap();
        assert_eq!(close.kind, TokenKind::RBrace);
        let middle = lexer.rescan_template_continuation(close.span.start).unwrap();
        assert!(matches!(
            middle.kind,
            TokenKind::TemplateMiddle(TemplatePart { ref raw, .. }) if raw == "b"
        ));
        lexer.next_token(false).unwrap(); // y
        let close = lexer.next_token(false).unwrap();
        let tail = lexer.rescan_template_continuation(close.span.start).unwrap();
        assert!(matches!(tail.kind, TokenKind::TemplateTail(_)));
        assert_eq!(tail.span.end as usize, source.len());
    }

    #[test]
    fn test_regex() {
        assert_eq!(
            lex("/[/]\\//gi").kind,
            TokenKind::Regex { pattern: "[/]\\/".into(), flags: "gi".into() }
        );
        assert_eq!(
            lex("/a]b/v").kind,
            TokenKind::Regex { pattern: "a]b".into(), flags: "v".into() }
        );
    }

    #[test]
    fn test_regex_errors() {
        assert_eq!(lex_err("/abc"), ErrorKind::Lexical);
        assert_eq!(lex_err("/a\nb/"), ErrorKind::Lexical);
        assert_eq!(lex_err("/a/gg"), ErrorKind::Lexical);
        assert_eq!(lex_err("/a/x"), ErrorKind::Lexical);
        assert_eq!(lex_err("/a/uv"), ErrorKind::Lexical);
    }
}
