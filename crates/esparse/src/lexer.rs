//! Lexer (tokenizer) for ECMAScript.
//!
//! The lexer converts source text into a stream of tokens.
//! It's called on-demand by the parser, not upfront, which enables
//! context-sensitive tokenization: the parser says whether a regular
//! expression may start at the current position, and rescans `}` as a
//! template continuation when it closes a substitution.
//!
//! Literal bodies (numbers, strings, templates, regular expressions) are
//! scanned in [`crate::literal`].

use crate::ast::{Comment, CommentKind};
use crate::chars::{self, ascii_is_id_part, ascii_is_id_start, CharClass};
use crate::error::ParseError;
use crate::span::Span;
use crate::token::{keyword_from_str, Token, TokenKind};

/// The lexer state.
#[derive(Clone)]
pub struct Lexer<'a> {
    /// Source code.
    pub(crate) source: &'a str,
    /// Source code as bytes (for fast indexing).
    pub(crate) bytes: &'a [u8],
    /// Current byte position.
    pub(crate) pos: usize,
    /// Start position of the current token.
    pub(crate) token_start: usize,
    /// A line terminator was skipped before the current token.
    newline_before: bool,
    /// Set while scanning an identifier that used a unicode escape.
    pub(crate) escaped: bool,
    /// Set while scanning a literal with a legacy octal form.
    pub(crate) legacy_octal: bool,
    /// At least one token has been produced.
    scanned_any: bool,
    module: bool,
    web_compat: bool,
    collect_comments: bool,
    comments: Vec<Comment>,
}

/// Saved lexer position used by lookahead.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    pos: usize,
    comments: usize,
    scanned_any: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    ///
    /// Defaults to the Script goal with Annex B comments enabled. A leading
    /// `#!` line is skipped.
    pub fn new(source: &'a str) -> Self {
        let bytes = source.as_bytes();
        let mut pos = 0;
        if bytes.starts_with(b"#!") {
            pos = 2;
            while pos < bytes.len() && !matches!(bytes[pos], b'\n' | b'\r') {
                if source[pos..].starts_with('\u{2028}') || source[pos..].starts_with('\u{2029}') {
                    break;
                }
                pos += 1;
            }
        }
        Self {
            source,
            bytes,
            pos,
            token_start: pos,
            newline_before: false,
            escaped: false,
            legacy_octal: false,
            scanned_any: false,
            module: false,
            web_compat: true,
            collect_comments: false,
            comments: Vec::new(),
        }
    }

    /// Scan with the Module goal (HTML-like comments are errors).
    #[must_use]
    pub fn with_module(mut self, module: bool) -> Self {
        self.module = module;
        self
    }

    #[must_use]
    pub fn with_web_compat(mut self, web_compat: bool) -> Self {
        self.web_compat = web_compat;
        self
    }

    /// Record comments as they are skipped.
    #[must_use]
    pub fn with_comments(mut self, collect: bool) -> Self {
        self.collect_comments = collect;
        self
    }

    /// Get the current byte position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Take the comments collected so far.
    pub fn take_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.comments)
    }

    /// Get the next token.
    ///
    /// `allow_regex` tells the lexer whether a `/` at this position starts a
    /// regular expression literal or is the division operator.
    pub fn next_token(&mut self, allow_regex: bool) -> Result<Token, ParseError> {
        self.newline_before = false;
        self.skip_whitespace_and_comments()?;
        self.token_start = self.pos;
        self.escaped = false;
        self.legacy_octal = false;
        self.scanned_any = true;

        if self.is_eof() {
            return Ok(self.make_token(TokenKind::Eof));
        }

        let ch = self.current();
        let kind = match ch {
            // Identifiers and keywords
            _ if ascii_is_id_start(ch) => self.scan_identifier()?,
            b'\\' => self.scan_identifier()?,

            // Numbers
            b'0'..=b'9' => self.scan_number()?,

            // Strings
            b'"' | b'\'' => self.scan_string(ch)?,

            // Template literals
            b'`' => {
                self.advance();
                self.scan_template_chunk(true)?
            }

            // Punctuation and operators
            b'(' => { self.advance(); TokenKind::LParen }
            b')' => { self.advance(); TokenKind::RParen }
            b'{' => { self.advance(); TokenKind::LBrace }
            b'}' => { self.advance(); TokenKind::RBrace }
            b'[' => { self.advance(); TokenKind::LBracket }
            b']' => { self.advance(); TokenKind::RBracket }
            b';' => { self.advance(); TokenKind::Semicolon }
            b',' => { self.advance(); TokenKind::Comma }
            b':' => { self.advance(); TokenKind::Colon }
            b'~' => { self.advance(); TokenKind::Tilde }
            b'#' => self.scan_private_name()?,

            b'.' => self.scan_dot()?,
            b'?' => self.scan_question(),
            b'+' => self.scan_plus(),
            b'-' => self.scan_minus(),
            b'*' => self.scan_star(),
            b'/' if allow_regex => self.scan_regex()?,
            b'/' => self.scan_slash(),
            b'%' => self.scan_percent(),
            b'=' => self.scan_equals(),
            b'!' => self.scan_bang(),
            b'<' => self.scan_less_than(),
            b'>' => self.scan_greater_than(),
            b'&' => self.scan_ampersand(),
            b'|' => self.scan_pipe(),
            b'^' => self.scan_caret(),

            _ if ch >= 0x80 => {
                let c = self.current_char();
                match chars::classify(c) {
                    CharClass::IdentifierStart => self.scan_identifier()?,
                    _ => return Err(self.error_here(format!("Invalid character '{}'", c.escape_unicode()))),
                }
            }

            _ => {
                return Err(self.error_here(format!(
                    "Invalid or unexpected token '{}'",
                    (ch as char).escape_default()
                )));
            }
        };

        Ok(self.make_token(kind))
    }

    /// Peek at the next token without consuming it.
    pub(crate) fn peek(&mut self) -> Result<Token, ParseError> {
        let saved = self.checkpoint();
        let token = self.next_token(false);
        self.restore(saved);
        token
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            comments: self.comments.len(),
            scanned_any: self.scanned_any,
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.comments.truncate(checkpoint.comments);
        self.scanned_any = checkpoint.scanned_any;
    }

    /// Rescan the `/` or `/=` token starting at `start` as a regular
    /// expression literal.
    pub(crate) fn rescan_regex(&mut self, start: u32) -> Result<Token, ParseError> {
        self.pos = start as usize;
        self.token_start = self.pos;
        self.legacy_octal = false;
        let kind = self.scan_regex()?;
        Ok(self.make_token(kind))
    }

    /// Rescan the `}` at `start` as the start of a template middle or tail.
    pub(crate) fn rescan_template_continuation(&mut self, start: u32) -> Result<Token, ParseError> {
        self.pos = start as usize;
        self.token_start = self.pos;
        self.legacy_octal = false;
        self.advance(); // Skip }
        let kind = self.scan_template_chunk(false)?;
        Ok(self.make_token(kind))
    }

    // === Helper methods ===

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    #[inline]
    pub(crate) fn peek_byte(&self) -> u8 {
        self.bytes.get(self.pos + 1).copied().unwrap_or(0)
    }

    /// Decode the code point at the current position.
    #[inline]
    pub(crate) fn current_char(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub(crate) fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    /// Advance past the code point at the current position.
    #[inline]
    pub(crate) fn advance_char(&mut self) -> char {
        let c = self.current_char();
        self.pos += c.len_utf8();
        c
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            span: Span::new(self.token_start as u32, self.pos as u32),
            newline_before: self.newline_before,
            escaped: self.escaped,
            legacy_octal: self.legacy_octal,
        }
    }

    #[inline]
    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    /// Lexical error covering the current token so far.
    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::lexical(
            message,
            self.source,
            Span::new(self.token_start as u32, self.pos as u32),
        )
    }

    /// Lexical error at the current position.
    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::lexical(message, self.source, Span::empty(self.pos as u32))
    }

    // === Whitespace and comments ===

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            match self.current() {
                b' ' | b'\t' | 0x0B | 0x0C => {
                    self.advance();
                }
                b'\n' | b'\r' => {
                    self.advance();
                    self.newline_before = true;
                }
                b'/' if self.peek_byte() == b'/' => {
                    self.skip_line_comment(2, CommentKind::Line);
                }
                b'/' if self.peek_byte() == b'*' => {
                    self.skip_block_comment()?;
                }
                b'<' if self.bytes[self.pos..].starts_with(b"<!--") => {
                    self.check_html_comment()?;
                    self.skip_line_comment(4, CommentKind::Html);
                }
                b'-' if self.bytes[self.pos..].starts_with(b"-->")
                    && (self.newline_before || !self.scanned_any) =>
                {
                    self.check_html_comment()?;
                    self.skip_line_comment(3, CommentKind::Html);
                }
                ch if ch >= 0x80 => {
                    let c = self.current_char();
                    match chars::classify(c) {
                        CharClass::LineTerminator => self.newline_before = true,
                        CharClass::Whitespace => {}
                        _ => break,
                    }
                    self.advance_n(c.len_utf8());
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn check_html_comment(&self) -> Result<(), ParseError> {
        if self.module {
            Err(self.error_here("HTML comments are not allowed in modules"))
        } else if !self.web_compat {
            Err(self.error_here("HTML comments are not allowed without web compatibility"))
        } else {
            Ok(())
        }
    }

    fn skip_line_comment(&mut self, opener: usize, kind: CommentKind) {
        let start = self.pos;
        self.advance_n(opener);
        let value_start = self.pos;
        while !self.is_eof() {
            match self.current() {
                b'\n' | b'\r' => break,
                ch if ch >= 0x80 => {
                    if chars::is_line_terminator(self.current_char()) {
                        break;
                    }
                    self.advance_char();
                }
                _ => self.advance(),
            }
        }
        self.record_comment(kind, start, value_start, self.pos);
    }

    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.advance_n(2); // Skip /*
        let value_start = self.pos;
        while !self.is_eof() {
            match self.current() {
                b'*' if self.peek_byte() == b'/' => {
                    let value_end = self.pos;
                    self.advance_n(2);
                    self.record_comment(CommentKind::Block, start, value_start, value_end);
                    return Ok(());
                }
                b'\n' | b'\r' => {
                    self.newline_before = true;
                    self.advance();
                }
                ch if ch >= 0x80 => {
                    if chars::is_line_terminator(self.advance_char()) {
                        self.newline_before = true;
                    }
                }
                _ => self.advance(),
            }
        }
        Err(ParseError::lexical(
            "Unterminated comment",
            self.source,
            Span::new(start as u32, self.pos as u32),
        ))
    }

    fn record_comment(&mut self, kind: CommentKind, start: usize, value_start: usize, value_end: usize) {
        if self.collect_comments {
            self.comments.push(Comment {
                kind,
                value: self.slice(value_start, value_end).to_string(),
                span: Span::new(start as u32, self.pos as u32),
            });
        }
    }

    // === Identifiers ===

    fn scan_identifier(&mut self) -> Result<TokenKind, ParseError> {
        let name = self.scan_identifier_name()?;
        if self.escaped {
            return Ok(TokenKind::Identifier(name));
        }
        Ok(keyword_from_str(&name).unwrap_or(TokenKind::Identifier(name)))
    }

    /// Scan an `IdentifierName`, decoding `\u` escapes.
    pub(crate) fn scan_identifier_name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while ascii_is_id_part(self.current()) {
            self.advance();
        }
        let ch = self.current();
        if ch != b'\\' && ch < 0x80 {
            return Ok(self.slice(start, self.pos).to_string());
        }

        // Slow path: escapes or non-ASCII code points.
        let mut name = self.slice(start, self.pos).to_string();
        loop {
            let ch = self.current();
            if ascii_is_id_part(ch) {
                name.push(ch as char);
                self.advance();
            } else if ch == b'\\' {
                let escape_start = self.pos;
                if self.peek_byte() != b'u' {
                    return Err(self.error_here("Expected unicode escape sequence"));
                }
                self.advance_n(2);
                let c = self
                    .scan_unicode_escape_value()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("Invalid unicode escape sequence"))?;
                let valid = if name.is_empty() {
                    chars::is_id_start(c)
                } else {
                    chars::is_id_continue(c)
                };
                if !valid {
                    return Err(ParseError::lexical(
                        "Invalid unicode escape sequence in identifier",
                        self.source,
                        Span::new(escape_start as u32, self.pos as u32),
                    ));
                }
                self.escaped = true;
                name.push(c);
            } else if ch >= 0x80 {
                let c = self.current_char();
                let valid = if name.is_empty() {
                    chars::is_id_start(c)
                } else {
                    chars::is_id_continue(c)
                };
                if !valid {
                    break;
                }
                name.push(c);
                self.advance_n(c.len_utf8());
            } else {
                break;
            }
        }
        Ok(name)
    }

    fn scan_private_name(&mut self) -> Result<TokenKind, ParseError> {
        self.advance(); // Skip #
        let ch = self.current();
        let starts_ident = ascii_is_id_start(ch)
            || ch == b'\\'
            || (ch >= 0x80 && chars::is_id_start(self.current_char()));
        if !starts_ident {
            return Err(self.error("Invalid character '#'"));
        }
        let name = self.scan_identifier_name()?;
        Ok(TokenKind::PrivateName(name))
    }

    // === Multi-character operators ===

    fn scan_dot(&mut self) -> Result<TokenKind, ParseError> {
        if self.peek_byte().is_ascii_digit() {
            return self.scan_number();
        }
        self.advance();
        if self.current() == b'.' && self.peek_byte() == b'.' {
            self.advance_n(2);
            Ok(TokenKind::Spread)
        } else {
            Ok(TokenKind::Dot)
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'?' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::QuestionQuestionEq
                } else {
                    TokenKind::QuestionQuestion
                }
            }
            // `a?.5:b` is a conditional, not optional chaining
            b'.' if !self.peek_byte().is_ascii_digit() => {
                self.advance();
                TokenKind::QuestionDot
            }
            _ => TokenKind::Question,
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'+' => { self.advance(); TokenKind::PlusPlus }
            b'=' => { self.advance(); TokenKind::PlusEq }
            _ => TokenKind::Plus,
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'-' => { self.advance(); TokenKind::MinusMinus }
            b'=' => { self.advance(); TokenKind::MinusEq }
            _ => TokenKind::Minus,
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'*' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::StarStarEq
                } else {
                    TokenKind::StarStar
                }
            }
            b'=' => { self.advance(); TokenKind::StarEq }
            _ => TokenKind::Star,
        }
    }

    fn scan_slash(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => { self.advance(); TokenKind::SlashEq }
            _ => TokenKind::Slash,
        }
    }

    fn scan_percent(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.advance();
            TokenKind::PercentEq
        } else {
            TokenKind::Percent
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::EqEqEq
                } else {
                    TokenKind::EqEq
                }
            }
            b'>' => { self.advance(); TokenKind::Arrow }
            _ => TokenKind::Eq,
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::BangEqEq
                } else {
                    TokenKind::BangEq
                }
            }
            _ => TokenKind::Bang,
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'<' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::LtLtEq
                } else {
                    TokenKind::LtLt
                }
            }
            b'=' => { self.advance(); TokenKind::LtEq }
            _ => TokenKind::Lt,
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'>' => {
                self.advance();
                match self.current() {
                    b'>' => {
                        self.advance();
                        if self.current() == b'=' {
                            self.advance();
                            TokenKind::GtGtGtEq
                        } else {
                            TokenKind::GtGtGt
                        }
                    }
                    b'=' => { self.advance(); TokenKind::GtGtEq }
                    _ => TokenKind::GtGt,
                }
            }
            b'=' => { self.advance(); TokenKind::GtEq }
            _ => TokenKind::Gt,
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'&' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::AmpAmpEq
                } else {
                    TokenKind::AmpAmp
                }
            }
            b'=' => { self.advance(); TokenKind::AmpEq }
            _ => TokenKind::Amp,
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'|' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::PipePipeEq
                } else {
                    TokenKind::PipePipe
                }
            }
            b'=' => { self.advance(); TokenKind::PipeEq }
            _ => TokenKind::Pipe,
        }
    }

    fn scan_caret(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.advance();
            TokenKind::CaretEq
        } else {
            TokenKind::Caret
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn tokenize(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token(false).unwrap();
            if matches!(token.kind, TokenKind::Eof) {
                break;
            }
            tokens.push(token.kind);
        }
        tokens
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.into())
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            tokenize("foo bar _baz $qux"),
            vec![ident("foo"), ident("bar"), ident("_baz"), ident("$qux")]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            tokenize("const let var function"),
            vec![TokenKind::Const, ident("let"), TokenKind::Var, TokenKind::Function]
        );
    }

    #[test]
    fn test_unicode_identifiers() {
        assert_eq!(tokenize("café πx"), vec![ident("café"), ident("πx")]);
        assert_eq!(tokenize("\\u0061b \\u{62}c"), vec![ident("ab"), ident("bc")]);
        // ID_Start characters outside XID_Start.
        assert_eq!(tokenize("\u{309B} \u{037A}x a\u{FF9E}"), vec![ident("\u{309B}"), ident("\u{037A}x"), ident("a\u{FF9E}")]);
        assert_eq!(tokenize("\\u309B"), vec![ident("\u{309B}")]);
        assert!(Lexer::new("\u{00D7}").next_token(false).is_err());
    }

    #[test]
    fn test_escaped_keyword_is_identifier() {
        let mut lexer = Lexer::new("\\u0069f");
        let token = lexer.next_token(false).unwrap();
        assert_eq!(token.kind, ident("if"));
        assert!(token.escaped);
    }

    #[test]
    fn test_invalid_identifier_escape() {
        let err = Lexer::new("\\u0030abc").next_token(false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert!(Lexer::new("a\\x41").next_token(false).is_err());
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokenize("+ - * / % ** ++ --"),
            vec![
                TokenKind::Plus, TokenKind::Minus, TokenKind::Star, TokenKind::Slash,
                TokenKind::Percent, TokenKind::StarStar, TokenKind::PlusPlus, TokenKind::MinusMinus,
            ]
        );
    }

    #[test]
    fn test_longest_match() {
        assert_eq!(
            tokenize(">>>= ??= ?. ... &&= **="),
            vec![
                TokenKind::GtGtGtEq,
                TokenKind::QuestionQuestionEq,
                TokenKind::QuestionDot,
                TokenKind::Spread,
                TokenKind::AmpAmpEq,
                TokenKind::StarStarEq,
            ]
        );
    }

    #[test]
    fn test_optional_chain_vs_conditional_number() {
        assert_eq!(
            tokenize("a?.5:b"),
            vec![ident("a"), TokenKind::Question, TokenKind::Number(0.5), TokenKind::Colon, ident("b")]
        );
    }

    #[test]
    fn test_comparison() {
        assert_eq!(
            tokenize("== === != !== < <= > >="),
            vec![
                TokenKind::EqEq, TokenKind::EqEqEq, TokenKind::BangEq, TokenKind::BangEqEq,
                TokenKind::Lt, TokenKind::LtEq, TokenKind::Gt, TokenKind::GtEq,
            ]
        );
    }

    #[test]
    fn test_arrow_function() {
        assert_eq!(
            tokenize("(x) => x"),
            vec![TokenKind::LParen, ident("x"), TokenKind::RParen, TokenKind::Arrow, ident("x")]
        );
    }

    #[test]
    fn test_comments_and_newlines() {
        let mut lexer = Lexer::new("a // line comment\nb /* block */ c /*\n*/ d").with_comments(true);
        let a = lexer.next_token(false).unwrap();
        let b = lexer.next_token(false).unwrap();
        let c = lexer.next_token(false).unwrap();
        let d = lexer.next_token(false).unwrap();
        assert!(!a.newline_before);
        assert!(b.newline_before);
        assert!(!c.newline_before);
        assert!(d.newline_before);
        let comments = lexer.take_comments();
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].value, " line comment");
        assert_eq!(comments[1].kind, CommentKind::Block);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut lexer = Lexer::new("a /* never closed");
        assert_eq!(lexer.next_token(false).unwrap().kind, ident("a"));
        assert!(lexer.next_token(false).is_err());
    }

    #[test]
    fn test_html_comments() {
        assert_eq!(tokenize("a <!-- b\nc"), vec![ident("a"), ident("c")]);
        assert_eq!(tokenize("a\n--> b\nc"), vec![ident("a"), ident("c")]);
        // Not at line start: decrement followed by greater-than.
        assert_eq!(
            tokenize("a --> b"),
            vec![ident("a"), TokenKind::MinusMinus, TokenKind::Gt, ident("b")]
        );

        let mut module = Lexer::new("a <!-- b").with_module(true);
        module.next_token(false).unwrap();
        assert!(module.next_token(false).is_err());

        let mut strict = Lexer::new("<!-- b").with_web_compat(false);
        assert!(strict.next_token(false).is_err());
    }

    #[test]
    fn test_hashbang_and_private_names() {
        assert_eq!(tokenize("#!/usr/bin/env node\nx"), vec![ident("x")]);
        assert_eq!(tokenize("#priv"), vec![TokenKind::PrivateName("priv".into())]);
        assert!(Lexer::new("# x").next_token(false).is_err());
    }

    #[test]
    fn test_unicode_whitespace_and_line_terminators() {
        let mut lexer = Lexer::new("a\u{00A0}\u{3000}b\u{2028}c");
        lexer.next_token(false).unwrap();
        let b = lexer.next_token(false).unwrap();
        let c = lexer.next_token(false).unwrap();
        assert!(!b.newline_before);
        assert!(c.newline_before);
        assert_eq!(c.kind, ident("c"));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("a /* c */ b").with_comments(true);
        lexer.next_token(false).unwrap();
        let peeked = lexer.peek().unwrap();
        assert_eq!(peeked.kind, ident("b"));
        assert_eq!(lexer.take_comments().len(), 0);
        assert_eq!(lexer.next_token(false).unwrap().kind, ident("b"));
    }

    #[test]
    fn test_regex_vs_divide() {
        let mut lexer = Lexer::new("a / b");
        lexer.next_token(false).unwrap();
        assert_eq!(lexer.next_token(false).unwrap().kind, TokenKind::Slash);

        let mut lexer = Lexer::new("/x/g");
        assert_eq!(
            lexer.next_token(true).unwrap().kind,
            TokenKind::Regex { pattern: "x".into(), flags: "g".into() }
        );
    }

    #[test]
    fn test_rescan_regex() {
        let mut lexer = Lexer::new("/=a/");
        let tok = lexer.next_token(false).unwrap();
        assert_eq!(tok.kind, TokenKind::SlashEq);
        let regex = lexer.rescan_regex(tok.span.start).unwrap();
        assert_eq!(regex.kind, TokenKind::Regex { pattern: "=a".into(), flags: String::new() });
        assert_eq!(regex.span, Span::new(0, 4));
    }

    #[test]
    fn test_invalid_character() {
        let err = Lexer::new("@").next_token(false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.offset, 0);
    }
}
