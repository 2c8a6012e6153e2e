use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::span::{line_column, Span};

/// Which stage rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed literal, escape or token.
    Lexical,
    /// Grammar mismatch or early (static semantic) error.
    Syntax,
}

/// A fatal parse failure.
///
/// `offset` is a byte offset into the source. `line` is 1-based and
/// `column` is 0-based, counted in UTF-16 code units.
#[derive(Error, Diagnostic, Debug, Clone)]
#[error("{message} ({line}:{column})")]
#[diagnostic(code(esparse::parse_error))]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    #[label("here")]
    pub span: SourceSpan,
}

impl ParseError {
    /// Build an error located at `span` within `source`.
    pub fn new(kind: ErrorKind, message: impl Into<String>, source: &str, span: Span) -> Self {
        let pos = line_column(source, span.start);
        Self {
            kind,
            message: message.into(),
            offset: span.start,
            line: pos.line,
            column: pos.column,
            span: SourceSpan::new((span.start as usize).into(), span.len() as usize),
        }
    }

    #[must_use]
    pub fn lexical(message: impl Into<String>, source: &str, span: Span) -> Self {
        Self::new(ErrorKind::Lexical, message, source, span)
    }

    #[must_use]
    pub fn syntax(message: impl Into<String>, source: &str, span: Span) -> Self {
        Self::new(ErrorKind::Syntax, message, source, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_position() {
        let source = "let a;\nlet a;";
        let err = ParseError::syntax("Identifier 'a' has already been declared", source, Span::new(11, 12));
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 4);
        assert_eq!(err.offset, 11);
        assert_eq!(
            err.to_string(),
            "Identifier 'a' has already been declared (2:4)"
        );
    }
}
