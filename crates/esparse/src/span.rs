//! Source location tracking.
//!
//! Every AST node carries a `Span` of byte offsets. Line/column pairs are
//! derived on demand through [`LineIndex`], so parses that never ask for
//! locations never pay for them.

use serde::Serialize;

use crate::chars;

/// A span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the start.
    pub start: u32,
    /// Byte offset of the end (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create an empty span at a position.
    #[inline]
    pub const fn empty(pos: u32) -> Self {
        Self { start: pos, end: pos }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    #[inline]
    pub const fn merge(self, other: Span) -> Span {
        Span {
            start: if self.start < other.start { self.start } else { other.start },
            end: if self.end > other.end { self.end } else { other.end },
        }
    }

    /// Check if this span fully covers `other`.
    #[inline]
    pub const fn covers(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The source text under this span.
    #[inline]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start as usize..self.end as usize]
    }
}

/// A 1-based line and 0-based column, counted in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Converts byte offsets to line/column pairs and UTF-16 offsets.
///
/// All four line terminator forms (LF, CR, CR LF, U+2028, U+2029) start a
/// new line; CR LF counts once.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets of the start of each line.
    line_starts: Vec<u32>,
    /// `(byte offset after a non-ASCII char, cumulative utf8 - utf16 length)`.
    wide: Vec<(u32, u32)>,
}

impl LineIndex {
    /// Build a line index from source code.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut wide = Vec::new();
        let mut shrink = 0u32;
        let mut chars = source.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            let next = (i + c.len_utf8()) as u32;
            if !c.is_ascii() {
                shrink += (c.len_utf8() - c.len_utf16()) as u32;
                wide.push((next, shrink));
            }
            if c == '\r' {
                if let Some(&(_, '\n')) = chars.peek() {
                    continue;
                }
            }
            if chars::is_line_terminator(c) {
                line_starts.push(next);
            }
        }
        Self { line_starts, wide }
    }

    /// Convert a byte offset to a UTF-16 code unit offset.
    pub fn utf16_offset(&self, offset: u32) -> u32 {
        let idx = self.wide.partition_point(|&(at, _)| at <= offset);
        match idx {
            0 => offset,
            n => offset - self.wide[n - 1].1,
        }
    }

    /// Convert a byte offset to a position.
    pub fn position(&self, offset: u32) -> Position {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        let column = self.utf16_offset(offset) - self.utf16_offset(self.line_starts[line]);
        Position {
            line: line as u32 + 1,
            column,
        }
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// One-off position lookup used when building errors.
pub fn line_column(source: &str, offset: u32) -> Position {
    LineIndex::new(source).position(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let a = Span::new(5, 10);
        let b = Span::new(8, 15);
        assert_eq!(a.merge(b), Span::new(5, 15));
        assert!(Span::new(5, 15).covers(a));
        assert!(!a.covers(b));
    }

    #[test]
    fn test_line_index() {
        let source = "line1\nline2\nline3";
        let index = LineIndex::new(source);

        assert_eq!(index.position(0), Position { line: 1, column: 0 });
        assert_eq!(index.position(5), Position { line: 1, column: 5 });
        assert_eq!(index.position(6), Position { line: 2, column: 0 });
        assert_eq!(index.position(12), Position { line: 3, column: 0 });
    }

    #[test]
    fn test_all_line_terminators() {
        let source = "a\r\nb\rc\u{2028}d\u{2029}e\nf";
        let index = LineIndex::new(source);
        assert_eq!(index.line_count(), 6);
        let f = source.find('f').unwrap() as u32;
        assert_eq!(index.position(f), Position { line: 6, column: 0 });
        let b = source.find('b').unwrap() as u32;
        assert_eq!(index.position(b), Position { line: 2, column: 0 });
    }

    #[test]
    fn test_utf16_columns() {
        // U+1F600 is four UTF-8 bytes and two UTF-16 units; é is two and one.
        let source = "é😀x";
        let index = LineIndex::new(source);
        let x = source.find('x').unwrap() as u32;
        assert_eq!(x, 6);
        assert_eq!(index.utf16_offset(x), 3);
        assert_eq!(index.position(x), Position { line: 1, column: 3 });
    }
}
