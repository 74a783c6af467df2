//! Byte spans over source text and their translation to line/column pairs.

use std::fmt;
use std::ops::Range;

/// Byte offset into a source file.
pub type TextPos = u32;

/// `start..start + length` in bytes. Tokens, nodes and diagnostics all carry one.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct TextSpan {
    pub start: TextPos,
    pub length: TextPos,
}

impl TextSpan {
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    #[inline]
    pub fn from_bounds(start: TextPos, end: TextPos) -> Self {
        debug_assert!(start <= end, "span ends before it starts");
        Self::new(start, end - start)
    }

    /// Zero-width span, used for tokens the parser fabricates.
    #[inline]
    pub fn empty(at: TextPos) -> Self {
        Self::new(at, 0)
    }

    /// One past the last byte.
    #[inline]
    pub fn end(&self) -> TextPos {
        self.start + self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end() as usize
    }

    /// Smallest span enclosing both, gaps included.
    pub fn union(&self, other: &TextSpan) -> TextSpan {
        Self::from_bounds(self.start.min(other.start), self.end().max(other.end()))
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_range())
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// Zero-based line and byte column. `Display` adds one to both, which is
/// what the `file(line, col)` diagnostic prefix expects.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    pub line: u32,
    pub character: u32,
}

impl fmt::Display for LineAndColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line + 1, self.character + 1)
    }
}

/// Offsets at which each line of a source file begins.
///
/// Only `\n` opens a new line; a `\r` before it stays in the previous
/// line's columns.
#[derive(Debug, Clone)]
pub struct LineMap {
    starts: Vec<TextPos>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let breaks = memchr::memchr_iter(b'\n', text.as_bytes()).map(|newline| newline as TextPos + 1);
        Self {
            starts: std::iter::once(0).chain(breaks).collect(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        // `starts[0]` is 0, so at least one entry is <= pos.
        let line = self.starts.partition_point(|&start| start <= pos) - 1;
        LineAndColumn {
            line: line as u32,
            character: pos - self.starts[line],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_bounds() {
        let span = TextSpan::new(5, 10);
        assert_eq!(span.end(), 15);
        assert_eq!(span.to_range(), 5..15);
        assert_eq!(TextSpan::from_bounds(5, 15), span);
        assert!(TextSpan::empty(7).is_empty());
        assert_eq!(format!("{span:?}"), "5..15");
    }

    #[test]
    fn test_span_union() {
        let a = TextSpan::new(2, 3);
        let b = TextSpan::from_bounds(10, 12);
        let union = a.union(&b);
        assert_eq!(union, TextSpan::from_bounds(2, 12));
        assert_eq!(b.union(&a), union);
        assert_eq!(union.to_string(), "[2, 12)");
    }

    #[test]
    fn test_line_and_column() {
        let map = LineMap::new("var a\nprint(a)\nb");
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.line_and_column_of(0), LineAndColumn { line: 0, character: 0 });
        // The newline itself still belongs to the line it ends.
        assert_eq!(map.line_and_column_of(5), LineAndColumn { line: 0, character: 5 });
        assert_eq!(map.line_and_column_of(6), LineAndColumn { line: 1, character: 0 });
        assert_eq!(map.line_and_column_of(8).to_string(), "(2, 3)");
        assert_eq!(map.line_and_column_of(15).line, 2);
    }

    #[test]
    fn test_crlf_counts_as_one_break() {
        let map = LineMap::new("a\r\nb\r\n");
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.line_and_column_of(1), LineAndColumn { line: 0, character: 1 });
        assert_eq!(map.line_and_column_of(3), LineAndColumn { line: 1, character: 0 });
    }

    #[test]
    fn test_empty_text_has_one_line() {
        let map = LineMap::new("");
        assert_eq!(map.line_count(), 1);
        assert_eq!(map.line_and_column_of(0).to_string(), "(1, 1)");
    }
}
