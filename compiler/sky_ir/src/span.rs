//! Source location spans and line/column mapping.

use std::fmt;
use std::ops::Range;

/// Source location span.
///
/// Layout: 8 bytes total
/// - start: u32 - byte offset from file start
/// - end: u32 - byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Dummy span for host-generated code.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create from a byte range.
    ///
    /// Offsets beyond `u32::MAX` saturate; module sources that large are
    /// rejected by the loader before lexing.
    #[inline]
    pub fn from_range(range: Range<usize>) -> Self {
        let start = u32::try_from(range.start).unwrap_or(u32::MAX);
        let end = u32::try_from(range.end).unwrap_or(u32::MAX);
        Span { start, end }
    }

    /// Create a point span (zero-length).
    #[inline]
    pub const fn point(offset: u32) -> Span {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Convert to a `std::ops::Range`.
    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Precomputed line starts for one source text.
///
/// Built once per module so that every diagnostic (print positions,
/// tracebacks, parse errors) maps offsets without rescanning the file.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineIndex { line_starts }
    }

    /// Compute 1-based (line, column) from a byte offset.
    ///
    /// The column counts characters, not bytes, from the start of the line.
    pub fn line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());
        let col = source
            .get(line_start..end)
            .map_or(0, |text| text.chars().count());
        (
            u32::try_from(line + 1).unwrap_or(u32::MAX),
            u32::try_from(col + 1).unwrap_or(u32::MAX),
        )
    }

    /// Number of lines in the indexed source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basic() {
        let span = Span::new(10, 20);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
        assert_eq!(span.to_range(), 10..20);
    }

    #[test]
    fn test_span_merge() {
        let merged = Span::new(10, 20).merge(Span::new(15, 30));
        assert_eq!(merged, Span::new(10, 30));
    }

    #[test]
    fn test_line_col() {
        let source = "abc\ndefgh\nij";
        let index = LineIndex::new(source);
        assert_eq!(index.line_col(source, 0), (1, 1));
        assert_eq!(index.line_col(source, 2), (1, 3));
        assert_eq!(index.line_col(source, 4), (2, 1));
        assert_eq!(index.line_col(source, 7), (2, 4));
        assert_eq!(index.line_col(source, 10), (3, 1));
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn test_line_col_empty_source() {
        let index = LineIndex::new("");
        assert_eq!(index.line_col("", 0), (1, 1));
    }

    #[test]
    fn test_line_col_unicode() {
        let source = "αβγ\nδε";
        let index = LineIndex::new(source);
        assert_eq!(index.line_col(source, 2), (1, 2));
        assert_eq!(index.line_col(source, 7), (2, 1));
    }
}
