//! Byte spans within a filter expression and their line/column projection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range `[start, end)` in the filter source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span, used for end-of-input positions
    #[inline]
    pub const fn point(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both
    #[inline]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Text of `source` under this span, empty when it falls outside
    pub fn slice(self, source: &str) -> &str {
        source.get(self.start..self.end).unwrap_or_default()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Line/column position of a span, 1-based
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    /// Byte offset (0-based)
    pub offset: usize,
    pub length: usize,
}

impl SourceLocation {
    pub const fn new(line: usize, column: usize, offset: usize, length: usize) -> Self {
        Self {
            line,
            column,
            offset,
            length,
        }
    }

    pub fn from_span(span: Span, source: &str) -> Self {
        let (line, column) = offset_to_line_col(source, span.start);
        Self::new(line, column, span.start, span.len())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Convert a byte offset to a 1-based (line, column) pair, counting columns in chars
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let end = offset.min(source.len());
    let prefix = source.get(..end).unwrap_or(source);
    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map_or(0, |i| i + 1);
    let column = prefix[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let a = Span::new(4, 9);
        let b = Span::new(0, 6);
        assert_eq!(a.merge(b), Span::new(0, 9));
        assert!(Span::point(3).is_empty());
    }

    #[test]
    fn test_span_slice() {
        let source = "and(price.gt.10.5)";
        assert_eq!(Span::new(13, 17).slice(source), "10.5");
        assert_eq!(Span::new(13, 90).slice(source), "");
    }

    #[test]
    fn test_offset_to_line_col() {
        let source = "and(\n  name.eq.x,\n  price.gt.1)";
        assert_eq!(offset_to_line_col(source, 0), (1, 1));
        assert_eq!(offset_to_line_col(source, 4), (1, 5));
        assert_eq!(offset_to_line_col(source, 7), (2, 3));
        assert_eq!(offset_to_line_col(source, 500), (3, 14));
    }

    #[test]
    fn test_location_from_span() {
        let loc = SourceLocation::from_span(Span::new(4, 8), "and(name.eq.x)");
        assert_eq!(loc, SourceLocation::new(1, 5, 4, 4));
        assert_eq!(loc.to_string(), "1:5");
    }
}
