//! Source positions, spans and locations.

use std::fmt;

use super::FileId;

/// A line and column position in source text.
///
/// Both line and column are 0-indexed internally, but displayed as 1-indexed.
/// Positions order by line first, then column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
pub struct LineCol {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (in UTF-8 bytes, not characters)
    pub col: u32,
}

impl LineCol {
    /// Create a new LineCol position.
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Create from 1-indexed line and column (as displayed to users).
    #[inline]
    pub const fn from_one_indexed(line: u32, col: u32) -> Self {
        Self {
            line: line.saturating_sub(1),
            col: col.saturating_sub(1),
        }
    }

    /// Get 1-indexed line number (for display).
    #[inline]
    pub const fn line_one_indexed(self) -> u32 {
        self.line + 1
    }

    /// Get 1-indexed column number (for display).
    #[inline]
    pub const fn col_one_indexed(self) -> u32 {
        self.col + 1
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

/// A half-open `[start, end)` region of one file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
pub struct TextSpan {
    pub start: LineCol,
    pub end: LineCol,
}

impl TextSpan {
    #[inline]
    pub const fn new(start: LineCol, end: LineCol) -> Self {
        Self { start, end }
    }

    /// Span on a single line covering `len` columns from `(line, col)`.
    #[inline]
    pub const fn on_line(line: u32, col: u32, len: u32) -> Self {
        Self {
            start: LineCol::new(line, col),
            end: LineCol::new(line, col + len),
        }
    }

    /// Check whether a position falls inside this span.
    ///
    /// An empty span contains its own start position so zero-width
    /// synthetic definitions stay addressable.
    pub fn contains(&self, pos: LineCol) -> bool {
        if self.start == self.end {
            return pos == self.start;
        }
        self.start <= pos && pos < self.end
    }

    /// Check whether `other` lies entirely within this span.
    pub fn encloses(&self, other: &TextSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A span inside a specific file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Location {
    pub file: FileId,
    pub span: TextSpan,
}

impl Location {
    #[inline]
    pub const fn new(file: FileId, span: TextSpan) -> Self {
        Self { file, span }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.file, self.span)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.span.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_display() {
        let pos = LineCol::new(0, 0);
        assert_eq!(format!("{}", pos), "1:1");

        let pos = LineCol::new(5, 10);
        assert_eq!(format!("{}", pos), "6:11");
    }

    #[test]
    fn test_line_col_from_one_indexed() {
        let pos = LineCol::from_one_indexed(1, 1);
        assert_eq!(pos.line, 0);
        assert_eq!(pos.col, 0);
    }

    #[test]
    fn test_line_col_ordering() {
        assert!(LineCol::new(0, 9) < LineCol::new(1, 0));
        assert!(LineCol::new(2, 3) < LineCol::new(2, 4));
    }

    #[test]
    fn test_span_contains() {
        let span = TextSpan::on_line(3, 4, 6);

        assert!(span.contains(LineCol::new(3, 4)));
        assert!(span.contains(LineCol::new(3, 9)));
        assert!(!span.contains(LineCol::new(3, 10)));
        assert!(!span.contains(LineCol::new(2, 5)));
    }

    #[test]
    fn test_multiline_span_contains() {
        let span = TextSpan::new(LineCol::new(1, 10), LineCol::new(4, 0));

        assert!(span.contains(LineCol::new(2, 0)));
        assert!(span.contains(LineCol::new(3, 80)));
        assert!(!span.contains(LineCol::new(1, 9)));
    }

    #[test]
    fn test_empty_span_contains_start() {
        let span = TextSpan::on_line(0, 0, 0);
        assert!(span.contains(LineCol::new(0, 0)));
        assert!(!span.contains(LineCol::new(0, 1)));
    }

    #[test]
    fn test_span_encloses() {
        let outer = TextSpan::new(LineCol::new(0, 0), LineCol::new(10, 0));
        let inner = TextSpan::on_line(4, 2, 3);
        assert!(outer.encloses(&inner));
        assert!(!inner.encloses(&outer));
    }
}
