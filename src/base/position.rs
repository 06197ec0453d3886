/// Position tracking for source text
///
/// Edits carry row/column positions next to their byte offsets, the same
/// way editors report them.
use std::fmt;

use text_size::TextSize;

/// A position in source text (0-indexed row, column counted in bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: u32,
    pub column: u32,
}

impl Point {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// Maps byte offsets to [`Point`]s.
///
/// Built once per source; lookups are a binary search over line starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(source: &[u8]) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in source.iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self {
            line_starts,
            len: TextSize::new(source.len() as u32),
        }
    }

    /// Number of lines (a trailing newline opens an empty last line)
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to a point. Offsets past the end clamp to the end.
    pub fn point(&self, offset: TextSize) -> Point {
        let offset = offset.min(self.len);
        let row = match self.line_starts.binary_search(&offset) {
            Ok(row) => row,
            Err(next) => next - 1,
        };
        let column = offset - self.line_starts[row];
        Point::new(row as u32, column.into())
    }

    /// Convert a point back to a byte offset, if the row exists.
    pub fn offset(&self, point: Point) -> Option<TextSize> {
        let start = *self.line_starts.get(point.row as usize)?;
        let offset = start + TextSize::new(point.column);
        (offset <= self.len).then_some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_for_offsets() {
        let index = LineIndex::new(b"ab\ncd\n");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.point(TextSize::new(0)), Point::new(0, 0));
        assert_eq!(index.point(TextSize::new(2)), Point::new(0, 2));
        assert_eq!(index.point(TextSize::new(3)), Point::new(1, 0));
        assert_eq!(index.point(TextSize::new(6)), Point::new(2, 0));
        assert_eq!(index.point(TextSize::new(60)), Point::new(2, 0));
    }

    #[test]
    fn test_offset_round_trip() {
        let index = LineIndex::new(b"let\n  x = 1;\ntel");
        let point = Point::new(1, 2);
        let offset = index.offset(point).unwrap();
        assert_eq!(offset, TextSize::new(6));
        assert_eq!(index.point(offset), point);
        assert_eq!(index.offset(Point::new(7, 0)), None);
    }
}
