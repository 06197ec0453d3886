//! Text edit descriptors.

use text_size::TextSize;

use crate::base::{LineIndex, Point};
use crate::errors::{Error, Result};

/// One replaced byte range: `[start_byte, old_end_byte)` in the old source
/// became `[start_byte, new_end_byte)` in the new source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEdit {
    pub start_byte: TextSize,
    pub old_end_byte: TextSize,
    pub new_end_byte: TextSize,
    pub start_point: Point,
    pub old_end_point: Point,
    pub new_end_point: Point,
}

impl InputEdit {
    /// Describe an edit between two sources, computing row/column positions.
    pub fn new(
        old_source: &[u8],
        new_source: &[u8],
        start_byte: TextSize,
        old_end_byte: TextSize,
        new_end_byte: TextSize,
    ) -> Self {
        let old_lines = LineIndex::new(old_source);
        let new_lines = LineIndex::new(new_source);
        Self {
            start_byte,
            old_end_byte,
            new_end_byte,
            start_point: old_lines.point(start_byte),
            old_end_point: old_lines.point(old_end_byte),
            new_end_point: new_lines.point(new_end_byte),
        }
    }

    /// Replace `[start, old_end)` of `old_source` with `replacement`.
    ///
    /// Returns the new source together with the edit describing it.
    pub fn replace(
        old_source: &[u8],
        start: TextSize,
        old_end: TextSize,
        replacement: &[u8],
    ) -> Result<(Vec<u8>, Self)> {
        let (from, to) = (usize::from(start), usize::from(old_end));
        if from > to || to > old_source.len() {
            return Err(Error::invalid_edit(format!(
                "range {from}..{to} is outside the source (length {})",
                old_source.len()
            )));
        }
        let mut new_source = Vec::with_capacity(old_source.len() - (to - from) + replacement.len());
        new_source.extend_from_slice(&old_source[..from]);
        new_source.extend_from_slice(replacement);
        new_source.extend_from_slice(&old_source[to..]);

        let new_end = start + TextSize::new(replacement.len() as u32);
        let edit = Self::new(old_source, &new_source, start, old_end, new_end);
        Ok((new_source, edit))
    }

    /// Change in total length
    pub fn delta(&self) -> i64 {
        i64::from(u32::from(self.new_end_byte)) - i64::from(u32::from(self.old_end_byte))
    }

    /// Check the byte offsets against the old and new source lengths.
    pub fn validate(&self, old_len: TextSize, new_len: TextSize) -> Result<()> {
        let (start, old_end, new_end) = (self.start_byte, self.old_end_byte, self.new_end_byte);
        if start > old_end {
            return Err(Error::invalid_edit(format!(
                "start {start:?} is after old end {old_end:?}"
            )));
        }
        if old_end > old_len {
            return Err(Error::invalid_edit(format!(
                "old end {old_end:?} is past the old source length {old_len:?}"
            )));
        }
        if start > new_end || new_end > new_len {
            return Err(Error::invalid_edit(format!(
                "new end {new_end:?} is outside {start:?}..={new_len:?}"
            )));
        }
        let expected = i64::from(u32::from(old_len)) + self.delta();
        if expected != i64::from(u32::from(new_len)) {
            return Err(Error::invalid_edit(format!(
                "edit implies a new length of {expected}, but the new source has {new_len:?}"
            )));
        }
        Ok(())
    }
}
