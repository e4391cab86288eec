//! Range map builder for accumulating mappings during one expansion pass.

use crate::{MappedRange, RangeMap, RangeMapError};
use text_size::TextSize;

/// A builder for constructing range maps while a macro expansion is emitted.
///
/// Ranges must be added in emission order. Each new range is merged into the
/// previous one when it continues it in both spaces; earlier entries are
/// never revisited.
#[derive(Debug, Default)]
pub struct RangeMapBuilder {
    ranges: Vec<MappedRange>,
    /// Current position in the expanded output.
    dst_offset: TextSize,
}

impl RangeMapBuilder {
    /// Creates a new range map builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current destination offset.
    #[inline]
    pub fn dst_offset(&self) -> TextSize {
        self.dst_offset
    }

    /// Returns the number of ranges accumulated so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns true if no range has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Adds a range, merging it with the last one if they touch.
    ///
    /// The destination cursor advances to the end of `range` if that lies
    /// past it.
    pub fn push(&mut self, range: MappedRange) {
        match self.ranges.last_mut() {
            Some(last) if last.touches(&range) => *last = last.merged_with(&range),
            _ => self.ranges.push(range),
        }
        self.dst_offset = self.dst_offset.max(range.dst_end());
    }

    /// Adds call-site text copied verbatim at the current destination offset.
    ///
    /// Zero-length text adds nothing.
    pub fn add_source(
        &mut self,
        src: impl Into<TextSize>,
        len: impl Into<TextSize>,
    ) -> Result<(), RangeMapError> {
        let len = len.into();
        if len == TextSize::from(0) {
            return Ok(());
        }
        let range = MappedRange::new(src, self.dst_offset, len)?;
        self.push(range);
        Ok(())
    }

    /// Skips synthetic output that has no call-site counterpart.
    pub fn skip(&mut self, len: impl Into<TextSize>) -> Result<(), RangeMapError> {
        let len = len.into();
        let offset = self.dst_offset;
        self.dst_offset = offset
            .checked_add(len)
            .ok_or(RangeMapError::OffsetOverflow { offset, len })?;
        Ok(())
    }

    /// Builds the final range map.
    pub fn build(self) -> RangeMap {
        RangeMap::from_vec_unmerged(self.ranges)
    }
}

impl Extend<MappedRange> for RangeMapBuilder {
    fn extend<I: IntoIterator<Item = MappedRange>>(&mut self, iter: I) {
        for range in iter {
            self.push(range);
        }
    }
}
