//! A single source ↔ destination correspondence.

use crate::RangeMapError;
use text_size::{TextRange, TextSize};

/// A run of `len` characters at `src` in the call-site text that appears
/// unchanged at `dst` in the expanded text.
///
/// Both intervals are half-open: `[src, src + len)` and `[dst, dst + len)`.
/// A `MappedRange` is never empty and its ends always fit in a `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawMappedRange"))]
pub struct MappedRange {
    src: TextSize,
    dst: TextSize,
    len: TextSize,
}

impl MappedRange {
    /// Creates a mapped range, rejecting empty or overflowing ones.
    pub fn new(
        src: impl Into<TextSize>,
        dst: impl Into<TextSize>,
        len: impl Into<TextSize>,
    ) -> Result<Self, RangeMapError> {
        let (src, dst, len) = (src.into(), dst.into(), len.into());
        if len == TextSize::from(0) {
            return Err(RangeMapError::EmptyRange);
        }
        checked_end(src, len)?;
        checked_end(dst, len)?;
        Ok(Self { src, dst, len })
    }

    /// Start of the range in source (call-site) coordinates.
    #[inline]
    pub fn src(&self) -> TextSize {
        self.src
    }

    /// Start of the range in destination (expansion) coordinates.
    #[inline]
    pub fn dst(&self) -> TextSize {
        self.dst
    }

    /// Number of characters covered.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.len
    }

    /// Exclusive end in source coordinates.
    #[inline]
    pub fn src_end(&self) -> TextSize {
        self.src + self.len
    }

    /// Exclusive end in destination coordinates.
    #[inline]
    pub fn dst_end(&self) -> TextSize {
        self.dst + self.len
    }

    /// The covered source interval.
    #[inline]
    pub fn src_range(&self) -> TextRange {
        TextRange::at(self.src, self.len)
    }

    /// The covered destination interval.
    #[inline]
    pub fn dst_range(&self) -> TextRange {
        TextRange::at(self.dst, self.len)
    }

    /// Moves the source start left by `delta`.
    pub fn src_shift_left(self, delta: impl Into<TextSize>) -> Result<Self, RangeMapError> {
        let delta = delta.into();
        let src = self
            .src
            .checked_sub(delta)
            .ok_or(RangeMapError::OffsetUnderflow {
                offset: self.src,
                delta,
            })?;
        Self::new(src, self.dst, self.len)
    }

    /// Moves the destination start right by `delta`.
    pub fn dst_shift_right(self, delta: impl Into<TextSize>) -> Result<Self, RangeMapError> {
        let delta = delta.into();
        let dst = checked_end(self.dst, delta)?;
        Self::new(self.src, dst, self.len)
    }

    /// Moves both starts right by `delta`.
    pub fn shift_right(self, delta: impl Into<TextSize>) -> Result<Self, RangeMapError> {
        let delta = delta.into();
        let src = checked_end(self.src, delta)?;
        let dst = checked_end(self.dst, delta)?;
        Self::new(src, dst, self.len)
    }

    /// Returns the same starts with a different length.
    pub fn with_len(self, len: impl Into<TextSize>) -> Result<Self, RangeMapError> {
        Self::new(self.src, self.dst, len)
    }

    /// Clips this range to the part whose destination lies inside `range`.
    ///
    /// The source start moves by the same amount as the destination start.
    /// Returns `None` unless the overlap is non-empty.
    pub fn dst_intersection(&self, range: TextRange) -> Option<MappedRange> {
        let start = self.dst.max(range.start());
        let end = self.dst_end().min(range.end());
        if start >= end {
            return None;
        }
        Some(Self {
            src: self.src + (start - self.dst),
            dst: start,
            len: end - start,
        })
    }

    /// Returns true if this range's source interval contains `offset`.
    #[inline]
    pub fn src_contains(&self, offset: TextSize) -> bool {
        self.src <= offset && offset < self.src_end()
    }

    /// Returns true if `offset` lies in the destination interval, or sits
    /// exactly on its end when `stick_to_left` is set.
    #[inline]
    pub fn dst_contains(&self, offset: TextSize, stick_to_left: bool) -> bool {
        let end = self.dst_end();
        offset >= self.dst && (offset < end || (stick_to_left && offset == end))
    }

    /// Returns true if `next` continues this range in both spaces.
    #[inline]
    pub(crate) fn touches(&self, next: &MappedRange) -> bool {
        self.src_end() == next.src && self.dst_end() == next.dst
    }

    /// Extends this range by `next`, which must continue it in both spaces.
    ///
    /// The combined ends are `next`'s ends, so they fit in a `u32`.
    pub(crate) fn merged_with(&self, next: &MappedRange) -> MappedRange {
        debug_assert!(self.touches(next));
        Self {
            src: self.src,
            dst: self.dst,
            len: self.len + next.len,
        }
    }
}

fn checked_end(offset: TextSize, len: TextSize) -> Result<TextSize, RangeMapError> {
    offset
        .checked_add(len)
        .ok_or(RangeMapError::OffsetOverflow { offset, len })
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawMappedRange {
    src: TextSize,
    dst: TextSize,
    len: TextSize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawMappedRange> for MappedRange {
    type Error = RangeMapError;

    fn try_from(raw: RawMappedRange) -> Result<Self, Self::Error> {
        MappedRange::new(raw.src, raw.dst, raw.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(src: u32, dst: u32, len: u32) -> MappedRange {
        MappedRange::new(src, dst, len).unwrap()
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(
            MappedRange::new(0u32, 0u32, 0u32),
            Err(RangeMapError::EmptyRange)
        );
    }

    #[test]
    fn test_new_rejects_overflow() {
        let err = MappedRange::new(u32::MAX, 0u32, 1u32).unwrap_err();
        assert!(matches!(err, RangeMapError::OffsetOverflow { .. }));
        assert!(MappedRange::new(0u32, u32::MAX - 1, 1u32).is_ok());
    }

    #[test]
    fn test_derived_ends() {
        let r = range(10, 100, 5);
        assert_eq!(r.src_end(), TextSize::from(15));
        assert_eq!(r.dst_end(), TextSize::from(105));
        assert_eq!(r.src_range(), TextRange::new(10.into(), 15.into()));
        assert_eq!(r.dst_range(), TextRange::new(100.into(), 105.into()));
    }

    #[test]
    fn test_shifts_produce_new_values() {
        let r = range(10, 20, 3);
        assert_eq!(r.src_shift_left(4u32).unwrap(), range(6, 20, 3));
        assert_eq!(r.dst_shift_right(5u32).unwrap(), range(10, 25, 3));
        assert_eq!(r.shift_right(1u32).unwrap(), range(11, 21, 3));
        assert_eq!(r.with_len(7u32).unwrap(), range(10, 20, 7));
        assert_eq!(r, range(10, 20, 3));
    }

    #[test]
    fn test_shift_left_below_zero() {
        let err = range(2, 0, 1).src_shift_left(3u32).unwrap_err();
        assert_eq!(
            err,
            RangeMapError::OffsetUnderflow {
                offset: 2.into(),
                delta: 3.into()
            }
        );
        assert_eq!(range(2, 0, 1).with_len(0u32), Err(RangeMapError::EmptyRange));
    }

    #[test]
    fn test_dst_intersection_clips() {
        let r = range(10, 100, 10);
        let clipped = r.dst_intersection(TextRange::new(105.into(), 108.into()));
        assert_eq!(clipped, Some(range(15, 105, 3)));

        let left = r.dst_intersection(TextRange::new(90.into(), 102.into()));
        assert_eq!(left, Some(range(10, 100, 2)));
    }

    #[test]
    fn test_dst_intersection_touching_is_none() {
        let r = range(0, 10, 5);
        assert_eq!(r.dst_intersection(TextRange::new(15.into(), 20.into())), None);
        assert_eq!(r.dst_intersection(TextRange::new(5.into(), 10.into())), None);
        assert_eq!(r.dst_intersection(TextRange::empty(12.into())), None);
    }

    #[test]
    fn test_dst_contains_stick_to_left() {
        let r = range(0, 3, 3);
        assert!(r.dst_contains(3.into(), false));
        assert!(!r.dst_contains(6.into(), false));
        assert!(r.dst_contains(6.into(), true));
        assert!(!r.dst_contains(2.into(), true));
    }
}
