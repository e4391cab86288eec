//! Offset and range translation between call-site and expansion text.

use crate::{MappedRange, RangeMapBuilder, RangeMapError};
use text_size::{TextRange, TextSize};

/// An ordered list of [`MappedRange`]s produced by one macro-expansion pass.
///
/// The "source" space is the text of the macro call body, the "destination"
/// space is the expanded text. Equality is exact and order-sensitive, so two
/// expansion passes can be compared to detect that nothing changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RangeMap {
    ranges: Vec<MappedRange>,
}

impl RangeMap {
    /// A map with no ranges.
    pub const EMPTY: RangeMap = RangeMap { ranges: Vec::new() };

    /// Creates a new empty range map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder that merges touching ranges as they are added.
    pub fn builder() -> RangeMapBuilder {
        RangeMapBuilder::new()
    }

    /// Creates a map holding exactly one range.
    pub fn from_range(range: MappedRange) -> Self {
        Self {
            ranges: vec![range],
        }
    }

    /// Creates a map from ranges in emission order, merging each range into
    /// its predecessor when the two touch in both spaces.
    pub fn from_ranges(ranges: impl IntoIterator<Item = MappedRange>) -> Self {
        let mut builder = RangeMapBuilder::new();
        builder.extend(ranges);
        builder.build()
    }

    /// Creates a map that stores `ranges` as given, without merging.
    pub fn from_vec_unmerged(ranges: Vec<MappedRange>) -> Self {
        Self { ranges }
    }

    /// Concatenates independently built maps in order.
    ///
    /// No merging happens across part boundaries.
    pub fn concat(parts: impl IntoIterator<Item = RangeMap>) -> Self {
        let ranges = parts.into_iter().flat_map(|part| part.ranges).collect();
        Self { ranges }
    }

    /// Returns true if this map has no ranges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the number of stored ranges.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns the stored ranges in order.
    #[inline]
    pub fn ranges(&self) -> &[MappedRange] {
        &self.ranges
    }

    /// Returns an iterator over the stored ranges.
    pub fn iter(&self) -> std::slice::Iter<'_, MappedRange> {
        self.ranges.iter()
    }

    /// Maps an expansion offset back to the call body.
    ///
    /// Tries a strict lookup first and, if nothing covers `offset`, retries
    /// allowing `offset` to sit on the exclusive end of a range.
    ///
    /// # Panics
    ///
    /// Panics if more than one range claims `offset`. Use
    /// [`RangeMap::checked_map_offset_to_source`] to get an error instead.
    pub fn map_offset_to_source(&self, offset: TextSize) -> Option<TextSize> {
        self.checked_map_offset_to_source(offset)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Maps an expansion offset back to the call body using a single lookup.
    ///
    /// # Panics
    ///
    /// Panics if more than one range claims `offset`.
    pub fn map_offset_to_source_with(
        &self,
        offset: TextSize,
        stick_to_left: bool,
    ) -> Option<TextSize> {
        self.checked_map_offset_to_source_with(offset, stick_to_left)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Like [`RangeMap::map_offset_to_source`], but reports overlapping
    /// ranges as an error.
    pub fn checked_map_offset_to_source(
        &self,
        offset: TextSize,
    ) -> Result<Option<TextSize>, RangeMapError> {
        match self.checked_map_offset_to_source_with(offset, false)? {
            Some(mapped) => Ok(Some(mapped)),
            None => self.checked_map_offset_to_source_with(offset, true),
        }
    }

    /// Like [`RangeMap::map_offset_to_source_with`], but reports overlapping
    /// ranges as an error.
    pub fn checked_map_offset_to_source_with(
        &self,
        offset: TextSize,
        stick_to_left: bool,
    ) -> Result<Option<TextSize>, RangeMapError> {
        let mut matching = self
            .ranges
            .iter()
            .filter(|range| range.dst_contains(offset, stick_to_left));

        let Some(range) = matching.next() else {
            return Ok(None);
        };

        let extra = matching.count();
        if extra > 0 {
            return Err(RangeMapError::AmbiguousOffset {
                offset,
                matches: extra + 1,
            });
        }

        Ok(Some(range.src() + (offset - range.dst())))
    }

    /// Maps a call-body offset to every place it appears in the expansion.
    ///
    /// A macro may repeat a call-site token, so this can return several
    /// offsets. They are returned in range order.
    pub fn map_offset_to_destination(&self, offset: TextSize) -> Vec<TextSize> {
        self.ranges
            .iter()
            .filter(|range| range.src_contains(offset))
            .map(|range| range.dst() + (offset - range.src()))
            .collect()
    }

    /// Maps an expansion range back to the call body, one piece per stored
    /// range it overlaps.
    pub fn map_range_to_source(&self, range: TextRange) -> Vec<MappedRange> {
        self.ranges
            .iter()
            .filter_map(|stored| stored.dst_intersection(range))
            .collect()
    }

    /// Maps a range that belongs to a later expansion stage.
    ///
    /// The source interval of `to_map` lies in this map's destination space.
    /// Each returned piece keeps its source offset from this map and has its
    /// destination offset moved into `to_map`'s destination space.
    pub fn map_mapped_range_to_source(&self, to_map: MappedRange) -> Vec<MappedRange> {
        self.map_range_to_source(to_map.src_range())
            .into_iter()
            .filter_map(|mapped| {
                let dst = to_map.dst().checked_add(mapped.dst() - to_map.src())?;
                MappedRange::new(mapped.src(), dst, mapped.len()).ok()
            })
            .collect()
    }

    /// Composes two expansion stages.
    ///
    /// If `self` maps stage A to stage B and `other` maps stage B to stage C,
    /// the result maps stage A to stage C. Pieces are concatenated in the
    /// order of `other`'s ranges and are not merged.
    pub fn compose(&self, other: &RangeMap) -> RangeMap {
        let ranges: Vec<MappedRange> = other
            .ranges
            .iter()
            .flat_map(|&range| self.map_mapped_range_to_source(range))
            .collect();
        tracing::trace!(
            first = self.len(),
            second = other.len(),
            composed = ranges.len(),
            "composed range maps"
        );
        Self { ranges }
    }
}

impl From<MappedRange> for RangeMap {
    fn from(range: MappedRange) -> Self {
        Self::from_range(range)
    }
}

impl FromIterator<MappedRange> for RangeMap {
    fn from_iter<I: IntoIterator<Item = MappedRange>>(iter: I) -> Self {
        Self::from_ranges(iter)
    }
}

impl<'a> IntoIterator for &'a RangeMap {
    type Item = &'a MappedRange;
    type IntoIter = std::slice::Iter<'a, MappedRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}
