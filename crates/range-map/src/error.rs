//! Error types for range construction, lookup and decoding.

use text_size::TextSize;
use thiserror::Error;

/// An error raised while building or querying mapped ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeMapError {
    /// A mapped range must cover at least one character.
    #[error("mapped range length should be greater than 0")]
    EmptyRange,

    /// An offset plus length does not fit in a `u32`.
    #[error("mapped range end overflows: offset {offset:?} + length {len:?}")]
    OffsetOverflow {
        /// The offset being extended.
        offset: TextSize,
        /// The length or delta added to it.
        len: TextSize,
    },

    /// A shift would move an offset below zero.
    #[error("cannot shift offset {offset:?} left by {delta:?}")]
    OffsetUnderflow {
        /// The offset being shifted.
        offset: TextSize,
        /// The requested shift.
        delta: TextSize,
    },

    /// More than one stored range claims the same destination offset.
    ///
    /// Only reachable when overlapping ranges were put into a map, which
    /// means the expansion generator that produced them is broken.
    #[error("destination offset {offset:?} is claimed by {matches} ranges")]
    AmbiguousOffset {
        /// The queried destination offset.
        offset: TextSize,
        /// How many ranges matched.
        matches: usize,
    },
}

/// An error raised while decoding a persisted range map.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The stream ended before the declared number of ranges was read.
    #[error("unexpected end of range map data")]
    Truncated,

    /// A variable-length integer does not fit in a `u32`.
    #[error("variable-length integer overflows u32")]
    VarIntOverflow,

    /// A decoded entry is not a valid mapped range.
    #[error("invalid mapped range at index {index}")]
    InvalidRange {
        /// Position of the entry in the stream.
        index: usize,
        /// Why the entry was rejected.
        #[source]
        source: RangeMapError,
    },

    /// Bytes remain after the last declared range.
    #[error("{0} trailing bytes after range map data")]
    TrailingBytes(usize),

    /// The underlying reader failed.
    #[error("failed to read range map data: {0}")]
    Io(#[source] std::io::Error),
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            DecodeError::Truncated
        } else {
            DecodeError::Io(err)
        }
    }
}
