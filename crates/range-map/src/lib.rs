//! Source range mapping for macro expansions.
//!
//! A macro call body (the *source*) is expanded into new text (the
//! *destination*). Pieces of the call body that survive expansion unchanged
//! are recorded as [`MappedRange`]s, collected into a [`RangeMap`]. The map
//! translates offsets and ranges found in expanded text back to the call
//! site, so diagnostics and navigation can point at what the user wrote.
//!
//! Maps from successive expansion stages can be chained with
//! [`RangeMap::compose`], and persisted with the compact binary form in
//! [`codec`].

mod builder;
pub mod codec;
mod error;
mod map;
mod mapped_range;

pub use builder::RangeMapBuilder;
pub use error::{DecodeError, RangeMapError};
pub use map::RangeMap;
pub use mapped_range::MappedRange;
pub use text_size::{TextRange, TextSize};
