//! Compact binary form of a [`RangeMap`], used when expansion results are cached.
//!
//! The layout is a big-endian `u32` range count followed by, for each range,
//! three variable-length integers: source offset, destination offset, length.
//!
//! Variable-length integers favour small values: anything below 192 takes a
//! single byte. Larger values start with `192 + (v & 0x3F)`, followed by the
//! remaining bits seven at a time, low bits first, with the high bit set on
//! every byte except the last.

use crate::{DecodeError, MappedRange, RangeMap};
use std::io::{self, Read, Write};
use text_size::TextSize;

/// Version of the binary layout written by [`RangeMap::write_to`].
///
/// It is not part of the stream; caches that persist range maps should store
/// it next to their entries and drop entries written with another version.
pub const FORMAT_VERSION: u32 = 1;

const SINGLE_BYTE_LIMIT: u32 = 192;

/// Upper bound on capacity reserved up front from an untrusted count.
const MAX_PREALLOCATED_RANGES: usize = 1024;

impl RangeMap {
    /// Writes this map in its binary form.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let count = u32::try_from(self.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "too many ranges to encode")
        })?;
        writer.write_all(&count.to_be_bytes())?;
        for range in self.iter() {
            write_var_int(&mut writer, range.src().into())?;
            write_var_int(&mut writer, range.dst().into())?;
            write_var_int(&mut writer, range.len().into())?;
        }
        Ok(())
    }

    /// Reads a map written by [`RangeMap::write_to`].
    ///
    /// The ranges are restored exactly as encoded; nothing is merged.
    pub fn read_from<R: Read>(mut reader: R) -> Result<RangeMap, DecodeError> {
        let mut count = [0u8; 4];
        reader.read_exact(&mut count)?;
        let count = u32::from_be_bytes(count) as usize;

        let mut ranges = Vec::with_capacity(count.min(MAX_PREALLOCATED_RANGES));
        for index in 0..count {
            let src = read_var_int(&mut reader)?;
            let dst = read_var_int(&mut reader)?;
            let len = read_var_int(&mut reader)?;
            let range = MappedRange::new(src, dst, len)
                .map_err(|source| DecodeError::InvalidRange { index, source })?;
            ranges.push(range);
        }

        tracing::debug!(ranges = ranges.len(), "decoded range map");
        Ok(RangeMap::from_vec_unmerged(ranges))
    }

    /// Encodes this map into a byte vector.
    ///
    /// # Panics
    ///
    /// Panics if the map holds more than `u32::MAX` ranges.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.len() * 3);
        // Writing into a Vec only fails on the range count.
        if let Err(err) = self.write_to(&mut bytes) {
            panic!("failed to encode range map: {err}");
        }
        bytes
    }

    /// Decodes a map from `bytes`, which must hold exactly one encoded map.
    pub fn from_bytes(bytes: &[u8]) -> Result<RangeMap, DecodeError> {
        let mut rest = bytes;
        let map = Self::read_from(&mut rest)?;
        if !rest.is_empty() {
            return Err(DecodeError::TrailingBytes(rest.len()));
        }
        Ok(map)
    }
}

fn write_var_int<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    let mut value = value;
    if value >= SINGLE_BYTE_LIMIT {
        writer.write_all(&[(SINGLE_BYTE_LIMIT + (value & 0x3F)) as u8])?;
        value >>= 6;
        while value >= 0x80 {
            writer.write_all(&[(value & 0x7F) as u8 | 0x80])?;
            value >>= 7;
        }
    }
    writer.write_all(&[value as u8])
}

fn read_var_int<R: Read>(reader: &mut R) -> Result<TextSize, DecodeError> {
    let first = read_u8(reader)?;
    if u32::from(first) < SINGLE_BYTE_LIMIT {
        return Ok(TextSize::from(u32::from(first)));
    }

    let mut value = u32::from(first) - SINGLE_BYTE_LIMIT;
    let mut shift = 6;
    loop {
        let next = read_u8(reader)?;
        let bits = u32::from(next & 0x7F);
        if shift > 27 || bits.checked_shl(shift).map(|v| v >> shift) != Some(bits) {
            return Err(DecodeError::VarIntOverflow);
        }
        value |= bits << shift;
        if next & 0x80 == 0 {
            return Ok(TextSize::from(value));
        }
        shift += 7;
    }
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, DecodeError> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0])
}
