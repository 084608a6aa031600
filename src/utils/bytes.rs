//! Byte-buffer utilities for writing (and re-reading) little-endian resource layouts.
//!
//! Every resource format produced by this crate is little-endian and made of fixed-width
//! numeric fields, so the whole serialization story is a handful of `put_*` helpers over
//! `Vec<u8>`. Fields are always written one by one in their documented order; we never copy a
//! struct's in-memory representation.
//!
//! There are two layers:
//! - **Write layer** (`put_*`, `pad_to_4`): append primitives to a growing buffer.
//! - **Read layer** (`read_*`): `Option`-returning readers at fixed offsets, for walking an
//!   already-encoded buffer (e.g. when verifying a produced resource).
//!
//! Example (length-prefixed record):
//!
//! ```ignore
//! use crate::utils::bytes;
//!
//! let mut buf = Vec::new();
//! bytes::put_u16(&mut buf, 0); // placeholder
//! bytes::put_u32(&mut buf, 0xFEEF04BD);
//! let len = buf.len() as u16;
//! bytes::patch_u16(&mut buf, 0, len);
//! ```

use byteorder::{LittleEndian, WriteBytesExt};

/// Append a `u16` (little-endian).
pub(crate) fn put_u16(buf: &mut Vec<u8>, value: u16) {
    // Writing into a `Vec<u8>` cannot fail.
    let _ = buf.write_u16::<LittleEndian>(value);
}

/// Append a `u32` (little-endian).
pub(crate) fn put_u32(buf: &mut Vec<u8>, value: u32) {
    let _ = buf.write_u32::<LittleEndian>(value);
}

/// Append `count` zero bytes.
pub(crate) fn put_zeros(buf: &mut Vec<u8>, count: usize) {
    buf.resize(buf.len() + count, 0);
}

/// Overwrite the `u16` at `offset` (little-endian).
///
/// Used to backfill length fields once a record's payload is known.
pub(crate) fn patch_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Round `len` up to the next multiple of 4.
pub(crate) const fn align4(len: usize) -> usize {
    (len + 3) & !3
}

/// Zero-pad `buf` so its length is a multiple of 4.
pub(crate) fn pad_to_4(buf: &mut Vec<u8>) {
    let aligned = align4(buf.len());
    buf.resize(aligned, 0);
}

/// Convert a byte count into a `u16` length field.
///
/// Document validation bounds every string, so an overflow here is a programming error.
pub(crate) fn len_u16(len: usize, what: &'static str) -> u16 {
    debug_assert!(
        len <= usize::from(u16::MAX),
        "{what} length {len} does not fit in a u16 field"
    );
    len as u16
}

/// Read `N` raw bytes at `offset`.
///
/// Returns `None` if the range is out of bounds.
pub fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    let bytes: [u8; N] = buf.get(offset..end)?.try_into().ok()?;
    Some(bytes)
}

/// Read a `u16` (little-endian) at `offset`.
pub fn read_u16_le(buf: &[u8], offset: usize) -> Option<u16> {
    Some(u16::from_le_bytes(read_array::<2>(buf, offset)?))
}

/// Read a `u32` (little-endian) at `offset`.
pub fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    Some(u32::from_le_bytes(read_array::<4>(buf, offset)?))
}
