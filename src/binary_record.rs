//! Builder for the length-prefixed, UTF-16-keyed records that make up a `VERSIONINFO` resource.
//!
//! Every node of the version resource tree (`VS_VERSIONINFO`, `StringFileInfo`, `StringTable`,
//! `String`, `VarFileInfo`, `Var`) shares the same shape:
//!
//! ```text
//! u16    length        total bytes of this record, children included
//! u16    valueLength   bytes (binary) or UTF-16 units incl. NUL (text); 0 for containers
//! u16    type          0 = binary value, 1 = text value
//! WCHAR  key[]         NUL terminated, padded so the value starts on a DWORD boundary
//! ...    value         padded so the next sibling starts on a DWORD boundary
//! ...    children      already encoded records, each self-padded
//! ```
//!
//! Records are built bottom-up: children are encoded first and handed to their parent as bytes.
//! The builder is pure, so identical inputs always produce identical bytes.

use crate::err::RecordError;
use crate::utils::bytes::{self, pad_to_4, patch_u16, put_u16};
use crate::utils::utf16::{encode_units, put_units};

/// Size of the fixed `{length, valueLength, type}` prefix.
pub const RECORD_HEADER_SIZE: usize = 6;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u16)]
pub enum RecordType {
    Binary = 0,
    Text = 1,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordValue<'a> {
    /// Pure container, the record only owns children.
    Empty,
    /// NUL terminated UTF-16 string.
    Text(&'a str),
    /// Raw little-endian bytes (e.g. a serialized `VS_FIXEDFILEINFO`).
    Binary(&'a [u8]),
}

#[derive(Debug, Clone)]
pub struct BinaryRecord<'a> {
    key: &'a str,
    record_type: RecordType,
    value: RecordValue<'a>,
    children: Vec<Vec<u8>>,
}

impl<'a> BinaryRecord<'a> {
    pub fn new(key: &'a str, record_type: RecordType) -> Self {
        BinaryRecord {
            key,
            record_type,
            value: RecordValue::Empty,
            children: Vec::new(),
        }
    }

    /// A text container (`type = 1`, no value of its own).
    pub fn container(key: &'a str) -> Self {
        Self::new(key, RecordType::Text)
    }

    /// A text leaf, e.g. one `String` entry of a `StringTable`.
    pub fn text(key: &'a str, value: &'a str) -> Self {
        Self::new(key, RecordType::Text).with_value(RecordValue::Text(value))
    }

    /// A binary leaf, e.g. the `Translation` var.
    pub fn binary(key: &'a str, value: &'a [u8]) -> Self {
        Self::new(key, RecordType::Binary).with_value(RecordValue::Binary(value))
    }

    pub fn with_value(mut self, value: RecordValue<'a>) -> Self {
        self.value = value;
        self
    }

    pub fn with_child(mut self, child: Vec<u8>) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn key(&self) -> &str {
        self.key
    }

    /// Encode the record and its children.
    ///
    /// Fails if the record (or its value) is too large for the 16-bit `length`/`valueLength`
    /// fields.
    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        let key_units = encode_units(self.key);
        let value_units = match self.value {
            RecordValue::Text(text) => Some(encode_units(text)),
            _ => None,
        };

        let value_length = match (&self.value, &value_units) {
            (RecordValue::Text(_), Some(units)) => {
                self.len_field("valueLength", units.len() + 1)?
            }
            (RecordValue::Binary(raw), _) => self.len_field("valueLength", raw.len())?,
            _ => 0,
        };

        let children_len: usize = self.children.iter().map(Vec::len).sum();
        let mut buf = Vec::with_capacity(
            RECORD_HEADER_SIZE + (key_units.len() + 2) * 2 + 64 + children_len,
        );

        // `length` is backfilled once the payload is known.
        put_u16(&mut buf, 0);
        put_u16(&mut buf, value_length);
        put_u16(&mut buf, self.record_type as u16);

        // The 6-byte header leaves the key on a WORD boundary; an odd number of key units plus
        // the terminator needs one extra NUL unit to put the value on a DWORD boundary.
        put_units(&mut buf, &key_units);
        put_u16(&mut buf, 0);
        if key_units.len() % 2 == 1 {
            put_u16(&mut buf, 0);
        }

        match (self.value, value_units) {
            (RecordValue::Text(_), Some(units)) => {
                put_units(&mut buf, &units);
                put_u16(&mut buf, 0);
                // Inverse parity to the key: an even unit count plus NUL ends mid-DWORD.
                if units.len() % 2 == 0 {
                    put_u16(&mut buf, 0);
                }
            }
            (RecordValue::Binary(raw), _) => {
                buf.extend_from_slice(raw);
                pad_to_4(&mut buf);
            }
            _ => {}
        }

        for child in &self.children {
            debug_assert!(
                child.len() % 4 == 0,
                "child of `{}` is not DWORD aligned",
                self.key
            );
            buf.extend_from_slice(child);
        }

        let length = self.len_field("length", buf.len())?;
        patch_u16(&mut buf, 0, length);
        Ok(buf)
    }

    fn len_field(&self, field: &'static str, len: usize) -> Result<u16, RecordError> {
        u16::try_from(len).map_err(|_| RecordError::LengthOverflow {
            key: self.key.to_owned(),
            field,
            len,
        })
    }
}

/// Header fields of an encoded record, as read back from a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub length: u16,
    pub value_length: u16,
    pub record_type: u16,
    pub key: String,
    /// Offset of the value payload, relative to the start of the record.
    pub value_offset: usize,
}

impl RecordHeader {
    /// Read the header of the record starting at `offset`.
    ///
    /// Returns `None` on truncated input or a malformed key.
    pub fn read(buf: &[u8], offset: usize) -> Option<RecordHeader> {
        let length = bytes::read_u16_le(buf, offset)?;
        let value_length = bytes::read_u16_le(buf, offset + 2)?;
        let record_type = bytes::read_u16_le(buf, offset + 4)?;

        let key_start = offset + RECORD_HEADER_SIZE;
        let mut units = Vec::new();
        let mut cursor = key_start;
        loop {
            let unit = bytes::read_u16_le(buf, cursor)?;
            cursor += 2;
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        let key = String::from_utf16(&units).ok()?;

        Some(RecordHeader {
            length,
            value_length,
            record_type,
            key,
            value_offset: bytes::align4(cursor - offset),
        })
    }
}
