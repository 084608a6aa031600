//! `RT_MESSAGETABLE` encoding.
//!
//! Layout (all fields little-endian):
//!
//! ```text
//! MESSAGE_RESOURCE_DATA   u32 NumberOfBlocks
//! MESSAGE_RESOURCE_BLOCK  { u32 LowId, u32 HighId, u32 OffsetToEntries } * NumberOfBlocks
//! MESSAGE_RESOURCE_ENTRY  { u16 Length, u16 Flags, WCHAR Text[] } * number of messages
//! ```
//!
//! Blocks describe maximal runs of consecutive message ids. Entries are laid out in ascending id
//! order; a block's `OffsetToEntries` (relative to the start of the resource) points at the entry
//! of its `LowId`, and the remaining entries of the run follow back to back.

use std::collections::BTreeMap;

use log::trace;

use crate::err::FieldError;
use crate::utils::bytes::{len_u16, put_u16, put_u32, put_zeros};
use crate::utils::utf16::{encode_units, put_units};

/// `MESSAGE_RESOURCE_UNICODE`
pub const MESSAGE_RESOURCE_UNICODE: u16 = 0x0001;

/// Longest accepted message text, in UTF-16 code units (entry lengths are 16-bit).
pub const MAX_MESSAGE_UNITS: usize = 32_000;

const RESOURCE_DATA_HEADER_SIZE: usize = 4;
const RESOURCE_BLOCK_SIZE: usize = 12;
const RESOURCE_ENTRY_HEADER_SIZE: usize = 4;

win32_enum! {
    /// Message severity, stored in the top two bits of the message id.
    pub enum Severity: u32 {
        Success => ("Success", 0x0000_0000),
        Informational => ("Informational", 0x4000_0000),
        Warning => ("Warning", 0x8000_0000),
        Error => ("Error", 0xC000_0000),
    }
}

impl Severity {
    /// Merge the severity bits into a raw message id.
    pub fn apply(self, id: u32) -> u32 {
        id | self.value()
    }
}

/// Message id (severity bits included) to text.
///
/// Kept sorted by id, which is the order the encoder lays entries out in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    messages: BTreeMap<u32, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        MessageCatalog::default()
    }

    /// Add a message. Ids must be unique within a catalog.
    pub fn insert(&mut self, id: u32, text: impl Into<String>) -> Result<(), FieldError> {
        let text = text.into();
        let units = text.encode_utf16().count();
        if units > MAX_MESSAGE_UNITS {
            return Err(FieldError::ValueTooLong {
                field: "messageText".to_owned(),
                units,
                max: MAX_MESSAGE_UNITS,
            });
        }
        if self.messages.contains_key(&id) {
            return Err(FieldError::DuplicateMessageId { id });
        }
        self.messages.insert(id, text);
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.messages.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.messages.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.messages.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.messages.iter().map(|(id, text)| (*id, text.as_str()))
    }
}

/// An inclusive run of consecutive message ids.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    pub low_id: u32,
    pub high_id: u32,
}

impl MessageBlock {
    /// Number of ids in the run.
    pub fn count(&self) -> usize {
        (self.high_id - self.low_id) as usize + 1
    }
}

/// Split ascending `ids` into maximal runs of consecutive integers.
pub fn partition_blocks(ids: impl IntoIterator<Item = u32>) -> Vec<MessageBlock> {
    let mut blocks: Vec<MessageBlock> = Vec::new();

    for id in ids {
        match blocks.last_mut() {
            Some(block) if block.high_id.checked_add(1) == Some(id) => block.high_id = id,
            _ => blocks.push(MessageBlock {
                low_id: id,
                high_id: id,
            }),
        }
    }

    blocks
}

/// Encode a single `MESSAGE_RESOURCE_ENTRY`.
///
/// The text gets a trailing CRLF and one or two NUL units, so the entry length is always a
/// multiple of 4.
fn encode_entry(text: &str) -> Vec<u8> {
    let mut units = encode_units(text);
    units.extend_from_slice(&[0x000D, 0x000A]);

    let text_bytes = units.len() * 2;
    let nul_bytes = if text_bytes % 4 == 0 { 4 } else { 2 };
    let length = RESOURCE_ENTRY_HEADER_SIZE + text_bytes + nul_bytes;

    let mut entry = Vec::with_capacity(length);
    put_u16(&mut entry, len_u16(length, "message entry"));
    put_u16(&mut entry, MESSAGE_RESOURCE_UNICODE);
    put_units(&mut entry, &units);
    put_zeros(&mut entry, nul_bytes);

    debug_assert_eq!(entry.len(), length);
    entry
}

/// Encode `catalog` as an `RT_MESSAGETABLE` resource.
pub fn encode_message_table(catalog: &MessageCatalog) -> Vec<u8> {
    let blocks = partition_blocks(catalog.ids());
    let entries: Vec<Vec<u8>> = catalog.iter().map(|(_, text)| encode_entry(text)).collect();

    trace!(
        "message table: {} messages in {} blocks",
        entries.len(),
        blocks.len()
    );

    let header_len = RESOURCE_DATA_HEADER_SIZE + blocks.len() * RESOURCE_BLOCK_SIZE;
    let entries_len: usize = entries.iter().map(Vec::len).sum();
    let mut buf = Vec::with_capacity(header_len + entries_len);

    put_u32(&mut buf, blocks.len() as u32);

    let mut offset = header_len;
    let mut entry_index = 0;
    for block in &blocks {
        put_u32(&mut buf, block.low_id);
        put_u32(&mut buf, block.high_id);
        put_u32(&mut buf, offset as u32);

        let run = &entries[entry_index..entry_index + block.count()];
        offset += run.iter().map(Vec::len).sum::<usize>();
        entry_index += block.count();
    }

    for entry in &entries {
        buf.extend_from_slice(entry);
    }

    buf
}
