//! Win32 `.res` files (the 32-bit resource file format consumed by linkers).
//!
//! ```text
//! RESOURCEHEADER   DataSize, HeaderSize, TYPE, NAME, DataVersion, MemoryFlags, LanguageId,
//!                  Version, Characteristics
//! data             DataSize bytes, padded to a DWORD boundary
//! ```
//!
//! The file starts with an empty entry (DataSize = 0, type and name 0) marking it as a 32-bit
//! resource file. Types and names are always ordinals here (`0xFFFF` followed by the value), so
//! every header is exactly 32 bytes.

use std::path::{Path, PathBuf};

use log::{debug, trace};
use tempfile::NamedTempFile;

use super::{ResourceUpdate, persist_over, temp_file_beside};
use crate::err::StoreError;
use crate::locale::LanguageId;
use crate::resource::ResourceType;
use crate::utils::bytes::{pad_to_4, put_u16, put_u32};

const RES_HEADER_SIZE: u32 = 32;

/// `MOVEABLE | PURE | DISCARDABLE`
const MEMORY_FLAGS: u16 = 0x1030;

fn put_res_header(
    buf: &mut Vec<u8>,
    data_size: u32,
    kind: u16,
    id: u16,
    language: u16,
    flags: u16,
) {
    put_u32(buf, data_size);
    put_u32(buf, RES_HEADER_SIZE);
    put_u16(buf, 0xFFFF);
    put_u16(buf, kind);
    put_u16(buf, 0xFFFF);
    put_u16(buf, id);
    // DataVersion
    put_u32(buf, 0);
    put_u16(buf, flags);
    put_u16(buf, language);
    // Version, Characteristics
    put_u32(buf, 0);
    put_u32(buf, 0);
}

/// Serialize resources, in the given order, as a `.res` file.
pub fn encode_res_file<'a>(
    entries: impl IntoIterator<Item = (ResourceType, u16, LanguageId, &'a [u8])>,
) -> Vec<u8> {
    let mut buf = Vec::new();
    put_res_header(&mut buf, 0, 0, 0, 0, 0);

    for (kind, id, language, data) in entries {
        trace!(
            "res entry {} #{} language {} at offset {}",
            kind,
            id,
            language,
            buf.len()
        );
        put_res_header(
            &mut buf,
            data.len() as u32,
            kind.ordinal(),
            id,
            language.value(),
            MEMORY_FLAGS,
        );
        buf.extend_from_slice(data);
        pad_to_4(&mut buf);
    }

    buf
}

#[derive(Debug)]
struct ResEntry {
    kind: ResourceType,
    id: u16,
    language: LanguageId,
    data: Vec<u8>,
}

/// A resource update session targeting a `.res` file.
///
/// The file is written to a temporary sibling on commit and atomically moved into place, so an
/// existing file at the destination survives a failed or discarded session.
#[derive(Debug)]
pub struct ResFileUpdate {
    path: PathBuf,
    temp: NamedTempFile,
    entries: Vec<ResEntry>,
}

impl ResFileUpdate {
    /// Begin an update of the `.res` file at `path`.
    ///
    /// Fails if `path` is a directory or its parent directory is not writable.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if path.is_dir() {
            return Err(StoreError::Open {
                source: std::io::Error::other("destination is a directory"),
                path,
            });
        }

        let temp = temp_file_beside(&path)?;

        debug!("opened resource update for `{}`", path.display());
        Ok(ResFileUpdate {
            path,
            temp,
            entries: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of distinct resources upserted so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode_res_file(
            self.entries
                .iter()
                .map(|e| (e.kind, e.id, e.language, e.data.as_slice())),
        )
    }
}

impl ResourceUpdate for ResFileUpdate {
    fn upsert(
        &mut self,
        kind: ResourceType,
        id: u16,
        language: LanguageId,
        data: &[u8],
    ) -> Result<(), StoreError> {
        if u32::try_from(data.len()).is_err() {
            return Err(StoreError::Upsert {
                kind,
                id,
                language: language.value(),
                message: format!("{} bytes do not fit a resource entry", data.len()),
            });
        }

        let existing = self
            .entries
            .iter_mut()
            .find(|e| e.kind == kind && e.id == id && e.language == language);
        match existing {
            Some(entry) => entry.data = data.to_vec(),
            None => self.entries.push(ResEntry {
                kind,
                id,
                language,
                data: data.to_vec(),
            }),
        }
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        let bytes = self.to_bytes();
        persist_over(self.temp, &bytes, self.path)
    }

    fn discard(self) {
        debug!("discarding resource update for `{}`", self.path.display());
    }
}
