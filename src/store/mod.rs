//! Destinations for encoded resources.
//!
//! A store is used in a single session: open, upsert any number of resources, then either
//! commit or discard. Nothing is written to the destination before `commit`.

#[cfg(feature = "pe_update")]
mod pe_image;
mod res_file;

#[cfg(feature = "pe_update")]
pub use self::pe_image::{PeImageUpdate, find_resource};
pub use self::res_file::{ResFileUpdate, encode_res_file};

use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::err::StoreError;
use crate::locale::LanguageId;
use crate::resource::{Resource, ResourceType};

/// An open resource update session.
pub trait ResourceUpdate {
    /// Add a resource, replacing any resource with the same type, id and language.
    fn upsert(
        &mut self,
        kind: ResourceType,
        id: u16,
        language: LanguageId,
        data: &[u8],
    ) -> Result<(), StoreError>;

    /// Write every upserted resource to the destination.
    fn commit(self) -> Result<(), StoreError>;

    /// Abandon the session, leaving the destination untouched.
    fn discard(self);
}

/// Upsert `resources` under `language` and commit.
///
/// If any upsert fails, the session is discarded and the error returned; the destination is
/// never partially updated.
pub fn apply_resources<U: ResourceUpdate>(
    mut update: U,
    language: LanguageId,
    resources: &[Resource],
) -> Result<(), StoreError> {
    for resource in resources {
        if let Err(e) = update.upsert(resource.kind, resource.id, language, &resource.data) {
            warn!(
                "discarding resource update after failing to store {} #{}",
                resource.kind, resource.id
            );
            update.discard();
            return Err(e);
        }
        debug!(
            "stored {} #{} (language {}, {} bytes)",
            resource.kind,
            resource.id,
            language,
            resource.data.len()
        );
    }

    update.commit()
}

/// Stage a temporary file in the destination's directory, so it can later be renamed over it.
fn temp_file_beside(path: &Path) -> Result<NamedTempFile, StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir).map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `bytes` to `temp` and atomically move it over `path`.
fn persist_over(mut temp: NamedTempFile, bytes: &[u8], path: PathBuf) -> Result<(), StoreError> {
    let commit_err = |source: std::io::Error| StoreError::Commit {
        path: path.clone(),
        source,
    };
    temp.write_all(bytes).map_err(commit_err)?;
    temp.as_file().sync_all().map_err(commit_err)?;
    temp.persist(&path).map_err(|e| commit_err(e.error))?;

    debug!("wrote {} bytes to `{}`", bytes.len(), path.display());
    Ok(())
}
