//! Resource updates applied to an existing PE image (EXE/DLL), in place.
//!
//! The image's resource directory is a three level tree, type → id → language, each leaf holding
//! the resource bytes. Upserts edit a copy of that tree; `commit` rebuilds the image around it
//! and replaces the file.

use std::fs;
use std::path::{Path, PathBuf};

use editpe::{
    Image, ResourceData, ResourceDirectory, ResourceEntry, ResourceEntryName, ResourceTable,
};
use log::debug;
use tempfile::NamedTempFile;

use super::{ResourceUpdate, persist_over, temp_file_beside};
use crate::err::StoreError;
use crate::locale::LanguageId;
use crate::resource::ResourceType;

/// A resource update session targeting an executable image.
pub struct PeImageUpdate {
    path: PathBuf,
    temp: NamedTempFile,
    image: Vec<u8>,
    resources: ResourceDirectory,
}

impl PeImageUpdate {
    /// Begin an update of the executable at `path`.
    ///
    /// Fails if the file cannot be read or is not a PE image.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let image = fs::read(&path).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;

        let resources = Image::parse(&image)
            .map_err(|e| StoreError::InvalidImage {
                path: path.clone(),
                message: format!("{e:?}"),
            })?
            .resource_directory()
            .cloned()
            .unwrap_or_default();

        let temp = temp_file_beside(&path)?;

        debug!("opened resource update for image `{}`", path.display());
        Ok(PeImageUpdate {
            path,
            temp,
            image,
            resources,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The staged resource directory.
    pub fn resources(&self) -> &ResourceDirectory {
        &self.resources
    }

    /// Staged bytes for type/id/language, including resources already in the image.
    pub fn resource(&self, kind: ResourceType, id: u16, language: LanguageId) -> Option<Vec<u8>> {
        find_resource(&self.resources, kind, id, language)
    }
}

impl ResourceUpdate for PeImageUpdate {
    fn upsert(
        &mut self,
        kind: ResourceType,
        id: u16,
        language: LanguageId,
        data: &[u8],
    ) -> Result<(), StoreError> {
        insert_resource(&mut self.resources, kind, id, language, data.to_vec());
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        let mut image = Image::parse(&self.image).map_err(|e| StoreError::InvalidImage {
            path: self.path.clone(),
            message: format!("{e:?}"),
        })?;
        image
            .set_resource_directory(self.resources)
            .map_err(|e| StoreError::Rebuild {
                path: self.path.clone(),
                message: format!("{e:?}"),
            })?;

        let data = image.data();
        persist_over(self.temp, &data, self.path)
    }

    fn discard(self) {
        debug!("discarding resource update for image `{}`", self.path.display());
    }
}

/// Take the subtable stored under `name`, leaving an empty one in its place.
///
/// Returns `None` if there was no subtable under `name`.
fn take_table(table: &mut ResourceTable, name: ResourceEntryName) -> Option<ResourceTable> {
    match table.insert(name, ResourceEntry::Table(ResourceTable::default())) {
        Some(ResourceEntry::Table(existing)) => Some(existing),
        _ => None,
    }
}

/// Store `data` at type/id/language, replacing what was there and keeping every sibling.
fn insert_resource(
    resources: &mut ResourceDirectory,
    kind: ResourceType,
    id: u16,
    language: LanguageId,
    data: Vec<u8>,
) {
    let root = resources.root_mut();
    let kind_name = ResourceEntryName::ID(u32::from(kind.ordinal()));
    let id_name = ResourceEntryName::ID(u32::from(id));

    let mut by_id = take_table(root, kind_name.clone()).unwrap_or_default();
    let mut by_language = take_table(&mut by_id, id_name.clone()).unwrap_or_default();

    let mut entry = ResourceData::default();
    entry.set_data(data);
    by_language.insert(
        ResourceEntryName::ID(u32::from(language.value())),
        ResourceEntry::Data(entry),
    );

    by_id.insert(id_name, ResourceEntry::Table(by_language));
    root.insert(kind_name, ResourceEntry::Table(by_id));
}

/// Bytes stored at type/id/language, if any.
pub fn find_resource(
    resources: &ResourceDirectory,
    kind: ResourceType,
    id: u16,
    language: LanguageId,
) -> Option<Vec<u8>> {
    let mut resources = resources.clone();
    let root = resources.root_mut();
    let mut by_id = take_table(root, ResourceEntryName::ID(u32::from(kind.ordinal())))?;
    let mut by_language = take_table(&mut by_id, ResourceEntryName::ID(u32::from(id)))?;

    match by_language.insert(
        ResourceEntryName::ID(u32::from(language.value())),
        ResourceEntry::Table(ResourceTable::default()),
    ) {
        Some(ResourceEntry::Data(entry)) => Some(entry.data().to_vec()),
        _ => None,
    }
}
