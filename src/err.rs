use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::resource::ResourceType;

pub type Result<T> = std::result::Result<T, RcError>;

/// Errors raised while turning a JSON resource description into validated documents.
///
/// `field` is a path into the input document, e.g. `version.fileOS` or
/// `messageTable[2].severity`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("field {field} is required")]
    Missing { field: String },

    #[error("field {field} must specify {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("field {field} is too long ({units} UTF-16 units, at most {max} allowed)")]
    ValueTooLong {
        field: String,
        units: usize,
        max: usize,
    },

    #[error("duplicate message with ID 0x{id:08x}")]
    DuplicateMessageId { id: u32 },

    #[error("invalid resource type {name}")]
    UnknownSection { name: String },
}

impl FieldError {
    /// Re-point an error raised by a document model at its full path in the input.
    pub fn with_field(self, path: impl Into<String>) -> FieldError {
        let path = path.into();
        match self {
            FieldError::Missing { .. } => FieldError::Missing { field: path },
            FieldError::WrongType { expected, .. } => FieldError::WrongType {
                field: path,
                expected,
            },
            FieldError::InvalidValue { value, .. } => FieldError::InvalidValue { field: path, value },
            FieldError::ValueTooLong { units, max, .. } => FieldError::ValueTooLong {
                field: path,
                units,
                max,
            },
            other => other,
        }
    }
}

/// A version resource record that cannot be described by its 16-bit length fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("{field} of record `{key}` is {len}, more than a 16-bit field holds")]
    LengthOverflow {
        key: String,
        field: &'static str,
        len: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LanguageLookupError {
    #[error("invalid language {name}")]
    UnknownLocale { name: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open `{}` for resource update: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to update resource {kind} #{id} (language 0x{language:04x}): {message}")]
    Upsert {
        kind: ResourceType,
        id: u16,
        language: u16,
        message: String,
    },

    #[error("`{}` is not a valid PE image: {message}", path.display())]
    InvalidImage { path: PathBuf, message: String },

    #[error("failed to rebuild the resources of `{}`: {message}", path.display())]
    Rebuild { path: PathBuf, message: String },

    #[error("failed to write `{}`: {source}", path.display())]
    Commit { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
pub enum RcError {
    #[error("invalid resources: {0}")]
    Field(#[from] FieldError),

    #[error("failed to parse JSON: {source}")]
    Json { source: serde_json::Error },

    #[error(transparent)]
    Language(#[from] LanguageLookupError),

    #[error("failed to encode version info: {0}")]
    Record(#[from] RecordError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not read file `{}`: {source}", path.display())]
    ManifestRead { path: PathBuf, source: io::Error },
}
