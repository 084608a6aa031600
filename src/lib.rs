#![deny(unused_must_use)]
#![forbid(unsafe_code)]
// Don't allow dbg! prints in release.
#![cfg_attr(not(debug_assertions), deny(clippy::dbg_macro))]

#[macro_use]
mod macros;

pub mod binary_record;
pub mod err;
pub mod locale;
pub mod message_table;
pub mod resource;
pub mod script;
pub mod store;
pub mod utils;
pub mod version_info;

pub use binary_record::{BinaryRecord, RecordHeader, RecordType, RecordValue};
pub use err::{FieldError, LanguageLookupError, RcError, RecordError, Result, StoreError};
pub use locale::{BuiltinLocales, LanguageId, LanguageResolver};
pub use message_table::{MessageBlock, MessageCatalog, Severity, encode_message_table};
pub use resource::{Resource, ResourceType};
pub use script::{ResourceScript, Section};
#[cfg(feature = "pe_update")]
pub use store::PeImageUpdate;
pub use store::{ResFileUpdate, ResourceUpdate, apply_resources, encode_res_file};
pub use version_info::{
    FileFlags, FileOs, FileSubtype, FileType, FixedFileInfo, StringField, VersionDocument,
    VersionNumber, encode_version_info,
};
