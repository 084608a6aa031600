//! `RT_VERSION` (`VS_VERSIONINFO`) encoding.
//!
//! The resource is a small tree of [`BinaryRecord`]s:
//!
//! ```text
//! VS_VERSION_INFO            value = VS_FIXEDFILEINFO
//! ├── StringFileInfo
//! │   └── <lang><codepage>   e.g. "040904B0"
//! │       └── String *       one per populated canonical field
//! └── VarFileInfo
//!     └── Translation        value = MAKELONG(lang, codepage)
//! ```

mod fixed_file_info;

use std::collections::BTreeMap;

use log::trace;

pub use self::fixed_file_info::{
    FIXED_FILE_INFO_SIZE, FileFlags, FileOs, FileSubtype, FileType, FixedFileInfo,
    ParseVersionError, VS_FFI_FILEFLAGSMASK, VS_FFI_SIGNATURE, VersionNumber,
};

use crate::binary_record::BinaryRecord;
use crate::err::{FieldError, RecordError};
use crate::locale::LanguageId;

/// Code page 1200 (UTF-16LE), the only one this crate emits.
pub const CODE_PAGE_UTF16LE: u16 = 1200;

/// Longest accepted `StringFileInfo` value, in UTF-16 code units.
///
/// Twelve values of this size still fit the 16-bit length of the enclosing `StringTable`.
pub const MAX_STRING_VALUE_UNITS: usize = 2048;

/// The canonical `StringFileInfo` fields, declared in the order they are emitted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StringField {
    Comments,
    CompanyName,
    FileDescription,
    FileVersion,
    InternalName,
    LegalCopyright,
    LegalTrademarks,
    OriginalFilename,
    PrivateBuild,
    ProductName,
    ProductVersion,
    SpecialBuild,
}

impl StringField {
    pub const ALL: [StringField; 12] = [
        StringField::Comments,
        StringField::CompanyName,
        StringField::FileDescription,
        StringField::FileVersion,
        StringField::InternalName,
        StringField::LegalCopyright,
        StringField::LegalTrademarks,
        StringField::OriginalFilename,
        StringField::PrivateBuild,
        StringField::ProductName,
        StringField::ProductVersion,
        StringField::SpecialBuild,
    ];

    /// The `String` record key.
    pub fn key(self) -> &'static str {
        match self {
            StringField::Comments => "Comments",
            StringField::CompanyName => "CompanyName",
            StringField::FileDescription => "FileDescription",
            StringField::FileVersion => "FileVersion",
            StringField::InternalName => "InternalName",
            StringField::LegalCopyright => "LegalCopyright",
            StringField::LegalTrademarks => "LegalTrademarks",
            StringField::OriginalFilename => "OriginalFilename",
            StringField::PrivateBuild => "PrivateBuild",
            StringField::ProductName => "ProductName",
            StringField::ProductVersion => "ProductVersion",
            StringField::SpecialBuild => "SpecialBuild",
        }
    }

    /// The camelCase name used in JSON resource descriptions.
    pub fn json_name(self) -> &'static str {
        match self {
            StringField::Comments => "comments",
            StringField::CompanyName => "companyName",
            StringField::FileDescription => "fileDescription",
            StringField::FileVersion => "fileVersion",
            StringField::InternalName => "internalName",
            StringField::LegalCopyright => "legalCopyright",
            StringField::LegalTrademarks => "legalTrademarks",
            StringField::OriginalFilename => "originalFilename",
            StringField::PrivateBuild => "privateBuild",
            StringField::ProductName => "productName",
            StringField::ProductVersion => "productVersion",
            StringField::SpecialBuild => "specialBuild",
        }
    }
}

/// Everything needed to encode a version resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDocument {
    pub fixed: FixedFileInfo,
    pub language: LanguageId,
    pub code_page: u16,
    strings: BTreeMap<StringField, String>,
}

impl VersionDocument {
    pub fn new(fixed: FixedFileInfo, language: LanguageId) -> Self {
        VersionDocument {
            fixed,
            language,
            code_page: CODE_PAGE_UTF16LE,
            strings: BTreeMap::new(),
        }
    }

    /// Set a `StringFileInfo` value, replacing any previous one for `field`.
    pub fn set_string(
        &mut self,
        field: StringField,
        value: impl Into<String>,
    ) -> Result<(), FieldError> {
        let value = value.into();
        let units = value.encode_utf16().count();
        if units > MAX_STRING_VALUE_UNITS {
            return Err(FieldError::ValueTooLong {
                field: field.json_name().to_owned(),
                units,
                max: MAX_STRING_VALUE_UNITS,
            });
        }
        self.strings.insert(field, value);
        Ok(())
    }

    pub fn string(&self, field: StringField) -> Option<&str> {
        self.strings.get(&field).map(String::as_str)
    }

    /// Populated string fields, in canonical order.
    pub fn strings(&self) -> impl Iterator<Item = (StringField, &str)> + '_ {
        StringField::ALL
            .into_iter()
            .filter_map(|field| self.string(field).map(|value| (field, value)))
    }

    /// `StringTable` key: language and code page as 8 uppercase hex digits.
    pub fn string_table_key(&self) -> String {
        format!("{:04X}{:04X}", self.language.value(), self.code_page)
    }

    /// `Translation` value: language in the low word, code page in the high word.
    pub fn translation(&self) -> u32 {
        u32::from(self.language.value()) | (u32::from(self.code_page) << 16)
    }
}

/// Encode `document` as an `RT_VERSION` resource.
///
/// Documents whose strings were set through [`VersionDocument::set_string`] always fit the
/// 16-bit record lengths.
pub fn encode_version_info(document: &VersionDocument) -> Result<Vec<u8>, RecordError> {
    let table_key = document.string_table_key();
    trace!(
        "version info: {} strings under `{}`",
        document.strings.len(),
        table_key
    );

    let strings = document
        .strings()
        .map(|(field, value)| BinaryRecord::text(field.key(), value).encode())
        .collect::<Result<Vec<_>, _>>()?;
    let string_table = BinaryRecord::container(&table_key)
        .with_children(strings)
        .encode()?;
    let string_file_info = BinaryRecord::container("StringFileInfo")
        .with_child(string_table)
        .encode()?;

    let translation = document.translation().to_le_bytes();
    let var_file_info = BinaryRecord::container("VarFileInfo")
        .with_child(BinaryRecord::binary("Translation", &translation).encode()?)
        .encode()?;

    let fixed = document.fixed.to_bytes();
    BinaryRecord::binary("VS_VERSION_INFO", &fixed)
        .with_children([string_file_info, var_file_info])
        .encode()
}
