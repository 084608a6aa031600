//! JSON resource descriptions.
//!
//! A description is a single JSON object:
//!
//! ```json
//! {
//!   "language": "en-US",
//!   "version": {
//!     "fileVersion": "1.2.3.4",
//!     "fileFlags": ["VS_FF_PRERELEASE"],
//!     "fileOS": "VOS_NT_WINDOWS32",
//!     "fileType": "VFT_APP",
//!     "stringFileInfo": { "companyName": "Acme", "productName": "Widget" }
//!   },
//!   "messageTable": [
//!     { "id": 1, "severity": "Error", "messageText": "Something failed." }
//!   ],
//!   "manifest": "app.manifest"
//! }
//! ```
//!
//! Parsing validates every field against the closed sets of accepted names and produces
//! documents the encoders can consume without further checks. Sections keep the order they
//! appear in the description.

use std::path::{Path, PathBuf};

use log::debug;
use serde_json::{Map, Value};

use crate::err::{FieldError, RcError, Result};
use crate::locale::{LanguageId, LanguageResolver};
use crate::message_table::{MessageCatalog, Severity, encode_message_table};
use crate::resource::{DEFAULT_RESOURCE_ID, MANIFEST_RESOURCE_ID, Resource, ResourceType};
use crate::version_info::{
    FileFlags, FileOs, FileSubtype, FileType, FixedFileInfo, StringField, VersionDocument,
    VersionNumber, encode_version_info,
};

#[cfg(feature = "multithreading")]
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Version(VersionDocument),
    MessageTable(MessageCatalog),
    /// Manifest file name, relative to the description's directory.
    Manifest(PathBuf),
}

impl Section {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Section::Version(_) => ResourceType::Version,
            Section::MessageTable(_) => ResourceType::MessageTable,
            Section::Manifest(_) => ResourceType::Manifest,
        }
    }
}

/// A validated resource description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceScript {
    pub language: LanguageId,
    pub sections: Vec<Section>,
    base_dir: PathBuf,
}

impl ResourceScript {
    /// Parse and validate a description from JSON text.
    pub fn from_json_str(text: &str, resolver: &impl LanguageResolver) -> Result<Self> {
        let json: Value = serde_json::from_str(text).map_err(|source| RcError::Json { source })?;
        Self::from_json(&json, resolver)
    }

    pub fn from_json(json: &Value, resolver: &impl LanguageResolver) -> Result<Self> {
        let root = json.as_object().ok_or_else(|| FieldError::WrongType {
            field: "<root>".to_owned(),
            expected: "an object",
        })?;

        // The language applies to every section, wherever it appears in the object.
        let language = match root.get("language") {
            Some(Value::String(name)) => resolver.resolve(name)?,
            Some(_) => return Err(wrong_type("language", "a string").into()),
            None => LanguageId::NEUTRAL,
        };

        let mut sections = Vec::with_capacity(root.len());
        for (key, value) in root {
            let section = match key.as_str() {
                "language" => continue,
                "version" => Section::Version(parse_version(value, language)?),
                "messageTable" => Section::MessageTable(parse_message_table(value)?),
                "manifest" => Section::Manifest(parse_manifest(value)?),
                other => {
                    return Err(FieldError::UnknownSection {
                        name: other.to_owned(),
                    }
                    .into());
                }
            };
            debug!("parsed {} section", section.resource_type());
            sections.push(section);
        }

        Ok(ResourceScript {
            language,
            sections,
            base_dir: PathBuf::new(),
        })
    }

    /// Directory that relative manifest paths are resolved against.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Encode every section. The output keeps section order.
    pub fn compile(&self) -> Result<Vec<Resource>> {
        #[cfg(feature = "multithreading")]
        let resources = self
            .sections
            .par_iter()
            .map(|section| self.compile_section(section))
            .collect::<Result<Vec<_>>>()?;

        #[cfg(not(feature = "multithreading"))]
        let resources = self
            .sections
            .iter()
            .map(|section| self.compile_section(section))
            .collect::<Result<Vec<_>>>()?;

        Ok(resources)
    }

    pub fn compile_section(&self, section: &Section) -> Result<Resource> {
        let resource = match section {
            Section::Version(document) => Resource::new(
                ResourceType::Version,
                DEFAULT_RESOURCE_ID,
                encode_version_info(document)?,
            ),
            Section::MessageTable(catalog) => Resource::new(
                ResourceType::MessageTable,
                DEFAULT_RESOURCE_ID,
                encode_message_table(catalog),
            ),
            Section::Manifest(file_name) => {
                let path = self.base_dir.join(file_name);
                let data = std::fs::read(&path)
                    .map_err(|source| RcError::ManifestRead { path, source })?;
                Resource::new(ResourceType::Manifest, MANIFEST_RESOURCE_ID, data)
            }
        };

        debug!(
            "encoded {} #{} ({} bytes)",
            resource.kind,
            resource.id,
            resource.data.len()
        );
        Ok(resource)
    }
}

type FieldResult<T> = std::result::Result<T, FieldError>;

fn wrong_type(field: impl Into<String>, expected: &'static str) -> FieldError {
    FieldError::WrongType {
        field: field.into(),
        expected,
    }
}

fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> FieldError {
    FieldError::InvalidValue {
        field: field.into(),
        value: value.into(),
    }
}

fn as_object<'a>(value: &'a Value, field: &str) -> FieldResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| wrong_type(field, "an object"))
}

fn as_str<'a>(value: &'a Value, field: &str) -> FieldResult<&'a str> {
    value.as_str().ok_or_else(|| wrong_type(field, "a string"))
}

fn parse_version_number(value: &Value, field: &str) -> FieldResult<VersionNumber> {
    let text = as_str(value, field)?;
    text.parse().map_err(|_| invalid_value(field, text))
}

fn parse_enum<T>(
    value: &Value,
    field: &str,
    from_name: impl Fn(&str) -> Option<T>,
) -> FieldResult<T> {
    let name = as_str(value, field)?;
    from_name(name).ok_or_else(|| invalid_value(field, name))
}

fn parse_file_flags(value: &Value) -> FieldResult<FileFlags> {
    const FIELD: &str = "version.fileFlags";
    let names = value
        .as_array()
        .ok_or_else(|| wrong_type(FIELD, "a list of strings"))?;

    let mut flags = FileFlags::empty();
    for name in names {
        let name = name
            .as_str()
            .ok_or_else(|| wrong_type(FIELD, "a list of strings"))?;
        flags |= FileFlags::from_name(name).ok_or_else(|| invalid_value(FIELD, name))?;
    }
    Ok(flags)
}

fn parse_version(value: &Value, language: LanguageId) -> FieldResult<VersionDocument> {
    let version = as_object(value, "version")?;
    let mut fixed = FixedFileInfo::default();

    if let Some(v) = version.get("fileVersion") {
        fixed.file_version = parse_version_number(v, "version.fileVersion")?;
    }
    if let Some(v) = version.get("productVersion") {
        fixed.product_version = parse_version_number(v, "version.productVersion")?;
    }
    if let Some(v) = version.get("fileFlags") {
        fixed.file_flags = parse_file_flags(v)?;
    }
    if let Some(v) = version.get("fileOS") {
        fixed.file_os = parse_enum(v, "version.fileOS", FileOs::from_name)?;
    }
    if let Some(v) = version.get("fileType") {
        fixed.file_type = parse_enum(v, "version.fileType", FileType::from_name)?;
    }
    if let Some(v) = version.get("fileSubtype") {
        fixed.file_subtype = parse_enum(v, "version.fileSubtype", FileSubtype::from_name)?;
    }

    let mut document = VersionDocument::new(fixed, language);

    if let Some(v) = version.get("stringFileInfo") {
        let strings = as_object(v, "version.stringFileInfo")?;
        // Driven by the canonical field list; keys outside it are ignored.
        for field in StringField::ALL {
            let Some(v) = strings.get(field.json_name()) else {
                continue;
            };
            let path = format!("version.stringFileInfo.{}", field.json_name());
            let text = as_str(v, &path)?;
            document
                .set_string(field, text)
                .map_err(|e| e.with_field(path))?;
        }
    }

    Ok(document)
}

fn parse_message_table(value: &Value) -> FieldResult<MessageCatalog> {
    let messages = value
        .as_array()
        .ok_or_else(|| wrong_type("messageTable", "a list of objects"))?;

    let mut catalog = MessageCatalog::new();
    for (index, message) in messages.iter().enumerate() {
        let path = |name: &str| format!("messageTable[{index}].{name}");
        let message = message
            .as_object()
            .ok_or_else(|| wrong_type("messageTable", "a list of objects"))?;

        let id = match message.get("id") {
            None => return Err(FieldError::Missing { field: path("id") }),
            Some(v) => {
                let raw = v.as_u64().ok_or_else(|| wrong_type(path("id"), "an integer"))?;
                u32::try_from(raw).map_err(|_| invalid_value(path("id"), raw.to_string()))?
            }
        };

        let severity = match message.get("severity") {
            None => {
                return Err(FieldError::Missing {
                    field: path("severity"),
                });
            }
            Some(v) => parse_enum(v, &path("severity"), Severity::from_name)?,
        };
        let text = match message.get("messageText") {
            None => {
                return Err(FieldError::Missing {
                    field: path("messageText"),
                });
            }
            Some(v) => as_str(v, &path("messageText"))?,
        };

        // Severity bits are part of the id, so duplicates are detected after merging.
        catalog
            .insert(severity.apply(id), text)
            .map_err(|e| e.with_field(path("messageText")))?;
    }

    Ok(catalog)
}

fn parse_manifest(value: &Value) -> FieldResult<PathBuf> {
    value
        .as_str()
        .map(PathBuf::from)
        .ok_or_else(|| wrong_type("manifest", "a file name"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::BuiltinLocales;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(json: Value) -> Result<ResourceScript> {
        ResourceScript::from_json(&json, &BuiltinLocales)
    }

    fn field_error(json: Value) -> FieldError {
        match parse(json) {
            Err(RcError::Field(e)) => e,
            other => panic!("expected a field error, got {other:?}"),
        }
    }

    #[test]
    fn test_parses_full_version_section() {
        let script = parse(json!({
            "language": "en-US",
            "version": {
                "fileVersion": "1.2.3.4",
                "productVersion": "5.6",
                "fileFlags": ["VS_FF_DEBUG", "VS_FF_SPECIALBUILD"],
                "fileOS": "VOS_NT_WINDOWS32",
                "fileType": "VFT_DRV",
                "fileSubtype": "VFT2_DRV_SOUND",
                "stringFileInfo": {
                    "productName": "Widget",
                    "companyName": "Acme",
                    "notAField": "ignored"
                }
            }
        }))
        .unwrap();

        assert_eq!(script.language, LanguageId::new(0x0409));
        let [Section::Version(document)] = script.sections.as_slice() else {
            panic!("expected a single version section");
        };
        assert_eq!(document.fixed.file_version, VersionNumber::new(1, 2, 3, 4));
        assert_eq!(document.fixed.product_version, VersionNumber::new(5, 6, 0, 0));
        assert_eq!(
            document.fixed.file_flags,
            FileFlags::VS_FF_DEBUG | FileFlags::VS_FF_SPECIALBUILD
        );
        assert_eq!(document.fixed.file_os, FileOs::NtWindows32);
        assert_eq!(document.fixed.file_type, FileType::Drv);
        assert_eq!(document.fixed.file_subtype, FileSubtype::DrvSound);
        assert_eq!(document.language, LanguageId::new(0x0409));

        let strings: Vec<(StringField, &str)> = document.strings().collect();
        assert_eq!(
            strings,
            vec![
                (StringField::CompanyName, "Acme"),
                (StringField::ProductName, "Widget")
            ]
        );
    }

    #[test]
    fn test_missing_language_is_neutral() {
        let script = parse(json!({ "messageTable": [] })).unwrap();
        assert_eq!(script.language, LanguageId::NEUTRAL);
        assert_eq!(script.sections, vec![Section::MessageTable(MessageCatalog::new())]);
    }

    #[test]
    fn test_merges_severity_into_message_ids() {
        let script = parse(json!({
            "messageTable": [
                { "id": 1, "severity": "Success", "messageText": "ok" },
                { "id": 1, "severity": "Error", "messageText": "failed" }
            ]
        }))
        .unwrap();

        let [Section::MessageTable(catalog)] = script.sections.as_slice() else {
            panic!("expected a single message table section");
        };
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec![1, 0xC000_0001]);
        assert_eq!(catalog.get(0xC000_0001), Some("failed"));
    }

    #[test]
    fn test_reports_offending_fields() {
        assert_eq!(
            field_error(json!({ "version": { "fileOS": "VOS_BEOS" } })),
            FieldError::InvalidValue {
                field: "version.fileOS".to_owned(),
                value: "VOS_BEOS".to_owned()
            }
        );
        assert_eq!(
            field_error(json!({ "version": { "fileFlags": "VS_FF_DEBUG" } })),
            FieldError::WrongType {
                field: "version.fileFlags".to_owned(),
                expected: "a list of strings"
            }
        );
        assert_eq!(
            field_error(json!({ "version": { "fileVersion": "1.2.x" } })),
            FieldError::InvalidValue {
                field: "version.fileVersion".to_owned(),
                value: "1.2.x".to_owned()
            }
        );
        assert_eq!(
            field_error(json!({ "version": { "stringFileInfo": { "comments": 3 } } })),
            FieldError::WrongType {
                field: "version.stringFileInfo.comments".to_owned(),
                expected: "a string"
            }
        );
        assert_eq!(
            field_error(json!({ "messageTable": [{ "id": 1, "messageText": "x" }] })),
            FieldError::Missing {
                field: "messageTable[0].severity".to_owned()
            }
        );
        assert_eq!(
            field_error(json!({
                "messageTable": [{ "id": 1, "severity": "Fatal", "messageText": "x" }]
            })),
            FieldError::InvalidValue {
                field: "messageTable[0].severity".to_owned(),
                value: "Fatal".to_owned()
            }
        );
        assert_eq!(
            field_error(json!({ "icon": "app.ico" })),
            FieldError::UnknownSection {
                name: "icon".to_owned()
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_merged_ids() {
        assert_eq!(
            field_error(json!({
                "messageTable": [
                    { "id": 0x4000_0002u32, "severity": "Success", "messageText": "a" },
                    { "id": 2, "severity": "Informational", "messageText": "b" }
                ]
            })),
            FieldError::DuplicateMessageId { id: 0x4000_0002 }
        );
    }

    #[test]
    fn test_length_limits_report_the_input_path() {
        assert_eq!(
            field_error(json!({
                "version": { "stringFileInfo": { "comments": "x".repeat(2049) } }
            })),
            FieldError::ValueTooLong {
                field: "version.stringFileInfo.comments".to_owned(),
                units: 2049,
                max: 2048
            }
        );
        assert_eq!(
            field_error(json!({
                "messageTable": [
                    { "id": 1, "severity": "Success", "messageText": "ok" },
                    { "id": 2, "severity": "Success", "messageText": "x".repeat(32_001) }
                ]
            })),
            FieldError::ValueTooLong {
                field: "messageTable[1].messageText".to_owned(),
                units: 32_001,
                max: 32_000
            }
        );
    }

    #[test]
    fn test_rejects_unknown_language() {
        assert!(matches!(
            parse(json!({ "language": "xx-XX" })),
            Err(RcError::Language(_))
        ));
        assert_eq!(
            field_error(json!({ "language": 1033 })),
            FieldError::WrongType {
                field: "language".to_owned(),
                expected: "a string"
            }
        );
    }

    #[test]
    fn test_sections_keep_document_order() {
        let script = parse(json!({
            "messageTable": [],
            "language": "de-DE",
            "version": {}
        }))
        .unwrap();

        let kinds: Vec<ResourceType> = script.sections.iter().map(Section::resource_type).collect();
        assert_eq!(kinds, vec![ResourceType::MessageTable, ResourceType::Version]);

        let resources = script.compile().unwrap();
        assert_eq!(resources[0].kind, ResourceType::MessageTable);
        assert_eq!(resources[1].kind, ResourceType::Version);
        assert!(resources.iter().all(|r| r.id == 1));
    }

    #[test]
    fn test_missing_manifest_file_is_reported() {
        let script = parse(json!({ "manifest": "does-not-exist.manifest" }))
            .unwrap()
            .with_base_dir("/nonexistent-dir");
        assert!(matches!(
            script.compile(),
            Err(RcError::ManifestRead { .. })
        ));
    }
}
