//! Locale name to Windows language id (`LANGID`) resolution.
//!
//! Resource languages are 16-bit `LANGID`s (`MAKELANGID(primary, sublanguage)`). Descriptions
//! name them with BCP-47 style locale names (`en-US`), which are resolved through a
//! [`LanguageResolver`]. [`BuiltinLocales`] ships a static table, so resolution works on every
//! host without calling into Windows.

use std::fmt;

use log::debug;

use crate::err::LanguageLookupError;

/// A Windows language identifier.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageId(u16);

impl LanguageId {
    /// `MAKELANGID(LANG_NEUTRAL, SUBLANG_NEUTRAL)`
    pub const NEUTRAL: LanguageId = LanguageId(0x0000);
    /// `LANG_INVARIANT`
    pub const INVARIANT: LanguageId = LanguageId(0x007F);

    pub const fn new(value: u16) -> Self {
        LanguageId(value)
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    pub const fn primary_language(self) -> u16 {
        self.0 & 0x03FF
    }

    pub const fn sublanguage(self) -> u16 {
        self.0 >> 10
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

pub trait LanguageResolver {
    fn resolve(&self, name: &str) -> Result<LanguageId, LanguageLookupError>;
}

impl<F> LanguageResolver for F
where
    F: Fn(&str) -> Option<LanguageId>,
{
    fn resolve(&self, name: &str) -> Result<LanguageId, LanguageLookupError> {
        self(name).ok_or_else(|| LanguageLookupError::UnknownLocale {
            name: name.to_owned(),
        })
    }
}

/// Locale names understood by [`BuiltinLocales`], matched case-insensitively.
///
/// An empty name is the invariant locale, as with `LocaleNameToLCID`.
const LOCALES: &[(&str, u16)] = &[
    ("", 0x007F),
    ("ar", 0x0001),
    ("ar-SA", 0x0401),
    ("ar-EG", 0x0C01),
    ("bg-BG", 0x0402),
    ("ca-ES", 0x0403),
    ("cs", 0x0005),
    ("cs-CZ", 0x0405),
    ("da", 0x0006),
    ("da-DK", 0x0406),
    ("de", 0x0007),
    ("de-DE", 0x0407),
    ("de-CH", 0x0807),
    ("de-AT", 0x0C07),
    ("el-GR", 0x0408),
    ("en", 0x0009),
    ("en-US", 0x0409),
    ("en-GB", 0x0809),
    ("en-AU", 0x0C09),
    ("en-CA", 0x1009),
    ("en-NZ", 0x1409),
    ("en-IE", 0x1809),
    ("en-IN", 0x4009),
    ("es", 0x000A),
    ("es-MX", 0x080A),
    ("es-ES", 0x0C0A),
    ("et-EE", 0x0425),
    ("fi", 0x000B),
    ("fi-FI", 0x040B),
    ("fr", 0x000C),
    ("fr-FR", 0x040C),
    ("fr-BE", 0x080C),
    ("fr-CA", 0x0C0C),
    ("fr-CH", 0x100C),
    ("he-IL", 0x040D),
    ("hi-IN", 0x0439),
    ("hr-HR", 0x041A),
    ("hu", 0x000E),
    ("hu-HU", 0x040E),
    ("id-ID", 0x0421),
    ("it", 0x0010),
    ("it-IT", 0x0410),
    ("it-CH", 0x0810),
    ("ja", 0x0011),
    ("ja-JP", 0x0411),
    ("ko", 0x0012),
    ("ko-KR", 0x0412),
    ("lt-LT", 0x0427),
    ("lv-LV", 0x0426),
    ("nb-NO", 0x0414),
    ("nl", 0x0013),
    ("nl-NL", 0x0413),
    ("nl-BE", 0x0813),
    ("pl", 0x0015),
    ("pl-PL", 0x0415),
    ("pt", 0x0016),
    ("pt-BR", 0x0416),
    ("pt-PT", 0x0816),
    ("ro-RO", 0x0418),
    ("ru", 0x0019),
    ("ru-RU", 0x0419),
    ("sk-SK", 0x041B),
    ("sl-SI", 0x0424),
    ("sr-Latn-RS", 0x241A),
    ("sv", 0x001D),
    ("sv-SE", 0x041D),
    ("th-TH", 0x041E),
    ("tr", 0x001F),
    ("tr-TR", 0x041F),
    ("uk-UA", 0x0422),
    ("vi-VN", 0x042A),
    ("zh-TW", 0x0404),
    ("zh-CN", 0x0804),
    ("zh-HK", 0x0C04),
    ("zh-SG", 0x1004),
    ("zh-Hans", 0x0004),
    ("zh-Hant", 0x7C04),
];

/// The built-in locale table.
#[derive(Debug, Copy, Clone, Default)]
pub struct BuiltinLocales;

impl BuiltinLocales {
    pub fn names() -> impl Iterator<Item = &'static str> {
        LOCALES.iter().map(|(name, _)| *name)
    }
}

impl LanguageResolver for BuiltinLocales {
    fn resolve(&self, name: &str) -> Result<LanguageId, LanguageLookupError> {
        // `en_US` is a common spelling of `en-US`.
        let normalized = name.replace('_', "-");
        let language = LOCALES
            .iter()
            .find(|(locale, _)| locale.eq_ignore_ascii_case(&normalized))
            .map(|(_, id)| LanguageId(*id))
            .ok_or_else(|| LanguageLookupError::UnknownLocale {
                name: name.to_owned(),
            })?;

        debug!("resolved locale `{}` to language {}", name, language);
        Ok(language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_builtin_locales() {
        let resolver = BuiltinLocales;
        assert_eq!(resolver.resolve("en-US"), Ok(LanguageId::new(0x0409)));
        assert_eq!(resolver.resolve("EN-us"), Ok(LanguageId::new(0x0409)));
        assert_eq!(resolver.resolve("de_DE"), Ok(LanguageId::new(0x0407)));
        assert_eq!(resolver.resolve(""), Ok(LanguageId::INVARIANT));
        assert_eq!(
            resolver.resolve("xx-YY"),
            Err(LanguageLookupError::UnknownLocale {
                name: "xx-YY".to_owned()
            })
        );
    }

    #[test]
    fn test_builtin_table_has_no_duplicate_names() {
        let mut names: Vec<String> = BuiltinLocales::names()
            .map(|n| n.to_ascii_lowercase())
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_closures_resolve() {
        let resolver = |name: &str| (name == "tlh").then_some(LanguageId::new(0x0401));
        assert_eq!(resolver.resolve("tlh"), Ok(LanguageId::new(0x0401)));
        assert!(resolver.resolve("en-US").is_err());
    }

    #[test]
    fn test_language_id_parts() {
        let id = LanguageId::new(0x0C0A);
        assert_eq!(id.primary_language(), 0x0A);
        assert_eq!(id.sublanguage(), 0x03);
        assert_eq!(id.to_string(), "0x0c0a");
    }
}
