//! `VS_FIXEDFILEINFO` and the closed sets of constants that populate it.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use thiserror::Error;

use crate::utils::bytes::put_u32;

pub const VS_FFI_SIGNATURE: u32 = 0xFEEF_04BD;
pub const VS_FFI_FILEFLAGSMASK: u32 = 0x0000_003F;

/// Serialized size of `VS_FIXEDFILEINFO` (13 DWORDs).
pub const FIXED_FILE_INFO_SIZE: usize = 52;

bitflags! {
    /// `dwFileFlags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FileFlags: u32 {
        const VS_FF_DEBUG = 0x0000_0001;
        const VS_FF_PRERELEASE = 0x0000_0002;
        const VS_FF_PATCHED = 0x0000_0004;
        const VS_FF_PRIVATEBUILD = 0x0000_0008;
        const VS_FF_INFOINFERRED = 0x0000_0010;
        const VS_FF_SPECIALBUILD = 0x0000_0020;
    }
}

win32_enum! {
    /// `dwFileOS`
    pub enum FileOs: u32 {
        Unknown => ("VOS_UNKNOWN", 0x0000_0000),
        Dos => ("VOS_DOS", 0x0001_0000),
        Os216 => ("VOS_OS216", 0x0002_0000),
        Os232 => ("VOS_OS232", 0x0003_0000),
        Nt => ("VOS_NT", 0x0004_0000),
        Windows16 => ("VOS__WINDOWS16", 0x0000_0001),
        Pm16 => ("VOS__PM16", 0x0000_0002),
        Pm32 => ("VOS__PM32", 0x0000_0003),
        Windows32 => ("VOS__WINDOWS32", 0x0000_0004),
        DosWindows16 => ("VOS_DOS_WINDOWS16", 0x0001_0001),
        DosWindows32 => ("VOS_DOS_WINDOWS32", 0x0001_0004),
        Os216Pm16 => ("VOS_OS216_PM16", 0x0002_0002),
        Os232Pm32 => ("VOS_OS232_PM32", 0x0003_0003),
        NtWindows32 => ("VOS_NT_WINDOWS32", 0x0004_0004),
    }
}

win32_enum! {
    /// `dwFileType`
    pub enum FileType: u32 {
        Unknown => ("VFT_UNKNOWN", 0x0000_0000),
        App => ("VFT_APP", 0x0000_0001),
        Dll => ("VFT_DLL", 0x0000_0002),
        Drv => ("VFT_DRV", 0x0000_0003),
        Font => ("VFT_FONT", 0x0000_0004),
        Vxd => ("VFT_VXD", 0x0000_0005),
        StaticLib => ("VFT_STATIC_LIB", 0x0000_0007),
    }
}

win32_enum! {
    /// `dwFileSubtype`. Driver and font subtypes share numeric values.
    pub enum FileSubtype: u32 {
        Unknown => ("VFT2_UNKNOWN", 0x0000_0000),
        DrvPrinter => ("VFT2_DRV_PRINTER", 0x0000_0001),
        DrvKeyboard => ("VFT2_DRV_KEYBOARD", 0x0000_0002),
        DrvLanguage => ("VFT2_DRV_LANGUAGE", 0x0000_0003),
        DrvDisplay => ("VFT2_DRV_DISPLAY", 0x0000_0004),
        DrvMouse => ("VFT2_DRV_MOUSE", 0x0000_0005),
        DrvNetwork => ("VFT2_DRV_NETWORK", 0x0000_0006),
        DrvSystem => ("VFT2_DRV_SYSTEM", 0x0000_0007),
        DrvInstallable => ("VFT2_DRV_INSTALLABLE", 0x0000_0008),
        DrvSound => ("VFT2_DRV_SOUND", 0x0000_0009),
        DrvComm => ("VFT2_DRV_COMM", 0x0000_000A),
        DrvVersionedPrinter => ("VFT2_DRV_VERSIONED_PRINTER", 0x0000_000C),
        FontRaster => ("VFT2_FONT_RASTER", 0x0000_0001),
        FontVector => ("VFT2_FONT_VECTOR", 0x0000_0002),
        FontTruetype => ("VFT2_FONT_TRUETYPE", 0x0000_0003),
    }
}

impl Default for FileOs {
    fn default() -> Self {
        FileOs::Unknown
    }
}

impl Default for FileType {
    fn default() -> Self {
        FileType::Unknown
    }
}

impl Default for FileSubtype {
    fn default() -> Self {
        FileSubtype::Unknown
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseVersionError {
    #[error("version number is empty")]
    Empty,
    #[error("version number has {count} components, at most 4 are allowed")]
    TooManyComponents { count: usize },
    #[error("`{component}` is not a 16-bit version component")]
    InvalidComponent { component: String },
}

/// A four part `major.minor.build.revision` version.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionNumber {
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub revision: u16,
}

impl VersionNumber {
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        VersionNumber {
            major,
            minor,
            build,
            revision,
        }
    }

    /// `dwFileVersionMS`/`dwProductVersionMS`: major in the high word, minor in the low word.
    pub fn ms(&self) -> u32 {
        (u32::from(self.major) << 16) | u32::from(self.minor)
    }

    /// `dwFileVersionLS`/`dwProductVersionLS`: build in the high word, revision in the low word.
    pub fn ls(&self) -> u32 {
        (u32::from(self.build) << 16) | u32::from(self.revision)
    }
}

impl FromStr for VersionNumber {
    type Err = ParseVersionError;

    /// Parses one to four dot separated decimal components; missing trailing components are 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseVersionError::Empty);
        }

        let components: Vec<&str> = s.split('.').collect();
        if components.len() > 4 {
            return Err(ParseVersionError::TooManyComponents {
                count: components.len(),
            });
        }

        let mut parts = [0u16; 4];
        for (slot, component) in parts.iter_mut().zip(&components) {
            // `u16::from_str` accepts a leading `+`, which has no place in a version string.
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseVersionError::InvalidComponent {
                    component: component.to_string(),
                });
            }
            *slot = component
                .parse()
                .map_err(|_| ParseVersionError::InvalidComponent {
                    component: component.to_string(),
                })?;
        }

        Ok(VersionNumber::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// The fixed, numeric part of a version resource.
///
/// Signature and flags mask are constants; the structure version and file date are always zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedFileInfo {
    pub file_version: VersionNumber,
    pub product_version: VersionNumber,
    pub file_flags: FileFlags,
    pub file_os: FileOs,
    pub file_type: FileType,
    pub file_subtype: FileSubtype,
}

impl FixedFileInfo {
    /// Serialize as `VS_FIXEDFILEINFO`, field by field, little-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FIXED_FILE_INFO_SIZE);
        put_u32(&mut buf, VS_FFI_SIGNATURE);
        // dwStrucVersion
        put_u32(&mut buf, 0);
        put_u32(&mut buf, self.file_version.ms());
        put_u32(&mut buf, self.file_version.ls());
        put_u32(&mut buf, self.product_version.ms());
        put_u32(&mut buf, self.product_version.ls());
        put_u32(&mut buf, VS_FFI_FILEFLAGSMASK);
        put_u32(&mut buf, self.file_flags.bits());
        put_u32(&mut buf, self.file_os.value());
        put_u32(&mut buf, self.file_type.value());
        put_u32(&mut buf, self.file_subtype.value());
        // dwFileDateMS, dwFileDateLS
        put_u32(&mut buf, 0);
        put_u32(&mut buf, 0);

        debug_assert_eq!(buf.len(), FIXED_FILE_INFO_SIZE);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::bytes::read_u32_le;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_dotted_version() {
        let version: VersionNumber = "1.2.3.4".parse().unwrap();
        assert_eq!(version, VersionNumber::new(1, 2, 3, 4));
        assert_eq!(version.ms(), (1 << 16) | 2);
        assert_eq!(version.ls(), (3 << 16) | 4);
        assert_eq!(version.to_string(), "1.2.3.4");
    }

    #[test]
    fn test_missing_trailing_components_are_zero() {
        assert_eq!(
            "2.0".parse::<VersionNumber>().unwrap(),
            VersionNumber::new(2, 0, 0, 0)
        );
        assert_eq!(
            "65535.0.0.1".parse::<VersionNumber>().unwrap().ms(),
            0xFFFF_0000
        );
    }

    #[test]
    fn test_rejects_malformed_versions() {
        assert_eq!("".parse::<VersionNumber>(), Err(ParseVersionError::Empty));
        assert_eq!(
            "1.2.3.4.5".parse::<VersionNumber>(),
            Err(ParseVersionError::TooManyComponents { count: 5 })
        );
        for bad in ["1..2", "1.x", "65536", "+1", "1.2.3.-4", " 1"] {
            assert!(bad.parse::<VersionNumber>().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_closed_name_sets() {
        assert_eq!(FileOs::from_name("VOS_NT_WINDOWS32").map(FileOs::value), Some(0x0004_0004));
        assert_eq!(FileType::from_name("VFT_STATIC_LIB").map(FileType::value), Some(7));
        assert_eq!(
            FileSubtype::from_name("VFT2_FONT_TRUETYPE").map(FileSubtype::value),
            Some(3)
        );
        assert_eq!(FileOs::from_name("VOS_WINDOWS32"), None);
        assert_eq!(FileType::from_name("vft_app"), None);
        assert_eq!(FileOs::ALL.len(), 14);
        assert_eq!(FileType::ALL.len(), 7);
        assert_eq!(FileSubtype::ALL.len(), 15);

        assert_eq!(FileFlags::from_name("VS_FF_DEBUG"), Some(FileFlags::VS_FF_DEBUG));
        assert_eq!(FileFlags::from_name("VS_FF_UNKNOWN"), None);
        assert_eq!(FileFlags::all().bits(), VS_FFI_FILEFLAGSMASK);
    }

    #[test]
    fn test_serializes_fixed_file_info_field_by_field() {
        let info = FixedFileInfo {
            file_version: VersionNumber::new(1, 2, 3, 4),
            product_version: VersionNumber::new(5, 6, 7, 8),
            file_flags: FileFlags::VS_FF_DEBUG | FileFlags::VS_FF_PATCHED,
            file_os: FileOs::NtWindows32,
            file_type: FileType::Dll,
            file_subtype: FileSubtype::Unknown,
        };
        let bytes = info.to_bytes();
        assert_eq!(bytes.len(), FIXED_FILE_INFO_SIZE);

        let words: Vec<u32> = (0..13).map(|i| read_u32_le(&bytes, i * 4).unwrap()).collect();
        assert_eq!(
            words,
            vec![
                0xFEEF_04BD,
                0,
                0x0001_0002,
                0x0003_0004,
                0x0005_0006,
                0x0007_0008,
                0x0000_003F,
                0x0000_0005,
                0x0004_0004,
                0x0000_0002,
                0,
                0,
                0,
            ]
        );
    }
}
