#![allow(dead_code)]
use std::path::PathBuf;

use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
#[cfg(test)]
pub fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .init();
    });
}

pub fn samples_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("samples")
        .canonicalize()
        .unwrap()
}

pub fn regular_sample() -> PathBuf {
    samples_dir().join("app.json")
}

pub fn sample_manifest() -> PathBuf {
    samples_dir().join("app.manifest")
}

pub fn sample_with_an_invalid_severity() -> PathBuf {
    samples_dir().join("bad_severity.json")
}

/// Walks a `.res` file, returning `(type, id, language, data)` for every entry after the
/// leading marker.
pub fn read_res_entries(bytes: &[u8]) -> Vec<(u16, u16, u16, Vec<u8>)> {
    let u16_at = |offset: usize| u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
    let u32_at = |offset: usize| {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    };

    assert_eq!(u32_at(0), 0, "first entry must be the empty marker");
    let mut offset = u32_at(4) as usize;
    let mut entries = Vec::new();

    while offset < bytes.len() {
        let data_size = u32_at(offset) as usize;
        let header_size = u32_at(offset + 4) as usize;
        assert_eq!(header_size, 32);
        assert_eq!(u16_at(offset + 8), 0xFFFF);
        assert_eq!(u16_at(offset + 12), 0xFFFF);

        let kind = u16_at(offset + 10);
        let id = u16_at(offset + 14);
        let language = u16_at(offset + 22);
        let start = offset + header_size;
        entries.push((kind, id, language, bytes[start..start + data_size].to_vec()));

        offset = start + data_size.next_multiple_of(4);
    }

    assert_eq!(offset, bytes.len());
    entries
}

/// A small console launcher (x64 PE) carrying icon, version and manifest resources of its own.
pub fn launcher_exe() -> PathBuf {
    samples_dir().join("launcher.exe")
}
