use thiserror::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum Utf16LeDecodeError {
    #[error("UTF-16LE byte slice has an odd length")]
    OddLength,
    #[error("UTF-16LE byte slice contains unpaired surrogates")]
    InvalidData,
}

/// Encode `text` as UTF-16 code units (no terminator).
pub(crate) fn encode_units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Append UTF-16 code units to `buf` as little-endian bytes.
pub(crate) fn put_units(buf: &mut Vec<u8>, units: &[u16]) {
    buf.reserve(units.len() * 2);
    for unit in units {
        buf.extend_from_slice(&unit.to_le_bytes());
    }
}

/// Decode a UTF-16LE byte slice until the first NUL (0x0000), if present.
pub fn decode_utf16le_bytes_z(bytes: &[u8]) -> Result<String, Utf16LeDecodeError> {
    if !bytes.len().is_multiple_of(2) {
        return Err(Utf16LeDecodeError::OddLength);
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();

    let end = units.iter().position(|&c| c == 0).unwrap_or(units.len());
    String::from_utf16(&units[..end]).map_err(|_| Utf16LeDecodeError::InvalidData)
}
