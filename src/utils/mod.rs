pub mod bytes;
pub mod utf16;

pub use self::utf16::{Utf16LeDecodeError, decode_utf16le_bytes_z};
