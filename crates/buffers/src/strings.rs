//! Text encoding helpers for Latin-1, UTF-16LE and UTF-8.

use crate::BufferError;

/// Returns `true` if every char fits in one Latin-1 byte (U+0000..=U+00FF).
///
/// # Example
///
/// ```
/// use fory_buffers::strings::is_latin1;
///
/// assert!(is_latin1("café"));
/// assert!(!is_latin1("Hello，你好"));
/// ```
pub fn is_latin1(s: &str) -> bool {
    s.chars().all(|c| (c as u32) <= 0xff)
}

/// Encodes a Latin-1 representable string, one byte per char.
///
/// Callers check [`is_latin1`] first; chars above U+00FF keep their low byte.
pub fn latin1_encode(s: &str) -> Vec<u8> {
    s.chars().map(|c| c as u32 as u8).collect()
}

pub fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encodes as UTF-16 code units in little-endian order.
pub fn utf16le_encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

pub fn utf16le_decode(bytes: &[u8]) -> Result<String, BufferError> {
    if bytes.len() % 2 != 0 {
        return Err(BufferError::InvalidUtf16);
    }
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|_| BufferError::InvalidUtf16)
}

pub fn utf8_decode(bytes: &[u8]) -> Result<String, BufferError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| BufferError::InvalidUtf8)
}
