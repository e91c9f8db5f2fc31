//! Utility functions for binary encoding and UTF-16 string conversion.

use crate::error::{RegistryError, Result};
use crate::value_type::ValueType;
use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::UTF_16LE;

/// Decodes UTF-16LE bytes without trimming anything.
///
/// BOM sniffing is disabled: a leading U+FEFF is data, not a marker.
///
/// # Errors
///
/// Returns `MalformedValue` if the byte count is odd or the data is not
/// valid UTF-16 (e.g. an unpaired surrogate).
pub fn decode_utf16(data: &[u8], value_type: ValueType) -> Result<String> {
    if data.is_empty() {
        return Ok(String::new());
    }

    // UTF-16 requires even number of bytes
    if data.len() % 2 != 0 {
        return Err(RegistryError::malformed(
            value_type,
            format!("odd UTF-16 byte count {}", data.len()),
        ));
    }

    UTF_16LE
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|decoded| decoded.into_owned())
        .ok_or_else(|| RegistryError::malformed(value_type, "invalid UTF-16 sequence"))
}

/// Reads a null-terminated UTF-16LE string, trimming trailing terminators.
pub fn read_utf16_string(data: &[u8], value_type: ValueType) -> Result<String> {
    Ok(decode_utf16(data, value_type)?.trim_end_matches('\0').to_string())
}

/// Appends `text` as UTF-16LE code units to `out`, without a terminator.
pub fn push_utf16(out: &mut Vec<u8>, text: &str) {
    let mut buf = [0u8; 2];
    for unit in text.encode_utf16() {
        LittleEndian::write_u16(&mut buf, unit);
        out.extend_from_slice(&buf);
    }
}

/// Encodes `text` as a null-terminated UTF-16LE string.
pub fn write_utf16_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity((text.len() + 1) * 2);
    push_utf16(&mut out, text);
    out.extend_from_slice(&[0, 0]);
    out
}

/// Reads an exactly `N`-byte buffer, failing with `MalformedValue` on any
/// other length.
pub fn exact_bytes<const N: usize>(data: &[u8], value_type: ValueType) -> Result<[u8; N]> {
    data.try_into().map_err(|_| {
        RegistryError::malformed(
            value_type,
            format!("expected {} bytes, got {}", N, data.len()),
        )
    })
}

/// Encodes a u32 in little-endian byte order.
pub fn write_u32_le(value: u32) -> Vec<u8> {
    let mut buf = vec![0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    buf
}
