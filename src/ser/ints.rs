use super::cursor::ByteReader;
use super::error::{SerError, SerKind, SerResult};

/// Upper bound applied to every length prefix before allocation.
///
/// A prefix above this limit cannot describe a well-formed proof and is
/// rejected before any buffer is reserved.
pub const MAX_LENGTH_PREFIX: u32 = 1 << 26;

/// Reads a little-endian `u32`.
pub fn read_u32(reader: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<u32> {
    let bytes = reader.read_array::<4>(kind, field)?;
    Ok(u32::from_le_bytes(bytes))
}

/// Reads a little-endian `u64`.
pub fn read_u64(reader: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<u64> {
    let bytes = reader.read_array::<8>(kind, field)?;
    Ok(u64::from_le_bytes(bytes))
}

/// Reads a little-endian `u32` length prefix and validates it against
/// [`MAX_LENGTH_PREFIX`] and the remaining buffer capacity.
///
/// `element_size` is the minimum number of bytes each announced element will
/// consume, so a prefix larger than the remaining payload fails early.
pub fn read_length_prefix(
    reader: &mut ByteReader<'_>,
    element_size: usize,
    kind: SerKind,
    field: &'static str,
) -> SerResult<usize> {
    let raw = read_u32(reader, kind, field)?;
    if raw > MAX_LENGTH_PREFIX {
        return Err(SerError::invalid_length(kind, field));
    }
    let len = raw as usize;
    if element_size != 0 && len.saturating_mul(element_size) > reader.remaining() {
        return Err(SerError::invalid_length(kind, field));
    }
    Ok(len)
}

/// Writes a little-endian `u32`.
pub fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Writes a little-endian `u64`.
pub fn write_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Writes a `u32` length prefix.
pub fn write_length_prefix(out: &mut Vec<u8>, len: usize) {
    write_u32(out, len as u32);
}
