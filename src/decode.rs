//! Decoding raw byte ranges into endianness-aware representations
//!
//! Pure functions; no collaborator access. The string renderings always
//! preserve the stored byte order rather than reinterpreting the computed
//! integer.

use crate::core::types::{ByteBuffer, ByteOrder, ProbeError, ProbeResult};

/// Widest range for which full-integer values are still emitted.
///
/// Beyond this only the per-byte column dumps are produced; a 32-byte
/// "integer" has no single meaningful value to print.
pub const INLINE_VALUE_MAX: usize = 8;

/// A decoded byte range with both endianness interpretations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBytes {
    bytes: ByteBuffer,
    /// Big-endian integer value, when the range is small enough
    pub be_value: Option<u64>,
    /// Little-endian integer value, when the range is small enough
    pub le_value: Option<u64>,
}

impl DecodedBytes {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// `0xAC 0x10 0x43 0xB9`
    pub fn hex_string(&self) -> String {
        hex_string(self.bytes())
    }

    /// Each byte in decimal, column-aligned to width 4
    pub fn dec_string(&self) -> String {
        dec_string(self.bytes())
    }

    /// Each byte as eight binary digits
    pub fn bin_string(&self) -> String {
        bin_string(self.bytes())
    }
}

/// Decodes a captured byte range. Empty input is a `NoData` condition.
pub fn decode(buffer: &ByteBuffer) -> ProbeResult<DecodedBytes> {
    if buffer.is_empty() {
        return Err(ProbeError::NoData);
    }

    let (be_value, le_value) = if buffer.len() <= INLINE_VALUE_MAX {
        (
            Some(be_value(buffer.as_slice())),
            Some(le_value(buffer.as_slice())),
        )
    } else {
        (None, None)
    };

    Ok(DecodedBytes {
        bytes: buffer.clone(),
        be_value,
        le_value,
    })
}

/// Big-endian interpretation: byte[i] * 256^(size-1-i)
pub fn be_value(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Little-endian interpretation: byte[i] * 256^i
pub fn le_value(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | ((b as u64) << (8 * i)))
}

/// Encodes an integer back into `size` bytes in the given order.
pub fn to_bytes(value: u64, size: usize, order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(size);
    match order {
        ByteOrder::Big => {
            for i in (0..size).rev() {
                out.push((value >> (8 * i)) as u8);
            }
        }
        ByteOrder::Little => {
            for i in 0..size {
                out.push((value >> (8 * i)) as u8);
            }
        }
    }
    out
}

pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn dec_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:<4}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn bin_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:08b}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The four-line dump the memory commands print.
///
/// Integer lines are omitted for ranges above `INLINE_VALUE_MAX`.
pub fn dump_lines(decoded: &DecodedBytes) -> Vec<String> {
    let mut lines = vec![
        format!("Big-endian Hex string: {}", decoded.hex_string()),
        format!("Big-endian Dec string: {}", decoded.dec_string()),
    ];
    if let (Some(be), Some(le)) = (decoded.be_value, decoded.le_value) {
        lines.push(format!("Big-endian Decimal:    {be}"));
        lines.push(format!("Little-endian Decimal: {le}"));
    }
    lines
}
