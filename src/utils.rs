//! Bit packing and hex-ASCII field helpers shared by the frame codec.
//!
//! # Example
//!
//! ```
//! use melsec_mc::utils::{pack_bits, unpack_bits};
//!
//! // Two points per byte: the first in the high nibble, the second in the low.
//! assert_eq!(pack_bits(&[true, false, true]), vec![0x10, 0x10]);
//! assert_eq!(unpack_bits(&[0x11, 0x00], 4), vec![true, true, false, false]);
//! ```

use std::fmt::Write;

/// Packs points two per byte: `0x10` for the even point, `0x01` for the odd one.
///
/// The output has `ceil(bits.len() / 2)` bytes; an odd-length input leaves
/// the low nibble of the last byte clear.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    bits.chunks(2)
        .map(|pair| {
            let high = if pair[0] { 0x10 } else { 0x00 };
            let low = match pair.get(1) {
                Some(true) => 0x01,
                _ => 0x00,
            };
            high | low
        })
        .collect()
}

/// Inverse of [`pack_bits`]: expands each byte into two points and keeps the
/// first `length`.
pub fn unpack_bits(data: &[u8], length: usize) -> Vec<bool> {
    data.iter()
        .flat_map(|byte| [byte & 0x10 == 0x10, byte & 0x01 == 0x01])
        .take(length)
        .collect()
}

/// Appends `value` as `width` uppercase hex digits (zero padded, truncated
/// to the low digits when wider).
pub(crate) fn push_hex(out: &mut Vec<u8>, value: u32, width: usize) {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    for shift in (0..width).rev() {
        let nibble = (value >> (shift * 4)) & 0x0F;
        out.push(DIGITS[nibble as usize]);
    }
}

/// Appends a device offset as six ASCII characters, decimal or hex
/// depending on the device base.
pub(crate) fn push_offset(out: &mut Vec<u8>, offset: u32, base: u32) {
    let text = if base == 16 {
        format!("{offset:06X}")
    } else {
        format!("{offset:06}")
    };
    out.extend_from_slice(text.as_bytes());
}

/// Parses ASCII hex digits (either case). Returns `None` for empty input,
/// non-hex characters, or values wider than 32 bits.
///
/// ```
/// use melsec_mc::utils::parse_hex;
///
/// assert_eq!(parse_hex(b"C051"), Some(0xC051));
/// assert_eq!(parse_hex(b"00g0"), None);
/// ```
pub fn parse_hex(text: &[u8]) -> Option<u32> {
    if text.is_empty() || text.len() > 8 {
        return None;
    }
    text.iter().try_fold(0u32, |acc, byte| {
        let digit = (*byte as char).to_digit(16)?;
        Some((acc << 4) | digit)
    })
}

/// Formats bytes as space-separated uppercase hex, for logging frames.
///
/// ```
/// use melsec_mc::utils::format_frame;
///
/// assert_eq!(format_frame(&[0x50, 0x00, 0xFF]), "50 00 FF");
/// ```
pub fn format_frame(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        let _ = write!(text, "{byte:02X}");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_bits_odd_length() {
        assert_eq!(pack_bits(&[true, false, true]), vec![0x10, 0x10]);
    }

    #[test]
    fn test_pack_bits_even_length() {
        assert_eq!(pack_bits(&[true, true, false, true]), vec![0x11, 0x01]);
        assert!(pack_bits(&[]).is_empty());
    }

    #[test]
    fn test_unpack_bits() {
        assert_eq!(
            unpack_bits(&[0x11, 0x00], 4),
            vec![true, true, false, false]
        );
        assert_eq!(unpack_bits(&[0x10, 0x01], 3), vec![true, false, false]);
        assert_eq!(unpack_bits(&[0x01], 8), vec![false, true]);
    }

    #[test]
    fn test_push_hex() {
        let mut out = Vec::new();
        push_hex(&mut out, 0x1A, 2);
        push_hex(&mut out, 0x3F, 4);
        push_hex(&mut out, 0x12345, 4);
        assert_eq!(out, b"1A003F2345");
    }

    #[test]
    fn test_push_offset() {
        let mut out = Vec::new();
        push_offset(&mut out, 100, 10);
        push_offset(&mut out, 0x1A0, 16);
        assert_eq!(out, b"0001000001A0");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex(b"0000"), Some(0));
        assert_eq!(parse_hex(b"ffff"), Some(0xFFFF));
        assert_eq!(parse_hex(b""), None);
        assert_eq!(parse_hex(b"123456789"), None);
        assert_eq!(parse_hex(b"+1"), None);
    }

    #[test]
    fn test_format_frame() {
        assert_eq!(format_frame(&[]), "");
        assert_eq!(format_frame(&[0x0A]), "0A");
    }
}
