//! Conversion between raw PLC bytes and typed numeric values.
//!
//! MELSEC controllers store each 16-bit word little-endian, and multi-word
//! values with the low word first. Other devices (or other firmware
//! settings) order the words differently. [`DataFormat`] names the four
//! possible layouts using ABCD notation, where `A` is the most significant
//! byte of a 32-bit value:
//!
//! | Format | `0x12345678` on the wire |
//! |--------|--------------------------|
//! | `ABCD` | `12 34 56 78` |
//! | `BADC` | `34 12 78 56` |
//! | `CDAB` | `56 78 12 34` |
//! | `DCBA` | `78 56 34 12` (MELSEC native) |
//!
//! 16-bit values always use the native little-endian word layout; the data
//! format only reorders bytes of 32 and 64-bit values.
//!
//! # Example
//!
//! ```
//! use melsec_mc::{ByteTransform, DataFormat, RegularByteTransform};
//!
//! let transform = RegularByteTransform::new(DataFormat::ABCD);
//! assert_eq!(transform.bytes_from_i32(0x12345678), [0x12, 0x34, 0x56, 0x78]);
//! assert_eq!(transform.to_i32([0x12, 0x34, 0x56, 0x78]), 0x12345678);
//! ```

use std::fmt;

/// Byte/word order of multi-word values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataFormat {
    /// Big-endian: most significant byte first.
    ABCD,
    /// Bytes swapped within each word, words big-endian.
    BADC,
    /// Words little-endian, bytes big-endian within each word.
    CDAB,
    /// Little-endian: least significant byte first. MELSEC native order.
    #[default]
    DCBA,
}

impl DataFormat {
    /// Reorders a 4-byte group between this format and little-endian.
    ///
    /// Every reordering is its own inverse, so the same call converts in
    /// both directions.
    pub fn reorder4(self, b: [u8; 4]) -> [u8; 4] {
        match self {
            DataFormat::ABCD => [b[3], b[2], b[1], b[0]],
            DataFormat::BADC => [b[2], b[3], b[0], b[1]],
            DataFormat::CDAB => [b[1], b[0], b[3], b[2]],
            DataFormat::DCBA => b,
        }
    }

    /// Reorders an 8-byte group between this format and little-endian.
    pub fn reorder8(self, b: [u8; 8]) -> [u8; 8] {
        match self {
            DataFormat::ABCD => [b[7], b[6], b[5], b[4], b[3], b[2], b[1], b[0]],
            DataFormat::BADC => [b[6], b[7], b[4], b[5], b[2], b[3], b[0], b[1]],
            DataFormat::CDAB => [b[1], b[0], b[3], b[2], b[5], b[4], b[7], b[6]],
            DataFormat::DCBA => b,
        }
    }

    /// Parses the four-letter notation, case-insensitive.
    ///
    /// ```
    /// use melsec_mc::DataFormat;
    ///
    /// assert_eq!(DataFormat::parse("cdab"), Some(DataFormat::CDAB));
    /// assert_eq!(DataFormat::parse("ABDC"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ABCD" => Some(DataFormat::ABCD),
            "BADC" => Some(DataFormat::BADC),
            "CDAB" => Some(DataFormat::CDAB),
            "DCBA" => Some(DataFormat::DCBA),
            _ => None,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataFormat::ABCD => "ABCD",
            DataFormat::BADC => "BADC",
            DataFormat::CDAB => "CDAB",
            DataFormat::DCBA => "DCBA",
        };
        f.write_str(name)
    }
}

/// Pluggable conversion between raw bytes and typed values.
///
/// Implementors only choose a [`DataFormat`]; every conversion is provided
/// on top of it. A transform may override [`reorder4`](Self::reorder4) or
/// [`reorder8`](Self::reorder8) for layouts the four formats do not cover.
pub trait ByteTransform: Send + Sync + fmt::Debug {
    /// Word order applied to 32 and 64-bit values.
    fn data_format(&self) -> DataFormat;

    /// Converts a 4-byte group between device order and little-endian.
    fn reorder4(&self, bytes: [u8; 4]) -> [u8; 4] {
        self.data_format().reorder4(bytes)
    }

    /// Converts an 8-byte group between device order and little-endian.
    fn reorder8(&self, bytes: [u8; 8]) -> [u8; 8] {
        self.data_format().reorder8(bytes)
    }

    /// Decodes an `i16`.
    fn to_i16(&self, bytes: [u8; 2]) -> i16 {
        i16::from_le_bytes(bytes)
    }

    /// Decodes a `u16`.
    fn to_u16(&self, bytes: [u8; 2]) -> u16 {
        u16::from_le_bytes(bytes)
    }

    /// Decodes an `i32`.
    fn to_i32(&self, bytes: [u8; 4]) -> i32 {
        i32::from_le_bytes(self.reorder4(bytes))
    }

    /// Decodes a `u32`.
    fn to_u32(&self, bytes: [u8; 4]) -> u32 {
        u32::from_le_bytes(self.reorder4(bytes))
    }

    /// Decodes an `f32`.
    fn to_f32(&self, bytes: [u8; 4]) -> f32 {
        f32::from_le_bytes(self.reorder4(bytes))
    }

    /// Decodes an `i64`.
    fn to_i64(&self, bytes: [u8; 8]) -> i64 {
        i64::from_le_bytes(self.reorder8(bytes))
    }

    /// Decodes a `u64`.
    fn to_u64(&self, bytes: [u8; 8]) -> u64 {
        u64::from_le_bytes(self.reorder8(bytes))
    }

    /// Decodes an `f64`.
    fn to_f64(&self, bytes: [u8; 8]) -> f64 {
        f64::from_le_bytes(self.reorder8(bytes))
    }

    /// Encodes an `i16`.
    fn bytes_from_i16(&self, value: i16) -> [u8; 2] {
        value.to_le_bytes()
    }

    /// Encodes a `u16`.
    fn bytes_from_u16(&self, value: u16) -> [u8; 2] {
        value.to_le_bytes()
    }

    /// Encodes an `i32`.
    fn bytes_from_i32(&self, value: i32) -> [u8; 4] {
        self.reorder4(value.to_le_bytes())
    }

    /// Encodes a `u32`.
    fn bytes_from_u32(&self, value: u32) -> [u8; 4] {
        self.reorder4(value.to_le_bytes())
    }

    /// Encodes an `f32`.
    fn bytes_from_f32(&self, value: f32) -> [u8; 4] {
        self.reorder4(value.to_le_bytes())
    }

    /// Encodes an `i64`.
    fn bytes_from_i64(&self, value: i64) -> [u8; 8] {
        self.reorder8(value.to_le_bytes())
    }

    /// Encodes a `u64`.
    fn bytes_from_u64(&self, value: u64) -> [u8; 8] {
        self.reorder8(value.to_le_bytes())
    }

    /// Encodes an `f64`.
    fn bytes_from_f64(&self, value: f64) -> [u8; 8] {
        self.reorder8(value.to_le_bytes())
    }
}

/// The standard transform: a fixed [`DataFormat`], DCBA unless configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegularByteTransform {
    format: DataFormat,
}

impl RegularByteTransform {
    /// Creates a transform using the given word order.
    pub fn new(format: DataFormat) -> Self {
        Self { format }
    }
}

impl ByteTransform for RegularByteTransform {
    fn data_format(&self) -> DataFormat {
        self.format
    }
}

/// Splits `data` into fixed-size groups, ignoring a trailing partial group.
pub(crate) fn chunks<const N: usize>(data: &[u8]) -> impl Iterator<Item = [u8; N]> + '_ {
    data.chunks_exact(N).map(|chunk| {
        let mut group = [0u8; N];
        group.copy_from_slice(chunk);
        group
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DataFormat; 4] = [
        DataFormat::ABCD,
        DataFormat::BADC,
        DataFormat::CDAB,
        DataFormat::DCBA,
    ];

    #[test]
    fn test_wire_layout_32() {
        let value = 0x12345678u32;
        let expected = [
            (DataFormat::ABCD, [0x12, 0x34, 0x56, 0x78]),
            (DataFormat::BADC, [0x34, 0x12, 0x78, 0x56]),
            (DataFormat::CDAB, [0x56, 0x78, 0x12, 0x34]),
            (DataFormat::DCBA, [0x78, 0x56, 0x34, 0x12]),
        ];
        for (format, wire) in expected {
            let transform = RegularByteTransform::new(format);
            assert_eq!(transform.bytes_from_u32(value), wire, "{format}");
            assert_eq!(transform.to_u32(wire), value, "{format}");
        }
    }

    #[test]
    fn test_wire_layout_64() {
        let value = 0x0102030405060708u64;
        let abcd = RegularByteTransform::new(DataFormat::ABCD);
        assert_eq!(
            abcd.bytes_from_u64(value),
            [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
        );
        let cdab = RegularByteTransform::new(DataFormat::CDAB);
        assert_eq!(
            cdab.bytes_from_u64(value),
            [0x07, 0x08, 0x05, 0x06, 0x03, 0x04, 0x01, 0x02]
        );
        let badc = RegularByteTransform::new(DataFormat::BADC);
        assert_eq!(
            badc.bytes_from_u64(value),
            [0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07]
        );
    }

    #[test]
    fn test_reorder_is_involution() {
        let four = [1, 2, 3, 4];
        let eight = [1, 2, 3, 4, 5, 6, 7, 8];
        for format in ALL {
            assert_eq!(format.reorder4(format.reorder4(four)), four);
            assert_eq!(format.reorder8(format.reorder8(eight)), eight);
        }
    }

    #[test]
    fn test_sixteen_bit_ignores_format() {
        for format in ALL {
            let transform = RegularByteTransform::new(format);
            assert_eq!(transform.bytes_from_i16(-2), [0xFE, 0xFF]);
            assert_eq!(transform.to_u16([0x34, 0x12]), 0x1234);
        }
    }

    #[test]
    fn test_floats() {
        let transform = RegularByteTransform::default();
        let bytes = transform.bytes_from_f32(3.5);
        assert_eq!(transform.to_f32(bytes), 3.5);
        let bytes = transform.bytes_from_f64(-1.25);
        assert_eq!(transform.to_f64(bytes), -1.25);
    }

    #[test]
    fn test_default_is_dcba() {
        assert_eq!(RegularByteTransform::default().data_format(), DataFormat::DCBA);
    }

    #[test]
    fn test_parse_and_display() {
        for format in ALL {
            assert_eq!(DataFormat::parse(&format.to_string()), Some(format));
        }
        assert_eq!(DataFormat::parse(""), None);
    }

    #[test]
    fn test_chunks_drops_partial_group() {
        let groups: Vec<[u8; 2]> = chunks(&[1, 2, 3, 4, 5]).collect();
        assert_eq!(groups, vec![[1, 2], [3, 4]]);
    }
}
