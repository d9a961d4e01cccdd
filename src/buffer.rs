//! Fixed-capacity, lock-protected byte buffer with bit and typed accessors.
//!
//! [`ScratchBuffer`] stages device values in process memory. Writes that run
//! past the end are clamped (out-of-range bits are ignored, byte copies are
//! truncated), while bit reads outside the buffer fail with
//! [`McError::OutOfBounds`]. Callers rely on that asymmetry, so writes never
//! report range errors.
//!
//! # Example
//!
//! ```
//! use melsec_mc::ScratchBuffer;
//!
//! let buffer = ScratchBuffer::new(16);
//! buffer.set_f32(2, 25.5);
//! assert_eq!(buffer.get_f32(2), 25.5);
//!
//! buffer.set_bool(true, 5);
//! assert!(buffer.get_bool(5).unwrap());
//! assert!(buffer.get_bool(200).is_err());
//! ```

use crate::error::{McError, Result};
use crate::lock::HybridLock;
use crate::transform::{chunks, ByteTransform, DataFormat, RegularByteTransform};

/// Capacity used by [`ScratchBuffer::default`].
pub const DEFAULT_CAPACITY: usize = 10;

const OR_MASK: [u8; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];
const AND_MASK: [u8; 8] = [0xFE, 0xFD, 0xFB, 0xF7, 0xEF, 0xDF, 0xBF, 0x7F];

/// A composite record that knows its own byte layout.
///
/// Used with [`ScratchBuffer::get_custom`] and [`ScratchBuffer::set_custom`]
/// to layer structured data over a raw buffer.
///
/// # Example
///
/// ```
/// use melsec_mc::{DataTransfer, ScratchBuffer};
///
/// #[derive(Debug, PartialEq)]
/// struct Setpoint {
///     target: u16,
///     ramp: u16,
/// }
///
/// impl DataTransfer for Setpoint {
///     const READ_COUNT: usize = 4;
///
///     fn from_source(content: &[u8]) -> Self {
///         Setpoint {
///             target: u16::from_le_bytes([content[0], content[1]]),
///             ramp: u16::from_le_bytes([content[2], content[3]]),
///         }
///     }
///
///     fn to_source(&self) -> Vec<u8> {
///         let mut bytes = self.target.to_le_bytes().to_vec();
///         bytes.extend_from_slice(&self.ramp.to_le_bytes());
///         bytes
///     }
/// }
///
/// let buffer = ScratchBuffer::new(8);
/// buffer.set_custom(&Setpoint { target: 300, ramp: 5 }, 2);
/// assert_eq!(buffer.get_custom::<Setpoint>(2), Setpoint { target: 300, ramp: 5 });
/// ```
pub trait DataTransfer: Sized {
    /// Number of bytes the record occupies in the buffer.
    const READ_COUNT: usize;

    /// Builds the record from exactly [`READ_COUNT`](Self::READ_COUNT) bytes.
    fn from_source(content: &[u8]) -> Self;

    /// Serializes the record.
    fn to_source(&self) -> Vec<u8>;
}

#[derive(Debug)]
struct BufferState {
    bytes: Vec<u8>,
    transform: Box<dyn ByteTransform>,
}

impl BufferState {
    fn read_bytes(&self, index: usize, length: usize) -> Vec<u8> {
        let mut result = vec![0u8; length];
        if let Some(end) = index.checked_add(length) {
            if end <= self.bytes.len() {
                result.copy_from_slice(&self.bytes[index..end]);
            }
        }
        result
    }

    fn write_bytes(&mut self, data: &[u8], dest_index: usize) {
        if dest_index >= self.bytes.len() {
            return;
        }
        let count = data.len().min(self.bytes.len() - dest_index);
        self.bytes[dest_index..dest_index + count].copy_from_slice(&data[..count]);
    }

    fn write_bit(&mut self, bit_index: usize, value: bool) {
        let offset = bit_index % 8;
        if let Some(byte) = self.bytes.get_mut(bit_index / 8) {
            if value {
                *byte |= OR_MASK[offset];
            } else {
                *byte &= AND_MASK[offset];
            }
        }
    }

    fn read_bit(&self, bit_index: usize) -> Result<bool> {
        let offset = bit_index % 8;
        self.bytes
            .get(bit_index / 8)
            .map(|byte| byte & OR_MASK[offset] == OR_MASK[offset])
            .ok_or_else(|| McError::out_of_bounds(bit_index, self.bytes.len() * 8))
    }
}

/// Fixed-capacity byte buffer guarded by a single [`HybridLock`].
///
/// Every public method takes the lock exactly once, so each call is atomic
/// with respect to other threads using the same buffer.
#[derive(Debug)]
pub struct ScratchBuffer {
    state: HybridLock<BufferState>,
    capacity: usize,
}

impl Default for ScratchBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

macro_rules! typed_access {
    ($ty:ty, $size:literal, $to:ident, $from:ident, $get:ident, $get_array:ident, $set:ident, $set_array:ident) => {
        #[doc = concat!("Reads a `", stringify!($ty), "` at byte `index`; zero when out of range.")]
        pub fn $get(&self, index: usize) -> $ty {
            self.state.with(|state| {
                let raw = state.read_bytes(index, $size);
                let mut group = [0u8; $size];
                group.copy_from_slice(&raw);
                state.transform.$to(group)
            })
        }

        #[doc = concat!("Reads `length` consecutive `", stringify!($ty), "` values starting at byte `index`.")]
        pub fn $get_array(&self, index: usize, length: usize) -> Vec<$ty> {
            self.state.with(|state| {
                let raw = state.read_bytes(index, length.saturating_mul($size));
                chunks::<$size>(&raw).map(|group| state.transform.$to(group)).collect()
            })
        }

        #[doc = concat!("Writes a `", stringify!($ty), "` at byte `index`, truncated at the end of the buffer.")]
        pub fn $set(&self, index: usize, value: $ty) {
            self.state.with(|state| {
                let raw = state.transform.$from(value);
                state.write_bytes(&raw, index);
            })
        }

        #[doc = concat!("Writes consecutive `", stringify!($ty), "` values starting at byte `index`.")]
        pub fn $set_array(&self, index: usize, values: &[$ty]) {
            self.state.with(|state| {
                let raw: Vec<u8> = values
                    .iter()
                    .flat_map(|value| state.transform.$from(*value))
                    .collect();
                state.write_bytes(&raw, index);
            })
        }
    };
}

impl ScratchBuffer {
    /// Creates a zeroed buffer using the default DCBA transform.
    pub fn new(capacity: usize) -> Self {
        Self::with_transform(capacity, Box::new(RegularByteTransform::default()))
    }

    /// Creates a zeroed buffer using a custom byte transform.
    pub fn with_transform(capacity: usize, transform: Box<dyn ByteTransform>) -> Self {
        Self {
            state: HybridLock::new(BufferState {
                bytes: vec![0u8; capacity],
                transform,
            }),
            capacity,
        }
    }

    /// Returns the fixed capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Replaces the byte transform used by the typed accessors.
    pub fn set_transform(&self, transform: Box<dyn ByteTransform>) {
        self.state.with(|state| state.transform = transform);
    }

    /// Returns the word order of the active transform.
    pub fn data_format(&self) -> DataFormat {
        self.state.with(|state| state.transform.data_format())
    }

    /// Sets or clears one bit. Indices past the end are ignored.
    pub fn set_bool(&self, value: bool, bit_index: usize) {
        self.state.with(|state| state.write_bit(bit_index, value));
    }

    /// Sets consecutive bits starting at `bit_index`, ignoring any that fall
    /// past the end.
    pub fn set_bools(&self, values: &[bool], bit_index: usize) {
        self.state.with(|state| {
            for (i, value) in values.iter().enumerate() {
                match bit_index.checked_add(i) {
                    Some(bit) => state.write_bit(bit, *value),
                    None => break,
                }
            }
        });
    }

    /// Reads one bit.
    ///
    /// # Errors
    ///
    /// Returns [`McError::OutOfBounds`] if the bit lies past the end of the buffer.
    pub fn get_bool(&self, bit_index: usize) -> Result<bool> {
        self.state.with(|state| state.read_bit(bit_index))
    }

    /// Reads `length` consecutive bits.
    ///
    /// # Errors
    ///
    /// Returns [`McError::OutOfBounds`] if any requested bit lies past the end.
    pub fn get_bools(&self, bit_index: usize, length: usize) -> Result<Vec<bool>> {
        self.state.with(|state| {
            (0..length)
                .map(|i| {
                    let bit = bit_index
                        .checked_add(i)
                        .ok_or_else(|| McError::out_of_bounds(usize::MAX, state.bytes.len() * 8))?;
                    state.read_bit(bit)
                })
                .collect()
        })
    }

    /// Copies `data` into the buffer at `dest_index`, truncating at capacity.
    pub fn set_bytes(&self, data: &[u8], dest_index: usize) {
        self.state.with(|state| state.write_bytes(data, dest_index));
    }

    /// Copies `length` bytes of `data` starting at `source_index` into the
    /// buffer at `dest_index`. Both ends are clamped.
    pub fn set_bytes_from(&self, data: &[u8], source_index: usize, dest_index: usize, length: usize) {
        let Some(source) = data.get(source_index..) else {
            return;
        };
        let count = length.min(source.len());
        self.state.with(|state| state.write_bytes(&source[..count], dest_index));
    }

    /// Returns `length` bytes starting at `index`.
    ///
    /// When the range does not fit inside the buffer the result is `length`
    /// zero bytes.
    pub fn get_bytes(&self, index: usize, length: usize) -> Vec<u8> {
        self.state.with(|state| state.read_bytes(index, length))
    }

    /// Returns a copy of the whole buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        self.state.with(|state| state.bytes.clone())
    }

    /// Reads one byte; zero when out of range.
    pub fn get_byte(&self, index: usize) -> u8 {
        self.state
            .with(|state| state.bytes.get(index).copied().unwrap_or_default())
    }

    /// Writes one byte; ignored when out of range.
    pub fn set_byte(&self, index: usize, value: u8) {
        self.state.with(|state| state.write_bytes(&[value], index));
    }

    typed_access!(i16, 2, to_i16, bytes_from_i16, get_i16, get_i16_array, set_i16, set_i16_array);
    typed_access!(u16, 2, to_u16, bytes_from_u16, get_u16, get_u16_array, set_u16, set_u16_array);
    typed_access!(i32, 4, to_i32, bytes_from_i32, get_i32, get_i32_array, set_i32, set_i32_array);
    typed_access!(u32, 4, to_u32, bytes_from_u32, get_u32, get_u32_array, set_u32, set_u32_array);
    typed_access!(i64, 8, to_i64, bytes_from_i64, get_i64, get_i64_array, set_i64, set_i64_array);
    typed_access!(u64, 8, to_u64, bytes_from_u64, get_u64, get_u64_array, set_u64, set_u64_array);
    typed_access!(f32, 4, to_f32, bytes_from_f32, get_f32, get_f32_array, set_f32, set_f32_array);
    typed_access!(f64, 8, to_f64, bytes_from_f64, get_f64, get_f64_array, set_f64, set_f64_array);

    /// Reads a custom record starting at byte `index`.
    pub fn get_custom<T: DataTransfer>(&self, index: usize) -> T {
        let content = self.get_bytes(index, T::READ_COUNT);
        T::from_source(&content)
    }

    /// Writes a custom record starting at byte `index`, truncated at capacity.
    pub fn set_custom<T: DataTransfer>(&self, value: &T, index: usize) {
        let content = value.to_source();
        self.set_bytes(&content, index);
    }
}
