//! QnA 3E envelope and request routing.
//!
//! Every core command is wrapped in a fixed envelope before it is sent. The
//! envelope carries the route to the target station and the length of the
//! remainder of the frame.
//!
//! # Binary envelope (11 bytes)
//!
//! | Byte | Field | Value |
//! |------|-------|-------|
//! | 0-1 | Subheader | `50 00` |
//! | 2 | Network number | route |
//! | 3 | PLC number | `FF` |
//! | 4-5 | Module I/O number | `FF 03` |
//! | 6 | Station number | route |
//! | 7-8 | Request length (LE) | bytes after this field |
//! | 9-10 | CPU monitor timer (LE) | `0A 00` |
//!
//! # ASCII envelope (22 characters)
//!
//! The same fields rendered as uppercase hex text:
//! `"5000"`, network (2), `"FF"`, `"03FF"`, station (2), length (4), `"0010"`.
//!
//! # Example
//!
//! ```
//! use melsec_mc::{FrameFormat, Route};
//!
//! let frame = Route::default().pack(&[], FrameFormat::Binary);
//! assert_eq!(frame, [0x50, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x02, 0x00, 0x0A, 0x00]);
//!
//! let frame = Route::new(0x01, 0x02).pack(b"0401", FrameFormat::Ascii);
//! assert_eq!(frame, b"500001FF03FF02000800100401".to_vec());
//! ```

use std::fmt;

use crate::utils::push_hex;

/// Binary envelope size in bytes.
pub const BINARY_HEADER_SIZE: usize = 11;

/// ASCII envelope size in characters.
pub const ASCII_HEADER_SIZE: usize = 22;

/// Wire encoding of MC frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameFormat {
    /// Binary codes.
    #[default]
    Binary,
    /// ASCII codes, every field rendered as hex text.
    Ascii,
}

impl FrameFormat {
    /// Envelope size for this format.
    pub fn header_size(self) -> usize {
        match self {
            FrameFormat::Binary => BINARY_HEADER_SIZE,
            FrameFormat::Ascii => ASCII_HEADER_SIZE,
        }
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameFormat::Binary => write!(f, "binary"),
            FrameFormat::Ascii => write!(f, "ascii"),
        }
    }
}

/// Network and station the request is routed to.
///
/// Both default to `0x00`, which addresses the directly connected CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Route {
    /// Network number.
    pub network: u8,
    /// Station number within the network.
    pub station: u8,
}

impl Route {
    /// Creates a route.
    pub fn new(network: u8, station: u8) -> Self {
        Self { network, station }
    }

    /// Wraps `core` in the envelope for `format`.
    pub fn pack(&self, core: &[u8], format: FrameFormat) -> Vec<u8> {
        match format {
            FrameFormat::Binary => self.pack_binary(core),
            FrameFormat::Ascii => self.pack_ascii(core),
        }
    }

    /// Wraps a binary core command.
    ///
    /// The length field counts the monitor timer plus the core, i.e. the
    /// total frame length minus 9.
    pub fn pack_binary(&self, core: &[u8]) -> Vec<u8> {
        let length = (core.len() + BINARY_HEADER_SIZE - 9) as u16;
        let mut frame = Vec::with_capacity(BINARY_HEADER_SIZE + core.len());
        frame.extend_from_slice(&[0x50, 0x00, self.network, 0xFF, 0xFF, 0x03, self.station]);
        frame.extend_from_slice(&length.to_le_bytes());
        frame.extend_from_slice(&[0x0A, 0x00]);
        frame.extend_from_slice(core);
        frame
    }

    /// Wraps an ASCII core command.
    ///
    /// The length field counts the monitor timer plus the core, i.e. the
    /// total frame length minus 18.
    pub fn pack_ascii(&self, core: &[u8]) -> Vec<u8> {
        let length = (core.len() + ASCII_HEADER_SIZE - 18) as u32;
        let mut frame = Vec::with_capacity(ASCII_HEADER_SIZE + core.len());
        frame.extend_from_slice(b"5000");
        push_hex(&mut frame, self.network.into(), 2);
        frame.extend_from_slice(b"FF03FF");
        push_hex(&mut frame, self.station.into(), 2);
        push_hex(&mut frame, length, 4);
        frame.extend_from_slice(b"0010");
        frame.extend_from_slice(core);
        frame
    }
}
