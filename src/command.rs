//! MC core commands and their binary/ASCII encodings.
//!
//! A core command describes one operation (what to read or write, where,
//! and how much) before it is wrapped in the envelope by
//! [`Route::pack`](crate::Route::pack). Each command renders itself in both
//! wire formats through the [`McCommand`] trait.
//!
//! ## Device access
//! - [`ReadCommand`] - batch read in word or bit units
//! - [`WriteWordCommand`] - batch write in word units
//! - [`WriteBitCommand`] - batch write in bit units
//!
//! ## CPU control
//! - [`RemoteCommand`] - remote RUN / STOP / RESET
//! - [`ReadPlcTypeCommand`] - read the CPU model name
//!
//! # Example
//!
//! ```
//! use melsec_mc::{McAddress, McCommand, MelsecDevice, ReadCommand};
//!
//! let address = McAddress::new(MelsecDevice::D, 100);
//! let cmd = ReadCommand::words(address, 10).unwrap();
//! assert_eq!(
//!     cmd.to_binary(),
//!     [0x01, 0x04, 0x00, 0x00, 0x64, 0x00, 0x00, 0xA8, 0x0A, 0x00]
//! );
//! assert_eq!(cmd.to_ascii(), b"04010000D*000100000A".to_vec());
//! ```

use crate::device::{McAddress, McDevice};
use crate::error::{McError, Result};
use crate::header::FrameFormat;
use crate::utils::{pack_bits, push_hex, push_offset};

/// Maximum words per read request in binary mode.
pub const MAX_BINARY_READ_WORDS: u16 = 900;

/// Maximum words per read request in ASCII mode.
pub const MAX_ASCII_READ_WORDS: u16 = 450;

/// Maximum words in one write request.
pub const MAX_WRITE_WORDS: usize = 960;

/// Maximum points in one bit write request.
pub const MAX_WRITE_BITS: usize = 7168;

const READ_COMMAND: [u8; 2] = [0x01, 0x04];
const WRITE_COMMAND: [u8; 2] = [0x01, 0x14];

/// A core command renderable in both wire formats.
pub trait McCommand {
    /// Binary core bytes.
    fn to_binary(&self) -> Vec<u8>;

    /// ASCII core bytes.
    fn to_ascii(&self) -> Vec<u8>;

    /// Core bytes in the requested format.
    fn encode(&self, format: FrameFormat) -> Vec<u8> {
        match format {
            FrameFormat::Binary => self.to_binary(),
            FrameFormat::Ascii => self.to_ascii(),
        }
    }
}

/// Appends the binary device field: 3-byte LE offset and device code.
fn push_binary_device<D: McDevice>(out: &mut Vec<u8>, address: &McAddress<D>) {
    let offset = address.offset.to_le_bytes();
    out.extend_from_slice(&offset[..3]);
    out.push(address.device.binary_code());
}

/// Appends the ASCII device field: 2-char device code and 6-char offset.
fn push_ascii_device<D: McDevice>(out: &mut Vec<u8>, address: &McAddress<D>) {
    out.extend_from_slice(address.device.ascii_code().as_bytes());
    push_offset(out, address.offset, address.device.base());
}

fn check_address<D: McDevice>(address: &McAddress<D>) -> Result<()> {
    if address.offset > address.device.max_offset() {
        return Err(McError::invalid_parameter(
            "address",
            format!("offset {} exceeds {}", address.offset, address.device.max_offset()),
        ));
    }
    Ok(())
}

/// Batch read in word or bit units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCommand<D> {
    address: McAddress<D>,
    length: u16,
    bit: bool,
}

impl<D: McDevice> ReadCommand<D> {
    /// Creates a read command.
    ///
    /// `length` counts words when `bit` is false and points when it is true.
    ///
    /// # Errors
    ///
    /// Returns an error if `length` is zero or the offset is out of range.
    pub fn new(address: McAddress<D>, length: u16, bit: bool) -> Result<Self> {
        if length == 0 {
            return Err(McError::invalid_parameter("length", "must be greater than 0"));
        }
        check_address(&address)?;
        Ok(Self {
            address,
            length,
            bit,
        })
    }

    /// Read `length` words.
    pub fn words(address: McAddress<D>, length: u16) -> Result<Self> {
        Self::new(address, length, false)
    }

    /// Read `length` points.
    pub fn bits(address: McAddress<D>, length: u16) -> Result<Self> {
        Self::new(address, length, true)
    }

    /// Start address.
    pub fn address(&self) -> McAddress<D> {
        self.address
    }

    /// Requested words or points.
    pub fn length(&self) -> u16 {
        self.length
    }

    /// Whether this is a bit-unit read.
    pub fn is_bit(&self) -> bool {
        self.bit
    }
}

impl<D: McDevice> McCommand for ReadCommand<D> {
    fn to_binary(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(10);
        out.extend_from_slice(&READ_COMMAND);
        out.extend_from_slice(&[u8::from(self.bit), 0x00]);
        push_binary_device(&mut out, &self.address);
        out.extend_from_slice(&self.length.to_le_bytes());
        out
    }

    fn to_ascii(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(20);
        out.extend_from_slice(b"0401");
        out.extend_from_slice(if self.bit { b"0001" } else { b"0000" });
        push_ascii_device(&mut out, &self.address);
        push_hex(&mut out, self.length.into(), 4);
        out
    }
}

/// Batch write in word units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteWordCommand<D> {
    address: McAddress<D>,
    payload: Vec<u8>,
}

impl<D: McDevice> WriteWordCommand<D> {
    /// Creates a word write. `payload` holds little-endian words.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is empty, has odd length, or exceeds
    /// [`MAX_WRITE_WORDS`] words.
    pub fn new(address: McAddress<D>, payload: &[u8]) -> Result<Self> {
        if payload.is_empty() {
            return Err(McError::invalid_parameter("value", "must not be empty"));
        }
        if payload.len() % 2 != 0 {
            return Err(McError::invalid_parameter(
                "value",
                "length must be a whole number of words",
            ));
        }
        if payload.len() / 2 > MAX_WRITE_WORDS {
            return Err(McError::invalid_parameter(
                "value",
                format!("at most {MAX_WRITE_WORDS} words per write"),
            ));
        }
        check_address(&address)?;
        Ok(Self {
            address,
            payload: payload.to_vec(),
        })
    }

    /// Number of words written.
    pub fn word_count(&self) -> u16 {
        (self.payload.len() / 2) as u16
    }
}

impl<D: McDevice> McCommand for WriteWordCommand<D> {
    fn to_binary(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(10 + self.payload.len());
        out.extend_from_slice(&WRITE_COMMAND);
        out.extend_from_slice(&[0x00, 0x00]);
        push_binary_device(&mut out, &self.address);
        out.extend_from_slice(&self.word_count().to_le_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    fn to_ascii(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(20 + self.payload.len() * 2);
        out.extend_from_slice(b"1401");
        out.extend_from_slice(b"0000");
        push_ascii_device(&mut out, &self.address);
        push_hex(&mut out, self.word_count().into(), 4);
        for word in self.payload.chunks_exact(2) {
            push_hex(&mut out, u16::from_le_bytes([word[0], word[1]]).into(), 4);
        }
        out
    }
}

/// Batch write in bit units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBitCommand<D> {
    address: McAddress<D>,
    values: Vec<bool>,
}

impl<D: McDevice> WriteBitCommand<D> {
    /// Creates a bit write.
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is empty or longer than [`MAX_WRITE_BITS`].
    pub fn new(address: McAddress<D>, values: &[bool]) -> Result<Self> {
        if values.is_empty() {
            return Err(McError::invalid_parameter("value", "must not be empty"));
        }
        if values.len() > MAX_WRITE_BITS {
            return Err(McError::invalid_parameter(
                "value",
                format!("at most {MAX_WRITE_BITS} points per write"),
            ));
        }
        check_address(&address)?;
        Ok(Self {
            address,
            values: values.to_vec(),
        })
    }

    /// Number of points written.
    pub fn point_count(&self) -> u16 {
        self.values.len() as u16
    }
}

impl<D: McDevice> McCommand for WriteBitCommand<D> {
    fn to_binary(&self) -> Vec<u8> {
        let packed = pack_bits(&self.values);
        let mut out = Vec::with_capacity(10 + packed.len());
        out.extend_from_slice(&WRITE_COMMAND);
        out.extend_from_slice(&[0x01, 0x00]);
        push_binary_device(&mut out, &self.address);
        // Declared length is the point count, not the packed byte count.
        out.extend_from_slice(&self.point_count().to_le_bytes());
        out.extend_from_slice(&packed);
        out
    }

    fn to_ascii(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(20 + self.values.len());
        out.extend_from_slice(b"1401");
        out.extend_from_slice(b"0001");
        push_ascii_device(&mut out, &self.address);
        push_hex(&mut out, self.point_count().into(), 4);
        out.extend(self.values.iter().map(|v| if *v { b'1' } else { b'0' }));
        out
    }
}

/// Remote operation on the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteCommand {
    /// Remote RUN.
    Run,
    /// Remote STOP.
    Stop,
    /// Remote RESET.
    Reset,
}

impl McCommand for RemoteCommand {
    fn to_binary(&self) -> Vec<u8> {
        match self {
            RemoteCommand::Run => vec![0x01, 0x10, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00],
            RemoteCommand::Stop => vec![0x02, 0x10, 0x00, 0x00, 0x01, 0x00],
            RemoteCommand::Reset => vec![0x06, 0x10, 0x00, 0x00, 0x01, 0x00],
        }
    }

    fn to_ascii(&self) -> Vec<u8> {
        match self {
            RemoteCommand::Run => b"1001000000010000".to_vec(),
            RemoteCommand::Stop => b"100200000001".to_vec(),
            RemoteCommand::Reset => b"100600000001".to_vec(),
        }
    }
}

/// Reads the CPU model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadPlcTypeCommand;

impl McCommand for ReadPlcTypeCommand {
    fn to_binary(&self) -> Vec<u8> {
        vec![0x01, 0x01, 0x00, 0x00]
    }

    fn to_ascii(&self) -> Vec<u8> {
        b"01010000".to_vec()
    }
}
