//! # MELSEC MC Protocol Library
//!
//! A Rust library for communicating with Mitsubishi MELSEC and Keyence PLCs
//! using the MC protocol (QnA-compatible 3E frame) over TCP.
//!
//! Each call produces one request and one response, except long word reads,
//! which are split into several requests. No automatic retries, caching, or
//! reconnection.
//!
//! ## Features
//!
//! - **Two dialects** over one codec: [`Melsec`] and [`Keyence`] device tables
//! - **Binary and ASCII** frames, selected per client with [`FrameFormat`]
//! - **Typed access** with configurable word order ([`DataFormat`])
//! - **No panics** in library code; all errors returned as `Result<T, McError>`
//! - **Scratch primitives**: [`ScratchBuffer`], [`BoundedList`] and
//!   [`WrappingCounter`] for staging data between PLC reads
//!
//! ## Quick Start
//!
//! ```no_run
//! use melsec_mc::{ClientConfig, FrameFormat, MelsecMcClient};
//!
//! fn main() -> melsec_mc::Result<()> {
//!     let config = ClientConfig::new("192.168.1.10:6000".parse().unwrap())
//!         .with_format(FrameFormat::Binary);
//!     let client = MelsecMcClient::connect(config)?;
//!
//!     // 10 words from D100, little-endian bytes
//!     let data = client.read("D100", 10)?;
//!     println!("D100-D109: {:02X?}", data);
//!
//!     // Relays
//!     let bits = client.read_bool("M0", 16)?;
//!     client.write_bit("M0", !bits[0])?;
//!
//!     // Typed values
//!     client.write_f32("D200", 12.5)?;
//!     println!("CPU: {}", client.read_plc_type()?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Addresses
//!
//! Addresses are device prefix plus offset, e.g. `"D100"`, `"X1F"`,
//! `"ZR100000"`. Offsets of X, Y, B, W and ZR are hexadecimal in both
//! dialects; every other device is decimal. Prefixes are matched
//! case-insensitively, longest first.
//!
//! | Dialect | Devices |
//! |---------|---------|
//! | [`Melsec`] | X Y M L F V B S D W R Z ZR TN TS TC SN SS SC CN CS CC |
//! | [`Keyence`] | X Y B M L SM SD D R ZR W TN TS CN CS |
//!
//! ## Error Handling
//!
//! ```no_run
//! use melsec_mc::{ClientConfig, McError, MelsecMcClient};
//!
//! let client = MelsecMcClient::connect(ClientConfig::new(
//!     "192.168.1.10:6000".parse().unwrap(),
//! )).unwrap();
//!
//! match client.read("D100", 1) {
//!     Ok(data) => println!("{:?}", data),
//!     Err(McError::Timeout) => println!("no answer"),
//!     Err(McError::Device { code }) => println!("PLC end code 0x{code:04X}"),
//!     Err(e) => println!("error: {e}"),
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` per operation, `warn` when
//! the PLC answers with a nonzero end code and `trace` with the raw frames.
//! Install any subscriber to see them.

mod buffer;
mod client;
mod command;
mod counter;
mod device;
mod dialect;
mod error;
mod header;
mod list;
mod lock;
mod response;
mod transform;
mod transport;
pub mod utils;

pub use buffer::{DataTransfer, ScratchBuffer, DEFAULT_CAPACITY};
pub use client::{ClientConfig, KeyenceMcClient, McClient, MelsecMcClient};
pub use command::{
    McCommand, ReadCommand, ReadPlcTypeCommand, RemoteCommand, WriteBitCommand,
    WriteWordCommand, MAX_ASCII_READ_WORDS, MAX_BINARY_READ_WORDS, MAX_WRITE_BITS,
    MAX_WRITE_WORDS,
};
pub use counter::WrappingCounter;
pub use device::{KeyenceDevice, McAddress, McDevice, MelsecDevice};
pub use dialect::{Dialect, Keyence, Melsec};
pub use error::{McError, Result};
pub use header::{FrameFormat, Route, ASCII_HEADER_SIZE, BINARY_HEADER_SIZE};
pub use list::BoundedList;
pub use lock::HybridLock;
pub use response::{
    extract_ascii_bits, extract_ascii_words, extract_binary_bits, McResponse, PLC_TYPE_LENGTH,
};
pub use transform::{ByteTransform, DataFormat, RegularByteTransform};
pub use transport::{TcpTransport, Transport, DEFAULT_TIMEOUT};
