//! High-level MC client for communicating with MELSEC and Keyence PLCs.
//!
//! This module provides [`McClient`], the primary interface for reading and
//! writing PLC devices over the MC (QnA 3E) protocol.
//!
//! # Overview
//!
//! Every operation runs the same pipeline:
//!
//! 1. resolve the textual address with the client's [`Dialect`]
//! 2. build the core command in the configured [`FrameFormat`]
//! 3. wrap it in the envelope and exchange it over the [`Transport`]
//! 4. check the end code
//! 5. extract the payload
//!
//! The first failure aborts the operation; no partial results are returned.
//! The dialect is the only vendor-specific step, so [`MelsecMcClient`] and
//! [`KeyenceMcClient`] share all framing code.
//!
//! # Example
//!
//! ```no_run
//! use melsec_mc::{ClientConfig, MelsecMcClient};
//!
//! let config = ClientConfig::new("192.168.1.10:6000".parse().unwrap());
//! let client = MelsecMcClient::connect(config)?;
//!
//! // Read 10 words from D100 as little-endian bytes
//! let data = client.read("D100", 10)?;
//!
//! // Write two words to D200
//! client.write("D200", &[0x34, 0x12, 0x78, 0x56])?;
//!
//! // Read and write relays
//! let bits = client.read_bool("M100", 8)?;
//! client.write_bit("M100", true)?;
//!
//! // Typed values
//! let temperature = client.read_f32("D300")?;
//! client.write_i32("D310", -42)?;
//! # Ok::<(), melsec_mc::McError>(())
//! ```
//!
//! # Thread safety
//!
//! The client holds its transport behind a [`HybridLock`] for the whole
//! resolve-to-extract sequence, so concurrent calls on one client never
//! interleave on the connection. Chunked reads hold the lock across all
//! chunks.

use std::fmt;
use std::marker::PhantomData;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::command::{
    McCommand, ReadCommand, ReadPlcTypeCommand, RemoteCommand, WriteBitCommand, WriteWordCommand,
    MAX_ASCII_READ_WORDS, MAX_BINARY_READ_WORDS,
};
use crate::device::McDevice;
use crate::dialect::{Dialect, Keyence, Melsec};
use crate::error::{McError, Result};
use crate::header::{FrameFormat, Route};
use crate::lock::HybridLock;
use crate::response::McResponse;
use crate::transform::{chunks, ByteTransform, DataFormat, RegularByteTransform};
use crate::transport::{TcpTransport, Transport, DEFAULT_TIMEOUT};

/// Configuration for creating an MC client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// PLC address and MC port.
    pub plc_addr: SocketAddr,
    /// Network number in the envelope (default 0x00).
    pub network_number: u8,
    /// Station number in the envelope (default 0x00).
    pub station_number: u8,
    /// Wire format (default binary).
    pub format: FrameFormat,
    /// Connect, read and write timeout (default 2 seconds).
    pub timeout: Duration,
    /// Word order of 32 and 64-bit values (default DCBA).
    pub data_format: DataFormat,
}

impl ClientConfig {
    /// Creates a configuration with default routing, binary frames and a
    /// 2 second timeout.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{ClientConfig, FrameFormat};
    ///
    /// let config = ClientConfig::new("192.168.1.10:6000".parse().unwrap());
    /// assert_eq!(config.format, FrameFormat::Binary);
    /// ```
    pub fn new(plc_addr: SocketAddr) -> Self {
        Self {
            plc_addr,
            network_number: 0x00,
            station_number: 0x00,
            format: FrameFormat::Binary,
            timeout: DEFAULT_TIMEOUT,
            data_format: DataFormat::default(),
        }
    }

    /// Sets the network number.
    pub fn with_network_number(mut self, network: u8) -> Self {
        self.network_number = network;
        self
    }

    /// Sets the station number.
    pub fn with_station_number(mut self, station: u8) -> Self {
        self.station_number = station;
        self
    }

    /// Sets the wire format.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{ClientConfig, FrameFormat};
    ///
    /// let config = ClientConfig::new("192.168.1.10:6000".parse().unwrap())
    ///     .with_format(FrameFormat::Ascii);
    /// ```
    pub fn with_format(mut self, format: FrameFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom timeout (default is 2 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the word order used by the typed helpers.
    pub fn with_data_format(mut self, data_format: DataFormat) -> Self {
        self.data_format = data_format;
        self
    }

    /// Envelope route built from the network and station numbers.
    pub fn route(&self) -> Route {
        Route::new(self.network_number, self.station_number)
    }
}

/// MC client, generic over the address dialect and the transport.
///
/// Each operation takes the transport lock once and produces one request
/// and one response, except [`read`](Self::read), which splits long reads
/// into several requests. No automatic retries or reconnection.
pub struct McClient<D: Dialect, T: Transport = TcpTransport> {
    transport: HybridLock<T>,
    route: Route,
    format: FrameFormat,
    transform: RegularByteTransform,
    dialect: PhantomData<fn() -> D>,
}

/// Client for standard MELSEC controllers.
pub type MelsecMcClient<T = TcpTransport> = McClient<Melsec, T>;

/// Client for Keyence controllers.
pub type KeyenceMcClient<T = TcpTransport> = McClient<Keyence, T>;

impl<D: Dialect> McClient<D, TcpTransport> {
    /// Connects over TCP using `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::{ClientConfig, KeyenceMcClient};
    ///
    /// let config = ClientConfig::new("192.168.0.10:8501".parse().unwrap());
    /// let client = KeyenceMcClient::connect(config).unwrap();
    /// ```
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let transport = TcpTransport::connect(config.plc_addr, config.timeout, config.format)?;
        Ok(Self::with_transport(transport, &config))
    }
}

impl<D: Dialect, T: Transport> McClient<D, T> {
    /// Creates a client over an existing transport.
    ///
    /// Only the routing, frame format and data format of `config` are used.
    pub fn with_transport(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport: HybridLock::new(transport),
            route: config.route(),
            format: config.format,
            transform: RegularByteTransform::new(config.data_format),
            dialect: PhantomData,
        }
    }

    /// Returns the envelope route.
    pub fn route(&self) -> Route {
        self.route
    }

    /// Returns the wire format.
    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Returns the byte transform used by the typed helpers.
    pub fn byte_transform(&self) -> &RegularByteTransform {
        &self.transform
    }

    /// Consumes the client and returns its transport.
    pub fn into_transport(self) -> T {
        self.transport.into_inner()
    }

    /// Packs `core`, exchanges it and checks the end code.
    fn execute(&self, transport: &mut T, core: &[u8]) -> Result<McResponse> {
        let request = self.route.pack(core, self.format);
        let frame = transport.exchange(&request)?;

        let response = McResponse::from_bytes(&frame, self.format)?;
        if !response.is_success() {
            warn!(end_code = response.end_code, "PLC returned end code 0x{:04X}", response.end_code);
        }
        response.check_error()?;
        Ok(response)
    }

    fn run<C: McCommand>(&self, command: &C) -> Result<McResponse> {
        let core = command.encode(self.format);
        let mut transport = self.transport.enter();
        self.execute(&mut transport, &core)
    }

    fn max_read_words(&self) -> u16 {
        match self.format {
            FrameFormat::Binary => MAX_BINARY_READ_WORDS,
            FrameFormat::Ascii => MAX_ASCII_READ_WORDS,
        }
    }

    /// Reads `length` words starting at `address`.
    ///
    /// Returns the words as little-endian bytes (`2 * length` bytes). Reads
    /// longer than one request allows are split; for bit devices each word
    /// covers 16 points.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The address cannot be resolved
    /// - `length` is 0
    /// - Communication fails
    /// - The PLC returns a nonzero end code
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::{ClientConfig, MelsecMcClient};
    ///
    /// let client = MelsecMcClient::connect(ClientConfig::new(
    ///     "192.168.1.10:6000".parse().unwrap(),
    /// )).unwrap();
    ///
    /// let data = client.read("D100", 10).unwrap();
    /// assert_eq!(data.len(), 20);
    /// ```
    pub fn read(&self, address: &str, length: u16) -> Result<Vec<u8>> {
        let mut head = D::resolve(address)?;
        if length == 0 {
            return Err(McError::invalid_parameter("length", "must be greater than 0"));
        }
        debug!(dialect = D::NAME, address, length, format = %self.format, "read words");

        let max = self.max_read_words();
        let step = if head.device.is_bit() { 16 } else { 1 };
        let mut data = Vec::with_capacity(length as usize * 2);
        let mut transport = self.transport.enter();
        let mut remaining = length;
        while remaining > 0 {
            let chunk = remaining.min(max);
            let command = ReadCommand::words(head, chunk)?;
            let response = self.execute(&mut transport, &command.encode(self.format))?;
            let words = response.to_word_bytes()?;
            if words.len() < chunk as usize * 2 {
                return Err(McError::invalid_response(format!(
                    "expected {} bytes of word data, got {}",
                    chunk as usize * 2,
                    words.len()
                )));
            }
            data.extend_from_slice(&words[..chunk as usize * 2]);
            remaining -= chunk;
            head = head.advance(u32::from(chunk) * step);
        }
        Ok(data)
    }

    /// Reads `length` points starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be resolved, `length` is 0,
    /// communication fails or the PLC reports an error.
    pub fn read_bool(&self, address: &str, length: u16) -> Result<Vec<bool>> {
        let head = D::resolve(address)?;
        let command = ReadCommand::bits(head, length)?;
        debug!(dialect = D::NAME, address, length, format = %self.format, "read bits");
        self.run(&command)?.to_bits(length as usize)
    }

    /// Reads a single point.
    pub fn read_bit(&self, address: &str) -> Result<bool> {
        let bits = self.read_bool(address, 1)?;
        bits.first()
            .copied()
            .ok_or_else(|| McError::invalid_response("empty bit payload"))
    }

    /// Writes little-endian words starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be resolved, `value` is empty,
    /// of odd length or longer than 960 words, communication fails or the
    /// PLC reports an error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::{ClientConfig, MelsecMcClient};
    ///
    /// let client = MelsecMcClient::connect(ClientConfig::new(
    ///     "192.168.1.10:6000".parse().unwrap(),
    /// )).unwrap();
    ///
    /// // D200 = 0x1234, D201 = 0x5678
    /// client.write("D200", &[0x34, 0x12, 0x78, 0x56]).unwrap();
    /// ```
    pub fn write(&self, address: &str, value: &[u8]) -> Result<()> {
        let head = D::resolve(address)?;
        let command = WriteWordCommand::new(head, value)?;
        debug!(dialect = D::NAME, address, words = command.word_count(), format = %self.format, "write words");
        self.run(&command).map(|_| ())
    }

    /// Writes a single point.
    pub fn write_bit(&self, address: &str, value: bool) -> Result<()> {
        self.write_bits(address, &[value])
    }

    /// Writes consecutive points starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be resolved, `values` is empty
    /// or longer than 7168 points, communication fails or the PLC reports an
    /// error.
    pub fn write_bits(&self, address: &str, values: &[bool]) -> Result<()> {
        let head = D::resolve(address)?;
        let command = WriteBitCommand::new(head, values)?;
        debug!(dialect = D::NAME, address, points = values.len(), format = %self.format, "write bits");
        self.run(&command).map(|_| ())
    }

    /// Puts the CPU into RUN.
    pub fn remote_run(&self) -> Result<()> {
        debug!("remote run");
        self.run(&RemoteCommand::Run).map(|_| ())
    }

    /// Puts the CPU into STOP.
    pub fn remote_stop(&self) -> Result<()> {
        debug!("remote stop");
        self.run(&RemoteCommand::Stop).map(|_| ())
    }

    /// Resets the CPU. The CPU must be stopped first.
    pub fn remote_reset(&self) -> Result<()> {
        debug!("remote reset");
        self.run(&RemoteCommand::Reset).map(|_| ())
    }

    /// Reads the CPU model name, e.g. `"Q03UDVCPU"`.
    pub fn read_plc_type(&self) -> Result<String> {
        debug!("read CPU model");
        self.run(&ReadPlcTypeCommand)?.to_plc_type()
    }

    /// Reads an ASCII string stored two characters per word, low byte first.
    ///
    /// Trailing NUL bytes are trimmed.
    pub fn read_string(&self, address: &str, word_count: u16) -> Result<String> {
        let mut bytes = self.read(address, word_count)?;
        while bytes.last() == Some(&0) {
            bytes.pop();
        }
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    /// Writes a string two characters per word, low byte first, padding an
    /// odd length with a NUL byte.
    pub fn write_string(&self, address: &str, value: &str) -> Result<()> {
        let mut bytes = value.as_bytes().to_vec();
        if bytes.len() % 2 != 0 {
            bytes.push(0);
        }
        self.write(address, &bytes)
    }
}

macro_rules! typed_io {
    ($ty:ty, $size:literal, $to:ident, $from:ident, $read:ident, $write:ident) => {
        impl<D: Dialect, T: Transport> McClient<D, T> {
            #[doc = concat!("Reads a `", stringify!($ty), "` starting at `address`, using the configured data format.")]
            pub fn $read(&self, address: &str) -> Result<$ty> {
                let bytes = self.read(address, $size / 2)?;
                let value = chunks::<$size>(&bytes)
                    .next()
                    .map(|group| self.transform.$to(group))
                    .ok_or_else(|| McError::invalid_response("short word payload"));
                value
            }

            #[doc = concat!("Writes a `", stringify!($ty), "` starting at `address`, using the configured data format.")]
            pub fn $write(&self, address: &str, value: $ty) -> Result<()> {
                self.write(address, &self.transform.$from(value))
            }
        }
    };
}

typed_io!(i16, 2, to_i16, bytes_from_i16, read_i16, write_i16);
typed_io!(u16, 2, to_u16, bytes_from_u16, read_u16, write_u16);
typed_io!(i32, 4, to_i32, bytes_from_i32, read_i32, write_i32);
typed_io!(u32, 4, to_u32, bytes_from_u32, read_u32, write_u32);
typed_io!(i64, 8, to_i64, bytes_from_i64, read_i64, write_i64);
typed_io!(u64, 8, to_u64, bytes_from_u64, read_u64, write_u64);
typed_io!(f32, 4, to_f32, bytes_from_f32, read_f32, write_f32);
typed_io!(f64, 8, to_f64, bytes_from_f64, read_f64, write_f64);

impl<D: Dialect, T: Transport> fmt::Debug for McClient<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McClient")
            .field("dialect", &D::NAME)
            .field("route", &self.route)
            .field("format", &self.format)
            .field("data_format", &self.transform.data_format())
            .finish()
    }
}
