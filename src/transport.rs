//! Transport layer for MC communication.
//!
//! The codec only needs one primitive from the transport: [`Transport::exchange`],
//! a full request/response round trip over an already-established
//! connection. The protocol layer doesn't know about sockets; the socket
//! layer doesn't know MC beyond the message length needed to frame a
//! response.
//!
//! [`TcpTransport`] is the blocking TCP implementation used by
//! [`McClient::connect`](crate::McClient::connect). Tests and alternative
//! links (serial gateways, simulators) plug in their own [`Transport`].
//!
//! # Response framing
//!
//! | Format | Fixed part | Length field |
//! |--------|-----------|--------------|
//! | Binary | 9 bytes | LE `u16` at bytes 7-8 |
//! | ASCII | 18 chars | 4 hex chars at 14-17 |
//!
//! The length field counts the bytes that follow the fixed part.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::error::{McError, Result};
use crate::header::FrameFormat;
use crate::utils::{format_frame, parse_hex};

/// Default timeout for connect, read and write.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

const BINARY_FIXED_SIZE: usize = 9;
const ASCII_FIXED_SIZE: usize = 18;

/// One request/response round trip over an established connection.
pub trait Transport: Send {
    /// Sends `request` and returns the complete response frame.
    ///
    /// # Errors
    ///
    /// Returns [`McError::Timeout`] when the peer does not answer in time and
    /// [`McError::Io`] for other socket failures.
    fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        (**self).exchange(request)
    }
}

/// Blocking TCP transport with MC message-length framing.
///
/// A failed exchange may leave part of a reply unread, so the connection
/// is shut down and every later exchange fails with
/// [`io::ErrorKind::NotConnected`]. Reconnect by creating a new transport.
pub struct TcpTransport {
    stream: TcpStream,
    remote_addr: SocketAddr,
    format: FrameFormat,
    broken: bool,
}

impl TcpTransport {
    /// Connects to the PLC.
    ///
    /// # Arguments
    ///
    /// * `plc_addr` - Socket address of the PLC's MC port
    /// * `timeout` - Connect, read and write timeout
    /// * `format` - Frame format used to locate the response length
    ///
    /// # Errors
    ///
    /// Returns [`McError::Timeout`] if the connection is not established in
    /// time, or an I/O error if the socket cannot be configured.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::{FrameFormat, TcpTransport};
    /// use std::time::Duration;
    ///
    /// let transport = TcpTransport::connect(
    ///     "192.168.1.10:6000".parse().unwrap(),
    ///     Duration::from_secs(2),
    ///     FrameFormat::Binary,
    /// ).unwrap();
    /// ```
    pub fn connect(plc_addr: SocketAddr, timeout: Duration, format: FrameFormat) -> Result<Self> {
        let stream = TcpStream::connect_timeout(&plc_addr, timeout).map_err(map_io)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        debug!(%plc_addr, %format, ?timeout, "connected to PLC");

        Ok(Self {
            stream,
            remote_addr: plc_addr,
            format,
            broken: false,
        })
    }

    /// Connects with [`DEFAULT_TIMEOUT`].
    pub fn with_default_timeout(plc_addr: SocketAddr, format: FrameFormat) -> Result<Self> {
        Self::connect(plc_addr, DEFAULT_TIMEOUT, format)
    }

    /// Returns the remote PLC address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Returns the frame format used for response framing.
    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Returns true once an exchange has failed and the socket was closed.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    fn round_trip(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        self.stream.write_all(request).map_err(map_io)?;
        self.read_message()
    }

    fn read_message(&mut self) -> Result<Vec<u8>> {
        let fixed = match self.format {
            FrameFormat::Binary => BINARY_FIXED_SIZE,
            FrameFormat::Ascii => ASCII_FIXED_SIZE,
        };
        let mut frame = vec![0u8; fixed];
        self.stream.read_exact(&mut frame).map_err(map_io)?;

        let remaining = match self.format {
            FrameFormat::Binary => u16::from_le_bytes([frame[7], frame[8]]) as usize,
            FrameFormat::Ascii => parse_hex(&frame[14..18])
                .ok_or_else(|| McError::invalid_response("length field is not hex"))?
                as usize,
        };
        frame.resize(fixed + remaining, 0);
        self.stream.read_exact(&mut frame[fixed..]).map_err(map_io)?;
        Ok(frame)
    }
}

impl Transport for TcpTransport {
    fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        if self.broken {
            return Err(McError::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "connection closed after a failed exchange",
            )));
        }
        trace!(frame = %format_frame(request), "mc request");
        match self.round_trip(request) {
            Ok(response) => {
                trace!(frame = %format_frame(&response), "mc response");
                Ok(response)
            }
            Err(err) => {
                warn!(remote_addr = %self.remote_addr, error = %err, "closing connection");
                self.broken = true;
                let _ = self.stream.shutdown(Shutdown::Both);
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("remote_addr", &self.remote_addr)
            .field("local_addr", &self.stream.local_addr().ok())
            .field("format", &self.format)
            .field("broken", &self.broken)
            .finish()
    }
}

fn map_io(err: io::Error) -> McError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => McError::Timeout,
        _ => McError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    fn listener() -> (TcpListener, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        (listener, addr)
    }

    fn word_reply(word: u16) -> Vec<u8> {
        let mut frame = vec![0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x04, 0x00, 0x00, 0x00];
        frame.extend_from_slice(&word.to_le_bytes());
        frame
    }

    #[test]
    fn test_binary_framing_across_writes() {
        let (listener, addr) = listener();
        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = [0u8; 4];
            socket.read_exact(&mut request).unwrap();
            assert_eq!(request, [1, 2, 3, 4]);
            // Header and payload arrive in separate segments.
            socket
                .write_all(&[0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x04, 0x00])
                .unwrap();
            socket.flush().unwrap();
            thread::sleep(Duration::from_millis(20));
            socket.write_all(&[0x00, 0x00, 0x34, 0x12]).unwrap();
        });

        let mut transport =
            TcpTransport::connect(addr, Duration::from_secs(2), FrameFormat::Binary).unwrap();
        let response = transport.exchange(&[1, 2, 3, 4]).unwrap();
        assert_eq!(response.len(), 13);
        assert_eq!(&response[9..], &[0x00, 0x00, 0x34, 0x12]);
        server.join().unwrap();
    }

    #[test]
    fn test_ascii_framing() {
        let (listener, addr) = listener();
        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = [0u8; 2];
            socket.read_exact(&mut request).unwrap();
            socket.write_all(b"D00000FF03FF0000080000ABCD").unwrap();
        });

        let mut transport =
            TcpTransport::connect(addr, Duration::from_secs(2), FrameFormat::Ascii).unwrap();
        let response = transport.exchange(b"hi").unwrap();
        assert_eq!(response, b"D00000FF03FF0000080000ABCD");
        server.join().unwrap();
    }

    #[test]
    fn test_read_timeout() {
        let (listener, addr) = listener();
        let server = thread::spawn(move || {
            let (socket, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(300));
            drop(socket);
        });

        let mut transport =
            TcpTransport::connect(addr, Duration::from_millis(50), FrameFormat::Binary).unwrap();
        let err = transport.exchange(&[0x50, 0x00]).unwrap_err();
        assert!(matches!(err, McError::Timeout), "{err:?}");
        server.join().unwrap();
    }

    #[test]
    fn test_closed_connection_is_io_error() {
        let (listener, addr) = listener();
        let server = thread::spawn(move || {
            let (socket, _) = listener.accept().unwrap();
            drop(socket);
        });

        let mut transport =
            TcpTransport::connect(addr, Duration::from_secs(2), FrameFormat::Binary).unwrap();
        server.join().unwrap();
        let err = transport.exchange(&[0x50, 0x00]).unwrap_err();
        assert!(matches!(err, McError::Io(_)), "{err:?}");
    }

    #[test]
    fn test_late_reply_is_not_returned_after_timeout() {
        let (listener, addr) = listener();
        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = [0u8; 2];
            socket.read_exact(&mut request).unwrap();
            thread::sleep(Duration::from_millis(300));
            // Reply to the first request after the client gave up on it.
            let _ = socket.write_all(&word_reply(0x1111));
            let _ = socket.read(&mut request);
            let _ = socket.write_all(&word_reply(0x2222));
        });

        let mut transport =
            TcpTransport::connect(addr, Duration::from_millis(100), FrameFormat::Binary).unwrap();
        let first = transport.exchange(&[0x50, 0x00]).unwrap_err();
        assert!(matches!(first, McError::Timeout), "{first:?}");
        assert!(transport.is_broken());

        thread::sleep(Duration::from_millis(300));
        match transport.exchange(&[0x50, 0x00]) {
            Err(McError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::NotConnected),
            other => panic!("expected NotConnected, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_debug_output() {
        let (listener, addr) = listener();
        let transport =
            TcpTransport::connect(addr, Duration::from_secs(1), FrameFormat::Binary).unwrap();
        let debug_str = format!("{transport:?}");
        assert!(debug_str.contains("TcpTransport"));
        assert!(debug_str.contains(&addr.to_string()));
        assert_eq!(transport.remote_addr(), addr);
        drop(listener);
    }
}
