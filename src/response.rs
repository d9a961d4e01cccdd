//! MC response parsing and payload extraction.
//!
//! # Response structure
//!
//! | Format | Header | End code | Payload |
//! |--------|--------|----------|---------|
//! | Binary | 11 bytes | LE `u16` at bytes 9-10 | from byte 11 |
//! | ASCII | 22 chars | 4 hex chars at 18-21 | from char 22 |
//!
//! A response is successful when its end code is zero. Any other code is the
//! controller's own error number and is reported as [`McError::Device`].
//!
//! # Payload layout
//!
//! Word payloads are returned as little-endian words in both formats; ASCII
//! payloads are decoded from four hex characters per word. Bit payloads hold
//! two points per byte in binary (`0x10` then `0x01`) and one character per
//! point in ASCII.
//!
//! # Example
//!
//! ```
//! use melsec_mc::{FrameFormat, McResponse};
//!
//! let frame = [
//!     0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x04, 0x00, // header
//!     0x00, 0x00, // end code
//!     0x11, 0x00, // payload
//! ];
//! let response = McResponse::from_bytes(&frame, FrameFormat::Binary).unwrap();
//! assert!(response.is_success());
//! assert_eq!(response.to_bits(4).unwrap(), vec![true, true, false, false]);
//! ```

use crate::error::{McError, Result};
use crate::header::FrameFormat;
use crate::utils::{parse_hex, unpack_bits};

/// Length of the CPU model name field.
pub const PLC_TYPE_LENGTH: usize = 16;

/// Parsed MC response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McResponse {
    /// Format the response was parsed as.
    pub format: FrameFormat,
    /// End code (0x0000 = success).
    pub end_code: u16,
    /// Raw payload after the header.
    pub data: Vec<u8>,
}

impl McResponse {
    /// Splits a complete response frame into end code and payload.
    ///
    /// # Errors
    ///
    /// Returns [`McError::InvalidResponse`] if the frame is shorter than the
    /// header or the ASCII end code is not hex.
    pub fn from_bytes(frame: &[u8], format: FrameFormat) -> Result<Self> {
        let header_size = format.header_size();
        if frame.len() < header_size {
            return Err(McError::invalid_response(format!(
                "{format} response too short: {} bytes, expected at least {header_size}",
                frame.len()
            )));
        }
        let end_code = match format {
            FrameFormat::Binary => u16::from_le_bytes([frame[9], frame[10]]),
            FrameFormat::Ascii => parse_hex(&frame[18..22])
                .map(|code| code as u16)
                .ok_or_else(|| McError::invalid_response("end code is not hex"))?,
        };
        Ok(Self {
            format,
            end_code,
            data: frame[header_size..].to_vec(),
        })
    }

    /// Returns true if the end code is zero.
    pub fn is_success(&self) -> bool {
        self.end_code == 0
    }

    /// Converts a nonzero end code into [`McError::Device`].
    pub fn check_error(&self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(McError::device(self.end_code))
        }
    }

    /// Decodes a word payload into little-endian bytes.
    pub fn to_word_bytes(&self) -> Result<Vec<u8>> {
        match self.format {
            FrameFormat::Binary => Ok(self.data.clone()),
            FrameFormat::Ascii => extract_ascii_words(&self.data),
        }
    }

    /// Decodes `length` points of a bit payload.
    ///
    /// # Errors
    ///
    /// Returns [`McError::InvalidResponse`] if the payload holds fewer points.
    pub fn to_bits(&self, length: usize) -> Result<Vec<bool>> {
        let bits = match self.format {
            FrameFormat::Binary => extract_binary_bits(&self.data, length),
            FrameFormat::Ascii => extract_ascii_bits(&self.data, length),
        };
        if bits.len() < length {
            return Err(McError::invalid_response(format!(
                "expected {length} points, got {}",
                bits.len()
            )));
        }
        Ok(bits)
    }

    /// Decodes the CPU model name, trailing padding removed.
    pub fn to_plc_type(&self) -> Result<String> {
        let name = self.data.get(..PLC_TYPE_LENGTH).ok_or_else(|| {
            McError::invalid_response(format!(
                "CPU model needs {PLC_TYPE_LENGTH} bytes, got {}",
                self.data.len()
            ))
        })?;
        Ok(String::from_utf8_lossy(name).trim_end().to_string())
    }
}

/// Unpacks a binary bit payload: the high nibble flag of each byte is the
/// first point and the low nibble flag the second.
pub fn extract_binary_bits(data: &[u8], length: usize) -> Vec<bool> {
    unpack_bits(data, length)
}

/// Unpacks an ASCII bit payload: one character per point, `'0'` is off.
pub fn extract_ascii_bits(data: &[u8], length: usize) -> Vec<bool> {
    data.iter().take(length).map(|c| *c != b'0').collect()
}

/// Decodes an ASCII word payload (four hex characters per word) into
/// little-endian word bytes.
pub fn extract_ascii_words(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() % 4 != 0 {
        return Err(McError::invalid_response(format!(
            "ASCII word payload of {} chars is not a whole number of words",
            data.len()
        )));
    }
    let mut out = Vec::with_capacity(data.len() / 2);
    for word in data.chunks_exact(4) {
        let value = parse_hex(word)
            .ok_or_else(|| McError::invalid_response("word payload is not hex"))?;
        out.extend_from_slice(&(value as u16).to_le_bytes());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_frame(end_code: u16, payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00];
        frame.extend_from_slice(&((payload.len() + 2) as u16).to_le_bytes());
        frame.extend_from_slice(&end_code.to_le_bytes());
        frame.extend_from_slice(payload);
        frame
    }

    fn ascii_frame(end_code: &str, payload: &str) -> Vec<u8> {
        format!(
            "D00000FF03FF00{:04X}{end_code}{payload}",
            payload.len() + 4
        )
        .into_bytes()
    }

    #[test]
    fn test_binary_bits() {
        let response = McResponse::from_bytes(&binary_frame(0, &[0x11, 0x00]), FrameFormat::Binary)
            .unwrap();
        assert_eq!(
            response.to_bits(4).unwrap(),
            vec![true, true, false, false]
        );
        assert_eq!(response.to_bits(3).unwrap(), vec![true, true, false]);
        assert!(response.to_bits(5).is_err());
    }

    #[test]
    fn test_binary_words() {
        let response =
            McResponse::from_bytes(&binary_frame(0, &[0x34, 0x12]), FrameFormat::Binary).unwrap();
        assert_eq!(response.to_word_bytes().unwrap(), vec![0x34, 0x12]);
    }

    #[test]
    fn test_binary_error_code() {
        let response = McResponse::from_bytes(&binary_frame(0xC051, &[]), FrameFormat::Binary)
            .unwrap();
        assert!(!response.is_success());
        let err = response.check_error().unwrap_err();
        assert_eq!(err.device_code(), Some(0xC051));
    }

    #[test]
    fn test_short_frames() {
        assert!(McResponse::from_bytes(&[0xD0, 0x00], FrameFormat::Binary).is_err());
        assert!(McResponse::from_bytes(b"D00000FF03FF00", FrameFormat::Ascii).is_err());
    }

    #[test]
    fn test_ascii_words() {
        let response =
            McResponse::from_bytes(&ascii_frame("0000", "1234ABCD"), FrameFormat::Ascii).unwrap();
        assert!(response.is_success());
        assert_eq!(
            response.to_word_bytes().unwrap(),
            vec![0x34, 0x12, 0xCD, 0xAB]
        );
    }

    #[test]
    fn test_ascii_bits() {
        let response =
            McResponse::from_bytes(&ascii_frame("0000", "10110"), FrameFormat::Ascii).unwrap();
        assert_eq!(
            response.to_bits(4).unwrap(),
            vec![true, false, true, true]
        );
    }

    #[test]
    fn test_ascii_error_code() {
        let response =
            McResponse::from_bytes(&ascii_frame("C059", ""), FrameFormat::Ascii).unwrap();
        assert_eq!(response.end_code, 0xC059);
        assert!(response.check_error().is_err());
        let bad = McResponse::from_bytes(&ascii_frame("ZZZZ", ""), FrameFormat::Ascii);
        assert!(matches!(bad, Err(McError::InvalidResponse { .. })));
    }

    #[test]
    fn test_ascii_words_reject_partial() {
        assert!(extract_ascii_words(b"12").is_err());
        assert!(extract_ascii_words(b"12G4").is_err());
        assert_eq!(extract_ascii_words(b"").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_plc_type() {
        let response = McResponse::from_bytes(
            &binary_frame(0, b"Q03UDVCPU       \x01\x00"),
            FrameFormat::Binary,
        )
        .unwrap();
        assert_eq!(response.to_plc_type().unwrap(), "Q03UDVCPU");

        let response =
            McResponse::from_bytes(&ascii_frame("0000", "Q06UDEHCPU      0263"), FrameFormat::Ascii)
                .unwrap();
        assert_eq!(response.to_plc_type().unwrap(), "Q06UDEHCPU");

        let short = McResponse::from_bytes(&binary_frame(0, b"Q03"), FrameFormat::Binary).unwrap();
        assert!(short.to_plc_type().is_err());
    }
}
