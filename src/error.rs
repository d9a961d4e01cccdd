//! Error types for the MC protocol client.

use std::io;
use thiserror::Error;

/// Result type alias for MC operations.
pub type Result<T> = std::result::Result<T, McError>;

/// Errors that can occur while resolving addresses, building frames,
/// talking to a PLC or accessing the scratch buffers.
#[derive(Debug, Error)]
pub enum McError {
    /// The textual device address could not be resolved in the active dialect.
    #[error("Invalid address '{address}': {reason}")]
    AddressParse {
        /// The address as given by the caller.
        address: String,
        /// Why the address was rejected.
        reason: String,
    },

    /// The PLC answered with a nonzero end code.
    #[error("PLC end code 0x{code:04X}: please refer to the device manual for details")]
    Device {
        /// End code reported by the controller.
        code: u16,
    },

    /// Invalid parameter provided.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// Invalid response received from PLC.
    #[error("Invalid response: {reason}")]
    InvalidResponse {
        /// Description of the response error.
        reason: String,
    },

    /// Communication timeout.
    #[error("Communication timeout")]
    Timeout,

    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index outside the valid range of a buffer or list.
    #[error("Index {index} out of range (length {len})")]
    OutOfBounds {
        /// Requested index.
        index: usize,
        /// Valid length of the container.
        len: usize,
    },
}

impl McError {
    /// Creates a new `AddressParse` error.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::McError;
    ///
    /// let err = McError::address_parse("Q100", "unsupported device prefix");
    /// assert_eq!(err.to_string(), "Invalid address 'Q100': unsupported device prefix");
    /// ```
    pub fn address_parse(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AddressParse {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `Device` error from a PLC end code.
    pub fn device(code: u16) -> Self {
        Self::Device { code }
    }

    /// Creates a new `InvalidParameter` error.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::McError;
    ///
    /// let err = McError::invalid_parameter("length", "must be greater than 0");
    /// ```
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidResponse` error.
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Creates a new `OutOfBounds` error.
    pub fn out_of_bounds(index: usize, len: usize) -> Self {
        Self::OutOfBounds { index, len }
    }

    /// Returns whether this error was reported by the controller itself.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Device { .. })
    }

    /// Returns the PLC end code if this is a device error.
    pub fn device_code(&self) -> Option<u16> {
        match self {
            Self::Device { code } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_display() {
        let err = McError::device(0xC051);
        assert_eq!(
            err.to_string(),
            "PLC end code 0xC051: please refer to the device manual for details"
        );
        assert!(err.is_device_error());
        assert_eq!(err.device_code(), Some(0xC051));
    }

    #[test]
    fn test_address_parse_display() {
        let err = McError::address_parse("TX10", "unknown timer sub-device 'X'");
        assert_eq!(
            err.to_string(),
            "Invalid address 'TX10': unknown timer sub-device 'X'"
        );
        assert!(!err.is_device_error());
        assert_eq!(err.device_code(), None);
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(McError::Timeout.to_string(), "Communication timeout");
    }

    #[test]
    fn test_out_of_bounds_display() {
        let err = McError::out_of_bounds(80, 80);
        assert_eq!(err.to_string(), "Index 80 out of range (length 80)");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        let err: McError = io_err.into();
        assert!(matches!(err, McError::Io(_)));
    }
}
