//! Library-wide error type and the numeric codes of the flat handle API.

use std::fmt;
use thiserror::Error;

/// A specialized `Result` type for serial_core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric result codes. Zero is success, every failure is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ErrorCode {
    #[default]
    Ok = 0,
    InvalidArgument = -1,
    OsFailure = -2,
    Memory = -3,
    Unsupported = -4,
}

impl ErrorCode {
    /// The raw integer value returned by the flat API.
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "SP_OK",
            Self::InvalidArgument => "SP_ERR_ARG",
            Self::OsFailure => "SP_ERR_FAIL",
            Self::Memory => "SP_ERR_MEM",
            Self::Unsupported => "SP_ERR_SUPP",
        };
        f.write_str(name)
    }
}

/// Unified library error type.
///
/// Every variant maps onto one [`ErrorCode`]; see [`Error::code`].
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was absent, out of range, or the port was in the wrong state.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A port name did not resolve to any device.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// The operating system rejected the request.
    #[error("{context}: {source}")]
    Os {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// An error reported by the `serialport` backend.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// An allocation or resource reservation failed.
    #[error("Out of memory: {0}")]
    Memory(String),

    /// The request cannot be expressed on this platform or transport.
    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

impl Error {
    pub fn invalid_arg(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    pub fn os(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Os {
            context: context.into(),
            source,
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// The flat API code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) | Self::NotFound(_) => ErrorCode::InvalidArgument,
            Self::Os { .. } | Self::Serial(_) => ErrorCode::OsFailure,
            Self::Memory(_) => ErrorCode::Memory,
            Self::Unsupported(_) => ErrorCode::Unsupported,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::os("I/O error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_negative_on_failure() {
        assert_eq!(ErrorCode::Ok.as_i32(), 0);
        for code in [
            ErrorCode::InvalidArgument,
            ErrorCode::OsFailure,
            ErrorCode::Memory,
            ErrorCode::Unsupported,
        ] {
            assert!(code.as_i32() < 0, "{code} should be negative");
        }
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(Error::invalid_arg("x").code(), ErrorCode::InvalidArgument);
        assert_eq!(Error::not_found("/dev/foobar").code(), ErrorCode::InvalidArgument);
        assert_eq!(Error::unsupported("mark parity").code(), ErrorCode::Unsupported);
        assert_eq!(Error::Memory("list".into()).code(), ErrorCode::Memory);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::from(io).code(), ErrorCode::OsFailure);
    }

    #[test]
    fn test_error_display() {
        let err = Error::not_found("/dev/ttyUSB0");
        assert_eq!(err.to_string(), "Serial port not found: /dev/ttyUSB0");

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "No such device");
        let err = Error::os("open /dev/ttyUSB0 failed", io);
        assert_eq!(err.to_string(), "open /dev/ttyUSB0 failed: No such device");
    }
}
