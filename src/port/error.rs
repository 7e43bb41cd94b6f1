//! Adapter-level error types.
//!
//! Adapters report failures as `PortError`; the `Port` layer converts them into
//! the library-wide [`crate::Error`] so callers see one taxonomy.

use thiserror::Error;

/// Errors that can occur inside a device adapter.
#[derive(Debug, Error)]
pub enum PortError {
    /// The device node could not be found while opening.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device rejected a configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The adapter cannot express the requested setting.
    #[error("Unsupported setting: {0}")]
    Unsupported(String),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }
}

impl From<PortError> for crate::Error {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(name) => crate::Error::os(
                format!("Device {name} vanished"),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ),
            PortError::Io(e) => crate::Error::os("Device I/O failed", e),
            PortError::Config(msg) => crate::Error::os(
                "Device rejected configuration",
                std::io::Error::new(std::io::ErrorKind::InvalidInput, msg),
            ),
            PortError::Unsupported(msg) => crate::Error::Unsupported(msg),
            PortError::Serial(e) => crate::Error::Serial(e),
        }
    }
}
