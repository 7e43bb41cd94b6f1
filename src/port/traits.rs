//! The device capability interface.
//!
//! `SerialPortAdapter` is the only seam between the platform-agnostic `Port`
//! state machine and OS-specific code. The native implementation is chosen at
//! build time; the mock implementation stands in for hardware in tests.

use super::config::PortConfig;
use super::error::PortError;
use super::flags::{Buffers, Signals};
use crate::events::EventMask;
use std::time::Duration;

/// The OS descriptor of an open port.
#[cfg(unix)]
pub type NativeHandle = std::os::unix::io::RawFd;

/// The OS descriptor of an open port.
#[cfg(windows)]
pub type NativeHandle = std::os::windows::io::RawHandle;

/// Operations an open serial device must provide.
///
/// Transfer methods never fail on timeout: they return the number of bytes
/// moved, which may be zero.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Read whatever is available, waiting up to `timeout` for the first byte.
    ///
    /// A zero timeout never waits.
    fn read_bytes(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<usize, PortError>;

    /// Write as much of `data` as the device accepts within `timeout`.
    ///
    /// A zero timeout never waits.
    fn write_bytes(&mut self, data: &[u8], timeout: Duration) -> Result<usize, PortError>;

    /// Bytes received but not yet read.
    fn bytes_to_read(&self) -> Result<usize, PortError>;

    /// Bytes queued for transmission.
    fn bytes_to_write(&self) -> Result<usize, PortError>;

    /// Snapshot of the live line settings.
    fn settings(&self) -> Result<PortConfig, PortError>;

    /// Apply every specified field of `config`, leaving the rest untouched.
    ///
    /// Implementations validate the whole config before changing anything.
    fn apply_settings(&mut self, config: &PortConfig) -> Result<(), PortError>;

    /// Current state of the modem-control input lines.
    fn signals(&mut self) -> Result<Signals, PortError>;

    /// Assert (`true`) or release (`false`) a break condition.
    fn set_break(&mut self, asserted: bool) -> Result<(), PortError>;

    /// Discard buffered data.
    fn clear_buffers(&mut self, buffers: Buffers) -> Result<(), PortError>;

    /// Block until all queued output has been transmitted.
    fn drain(&mut self) -> Result<(), PortError>;

    /// The OS descriptor, when the device has one that can be polled.
    fn native_handle(&self) -> Option<NativeHandle> {
        None
    }

    /// Non-blocking readiness probe used when no native handle can be polled.
    fn readiness(&self) -> EventMask {
        let mut ready = EventMask::WRITABLE;
        match self.bytes_to_read() {
            Ok(0) => {}
            Ok(_) => ready |= EventMask::READABLE,
            Err(_) => ready |= EventMask::ERROR,
        }
        ready
    }
}
