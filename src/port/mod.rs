//! Port abstraction layer for serial communication.
//!
//! - `Port`: the platform-agnostic state machine handed out by the registry
//! - `SerialPortAdapter`: the capability trait each backend implements
//! - `NativeSerialPort` / `MockSerialPort`: the OS and in-memory backends
//! - `PortConfig`: link parameters with per-field "unspecified" state

pub mod config;
pub mod error;
pub mod flags;
pub mod mock;
pub mod native;
mod serial_port;
mod state;
pub mod traits;

pub use config::{
    ConfigField, Cts, DataBits, Dsr, Dtr, FlowControl, Parity, PortConfig, Rts, StopBits, XonXoff,
};
pub use error::PortError;
pub use flags::{Buffers, Direction, OpenMode, Signals};
pub use mock::MockSerialPort;
pub use native::NativeSerialPort;
pub use serial_port::Port;
pub(crate) use serial_port::PollSource;
pub use state::{PortAdapter, PortStats};
pub use traits::{NativeHandle, SerialPortAdapter};
