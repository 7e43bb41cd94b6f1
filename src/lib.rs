//! Cross-platform serial port access.
//!
//! This library discovers serial ports, opens them, configures line settings,
//! moves bytes with blocking or non-blocking calls, and waits for readiness
//! across several ports at once.
//!
//! # Modules
//!
//! - `registry`: port discovery and lookup (`PortRegistry`)
//! - `port`: the `Port` state machine, line settings, and device adapters
//! - `events`: readiness multiplexing (`EventSet`)
//! - `diagnostics`: per-thread last error and the process-wide debug handler
//! - `api`: a flat, handle-based surface returning integer codes
//! - `config`: runtime settings with TOML support
//! - `logging`: `tracing` subscriber setup
//! - `version`: package and library version numbers
//! - `error`: unified error handling

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod logging;
pub mod port;
pub mod registry;
pub mod version;

// Re-export commonly used types for convenience
pub use diagnostics::{last_error_code, last_error_message, set_debug_handler, ErrorContext};
pub use error::{Error, ErrorCode, Result};
pub use events::{EventMask, EventSet};
pub use port::{
    Buffers, Cts, DataBits, Direction, Dsr, Dtr, FlowControl, MockSerialPort, OpenMode, Parity,
    Port, PortConfig, PortError, PortStats, Rts, SerialPortAdapter, Signals, StopBits, XonXoff,
};
pub use registry::{
    DeviceProvider, MockProvider, NativeProvider, PortInfo, PortRegistry, Transport, UsbIdentity,
};

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
