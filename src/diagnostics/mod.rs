//! Error reporting and debug output.
//!
//! - `context`: the per-thread last-error record every fallible call updates
//! - `debug`: the process-wide debug handler

mod context;
mod debug;

pub use context::{
    last_error, last_error_code, last_error_message, ErrorContext, NO_ERROR_MESSAGE,
};
pub use debug::{
    debug_handler_installed, default_debug_handler, emit, restore_default_debug_handler,
    set_debug_handler, DebugHandler,
};

pub(crate) use context::{fail, record, track};
