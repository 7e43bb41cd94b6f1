//! Readiness multiplexing over a set of ports.
//!
//! On Unix, ports backed by an OS descriptor are watched with one `poll(2)`
//! call. Ports without a descriptor are probed through their adapter.

mod event_set;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as sys;

#[cfg(not(unix))]
mod fallback;
#[cfg(not(unix))]
use fallback as sys;

pub use event_set::EventSet;

use bitflags::bitflags;

bitflags! {
    /// Conditions a wait can watch for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventMask: u32 {
        /// Data is available to read
        const READABLE = 1;
        /// The port can accept data
        const WRITABLE = 2;
        /// The device reported an error or hang-up
        const ERROR = 4;
    }
}
