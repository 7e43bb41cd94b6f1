//! Mode, signal and buffer selectors.

use bitflags::bitflags;

bitflags! {
    /// Access mode requested when opening a port.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenMode: u32 {
        const READ = 1;
        const WRITE = 2;
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

bitflags! {
    /// Modem-control input lines.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Signals: u32 {
        /// Clear to send
        const CTS = 1;
        /// Data set ready
        const DSR = 2;
        /// Data carrier detect
        const DCD = 4;
        /// Ring indicator
        const RI = 8;
    }
}

/// Which buffered data `flush` discards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Buffers {
    Input,
    Output,
    Both,
}

impl From<Buffers> for serialport::ClearBuffer {
    fn from(buffers: Buffers) -> Self {
        match buffers {
            Buffers::Input => serialport::ClearBuffer::Input,
            Buffers::Output => serialport::ClearBuffer::Output,
            Buffers::Both => serialport::ClearBuffer::All,
        }
    }
}

/// Queue selector for `bytes_waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}
