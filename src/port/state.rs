use super::flags::OpenMode;
use super::traits::SerialPortAdapter;
use serde::Serialize;
use std::time::{Duration, Instant};

/// A type alias for the adapter owned by an open port.
pub type PortAdapter = Box<dyn SerialPortAdapter>;

/// Open-state of a `Port`.
#[derive(Debug, Default)]
pub(crate) enum PortState {
    #[default]
    Closed,
    Open {
        device: PortAdapter,
        mode: OpenMode,
        bytes_read_total: u64,
        bytes_written_total: u64,
        open_started: Instant,
    },
}

impl PortState {
    pub(crate) fn opened(device: PortAdapter, mode: OpenMode) -> Self {
        PortState::Open {
            device,
            mode,
            bytes_read_total: 0,
            bytes_written_total: 0,
            open_started: Instant::now(),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        matches!(self, PortState::Open { .. })
    }

    pub(crate) fn stats(&self) -> Option<PortStats> {
        match self {
            PortState::Closed => None,
            PortState::Open {
                mode,
                bytes_read_total,
                bytes_written_total,
                open_started,
                ..
            } => Some(PortStats {
                mode_bits: mode.bits(),
                bytes_read_total: *bytes_read_total,
                bytes_written_total: *bytes_written_total,
                open_duration: open_started.elapsed(),
            }),
        }
    }
}

/// Runtime counters of an open port, reset on every open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortStats {
    /// Raw `OpenMode` bits the port was opened with.
    pub mode_bits: u32,
    pub bytes_read_total: u64,
    pub bytes_written_total: u64,
    #[serde(serialize_with = "serialize_millis")]
    pub open_duration: Duration,
}

impl PortStats {
    pub fn mode(&self) -> OpenMode {
        OpenMode::from_bits_truncate(self.mode_bits)
    }
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(value.as_millis() as u64)
}
