//! The `Port` state machine.
//!
//! A `Port` is created Closed by the registry, carries its identity for its
//! whole life, and owns a device adapter only while open. Every fallible call
//! records its outcome in the calling thread's error context.

use super::config::{
    Cts, DataBits, Dsr, Dtr, FlowControl, Parity, PortConfig, Rts, StopBits, XonXoff,
};
use super::error::PortError;
use super::flags::{Buffers, Direction, OpenMode, Signals};
use super::state::{PortAdapter, PortState, PortStats};
use super::traits::NativeHandle;
use crate::diagnostics::track;
use crate::error::{Error, Result};
use crate::events::EventMask;
use crate::registry::{DeviceProvider, PortInfo, Transport};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How an event wait can observe a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollSource {
    Closed,
    Handle(NativeHandle),
    Probe(EventMask),
}

/// An addressable serial endpoint.
///
/// # Example
/// ```
/// use serial_core::{MockProvider, OpenMode, PortRegistry};
/// use std::sync::Arc;
///
/// let provider = Arc::new(MockProvider::new());
/// let device = provider.add_native("MOCK0");
/// let registry = PortRegistry::with_provider(provider);
///
/// let port = registry.by_name("MOCK0").unwrap();
/// port.open(OpenMode::READ_WRITE).unwrap();
/// port.blocking_write(b"AT\r", 100).unwrap();
/// assert_eq!(device.written_bytes(), b"AT\r");
/// port.close().unwrap();
/// ```
#[derive(Debug)]
pub struct Port {
    info: PortInfo,
    provider: Arc<dyn DeviceProvider>,
    state: Mutex<PortState>,
}

impl Port {
    pub(crate) fn new(info: PortInfo, provider: Arc<dyn DeviceProvider>) -> Self {
        Self {
            info,
            provider,
            state: Mutex::new(PortState::Closed),
        }
    }

    /// A closed port with the same identity and backend.
    pub(crate) fn detached_copy(&self) -> Self {
        Self::new(self.info.clone(), Arc::clone(&self.provider))
    }

    // ---- identity ----------------------------------------------------------

    pub fn info(&self) -> &PortInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn description(&self) -> &str {
        &self.info.description
    }

    pub fn transport(&self) -> Transport {
        self.info.transport
    }

    /// USB vendor and product ID.
    pub fn usb_vid_pid(&self) -> Result<(u16, u16)> {
        track("usb_vid_pid", || match &self.info.usb {
            Some(usb) => Ok((usb.vid, usb.pid)),
            None => Err(Error::invalid_arg(format!(
                "{} is not a USB port",
                self.info.name
            ))),
        })
    }

    /// USB bus number and device address.
    pub fn usb_bus_address(&self) -> Result<(u32, u32)> {
        track("usb_bus_address", || {
            match self.info.usb.as_ref().and_then(|usb| usb.bus.zip(usb.address)) {
                Some(location) => Ok(location),
                None => Err(Error::unsupported(format!(
                    "bus location of {} is not known",
                    self.info.name
                ))),
            }
        })
    }

    pub fn usb_manufacturer(&self) -> Option<&str> {
        self.info.usb.as_ref()?.manufacturer.as_deref()
    }

    pub fn usb_product(&self) -> Option<&str> {
        self.info.usb.as_ref()?.product.as_deref()
    }

    pub fn usb_serial(&self) -> Option<&str> {
        self.info.usb.as_ref()?.serial_number.as_deref()
    }

    /// The OS descriptor, or `None` while closed or for devices without one.
    pub fn native_handle(&self) -> Option<NativeHandle> {
        match &*self.state.lock() {
            PortState::Open { device, .. } => device.native_handle(),
            PortState::Closed => None,
        }
    }

    // ---- lifecycle ---------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.state.lock().is_open()
    }

    /// Mode the port was opened with.
    pub fn mode(&self) -> Option<OpenMode> {
        match &*self.state.lock() {
            PortState::Open { mode, .. } => Some(*mode),
            PortState::Closed => None,
        }
    }

    /// Open the device. The port must be closed.
    pub fn open(&self, mode: OpenMode) -> Result<()> {
        track("open", || {
            if mode.is_empty() {
                return Err(Error::invalid_arg("open mode must request read or write"));
            }
            let mut state = self.state.lock();
            if state.is_open() {
                return Err(Error::invalid_arg(format!(
                    "{} is already open",
                    self.info.name
                )));
            }
            let device = self.provider.open(&self.info.name).map_err(|e| {
                tracing::warn!(port = %self.info.name, error = %e, "Failed to open port");
                Error::from(e)
            })?;
            *state = PortState::opened(device, mode);
            tracing::info!(port = %self.info.name, ?mode, "Port opened");
            Ok(())
        })
    }

    /// Close the device. The port must be open.
    pub fn close(&self) -> Result<()> {
        track("close", || {
            let mut state = self.state.lock();
            match std::mem::take(&mut *state) {
                PortState::Open {
                    bytes_read_total,
                    bytes_written_total,
                    ..
                } => {
                    tracing::info!(
                        port = %self.info.name,
                        bytes_read_total,
                        bytes_written_total,
                        "Port closed"
                    );
                    Ok(())
                }
                PortState::Closed => Err(not_open(&self.info.name)),
            }
        })
    }

    pub fn stats(&self) -> Result<PortStats> {
        track("stats", || {
            self.state
                .lock()
                .stats()
                .ok_or_else(|| not_open(&self.info.name))
        })
    }

    fn with_device<T>(&self, f: impl FnOnce(&mut PortAdapter) -> Result<T>) -> Result<T> {
        match &mut *self.state.lock() {
            PortState::Open { device, .. } => f(device),
            PortState::Closed => Err(not_open(&self.info.name)),
        }
    }

    // ---- configuration -----------------------------------------------------

    /// Snapshot of the live line settings.
    pub fn read_config(&self) -> Result<PortConfig> {
        track("read_config", || {
            self.with_device(|device| Ok(device.settings()?))
        })
    }

    /// Apply every specified field of `config`.
    pub fn apply_config(&self, config: &PortConfig) -> Result<()> {
        track("apply_config", || self.apply(config))
    }

    fn apply(&self, config: &PortConfig) -> Result<()> {
        self.with_device(|device| {
            device.apply_settings(config)?;
            tracing::debug!(port = %self.info.name, ?config, "Applied port configuration");
            Ok(())
        })
    }

    pub fn set_baud_rate(&self, baud_rate: u32) -> Result<()> {
        track("set_baud_rate", || {
            let mut config = PortConfig::new();
            config.set_baud_rate(baud_rate)?;
            self.apply(&config)
        })
    }

    pub fn set_data_bits(&self, bits: DataBits) -> Result<()> {
        track("set_data_bits", || {
            self.apply(&PortConfig::new().with_data_bits(bits))
        })
    }

    pub fn set_parity(&self, parity: Parity) -> Result<()> {
        track("set_parity", || {
            self.apply(&PortConfig::new().with_parity(parity))
        })
    }

    pub fn set_stop_bits(&self, stop_bits: StopBits) -> Result<()> {
        track("set_stop_bits", || {
            self.apply(&PortConfig::new().with_stop_bits(stop_bits))
        })
    }

    pub fn set_rts(&self, rts: Rts) -> Result<()> {
        track("set_rts", || self.apply(&PortConfig::new().with_rts(rts)))
    }

    pub fn set_cts(&self, cts: Cts) -> Result<()> {
        track("set_cts", || self.apply(&PortConfig::new().with_cts(cts)))
    }

    pub fn set_dtr(&self, dtr: Dtr) -> Result<()> {
        track("set_dtr", || self.apply(&PortConfig::new().with_dtr(dtr)))
    }

    pub fn set_dsr(&self, dsr: Dsr) -> Result<()> {
        track("set_dsr", || self.apply(&PortConfig::new().with_dsr(dsr)))
    }

    pub fn set_xon_xoff(&self, xon_xoff: XonXoff) -> Result<()> {
        track("set_xon_xoff", || {
            self.apply(&PortConfig::new().with_xon_xoff(xon_xoff))
        })
    }

    /// Apply a flow-control preset on top of the live settings.
    pub fn set_flow_control(&self, preset: FlowControl) -> Result<()> {
        track("set_flow_control", || {
            self.with_device(|device| {
                let mut config = device.settings()?;
                config.set_flow_control(preset);
                device.apply_settings(&config)?;
                Ok(())
            })
        })
    }

    // ---- data transfer -----------------------------------------------------

    /// Read until `buffer` is full or `timeout_ms` elapses. Zero waits forever.
    pub fn blocking_read(&self, buffer: &mut [u8], timeout_ms: u32) -> Result<usize> {
        track("blocking_read", || {
            let len = buffer.len();
            self.transfer(OpenMode::READ, Some(timeout_ms), len, |device, step, done| {
                device.read_bytes(&mut buffer[done..], step)
            })
        })
    }

    /// Read whatever is already available.
    pub fn nonblocking_read(&self, buffer: &mut [u8]) -> Result<usize> {
        track("nonblocking_read", || {
            let len = buffer.len();
            self.transfer(OpenMode::READ, None, len, |device, _, done| {
                device.read_bytes(&mut buffer[done..], Duration::ZERO)
            })
        })
    }

    /// Write all of `data` or until `timeout_ms` elapses. Zero waits forever.
    pub fn blocking_write(&self, data: &[u8], timeout_ms: u32) -> Result<usize> {
        track("blocking_write", || {
            self.transfer(OpenMode::WRITE, Some(timeout_ms), data.len(), |device, step, done| {
                device.write_bytes(&data[done..], step)
            })
        })
    }

    /// Write as much of `data` as the device accepts right now.
    pub fn nonblocking_write(&self, data: &[u8]) -> Result<usize> {
        track("nonblocking_write", || {
            self.transfer(OpenMode::WRITE, None, data.len(), |device, _, done| {
                device.write_bytes(&data[done..], Duration::ZERO)
            })
        })
    }

    /// Drive `step_fn` until `len` bytes have moved or time runs out.
    ///
    /// `timeout_ms` of `None` makes a single non-blocking attempt.
    fn transfer(
        &self,
        direction: OpenMode,
        timeout_ms: Option<u32>,
        len: usize,
        mut step_fn: impl FnMut(&mut PortAdapter, Duration, usize) -> std::result::Result<usize, PortError>,
    ) -> Result<usize> {
        let slice = crate::config::global().io.blocking_slice();
        let mut state = self.state.lock();
        let PortState::Open {
            device,
            mode,
            bytes_read_total,
            bytes_written_total,
            ..
        } = &mut *state
        else {
            return Err(not_open(&self.info.name));
        };
        if !mode.contains(direction) {
            return Err(Error::invalid_arg(format!(
                "{} was not opened for {}",
                self.info.name,
                if direction == OpenMode::READ { "reading" } else { "writing" }
            )));
        }
        let total = if direction == OpenMode::READ {
            bytes_read_total
        } else {
            bytes_written_total
        };

        let deadline = match timeout_ms {
            Some(0) => None,
            Some(ms) => Some(Instant::now() + Duration::from_millis(u64::from(ms))),
            None => {
                let n = if len == 0 { 0 } else { step_fn(device, Duration::ZERO, 0)? };
                *total += n as u64;
                return Ok(n);
            }
        };

        let mut done = 0;
        while done < len {
            let step = match deadline {
                None => slice,
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        break;
                    }
                    remaining
                }
            };
            let n = step_fn(device, step, done)?;
            done += n;
            *total += n as u64;
        }
        tracing::trace!(port = %self.info.name, bytes = done, requested = len, "Blocking transfer finished");
        Ok(done)
    }

    // ---- line and buffer control -------------------------------------------

    pub fn bytes_waiting(&self, direction: Direction) -> Result<usize> {
        track("bytes_waiting", || {
            self.with_device(|device| {
                Ok(match direction {
                    Direction::Input => device.bytes_to_read()?,
                    Direction::Output => device.bytes_to_write()?,
                })
            })
        })
    }

    /// Bytes received but not yet read.
    pub fn input_waiting(&self) -> Result<usize> {
        self.bytes_waiting(Direction::Input)
    }

    /// Bytes queued but not yet transmitted.
    pub fn output_waiting(&self) -> Result<usize> {
        self.bytes_waiting(Direction::Output)
    }

    pub fn signals(&self) -> Result<Signals> {
        track("signals", || self.with_device(|device| Ok(device.signals()?)))
    }

    pub fn start_break(&self) -> Result<()> {
        track("start_break", || {
            self.with_device(|device| Ok(device.set_break(true)?))
        })
    }

    pub fn end_break(&self) -> Result<()> {
        track("end_break", || {
            self.with_device(|device| Ok(device.set_break(false)?))
        })
    }

    /// Discard buffered data.
    pub fn flush(&self, buffers: Buffers) -> Result<()> {
        track("flush", || {
            self.with_device(|device| Ok(device.clear_buffers(buffers)?))
        })
    }

    /// Wait until all queued output has been transmitted.
    pub fn drain(&self) -> Result<()> {
        track("drain", || self.with_device(|device| Ok(device.drain()?)))
    }

    // ---- readiness ---------------------------------------------------------

    /// How a wait should observe this port right now.
    ///
    /// A port busy in another thread reports no readiness for this round.
    pub(crate) fn poll_source(&self, allow_handle: bool) -> PollSource {
        let Some(state) = self.state.try_lock() else {
            return PollSource::Probe(EventMask::empty());
        };
        match &*state {
            PortState::Closed => PollSource::Closed,
            PortState::Open { device, .. } => match device.native_handle() {
                Some(handle) if allow_handle => PollSource::Handle(handle),
                _ => PollSource::Probe(device.readiness()),
            },
        }
    }
}

impl Drop for Port {
    fn drop(&mut self) {
        if self.state.get_mut().is_open() {
            tracing::debug!(port = %self.info.name, "Closing port on drop");
        }
    }
}

fn not_open(name: &str) -> Error {
    Error::invalid_arg(format!("{name} is not open"))
}
