//! Native serial port adapter.
//!
//! Wraps the `serialport` crate's platform port type (`TTYPort` on Unix,
//! `COMPort` on Windows) behind `SerialPortAdapter`.

use super::config::{Cts, DataBits, Dsr, Dtr, Parity, PortConfig, Rts, StopBits, XonXoff};
use super::error::PortError;
use super::flags::{Buffers, Signals};
use super::traits::{NativeHandle, SerialPortAdapter};
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;

#[cfg(unix)]
type PlatformPort = serialport::TTYPort;

#[cfg(windows)]
type PlatformPort = serialport::COMPort;

/// Baud rate a port is opened at before any config is applied.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

// A zero write timeout means "no timeout" to the Windows driver.
#[cfg(windows)]
const MIN_WRITE_TIMEOUT: Duration = Duration::from_millis(1);
#[cfg(not(windows))]
const MIN_WRITE_TIMEOUT: Duration = Duration::ZERO;

const AVAILABLE_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// An open OS serial device.
pub struct NativeSerialPort {
    port: PlatformPort,
    name: String,
    timeout: Duration,
    /// Last level written to RTS, when not under flow control.
    rts: Option<bool>,
    /// Last level written to DTR, when not under flow control.
    dtr: Option<bool>,
}

impl NativeSerialPort {
    /// Open `port_name` in raw mode at 9600 8N1 without flow control.
    pub fn open(port_name: &str) -> Result<Self, PortError> {
        let timeout = Duration::ZERO;
        let port = serialport::new(port_name, DEFAULT_BAUD_RATE)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(timeout)
            .open_native()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(port_name),
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        Ok(Self {
            port,
            name: port_name.to_string(),
            timeout,
            rts: None,
            dtr: None,
        })
    }

    fn ensure_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        if self.timeout != timeout {
            self.port.set_timeout(timeout)?;
            self.timeout = timeout;
        }
        Ok(())
    }

    pub fn as_raw(&self) -> &dyn SerialPort {
        &self.port
    }
}

fn transferred(result: std::io::Result<usize>) -> Result<usize, PortError> {
    match result {
        Ok(n) => Ok(n),
        Err(e)
            if matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::Interrupted
            ) =>
        {
            Ok(0)
        }
        Err(e) => Err(PortError::Io(e)),
    }
}

fn to_data_bits(bits: DataBits) -> Result<serialport::DataBits, PortError> {
    match bits {
        DataBits::Five => Ok(serialport::DataBits::Five),
        DataBits::Six => Ok(serialport::DataBits::Six),
        DataBits::Seven => Ok(serialport::DataBits::Seven),
        DataBits::Eight => Ok(serialport::DataBits::Eight),
        DataBits::Nine => Err(PortError::unsupported("9 data bits")),
    }
}

fn from_data_bits(bits: serialport::DataBits) -> DataBits {
    match bits {
        serialport::DataBits::Five => DataBits::Five,
        serialport::DataBits::Six => DataBits::Six,
        serialport::DataBits::Seven => DataBits::Seven,
        serialport::DataBits::Eight => DataBits::Eight,
    }
}

fn to_parity(parity: Parity) -> Result<serialport::Parity, PortError> {
    match parity {
        Parity::None => Ok(serialport::Parity::None),
        Parity::Odd => Ok(serialport::Parity::Odd),
        Parity::Even => Ok(serialport::Parity::Even),
        Parity::Mark | Parity::Space => Err(PortError::unsupported(format!(
            "{parity:?} parity"
        ))),
    }
}

fn from_parity(parity: serialport::Parity) -> Parity {
    match parity {
        serialport::Parity::None => Parity::None,
        serialport::Parity::Odd => Parity::Odd,
        serialport::Parity::Even => Parity::Even,
    }
}

fn to_stop_bits(stop_bits: StopBits) -> serialport::StopBits {
    match stop_bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}

fn from_stop_bits(stop_bits: serialport::StopBits) -> StopBits {
    match stop_bits {
        serialport::StopBits::One => StopBits::One,
        serialport::StopBits::Two => StopBits::Two,
    }
}

/// Map the five flow-control fields onto the three modes `serialport` offers.
fn to_flow_control(config: &PortConfig) -> Result<serialport::FlowControl, PortError> {
    if config.dtr() == Some(Dtr::FlowControl) || config.dsr() == Some(Dsr::FlowControl) {
        return Err(PortError::unsupported("DTR/DSR flow control"));
    }
    let rts_flow = config.rts() == Some(Rts::FlowControl);
    let cts_flow = config.cts() == Some(Cts::FlowControl);
    if rts_flow != cts_flow {
        return Err(PortError::unsupported(
            "RTS and CTS flow control must be enabled together",
        ));
    }
    let software = match config.xon_xoff() {
        Some(XonXoff::In) | Some(XonXoff::Out) => {
            return Err(PortError::unsupported("one-directional XON/XOFF"))
        }
        Some(XonXoff::InOut) => true,
        Some(XonXoff::Disabled) | None => false,
    };
    match (rts_flow, software) {
        (true, true) => Err(PortError::unsupported(
            "combined hardware and software flow control",
        )),
        (true, false) => Ok(serialport::FlowControl::Hardware),
        (false, true) => Ok(serialport::FlowControl::Software),
        (false, false) => Ok(serialport::FlowControl::None),
    }
}

fn touches_flow(config: &PortConfig) -> bool {
    config.rts().is_some()
        || config.cts().is_some()
        || config.dtr().is_some()
        || config.dsr().is_some()
        || config.xon_xoff().is_some()
}

impl SerialPortAdapter for NativeSerialPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<usize, PortError> {
        if buffer.is_empty() {
            return Ok(0);
        }
        let limit = if timeout.is_zero() {
            let available = self.port.bytes_to_read()? as usize;
            if available == 0 {
                return Ok(0);
            }
            self.ensure_timeout(AVAILABLE_READ_TIMEOUT)?;
            available.min(buffer.len())
        } else {
            self.ensure_timeout(timeout)?;
            buffer.len()
        };
        transferred(self.port.read(&mut buffer[..limit]))
    }

    fn write_bytes(&mut self, data: &[u8], timeout: Duration) -> Result<usize, PortError> {
        if data.is_empty() {
            return Ok(0);
        }
        self.ensure_timeout(timeout.max(MIN_WRITE_TIMEOUT))?;
        transferred(self.port.write(data))
    }

    fn bytes_to_read(&self) -> Result<usize, PortError> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn bytes_to_write(&self) -> Result<usize, PortError> {
        Ok(self.port.bytes_to_write()? as usize)
    }

    fn settings(&self) -> Result<PortConfig, PortError> {
        let mut config = PortConfig::new()
            .with_data_bits(from_data_bits(self.port.data_bits()?))
            .with_parity(from_parity(self.port.parity()?))
            .with_stop_bits(from_stop_bits(self.port.stop_bits()?))
            .with_dsr(Dsr::Ignore);
        config
            .set_baud_rate(self.port.baud_rate()?)
            .map_err(|e| PortError::config(e.to_string()))?;

        match self.port.flow_control()? {
            serialport::FlowControl::Hardware => {
                config.set_rts(Rts::FlowControl);
                config.set_cts(Cts::FlowControl);
                config.set_xon_xoff(XonXoff::Disabled);
            }
            serialport::FlowControl::Software => {
                config.set_cts(Cts::Ignore);
                config.set_xon_xoff(XonXoff::InOut);
            }
            serialport::FlowControl::None => {
                config.set_cts(Cts::Ignore);
                config.set_xon_xoff(XonXoff::Disabled);
            }
        }
        if config.rts().is_none() {
            if let Some(level) = self.rts {
                config.set_rts(if level { Rts::On } else { Rts::Off });
            }
        }
        if let Some(level) = self.dtr {
            config.set_dtr(if level { Dtr::On } else { Dtr::Off });
        }
        Ok(config)
    }

    fn apply_settings(&mut self, config: &PortConfig) -> Result<(), PortError> {
        let data_bits = config.data_bits().map(to_data_bits).transpose()?;
        let parity = config.parity().map(to_parity).transpose()?;
        let flow = if touches_flow(config) {
            let merged = self.settings()?.merged(config);
            Some(to_flow_control(&merged)?)
        } else {
            None
        };

        if let Some(baud) = config.baud_rate() {
            self.port.set_baud_rate(baud)?;
        }
        if let Some(bits) = data_bits {
            self.port.set_data_bits(bits)?;
        }
        if let Some(parity) = parity {
            self.port.set_parity(parity)?;
        }
        if let Some(stop_bits) = config.stop_bits() {
            self.port.set_stop_bits(to_stop_bits(stop_bits))?;
        }
        if let Some(flow) = flow {
            self.port.set_flow_control(flow)?;
        }
        match config.rts() {
            Some(Rts::On) | Some(Rts::Off) => {
                let level = config.rts() == Some(Rts::On);
                self.port.write_request_to_send(level)?;
                self.rts = Some(level);
            }
            Some(Rts::FlowControl) => self.rts = None,
            None => {}
        }
        if let Some(Dtr::On | Dtr::Off) = config.dtr() {
            let level = config.dtr() == Some(Dtr::On);
            self.port.write_data_terminal_ready(level)?;
            self.dtr = Some(level);
        }
        Ok(())
    }

    fn signals(&mut self) -> Result<Signals, PortError> {
        let mut signals = Signals::empty();
        signals.set(Signals::CTS, self.port.read_clear_to_send()?);
        signals.set(Signals::DSR, self.port.read_data_set_ready()?);
        signals.set(Signals::DCD, self.port.read_carrier_detect()?);
        signals.set(Signals::RI, self.port.read_ring_indicator()?);
        Ok(signals)
    }

    fn set_break(&mut self, asserted: bool) -> Result<(), PortError> {
        if asserted {
            self.port.set_break()?;
        } else {
            self.port.clear_break()?;
        }
        Ok(())
    }

    fn clear_buffers(&mut self, buffers: Buffers) -> Result<(), PortError> {
        self.port.clear(buffers.into()).map_err(PortError::Serial)
    }

    fn drain(&mut self) -> Result<(), PortError> {
        self.port.flush().map_err(PortError::Io)
    }

    #[cfg(unix)]
    fn native_handle(&self) -> Option<NativeHandle> {
        use std::os::unix::io::AsRawFd;
        Some(self.port.as_raw_fd())
    }

    #[cfg(windows)]
    fn native_handle(&self) -> Option<NativeHandle> {
        use std::os::windows::io::AsRawHandle;
        Some(self.port.as_raw_handle())
    }
}

impl std::fmt::Debug for NativeSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeSerialPort")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate().ok())
            .finish()
    }
}
