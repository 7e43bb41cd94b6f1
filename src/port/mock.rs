//! In-memory serial device for tests and simulation.
//!
//! Every clone of a `MockSerialPort` shares one device state, so a test can keep
//! a handle to feed input and inspect output while a `Port` drives another clone
//! through `SerialPortAdapter`.

use super::config::{Cts, DataBits, Dsr, Dtr, Parity, PortConfig, Rts, StopBits, XonXoff};
use super::error::PortError;
use super::flags::{Buffers, Signals};
use super::traits::SerialPortAdapter;
use crate::events::EventMask;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct MockPortState {
    /// Bytes waiting to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Every successful write, in order.
    write_log: Vec<Vec<u8>>,
    /// Live line settings.
    settings: PortConfig,
    signals: Signals,
    break_asserted: bool,
    /// Whether writes are currently accepted.
    writable: bool,
    /// Echo written bytes back into the read queue.
    loopback: bool,
    /// Error returned by the next I/O call.
    pending_fault: Option<std::io::ErrorKind>,
    /// Whether readiness reports an error condition.
    error_condition: bool,
    buffers_cleared: bool,
    drain_count: u32,
    open_count: u32,
}

impl Default for MockPortState {
    fn default() -> Self {
        let mut settings = PortConfig::new()
            .with_data_bits(DataBits::Eight)
            .with_parity(Parity::None)
            .with_stop_bits(StopBits::One)
            .with_rts(Rts::On)
            .with_cts(Cts::Ignore)
            .with_dtr(Dtr::On)
            .with_dsr(Dsr::Ignore)
            .with_xon_xoff(XonXoff::Disabled);
        let _ = settings.set_baud_rate(super::native::DEFAULT_BAUD_RATE);
        Self {
            read_queue: VecDeque::new(),
            write_log: Vec::new(),
            settings,
            signals: Signals::empty(),
            break_asserted: false,
            writable: true,
            loopback: false,
            pending_fault: None,
            error_condition: false,
            buffers_cleared: false,
            drain_count: 0,
            open_count: 0,
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<MockPortState>,
    /// Signalled whenever input arrives or the device becomes writable.
    changed: Condvar,
}

/// Mock serial device.
///
/// # Example
/// ```
/// use serial_core::port::{MockSerialPort, SerialPortAdapter};
/// use std::time::Duration;
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"Hello, World!");
///
/// let mut buffer = [0u8; 13];
/// let n = port.read_bytes(&mut buffer, Duration::ZERO).unwrap();
/// assert_eq!(&buffer[..n], b"Hello, World!");
///
/// port.write_bytes(b"Response", Duration::ZERO).unwrap();
/// assert_eq!(port.get_write_log(), vec![b"Response".to_vec()]);
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    shared: Arc<Shared>,
}

impl MockSerialPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Shared::default()),
        }
    }

    /// Append bytes to the read queue and wake blocked readers.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.shared.state.lock().read_queue.extend(data);
        self.shared.changed.notify_all();
    }

    /// Get a copy of all data written to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.shared.state.lock().write_log.clone()
    }

    /// All written bytes concatenated.
    pub fn written_bytes(&self) -> Vec<u8> {
        self.shared.state.lock().write_log.concat()
    }

    pub fn clear_write_log(&self) {
        self.shared.state.lock().write_log.clear();
    }

    /// Stop or resume accepting writes.
    pub fn set_writable(&self, writable: bool) {
        self.shared.state.lock().writable = writable;
        self.shared.changed.notify_all();
    }

    /// Echo every write back as input.
    pub fn set_loopback(&self, loopback: bool) {
        self.shared.state.lock().loopback = loopback;
    }

    /// Make the next I/O call fail with `kind`.
    pub fn fail_next(&self, kind: std::io::ErrorKind) {
        self.shared.state.lock().pending_fault = Some(kind);
    }

    /// Report (or stop reporting) an error condition to readiness probes.
    pub fn set_error_condition(&self, error: bool) {
        self.shared.state.lock().error_condition = error;
        self.shared.changed.notify_all();
    }

    pub fn set_signals(&self, signals: Signals) {
        self.shared.state.lock().signals = signals;
    }

    pub fn break_asserted(&self) -> bool {
        self.shared.state.lock().break_asserted
    }

    /// Live settings as last applied.
    pub fn current_settings(&self) -> PortConfig {
        self.shared.state.lock().settings.clone()
    }

    pub fn was_cleared(&self) -> bool {
        self.shared.state.lock().buffers_cleared
    }

    pub fn drain_count(&self) -> u32 {
        self.shared.state.lock().drain_count
    }

    pub fn available_bytes(&self) -> usize {
        self.shared.state.lock().read_queue.len()
    }

    /// How many times a provider has opened this device.
    pub fn open_count(&self) -> u32 {
        self.shared.state.lock().open_count
    }

    pub(crate) fn mark_opened(&self) {
        self.shared.state.lock().open_count += 1;
    }

    /// Block until the state changes. Returns true once `deadline` passes; a
    /// deadline beyond what `Instant` can hold never expires.
    fn wait_changed(
        &self,
        state: &mut MutexGuard<'_, MockPortState>,
        deadline: Option<Instant>,
    ) -> bool {
        match deadline {
            Some(deadline) => self.shared.changed.wait_until(state, deadline).timed_out(),
            None => {
                self.shared.changed.wait(state);
                false
            }
        }
    }

    fn take_fault(state: &mut MockPortState) -> Result<(), PortError> {
        match state.pending_fault.take() {
            Some(kind) => Err(PortError::Io(std::io::Error::new(kind, "injected fault"))),
            None => Ok(()),
        }
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<usize, PortError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.shared.state.lock();
        Self::take_fault(&mut state)?;

        while state.read_queue.is_empty() && !buffer.is_empty() {
            if self.wait_changed(&mut state, deadline) {
                break;
            }
        }

        let n = buffer.len().min(state.read_queue.len());
        for (slot, byte) in buffer.iter_mut().zip(state.read_queue.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_bytes(&mut self, data: &[u8], timeout: Duration) -> Result<usize, PortError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.shared.state.lock();
        Self::take_fault(&mut state)?;

        while !state.writable {
            if self.wait_changed(&mut state, deadline) {
                return Ok(0);
            }
        }
        if data.is_empty() {
            return Ok(0);
        }

        state.write_log.push(data.to_vec());
        if state.loopback {
            state.read_queue.extend(data);
            self.shared.changed.notify_all();
        }
        Ok(data.len())
    }

    fn bytes_to_read(&self) -> Result<usize, PortError> {
        Ok(self.shared.state.lock().read_queue.len())
    }

    fn bytes_to_write(&self) -> Result<usize, PortError> {
        // Writes complete immediately.
        Ok(0)
    }

    fn settings(&self) -> Result<PortConfig, PortError> {
        Ok(self.shared.state.lock().settings.clone())
    }

    fn apply_settings(&mut self, config: &PortConfig) -> Result<(), PortError> {
        let mut state = self.shared.state.lock();
        Self::take_fault(&mut state)?;
        state.settings.merge(config);
        Ok(())
    }

    fn signals(&mut self) -> Result<Signals, PortError> {
        let mut state = self.shared.state.lock();
        Self::take_fault(&mut state)?;
        Ok(state.signals)
    }

    fn set_break(&mut self, asserted: bool) -> Result<(), PortError> {
        let mut state = self.shared.state.lock();
        Self::take_fault(&mut state)?;
        state.break_asserted = asserted;
        Ok(())
    }

    fn clear_buffers(&mut self, buffers: Buffers) -> Result<(), PortError> {
        let mut state = self.shared.state.lock();
        Self::take_fault(&mut state)?;
        if matches!(buffers, Buffers::Input | Buffers::Both) {
            state.read_queue.clear();
        }
        state.buffers_cleared = true;
        Ok(())
    }

    fn drain(&mut self) -> Result<(), PortError> {
        let mut state = self.shared.state.lock();
        Self::take_fault(&mut state)?;
        state.drain_count += 1;
        Ok(())
    }

    fn readiness(&self) -> EventMask {
        let state = self.shared.state.lock();
        let mut ready = EventMask::empty();
        ready.set(EventMask::READABLE, !state.read_queue.is_empty());
        ready.set(EventMask::WRITABLE, state.writable);
        ready.set(EventMask::ERROR, state.error_condition);
        ready
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_and_read() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"Hello");

        let mut buffer = [0u8; 10];
        let n = port.read_bytes(&mut buffer, Duration::ZERO).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buffer[..n], b"Hello");
    }

    #[test]
    fn test_partial_read() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"Hello, World!");

        let mut buffer = [0u8; 5];
        let n = port.read_bytes(&mut buffer, Duration::ZERO).unwrap();
        assert_eq!(&buffer[..n], b"Hello");
        assert_eq!(port.available_bytes(), 8);
    }

    #[test]
    fn test_empty_read_times_out_with_zero() {
        let mut port = MockSerialPort::new("MOCK0");
        let mut buffer = [0u8; 10];
        let started = Instant::now();
        let n = port
            .read_bytes(&mut buffer, Duration::from_millis(20))
            .unwrap();
        assert_eq!(n, 0);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_blocked_read_wakes_on_input() {
        let mut port = MockSerialPort::new("MOCK0");
        let feeder = port.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            feeder.enqueue_read(b"late");
        });

        let mut buffer = [0u8; 4];
        let n = port.read_bytes(&mut buffer, Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
        assert_eq!(&buffer[..n], b"late");
    }

    #[test]
    fn test_write_logging_and_loopback() {
        let mut port = MockSerialPort::new("MOCK0");
        port.set_loopback(true);
        port.write_bytes(b"Test1", Duration::ZERO).unwrap();
        port.write_bytes(b"Test2", Duration::ZERO).unwrap();

        assert_eq!(port.get_write_log(), vec![b"Test1".to_vec(), b"Test2".to_vec()]);
        assert_eq!(port.available_bytes(), 10);
    }

    #[test]
    fn test_unwritable_device_accepts_nothing() {
        let mut port = MockSerialPort::new("MOCK0");
        port.set_writable(false);
        assert_eq!(port.write_bytes(b"x", Duration::ZERO).unwrap(), 0);
        assert!(port.get_write_log().is_empty());
        assert!(!port.readiness().contains(EventMask::WRITABLE));
    }

    #[test]
    fn test_injected_fault() {
        let mut port = MockSerialPort::new("MOCK0");
        port.fail_next(std::io::ErrorKind::BrokenPipe);

        let mut buffer = [0u8; 4];
        assert!(matches!(
            port.read_bytes(&mut buffer, Duration::ZERO),
            Err(PortError::Io(_))
        ));
        assert!(port.read_bytes(&mut buffer, Duration::ZERO).is_ok());
    }

    #[test]
    fn test_injected_fault_fails_flush() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"kept");
        port.fail_next(std::io::ErrorKind::BrokenPipe);

        assert!(port.clear_buffers(Buffers::Both).is_err());
        assert!(!port.was_cleared());
        assert_eq!(port.available_bytes(), 4);
        assert!(port.drain().is_ok());
    }

    #[test]
    fn test_unbounded_timeout_waits_for_input() {
        let mut port = MockSerialPort::new("MOCK0");
        let feeder = port.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            feeder.enqueue_read(b"late");
        });

        let mut buffer = [0u8; 4];
        assert_eq!(port.read_bytes(&mut buffer, Duration::MAX).unwrap(), 4);
        assert_eq!(&buffer, b"late");
        assert_eq!(port.write_bytes(b"x", Duration::MAX).unwrap(), 1);
        handle.join().unwrap();
    }

    #[test]
    fn test_clear_buffers() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"Should be cleared");

        port.clear_buffers(Buffers::Input).unwrap();
        assert!(port.was_cleared());
        assert_eq!(port.available_bytes(), 0);
    }

    #[test]
    fn test_apply_settings_merges() {
        let mut port = MockSerialPort::new("MOCK0");
        let update = PortConfig::new().with_parity(Parity::Mark);
        port.apply_settings(&update).unwrap();

        let live = port.settings().unwrap();
        assert_eq!(live.parity(), Some(Parity::Mark));
        assert_eq!(live.baud_rate(), Some(9600));
        assert_eq!(live.data_bits(), Some(DataBits::Eight));
    }
}
