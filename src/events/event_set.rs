use super::{sys, EventMask};
use crate::diagnostics::track;
use crate::error::{Error, Result};
use crate::port::{NativeHandle, PollSource, Port};
use std::time::{Duration, Instant};

/// A set of (port, interest mask) registrations waited on together.
///
/// The set borrows the ports it watches; it never opens, closes or frees them.
///
/// # Example
/// ```
/// use serial_core::{EventMask, EventSet, MockProvider, OpenMode, PortRegistry};
/// use std::sync::Arc;
///
/// let provider = Arc::new(MockProvider::new());
/// let device = provider.add_native("MOCK0");
/// let port = PortRegistry::with_provider(provider).by_name("MOCK0").unwrap();
/// port.open(OpenMode::READ).unwrap();
///
/// let mut events = EventSet::new();
/// events.add_port_events(&port, EventMask::READABLE.bits()).unwrap();
/// assert!(!events.wait(0).unwrap());
///
/// device.enqueue_read(b"x");
/// assert!(events.wait(100).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct EventSet<'p> {
    entries: Vec<(&'p Port, EventMask)>,
}

impl<'p> EventSet<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `port` for `mask`, merging with any earlier registration.
    ///
    /// Bits outside `READABLE | WRITABLE | ERROR` are rejected and leave the
    /// set unchanged.
    pub fn add_port_events(&mut self, port: &'p Port, mask: u32) -> Result<()> {
        track("add_port_events", || {
            let mask = EventMask::from_bits(mask).ok_or_else(|| {
                Error::invalid_arg(format!("invalid event mask {mask:#x}"))
            })?;
            match self
                .entries
                .iter_mut()
                .find(|(existing, _)| std::ptr::eq(*existing, port))
            {
                Some((_, existing)) => *existing |= mask,
                None => self.entries.push((port, mask)),
            }
            Ok(())
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interest registered for `port`, if any.
    pub fn mask_for(&self, port: &Port) -> Option<EventMask> {
        self.entries
            .iter()
            .find(|(existing, _)| std::ptr::eq(*existing, port))
            .map(|(_, mask)| *mask)
    }

    /// Wait until a registered port is ready or `timeout_ms` elapses.
    ///
    /// Zero polls once; a negative timeout waits forever. Returns `true` when
    /// something became ready and `false` on timeout.
    pub fn wait(&self, timeout_ms: i32) -> Result<bool> {
        track("wait", || self.wait_inner(timeout_ms))
    }

    fn wait_inner(&self, timeout_ms: i32) -> Result<bool> {
        let started = Instant::now();
        let deadline = u64::try_from(timeout_ms)
            .ok()
            .map(|ms| started + Duration::from_millis(ms));
        let probe_interval = crate::config::global().io.wait_probe_interval();

        loop {
            let mut handles: Vec<(NativeHandle, EventMask)> = Vec::new();
            let mut probing = false;
            for &(port, mask) in &self.entries {
                match port.poll_source(sys::HANDLE_POLLING) {
                    PollSource::Closed => {}
                    PollSource::Handle(handle) => handles.push((handle, mask)),
                    PollSource::Probe(ready) => {
                        if ready.intersects(mask) {
                            tracing::trace!(port = port.name(), ?ready, "Port ready");
                            return Ok(true);
                        }
                        probing = true;
                    }
                }
            }

            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            let step = if probing || handles.is_empty() {
                Some(remaining.map_or(probe_interval, |r| r.min(probe_interval)))
            } else {
                remaining
            };
            if sys::poll_handles(&handles, step)? {
                return Ok(true);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::trace!(elapsed = ?started.elapsed(), "Event wait timed out");
                return Ok(false);
            }
        }
    }
}
