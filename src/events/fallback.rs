use super::EventMask;
use crate::error::Result;
use crate::port::NativeHandle;
use std::time::Duration;

/// Descriptors are never polled here; every port is probed instead.
pub(super) const HANDLE_POLLING: bool = false;

pub(super) fn poll_handles(
    _handles: &[(NativeHandle, EventMask)],
    timeout: Option<Duration>,
) -> Result<bool> {
    if let Some(timeout) = timeout {
        std::thread::sleep(timeout);
    }
    Ok(false)
}
