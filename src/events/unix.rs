use super::EventMask;
use crate::error::{Error, Result};
use crate::port::NativeHandle;
use std::time::Duration;

pub(super) const HANDLE_POLLING: bool = true;

fn timeout_ms(timeout: Option<Duration>) -> libc::c_int {
    match timeout {
        None => -1,
        Some(timeout) => {
            let mut ms = timeout.as_millis();
            if Duration::from_millis(ms as u64) < timeout {
                ms += 1;
            }
            ms.min(libc::c_int::MAX as u128) as libc::c_int
        }
    }
}

/// Poll `handles` once. `true` when any descriptor reported an event.
///
/// Error conditions are always reported by the kernel, whatever the mask.
pub(super) fn poll_handles(
    handles: &[(NativeHandle, EventMask)],
    timeout: Option<Duration>,
) -> Result<bool> {
    if handles.is_empty() {
        if let Some(timeout) = timeout {
            std::thread::sleep(timeout);
        }
        return Ok(false);
    }

    let mut fds: Vec<libc::pollfd> = handles
        .iter()
        .map(|&(fd, mask)| {
            let mut events = 0;
            if mask.contains(EventMask::READABLE) {
                events |= libc::POLLIN;
            }
            if mask.contains(EventMask::WRITABLE) {
                events |= libc::POLLOUT;
            }
            libc::pollfd {
                fd,
                events,
                revents: 0,
            }
        })
        .collect();

    let n = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms(timeout)) };
    if n < 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() == std::io::ErrorKind::Interrupted {
            // The caller retries with the remaining time.
            return Ok(false);
        }
        return Err(Error::os("poll() failed", err));
    }
    Ok(n > 0)
}
