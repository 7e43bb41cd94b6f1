//! Process-wide debug sink.
//!
//! Internal diagnostics are always emitted as `tracing` events. In addition they
//! are handed to the installed [`DebugHandler`], which by default writes to
//! stderr when `[debug] enabled` is set. Installing or removing a handler while
//! other threads are logging is safe, but callers that swap handlers from
//! several threads must serialize those swaps themselves if ordering matters.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// A sink for formatted diagnostic lines.
pub type DebugHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Holds the currently installed handler for the life of the process.
struct DebugContext {
    handler: RwLock<Option<DebugHandler>>,
}

static CONTEXT: Lazy<DebugContext> = Lazy::new(|| DebugContext {
    handler: RwLock::new(Some(default_handler())),
});

fn default_handler() -> DebugHandler {
    Arc::new(|message: &str| default_debug_handler(Some(message)))
}

/// Install `handler`, or disable the sink with `None`. Returns the previous handler.
pub fn set_debug_handler(handler: Option<DebugHandler>) -> Option<DebugHandler> {
    std::mem::replace(&mut *CONTEXT.handler.write(), handler)
}

/// Reinstall the stderr handler.
pub fn restore_default_debug_handler() {
    set_debug_handler(Some(default_handler()));
}

/// Whether any handler is installed.
pub fn debug_handler_installed() -> bool {
    CONTEXT.handler.read().is_some()
}

/// Write `message` to stderr if debug output is enabled. `None` is ignored.
pub fn default_debug_handler(message: Option<&str>) {
    let Some(message) = message else {
        return;
    };
    if !crate::config::global().debug.enabled {
        return;
    }
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    let _ = writeln!(out, "sp: {message}");
}

/// Format and dispatch one diagnostic line.
pub fn emit(args: fmt::Arguments<'_>) {
    let message = args.to_string();
    tracing::debug!(target: "serial_core", "{}", message);

    // Clone out of the lock so a handler may itself swap handlers.
    let handler = CONTEXT.handler.read().clone();
    if let Some(handler) = handler {
        handler(&message);
    }
}

/// Emit an internal diagnostic through the debug sink.
#[doc(hidden)]
#[macro_export]
macro_rules! diag {
    ($($arg:tt)*) => {
        $crate::diagnostics::emit(format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serial_test::serial;

    fn capturing() -> (DebugHandler, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let handler: DebugHandler = Arc::new(move |msg: &str| sink.lock().push(msg.to_string()));
        (handler, lines)
    }

    #[test]
    #[serial]
    fn test_installed_handler_receives_messages() {
        let (handler, lines) = capturing();
        set_debug_handler(Some(handler));

        crate::diag!("opening {} at {}", "/dev/ttyS0", 9600);

        restore_default_debug_handler();
        assert!(lines
            .lock()
            .iter()
            .any(|l| l == "opening /dev/ttyS0 at 9600"));
    }

    #[test]
    #[serial]
    fn test_disabled_handler_drops_messages() {
        let (handler, lines) = capturing();
        let previous = set_debug_handler(Some(handler));
        assert!(previous.is_some());

        let captured = set_debug_handler(None).expect("capturing handler was installed");
        assert!(!debug_handler_installed());
        crate::diag!("nobody listens");

        restore_default_debug_handler();
        assert!(debug_handler_installed());
        assert!(!lines.lock().iter().any(|l| l == "nobody listens"));
        drop(captured);
    }

    #[test]
    fn test_default_handler_tolerates_absent_message() {
        default_debug_handler(None);
        default_debug_handler(Some("foo"));
        default_debug_handler(Some(&format!("{}", 100)));
    }
}
