//! Per-thread record of the last operation's outcome.

use crate::error::{Error, ErrorCode, Result};
use std::cell::RefCell;

/// Message returned when the calling thread has no recorded failure.
pub const NO_ERROR_MESSAGE: &str = "No error";

/// Outcome of the most recent fallible call made on one thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: Option<String>,
}

thread_local! {
    static CONTEXT: RefCell<ErrorContext> = RefCell::new(ErrorContext::default());
}

fn store(code: ErrorCode, message: Option<String>) {
    CONTEXT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        ctx.code = code;
        ctx.message = message;
    });
}

/// Record `result` as the calling thread's last outcome and hand it back.
pub(crate) fn record<T>(operation: &str, result: Result<T>) -> Result<T> {
    match &result {
        Ok(_) => store(ErrorCode::Ok, None),
        Err(e) => {
            let code = e.code();
            crate::diag!("{} returning {}: {}", operation, code, e);
            store(code, Some(e.to_string()));
        }
    }
    result
}

/// Run `f` and record its outcome under `operation`.
pub(crate) fn track<T>(operation: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    record(operation, f())
}

/// Record a failure detected before any work was attempted.
pub(crate) fn fail(operation: &str, err: Error) -> ErrorCode {
    let code = err.code();
    let _ = record::<()>(operation, Err(err));
    code
}

/// Snapshot of the calling thread's context.
pub fn last_error() -> ErrorContext {
    CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Code of the calling thread's last fallible call.
pub fn last_error_code() -> ErrorCode {
    CONTEXT.with(|ctx| ctx.borrow().code)
}

/// Owned copy of the calling thread's last failure message, or
/// [`NO_ERROR_MESSAGE`] when the last call succeeded.
pub fn last_error_message() -> String {
    CONTEXT.with(|ctx| {
        ctx.borrow()
            .message
            .clone()
            .unwrap_or_else(|| NO_ERROR_MESSAGE.to_string())
    })
}
