//! Failure funnel shared by both loading strategies.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::error::PreloadError;
use super::timeout_guard::panic_message;

/// Caller-supplied failure callback, invoked with `(url, error)`.
pub type ErrorCallback = Arc<dyn Fn(&str, &PreloadError) + Send + Sync>;

/// Logs every failure and forwards it to an optional callback.
///
/// A panicking callback is contained here; it never unwinds into the loader
/// or scheduler that reported the failure.
#[derive(Clone, Default)]
pub struct ErrorReporter {
    callback: Option<ErrorCallback>,
}

impl ErrorReporter {
    /// Create a reporter around an optional callback.
    pub fn new(callback: Option<ErrorCallback>) -> Self {
        Self { callback }
    }

    /// Whether a callback is attached.
    pub const fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Report a failure.
    pub fn report(&self, error: &PreloadError) {
        let url = error.url();
        tracing::warn!(url = %url, error = %error, "resource preload failed");

        let Some(callback) = self.callback.as_ref() else {
            return;
        };
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(url, error))) {
            tracing::error!(
                url = %url,
                panic = %panic_message(panic.as_ref()),
                "preload error callback panicked"
            );
        }
    }
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
