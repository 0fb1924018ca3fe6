//! Per-call options for the preload entry points.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::PreloadError;
use super::reporter::{ErrorCallback, ErrorReporter};

/// Upper bound on concurrent loads for either strategy.
pub const MAX_CONCURRENCY: usize = 2;

/// Loading strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Load now, in sequential chunks of bounded size.
    #[default]
    Immediate,
    /// Queue for the idle scheduler.
    Idle,
}

/// Options shared by every URL of one call.
#[derive(Clone)]
pub struct LoadOptions {
    /// Loading strategy.
    pub strategy: Strategy,
    /// Requested chunk size; clamped to `1..=MAX_CONCURRENCY`.
    pub batch_size: usize,
    /// Per-load timeout; `None` defers to the loader's configured default.
    pub timeout: Option<Duration>,
    /// Optional failure callback.
    pub on_error: Option<ErrorCallback>,
}

impl LoadOptions {
    /// Defaults: immediate strategy, batch size 1, loader default timeout,
    /// no callback.
    pub fn new() -> Self {
        Self {
            strategy: Strategy::Immediate,
            batch_size: 1,
            timeout: None,
            on_error: None,
        }
    }

    /// Set the strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the requested batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Override the per-load timeout for this call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach a failure callback.
    #[must_use]
    pub fn with_on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &PreloadError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Concurrency actually used: `min(max(batch_size, 1), cap)`.
    pub fn effective_concurrency(&self, cap: usize) -> usize {
        self.batch_size.max(1).min(cap.max(1))
    }

    /// Reporter wired to this call's callback.
    pub fn reporter(&self) -> ErrorReporter {
        ErrorReporter::new(self.on_error.clone())
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("strategy", &self.strategy)
            .field("batch_size", &self.batch_size)
            .field("timeout", &self.timeout)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
