//! Visibility signals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::host::VisibilityProbe;

/// Host without a visibility signal; never hidden.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl VisibilityProbe for AlwaysVisible {
    fn is_hidden(&self) -> bool {
        false
    }
}

/// Shared visibility flag updated by the host.
#[derive(Debug, Clone, Default)]
pub struct VisibilityFlag {
    hidden: Arc<AtomicBool>,
}

impl VisibilityFlag {
    /// Start visible.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visibility change.
    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.store(hidden, Ordering::Release);
        tracing::debug!(hidden, "visibility changed");
    }
}

impl VisibilityProbe for VisibilityFlag {
    fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::Acquire)
    }
}
