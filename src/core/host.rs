//! Host capability ports consumed by the loaders and the idle scheduler.
//!
//! Hosts provide a spawner, a source of idle slots and a visibility signal.
//! Ready-made adapters live in [`crate::infra::host`] and
//! [`crate::runtime::tokio_spawner`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

/// Abstraction for spawning detached work on a runtime.
pub trait Spawn {
    /// Spawn a future that runs to completion independently of the caller.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Remaining-time view of a granted idle slot.
#[derive(Debug, Clone, Copy)]
pub struct IdleDeadline {
    granted_at: Instant,
    budget: Duration,
    did_timeout: bool,
}

impl IdleDeadline {
    /// A slot granting `budget` starting now.
    pub fn new(budget: Duration) -> Self {
        Self {
            granted_at: Instant::now(),
            budget,
            did_timeout: false,
        }
    }

    /// A slot fired by a timer rather than by genuine idleness.
    pub fn timed_out(budget: Duration) -> Self {
        Self {
            did_timeout: true,
            ..Self::new(budget)
        }
    }

    /// Time left in the slot; zero once exhausted.
    pub fn time_remaining(&self) -> Duration {
        self.budget.saturating_sub(self.granted_at.elapsed())
    }

    /// Whether the slot came from a timer.
    pub const fn did_timeout(&self) -> bool {
        self.did_timeout
    }
}

/// Source of idle slots.
///
/// Each call resolves when the host grants a window in which non-urgent work
/// may run, reporting how much time the window holds.
#[async_trait]
pub trait IdleYield: Send + Sync + 'static {
    /// Wait for the next idle slot.
    async fn next_slot(&self) -> IdleDeadline;
}

/// Page/app visibility signal.
pub trait VisibilityProbe: Send + Sync + 'static {
    /// Whether the host is currently hidden.
    fn is_hidden(&self) -> bool;
}
