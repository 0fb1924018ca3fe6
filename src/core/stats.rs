//! Counters describing preload activity.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::error::PreloadError;

/// Point-in-time view of preload activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadStats {
    /// Loads handed to the fetcher.
    pub attempted: u64,
    /// Loads that settled successfully.
    pub succeeded: u64,
    /// Loads that failed (fetcher error or panic).
    pub failed: u64,
    /// Loads abandoned by the timeout guard.
    pub timed_out: u64,
    /// Input entries dropped by validation.
    pub dropped: u64,
    /// Task groups accepted by the idle scheduler.
    pub enqueued_groups: u64,
    /// Idle cycles that dispatched at least one load.
    pub cycles: u64,
    /// Idle cycles whose window was too short to dispatch anything.
    pub empty_cycles: u64,
    /// Idle cycles deferred because the page was hidden.
    pub hidden_deferrals: u64,
}

/// Lock-free counters behind [`PreloadStats`].
#[derive(Debug, Default)]
pub(crate) struct PreloadCounters {
    pub attempted: AtomicU64,
    pub succeeded: AtomicU64,
    pub failed: AtomicU64,
    pub timed_out: AtomicU64,
    pub dropped: AtomicU64,
    pub enqueued_groups: AtomicU64,
    pub cycles: AtomicU64,
    pub empty_cycles: AtomicU64,
    pub hidden_deferrals: AtomicU64,
}

impl PreloadCounters {
    /// Record the outcome of one guarded load.
    pub fn record_outcome(&self, outcome: &Result<(), PreloadError>) {
        match outcome {
            Ok(()) => self.succeeded.fetch_add(1, Ordering::Relaxed),
            Err(e) if e.is_timeout() => self.timed_out.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.failed.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, n: usize) {
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> PreloadStats {
        PreloadStats {
            attempted: self.attempted.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            enqueued_groups: self.enqueued_groups.load(Ordering::Relaxed),
            cycles: self.cycles.load(Ordering::Relaxed),
            empty_cycles: self.empty_cycles.load(Ordering::Relaxed),
            hidden_deferrals: self.hidden_deferrals.load(Ordering::Relaxed),
        }
    }
}
