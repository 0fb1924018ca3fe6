//! Idle slot sources.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::config::IdleConfig;
use crate::core::host::{IdleDeadline, IdleYield};

/// Timer fallback for hosts without an idle callback.
///
/// Fires after a fixed delay and reports a synthetic deadline.
#[derive(Debug, Clone, Copy)]
pub struct TimerFallbackYield {
    delay: Duration,
    time_remaining: Duration,
}

impl TimerFallbackYield {
    /// Fire after `delay`, reporting `time_remaining` in the slot.
    pub const fn new(delay: Duration, time_remaining: Duration) -> Self {
        Self {
            delay,
            time_remaining,
        }
    }

    /// Build from idle configuration.
    pub const fn from_config(config: &IdleConfig) -> Self {
        Self::new(
            Duration::from_millis(config.fallback_delay_ms),
            Duration::from_millis(config.fallback_time_remaining_ms),
        )
    }
}

#[async_trait]
impl IdleYield for TimerFallbackYield {
    async fn next_slot(&self) -> IdleDeadline {
        tokio::time::sleep(self.delay).await;
        IdleDeadline::timed_out(self.time_remaining)
    }
}

/// Event-loop driven host: yields one scheduler tick, then grants a fixed budget.
#[derive(Debug, Clone, Copy)]
pub struct TokioIdleYield {
    budget: Duration,
}

impl TokioIdleYield {
    /// Grant `budget` per slot.
    pub const fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// Build from idle configuration.
    pub const fn from_config(config: &IdleConfig) -> Self {
        Self::new(Duration::from_millis(config.host_budget_ms))
    }
}

#[async_trait]
impl IdleYield for TokioIdleYield {
    async fn next_slot(&self) -> IdleDeadline {
        tokio::task::yield_now().await;
        IdleDeadline::new(self.budget)
    }
}

/// Slots granted explicitly by the host, e.g. at the end of each frame.
///
/// Pair with an [`IdleSlotGrantor`] from [`FrameIdleYield::channel`]. Once
/// every grantor is dropped no further slots are granted.
#[derive(Debug)]
pub struct FrameIdleYield {
    slots: Mutex<mpsc::UnboundedReceiver<Duration>>,
}

/// Grants idle windows to a [`FrameIdleYield`].
#[derive(Debug, Clone)]
pub struct IdleSlotGrantor {
    tx: mpsc::UnboundedSender<Duration>,
}

impl FrameIdleYield {
    /// Create a connected yield source and grantor.
    pub fn channel() -> (Self, IdleSlotGrantor) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                slots: Mutex::new(rx),
            },
            IdleSlotGrantor { tx },
        )
    }
}

impl IdleSlotGrantor {
    /// Grant one window of `budget`. Returns false once the source is gone.
    pub fn grant(&self, budget: Duration) -> bool {
        self.tx.send(budget).is_ok()
    }
}

#[async_trait]
impl IdleYield for FrameIdleYield {
    async fn next_slot(&self) -> IdleDeadline {
        let mut slots = self.slots.lock().await;
        match slots.recv().await {
            Some(budget) => IdleDeadline::new(budget),
            None => {
                tracing::debug!("idle slot grantor dropped, no further slots");
                drop(slots);
                futures::future::pending().await
            }
        }
    }
}
