//! Per-resource timeout and cancellation contract.
//!
//! Every load, whether started by the batch loader or the idle scheduler,
//! passes through [`TimeoutGuard::run`]. The guard races the fetch against a
//! timer; whichever settles first wins and the loser is dropped.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use super::error::PreloadError;
use super::fetcher::ResourceFetcher;
use super::resource::FetchRequest;

/// Default per-load timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Whether the host offers a cancellation signal to fetchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelMode {
    /// The timer trips an [`AbortSignal`] handed to the fetcher.
    ///
    /// The fetch future itself is dropped on timeout, so only work the
    /// fetcher handed off to other tasks can observe the signal.
    #[default]
    Signal,
    /// Plain timer race; the fetcher receives no signal.
    Plain,
}

#[derive(Debug, Default)]
struct SignalState {
    aborted: AtomicBool,
    notify: Notify,
}

/// Cancellation signal for work a fetcher hands off to other tasks.
///
/// Tripped after the guard has already dropped the fetch future; anything
/// still awaited inside `fetch` itself is cancelled by that drop instead.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    inner: Arc<SignalState>,
}

impl AbortSignal {
    /// Create an untripped signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the signal and wake every waiter. Idempotent.
    pub fn abort(&self) {
        if !self.inner.aborted.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Whether the signal has been tripped.
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::Acquire)
    }

    /// Resolve once the signal is tripped.
    pub async fn aborted(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }
}

/// Applies the timeout/cancellation race to individual loads.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutGuard {
    timeout: Duration,
    mode: CancelMode,
}

impl TimeoutGuard {
    /// Create a guard with the given timeout and cancellation mode.
    pub const fn new(timeout: Duration, mode: CancelMode) -> Self {
        Self { timeout, mode }
    }

    /// Configured timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Cancellation mode.
    pub const fn mode(&self) -> CancelMode {
        self.mode
    }

    /// This guard with `timeout` replaced when one is given.
    #[must_use]
    pub fn or_timeout(self, timeout: Option<Duration>) -> Self {
        timeout.map_or(self, |timeout| Self { timeout, ..self })
    }

    /// Load `url` through `fetcher`, bounded by the timeout.
    ///
    /// A fetcher panic is caught and surfaced as [`PreloadError::Panicked`].
    pub async fn run(&self, fetcher: &dyn ResourceFetcher, url: &str) -> Result<(), PreloadError> {
        let mut request = FetchRequest::new(url);
        let signal = match self.mode {
            CancelMode::Signal => {
                let signal = AbortSignal::new();
                request = request.with_signal(signal.clone());
                Some(signal)
            }
            CancelMode::Plain => None,
        };

        let load = AssertUnwindSafe(fetcher.fetch(request)).catch_unwind();
        match tokio::time::timeout(self.timeout, load).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(panic)) => Err(PreloadError::Panicked {
                url: url.to_owned(),
                message: panic_message(panic.as_ref()),
            }),
            Err(_elapsed) => {
                if let Some(signal) = signal {
                    signal.abort();
                }
                Err(PreloadError::Timeout {
                    url: url.to_owned(),
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }
    }
}

impl Default for TimeoutGuard {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, CancelMode::default())
    }
}

/// Render a panic payload for logging.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NeverSettles;

    #[async_trait]
    impl ResourceFetcher for NeverSettles {
        async fn fetch(&self, request: FetchRequest) -> Result<(), PreloadError> {
            if let Some(signal) = request.signal {
                signal.aborted().await;
            }
            futures::future::pending::<()>().await;
            Ok(())
        }
    }

    struct Immediate;

    #[async_trait]
    impl ResourceFetcher for Immediate {
        async fn fetch(&self, _request: FetchRequest) -> Result<(), PreloadError> {
            Ok(())
        }
    }

    struct Panics;

    #[async_trait]
    impl ResourceFetcher for Panics {
        async fn fetch(&self, _request: FetchRequest) -> Result<(), PreloadError> {
            panic!("misconfigured fetcher");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_wins() {
        let guard = TimeoutGuard::new(Duration::from_millis(100), CancelMode::Plain);
        let err = guard.run(&NeverSettles, "a.jpg").await.unwrap_err();
        assert_eq!(
            err,
            PreloadError::Timeout {
                url: "a.jpg".into(),
                timeout_ms: 100
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_mode_times_out() {
        let guard = TimeoutGuard::new(Duration::from_millis(50), CancelMode::Signal);
        let err = guard.run(&NeverSettles, "b.mp3").await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_load_succeeds() {
        let guard = TimeoutGuard::default();
        assert!(guard.run(&Immediate, "c.xyz").await.is_ok());
    }

    #[tokio::test]
    async fn test_panic_is_caught() {
        let guard = TimeoutGuard::default();
        let err = guard.run(&Panics, "d.png").await.unwrap_err();
        assert!(matches!(err, PreloadError::Panicked { ref message, .. } if message == "misconfigured fetcher"));
    }

    /// Hands the download to a detached task that stops on the signal.
    struct Detached {
        stopped: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ResourceFetcher for Detached {
        async fn fetch(&self, request: FetchRequest) -> Result<(), PreloadError> {
            let signal = request.signal.expect("signal mode attaches a signal");
            let stopped = Arc::clone(&self.stopped);
            tokio::spawn(async move {
                signal.aborted().await;
                stopped.store(true, Ordering::SeqCst);
            });
            futures::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_stops_detached_work() {
        let stopped = Arc::new(AtomicBool::new(false));
        let fetcher = Detached {
            stopped: Arc::clone(&stopped),
        };
        let guard = TimeoutGuard::new(Duration::from_millis(30), CancelMode::Signal);

        let err = guard.run(&fetcher, "e.woff2").await.unwrap_err();
        assert!(err.is_timeout());
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_or_timeout() {
        let guard = TimeoutGuard::new(Duration::from_millis(100), CancelMode::Plain);
        assert_eq!(guard.or_timeout(None).timeout(), Duration::from_millis(100));
        let custom = guard.or_timeout(Some(Duration::from_millis(7)));
        assert_eq!(custom.timeout(), Duration::from_millis(7));
        assert_eq!(custom.mode(), CancelMode::Plain);
    }

    #[tokio::test]
    async fn test_abort_signal_wakes_waiters() {
        let signal = AbortSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.aborted().await })
        };
        tokio::task::yield_now().await;
        signal.abort();
        waiter.await.unwrap();
        assert!(signal.is_aborted());
    }
}
