//! Immediate strategy: sequential chunks of bounded concurrency.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use super::fetcher::ResourceFetcher;
use super::options::{LoadOptions, MAX_CONCURRENCY};
use super::reporter::ErrorReporter;
use super::stats::PreloadCounters;
use super::timeout_guard::TimeoutGuard;

/// Summary of one [`BatchLoader::run_batches`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Size of each chunk, in execution order.
    pub chunks: Vec<usize>,
    /// Loads that settled successfully.
    pub succeeded: usize,
    /// Loads that failed or timed out.
    pub failed: usize,
}

impl BatchReport {
    /// Total loads attempted.
    pub const fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Runs URL lists as strictly sequential, concurrency-capped chunks.
///
/// Chunk `i + 1` is not started until every load of chunk `i` has settled.
/// A failing load never cancels its siblings or later chunks.
#[derive(Clone)]
pub struct BatchLoader {
    fetcher: Arc<dyn ResourceFetcher>,
    counters: Arc<PreloadCounters>,
    max_concurrency: usize,
    guard: TimeoutGuard,
}

impl BatchLoader {
    /// Create a loader with the default concurrency cap, a 15 s default
    /// timeout and signal cancellation.
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self::with_counters(
            fetcher,
            Arc::new(PreloadCounters::default()),
            MAX_CONCURRENCY,
            TimeoutGuard::default(),
        )
    }

    /// Replace the guard applied when a call sets no timeout of its own.
    #[must_use]
    pub const fn with_guard(mut self, guard: TimeoutGuard) -> Self {
        self.guard = guard;
        self
    }

    pub(crate) fn with_counters(
        fetcher: Arc<dyn ResourceFetcher>,
        counters: Arc<PreloadCounters>,
        max_concurrency: usize,
        guard: TimeoutGuard,
    ) -> Self {
        Self {
            fetcher,
            counters,
            max_concurrency,
            guard,
        }
    }

    /// Load `urls` in order, `min(max(batch_size, 1), cap)` at a time.
    pub async fn run_batches(&self, urls: Vec<String>, options: &LoadOptions) -> BatchReport {
        let size = options.effective_concurrency(self.max_concurrency);
        let guard = self.guard.or_timeout(options.timeout);
        let reporter = options.reporter();
        let mut report = BatchReport::default();

        tracing::debug!(urls = urls.len(), chunk_size = size, "running preload batches");

        for (index, chunk) in urls.chunks(size).enumerate() {
            tracing::trace!(chunk = index, len = chunk.len(), "starting chunk");
            let loads = chunk.iter().map(|url| {
                guarded_load(self.fetcher.as_ref(), &self.counters, guard, &reporter, url)
            });
            let outcomes = join_all(loads).await;

            report.chunks.push(chunk.len());
            for ok in outcomes {
                if ok {
                    report.succeeded += 1;
                } else {
                    report.failed += 1;
                }
            }
        }

        tracing::debug!(
            chunks = report.chunks.len(),
            succeeded = report.succeeded,
            failed = report.failed,
            "preload batches settled"
        );
        report
    }
}

/// Run one load through the timeout guard and route any failure to `reporter`.
///
/// Returns whether the load succeeded.
pub(crate) async fn guarded_load(
    fetcher: &dyn ResourceFetcher,
    counters: &PreloadCounters,
    guard: TimeoutGuard,
    reporter: &ErrorReporter,
    url: &str,
) -> bool {
    PreloadCounters::bump(&counters.attempted);
    let outcome = guard.run(fetcher, url).await;
    counters.record_outcome(&outcome);
    match outcome {
        Ok(()) => {
            tracing::trace!(url = %url, "resource preloaded");
            true
        }
        Err(e) => {
            reporter.report(&e);
            false
        }
    }
}
