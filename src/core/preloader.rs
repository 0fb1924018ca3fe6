//! Public entry point tying validation, the batch loader and the idle
//! scheduler together.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::batch_loader::{BatchLoader, BatchReport};
use super::fetcher::ResourceFetcher;
use super::host::{IdleYield, Spawn, VisibilityProbe};
use super::idle_scheduler::IdleScheduler;
use super::options::{LoadOptions, Strategy};
use super::resource::ResourceList;
use super::stats::{PreloadCounters, PreloadStats};
use super::timeout_guard::{panic_message, TimeoutGuard};
use super::validate::partition_safe;
use crate::config::PreloadConfig;

/// Validation outcome of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Admission {
    pub(crate) accepted: usize,
    pub(crate) dropped: usize,
}

/// Preloads resources with either the immediate or the idle strategy.
///
/// # Example
///
/// ```rust,ignore
/// use prometheus_preload::builders::PreloaderBuilder;
/// use prometheus_preload::core::{LoadOptions, Strategy};
///
/// let preloader = PreloaderBuilder::new(my_fetcher).build()?;
/// preloader.load_resources(["hero.webp", "theme.mp3"], LoadOptions::default());
/// preloader.load_resources(
///     vec!["gallery/1.jpg", "gallery/2.jpg"],
///     LoadOptions::default().with_strategy(Strategy::Idle),
/// );
/// ```
pub struct Preloader<S> {
    batch: BatchLoader,
    scheduler: IdleScheduler<S>,
    spawner: S,
    counters: Arc<PreloadCounters>,
    config: PreloadConfig,
}

impl<S> Preloader<S>
where
    S: Spawn + Clone + Send + Sync + 'static,
{
    /// Assemble a preloader from host ports and validated configuration.
    pub fn new(
        fetcher: Arc<dyn ResourceFetcher>,
        idle: Arc<dyn IdleYield>,
        visibility: Arc<dyn VisibilityProbe>,
        spawner: S,
        config: PreloadConfig,
    ) -> Self {
        let counters = Arc::new(PreloadCounters::default());
        let guard = TimeoutGuard::new(config.default_timeout(), config.cancel_mode);
        let batch = BatchLoader::with_counters(
            Arc::clone(&fetcher),
            Arc::clone(&counters),
            config.max_concurrency,
            guard,
        );
        let scheduler = IdleScheduler::with_counters(
            fetcher,
            idle,
            visibility,
            spawner.clone(),
            config.idle.clone(),
            guard,
            Arc::clone(&counters),
        );
        Self {
            batch,
            scheduler,
            spawner,
            counters,
            config,
        }
    }

    /// Validate `resources` and start loading them. Never panics and returns
    /// immediately; failures are reported through `options.on_error`.
    ///
    /// Unsafe entries are dropped silently. The immediate strategy runs on a
    /// spawned task; the idle strategy enqueues one task group. Loads without
    /// an explicit timeout use the configured `default_timeout_ms`.
    pub fn load_resources(&self, resources: impl Into<ResourceList>, options: LoadOptions) {
        self.start(resources.into(), options);
    }

    /// [`Self::load_resources`], returning how many entries were accepted and
    /// dropped by validation.
    pub(crate) fn start(&self, resources: ResourceList, options: LoadOptions) -> Admission {
        let (urls, admission) = self.accept(resources);
        if urls.is_empty() {
            return admission;
        }

        match options.strategy {
            Strategy::Immediate => {
                let batch = self.batch.clone();
                self.spawner.spawn(async move {
                    let run = AssertUnwindSafe(batch.run_batches(urls, &options)).catch_unwind();
                    if let Err(panic) = run.await {
                        tracing::error!(
                            panic = %panic_message(panic.as_ref()),
                            "immediate preload aborted unexpectedly"
                        );
                    }
                });
            }
            Strategy::Idle => self.scheduler.enqueue(urls, options),
        }
        admission
    }

    /// Validate `resources` and load them with the immediate strategy,
    /// resolving once every chunk has settled. `options.strategy` is ignored.
    pub async fn preload(&self, resources: impl Into<ResourceList>, options: LoadOptions) -> BatchReport {
        let (urls, _) = self.accept(resources.into());
        if urls.is_empty() {
            return BatchReport::default();
        }
        self.batch.run_batches(urls, &options).await
    }

    fn accept(&self, resources: ResourceList) -> (Vec<String>, Admission) {
        let (urls, dropped) = partition_safe(resources.into_inner());
        PreloadCounters::add(&self.counters.dropped, dropped);
        if urls.is_empty() {
            tracing::debug!(dropped, "no loadable resources");
        }
        let admission = Admission {
            accepted: urls.len(),
            dropped,
        };
        (urls, admission)
    }

    /// Idle scheduler backing the idle strategy.
    pub const fn scheduler(&self) -> &IdleScheduler<S> {
        &self.scheduler
    }

    /// Active configuration.
    pub const fn config(&self) -> &PreloadConfig {
        &self.config
    }

    /// Snapshot of activity counters shared by both strategies.
    pub fn stats(&self) -> PreloadStats {
        self.counters.snapshot()
    }
}
