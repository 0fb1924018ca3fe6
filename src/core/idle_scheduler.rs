//! Idle strategy: a FIFO queue of task groups drained inside host idle slots.
//!
//! The scheduler owns the queue and a processing flag. The flag is set when a
//! slot is requested and stays set until a cycle finds the queue empty, so at
//! most one slot request is ever outstanding. Each cycle:
//!
//! 1. defers by a fixed backoff when the host is hidden,
//! 2. sizes its work from the slot's remaining time,
//! 3. takes at most one URL per group, round robin, re-appending unfinished
//!    groups at the tail,
//! 4. spawns each load without waiting for it.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use super::batch_loader::guarded_load;
use super::fetcher::ResourceFetcher;
use super::host::{IdleDeadline, IdleYield, Spawn, VisibilityProbe};
use super::options::LoadOptions;
use super::stats::{PreloadCounters, PreloadStats};
use super::timeout_guard::TimeoutGuard;
use crate::config::IdleConfig;

/// URLs sharing one options set, queued together for idle processing.
#[derive(Debug)]
pub struct TaskGroup {
    /// Identifier used in logs.
    pub id: Uuid,
    /// Remaining URLs, consumed from the front.
    pub urls: VecDeque<String>,
    /// Options of the originating call.
    pub options: LoadOptions,
}

impl TaskGroup {
    /// Create a group from `urls` and `options`.
    pub fn new(urls: impl IntoIterator<Item = String>, options: LoadOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            urls: urls.into_iter().collect(),
            options,
        }
    }
}

/// Queue plus processing flag, guarded together.
#[derive(Debug, Default)]
struct QueueState {
    groups: VecDeque<TaskGroup>,
    processing: bool,
}

/// Pop up to `max` URLs, at most one per group, FIFO over groups.
///
/// Groups that still hold URLs are pushed back to the tail; emptied groups are
/// dropped.
fn take_round_robin(groups: &mut VecDeque<TaskGroup>, max: usize) -> Vec<(String, LoadOptions)> {
    let visits = max.min(groups.len());
    let mut taken = Vec::with_capacity(visits);
    for _ in 0..visits {
        let Some(mut group) = groups.pop_front() else {
            break;
        };
        if let Some(url) = group.urls.pop_front() {
            taken.push((url, group.options.clone()));
        }
        if group.urls.is_empty() {
            tracing::trace!(group = %group.id, "task group drained");
        } else {
            groups.push_back(group);
        }
    }
    taken
}

struct Shared<S> {
    state: Mutex<QueueState>,
    fetcher: Arc<dyn ResourceFetcher>,
    idle: Arc<dyn IdleYield>,
    visibility: Arc<dyn VisibilityProbe>,
    spawner: S,
    counters: Arc<PreloadCounters>,
    config: IdleConfig,
    guard: TimeoutGuard,
}

/// Cooperative, time-sliced loader for non-critical resources.
///
/// Cloning yields another handle to the same queue.
pub struct IdleScheduler<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for IdleScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S> IdleScheduler<S>
where
    S: Spawn + Send + Sync + 'static,
{
    /// Create a scheduler over the given host ports, with a 15 s default
    /// timeout and signal cancellation.
    pub fn new(
        fetcher: Arc<dyn ResourceFetcher>,
        idle: Arc<dyn IdleYield>,
        visibility: Arc<dyn VisibilityProbe>,
        spawner: S,
        config: IdleConfig,
    ) -> Self {
        Self::with_counters(
            fetcher,
            idle,
            visibility,
            spawner,
            config,
            TimeoutGuard::default(),
            Arc::new(PreloadCounters::default()),
        )
    }

    pub(crate) fn with_counters(
        fetcher: Arc<dyn ResourceFetcher>,
        idle: Arc<dyn IdleYield>,
        visibility: Arc<dyn VisibilityProbe>,
        spawner: S,
        config: IdleConfig,
        guard: TimeoutGuard,
        counters: Arc<PreloadCounters>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState::default()),
                fetcher,
                idle,
                visibility,
                spawner,
                counters,
                config,
                guard,
            }),
        }
    }

    /// Queue `urls` as one task group.
    ///
    /// Requests an idle slot unless a cycle is already pending or running.
    /// Nothing is loaded before that slot fires. Empty lists are ignored.
    pub fn enqueue(&self, urls: Vec<String>, options: LoadOptions) {
        if urls.is_empty() {
            return;
        }
        let group = TaskGroup::new(urls, options);
        tracing::debug!(group = %group.id, urls = group.urls.len(), "enqueued idle task group");

        let request = {
            let mut state = self.shared.state.lock();
            state.groups.push_back(group);
            if state.processing {
                false
            } else {
                state.processing = true;
                true
            }
        };
        PreloadCounters::bump(&self.shared.counters.enqueued_groups);

        if request {
            Shared::request_slot(&self.shared);
        }
    }

    /// Groups still queued.
    pub fn pending_groups(&self) -> usize {
        self.shared.state.lock().groups.len()
    }

    /// URLs still queued across all groups.
    pub fn pending_urls(&self) -> usize {
        self.shared
            .state
            .lock()
            .groups
            .iter()
            .map(|g| g.urls.len())
            .sum()
    }

    /// Whether a cycle is pending or running.
    pub fn is_processing(&self) -> bool {
        self.shared.state.lock().processing
    }

    /// Snapshot of activity counters.
    pub fn stats(&self) -> PreloadStats {
        self.shared.counters.snapshot()
    }
}

impl<S> Shared<S>
where
    S: Spawn + Send + Sync + 'static,
{
    /// Ask the host for the next slot and run a cycle when it fires.
    /// Caller must already hold the processing flag.
    fn request_slot(this: &Arc<Self>) {
        let shared = Arc::clone(this);
        this.spawner.spawn(async move {
            let deadline = shared.idle.next_slot().await;
            Self::run_cycle(&shared, deadline);
        });
    }

    fn run_cycle(this: &Arc<Self>, deadline: IdleDeadline) {
        if this.visibility.is_hidden() {
            PreloadCounters::bump(&this.counters.hidden_deferrals);
            let backoff = this.config.hidden_backoff();
            tracing::debug!(backoff_ms = %backoff.as_millis(), "host hidden, deferring idle cycle");
            let shared = Arc::clone(this);
            this.spawner.spawn(async move {
                tokio::time::sleep(backoff).await;
                Self::finish_cycle(&shared);
            });
            return;
        }

        let remaining = deadline.time_remaining();
        let candidates = this.config.candidate_count(remaining);
        if candidates == 0 {
            PreloadCounters::bump(&this.counters.empty_cycles);
            tracing::trace!(
                remaining_us = %remaining.as_micros(),
                timer = deadline.did_timeout(),
                "idle window too short"
            );
            Self::finish_cycle(this);
            return;
        }

        let taken = {
            let mut state = this.state.lock();
            take_round_robin(&mut state.groups, candidates)
        };
        PreloadCounters::bump(&this.counters.cycles);
        tracing::trace!(dispatched = taken.len(), candidates, "idle cycle");

        for (url, options) in taken {
            Self::dispatch(this, url, &options);
        }
        Self::finish_cycle(this);
    }

    /// Fire-and-forget one guarded load.
    fn dispatch(this: &Arc<Self>, url: String, options: &LoadOptions) {
        let fetcher = Arc::clone(&this.fetcher);
        let counters = Arc::clone(&this.counters);
        let guard = this.guard.or_timeout(options.timeout);
        let reporter = options.reporter();
        this.spawner.spawn(async move {
            guarded_load(fetcher.as_ref(), &counters, guard, &reporter, &url).await;
        });
    }

    /// End a cycle: release the flag when the queue is empty, otherwise keep
    /// it and request the next slot.
    fn finish_cycle(this: &Arc<Self>) {
        let more = {
            let mut state = this.state.lock();
            if state.groups.is_empty() {
                state.processing = false;
                false
            } else {
                true
            }
        };
        if more {
            Self::request_slot(this);
        } else {
            tracing::debug!("idle queue drained");
        }
    }
}
