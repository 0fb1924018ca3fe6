//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use prometheus_preload::core::{
    FetchRequest, IdleDeadline, IdleYield, LoadMechanism, PreloadError, ResourceCategory,
    ResourceFetcher, Spawn,
};
use tokio::time::Instant;

/// One observed fetch.
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub category: ResourceCategory,
    pub mechanism: LoadMechanism,
    pub had_signal: bool,
    pub started: Instant,
    pub finished: Option<Instant>,
}

/// Fetcher that records every call and can be told to delay, fail or hang.
#[derive(Default)]
pub struct RecordingFetcher {
    calls: Mutex<Vec<Call>>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn delay_for(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_owned(), delay);
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_owned());
        self
    }

    pub fn hanging(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.url.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn finish(&self, index: usize) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.lock()[index].finished = Some(Instant::now());
    }
}

#[async_trait]
impl ResourceFetcher for RecordingFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<(), PreloadError> {
        let index = {
            let mut calls = self.calls.lock();
            calls.push(Call {
                url: request.url.clone(),
                category: request.category,
                mechanism: request.mechanism,
                had_signal: request.signal.is_some(),
                started: Instant::now(),
                finished: None,
            });
            calls.len() - 1
        };
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if self.hanging.contains(&request.url) {
            futures::future::pending::<()>().await;
        }

        let delay = self
            .delays
            .get(&request.url)
            .copied()
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.finish(index);

        if self.failing.contains(&request.url) {
            return Err(PreloadError::load(&request.url, request.category, "error event"));
        }
        Ok(())
    }
}

/// Fetcher that panics on every call.
pub struct PanickingFetcher;

#[async_trait]
impl ResourceFetcher for PanickingFetcher {
    async fn fetch(&self, _request: FetchRequest) -> Result<(), PreloadError> {
        panic!("fetcher misconfigured");
    }
}

/// Collects `(url, error)` pairs handed to an `on_error` callback.
#[derive(Clone, Default)]
pub struct ErrorLog {
    entries: Arc<Mutex<Vec<(String, PreloadError)>>>,
}

impl ErrorLog {
    pub fn callback(&self) -> impl Fn(&str, &PreloadError) + Send + Sync + 'static {
        let entries = Arc::clone(&self.entries);
        move |url: &str, err: &PreloadError| entries.lock().push((url.to_owned(), err.clone()))
    }

    pub fn entries(&self) -> Vec<(String, PreloadError)> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Spawner backed by `tokio::spawn`.
#[derive(Clone)]
pub struct TestSpawner;

impl Spawn for TestSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(fut);
    }
}

/// Idle source wrapper that tracks how many slot requests are outstanding.
pub struct CountingIdle<I> {
    inner: I,
    outstanding: AtomicUsize,
    max_outstanding: AtomicUsize,
    requests: AtomicUsize,
}

impl<I> CountingIdle<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            outstanding: AtomicUsize::new(0),
            max_outstanding: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn max_outstanding(&self) -> usize {
        self.max_outstanding.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I: IdleYield> IdleYield for CountingIdle<I> {
    async fn next_slot(&self) -> IdleDeadline {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let now = self.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_outstanding.fetch_max(now, Ordering::SeqCst);
        let deadline = self.inner.next_slot().await;
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        deadline
    }
}

/// Let every runnable task make progress; with paused time this also fires
/// timers due within `ms`.
pub async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

pub fn strings(urls: &[&str]) -> Vec<String> {
    urls.iter().map(|u| (*u).to_owned()).collect()
}
