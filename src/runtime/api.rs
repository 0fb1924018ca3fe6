//! Serializable request/response models for driving a preloader from JSON
//! manifests or an RPC layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{LoadOptions, Preloader, PreloadStats, Spawn, Strategy};

/// Preload request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadRequest {
    /// URLs to preload.
    pub resources: Vec<String>,
    /// Strategy; immediate when omitted.
    #[serde(default)]
    pub strategy: Strategy,
    /// Requested chunk size.
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Per-load timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl PreloadRequest {
    /// Parse a request from JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying parse error for malformed input.
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

/// Acknowledgement returned after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadAck {
    /// Entries accepted for loading.
    pub accepted: usize,
    /// Entries dropped by validation.
    pub dropped: usize,
    /// Strategy used.
    pub strategy: Strategy,
}

/// Submit `req` to `preloader`. Failures surface only through logs.
pub fn submit_request<S>(preloader: &Preloader<S>, req: PreloadRequest) -> PreloadAck
where
    S: Spawn + Clone + Send + Sync + 'static,
{
    let mut options = LoadOptions::new().with_strategy(req.strategy);
    if let Some(size) = req.batch_size {
        options = options.with_batch_size(size);
    }
    if let Some(ms) = req.timeout_ms {
        options = options.with_timeout(Duration::from_millis(ms));
    }

    let strategy = options.strategy;
    let admission = preloader.start(req.resources.into(), options);

    PreloadAck {
        accepted: admission.accepted,
        dropped: admission.dropped,
        strategy,
    }
}

/// Snapshot of preloader activity for status endpoints.
pub fn status<S>(preloader: &Preloader<S>) -> PreloadStats
where
    S: Spawn + Clone + Send + Sync + 'static,
{
    preloader.stats()
}

