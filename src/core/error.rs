//! Error types for preload operations.

use thiserror::Error;

use super::resource::ResourceCategory;

/// Failures produced while loading a single resource.
///
/// Every variant carries the URL it concerns so reporters can route it to
/// caller callbacks without extra context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreloadError {
    /// The fetcher reported a load failure for its content category.
    #[error("failed to load {category} resource {url}: {reason}")]
    Load {
        /// Resource URL.
        url: String,
        /// Category the fetcher dispatched on.
        category: ResourceCategory,
        /// Fetcher-supplied reason.
        reason: String,
    },
    /// The timeout timer won the race against the load.
    #[error("timed out after {timeout_ms}ms loading {url}")]
    Timeout {
        /// Resource URL.
        url: String,
        /// Timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },
    /// The fetcher panicked while loading.
    #[error("fetcher panicked loading {url}: {message}")]
    Panicked {
        /// Resource URL.
        url: String,
        /// Panic payload rendered as text.
        message: String,
    },
}

impl PreloadError {
    /// Build a load failure.
    pub fn load(url: impl Into<String>, category: ResourceCategory, reason: impl Into<String>) -> Self {
        Self::Load {
            url: url.into(),
            category,
            reason: reason.into(),
        }
    }

    /// URL the failure concerns.
    pub fn url(&self) -> &str {
        match self {
            Self::Load { url, .. } | Self::Timeout { url, .. } | Self::Panicked { url, .. } => url,
        }
    }

    /// Whether this failure came from the timeout guard.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Errors produced while validating or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value outside its accepted range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// Input could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
