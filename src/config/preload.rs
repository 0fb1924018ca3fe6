//! Preloader and idle scheduler configuration structures.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::error::{AppResult, ConfigError};
use crate::core::options::MAX_CONCURRENCY;
use crate::core::timeout_guard::CancelMode;

/// Idle scheduler tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Safety margin kept free in every idle window.
    pub min_time_remaining_ms: u64,
    /// Estimated cost of starting one load.
    pub estimated_process_time_ms: u64,
    /// Most loads started per window; at most `MAX_CONCURRENCY`.
    pub max_batch_size: usize,
    /// Delay before retrying after a hidden-page deferral.
    pub hidden_backoff_ms: u64,
    /// Delay of the timer fallback when the host has no idle callback.
    pub fallback_delay_ms: u64,
    /// Remaining time reported by the timer fallback's synthetic deadline.
    pub fallback_time_remaining_ms: u64,
    /// Budget granted per slot by event-loop driven hosts.
    pub host_budget_ms: u64,
}

impl IdleConfig {
    /// Safety margin as a duration.
    pub const fn min_time_remaining(&self) -> Duration {
        Duration::from_millis(self.min_time_remaining_ms)
    }

    /// Per-load estimate as a duration.
    pub const fn estimated_process_time(&self) -> Duration {
        Duration::from_millis(self.estimated_process_time_ms)
    }

    /// Hidden-page backoff as a duration.
    pub const fn hidden_backoff(&self) -> Duration {
        Duration::from_millis(self.hidden_backoff_ms)
    }

    /// Loads that fit in a window with `remaining` time left.
    ///
    /// `min(floor((remaining - margin) / estimate), max_batch_size)`, or zero
    /// when the window does not exceed the margin.
    pub fn candidate_count(&self, remaining: Duration) -> usize {
        let Some(available) = remaining.checked_sub(self.min_time_remaining()) else {
            return 0;
        };
        if available.is_zero() {
            return 0;
        }
        let per_load = self.estimated_process_time().as_nanos().max(1);
        let fits = usize::try_from(available.as_nanos() / per_load).unwrap_or(usize::MAX);
        fits.min(self.max_batch_size)
    }

    /// Validate idle tuning values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.estimated_process_time_ms == 0 {
            return Err(invalid("estimated_process_time_ms", "must be greater than 0"));
        }
        if self.max_batch_size == 0 || self.max_batch_size > MAX_CONCURRENCY {
            return Err(invalid(
                "max_batch_size",
                format!("must be between 1 and {MAX_CONCURRENCY}"),
            ));
        }
        if self.fallback_delay_ms == 0 {
            return Err(invalid("fallback_delay_ms", "must be greater than 0"));
        }
        if self.candidate_count(Duration::from_millis(self.fallback_time_remaining_ms)) == 0 {
            tracing::warn!(
                fallback_time_remaining_ms = self.fallback_time_remaining_ms,
                min_time_remaining_ms = self.min_time_remaining_ms,
                "timer fallback deadline leaves no room for loads; idle queue will not drain without a host idle callback"
            );
        }
        Ok(())
    }
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            min_time_remaining_ms: 12,
            estimated_process_time_ms: 3,
            max_batch_size: 2,
            hidden_backoff_ms: 1000,
            fallback_delay_ms: 50,
            fallback_time_remaining_ms: 20,
            host_budget_ms: 50,
        }
    }
}

/// Root preloader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadConfig {
    /// Timeout applied when callers do not pick one.
    pub default_timeout_ms: u64,
    /// Cap on concurrent loads of the immediate strategy.
    pub max_concurrency: usize,
    /// Whether fetchers receive an abort signal.
    pub cancel_mode: CancelMode,
    /// Idle scheduler tuning.
    pub idle: IdleConfig,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 15_000,
            max_concurrency: MAX_CONCURRENCY,
            cancel_mode: CancelMode::Signal,
            idle: IdleConfig::default(),
        }
    }
}

impl PreloadConfig {
    /// Default timeout as a duration.
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Validate all values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == 0 {
            return Err(invalid("default_timeout_ms", "must be greater than 0"));
        }
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY {
            return Err(invalid(
                "max_concurrency",
                format!("must be between 1 and {MAX_CONCURRENCY}"),
            ));
        }
        self.idle.validate()
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from defaults overridden by `PRELOAD_*` environment
    /// variables. A `.env` file in the working directory is loaded first.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();

        if let Some(v) = env_var::<u64>("PRELOAD_DEFAULT_TIMEOUT_MS")? {
            cfg.default_timeout_ms = v;
        }
        if let Some(v) = env_var::<usize>("PRELOAD_MAX_CONCURRENCY")? {
            cfg.max_concurrency = v;
        }
        if let Some(v) = env_var::<u64>("PRELOAD_HIDDEN_BACKOFF_MS")? {
            cfg.idle.hidden_backoff_ms = v;
        }
        if let Some(v) = env_var::<u64>("PRELOAD_FALLBACK_DELAY_MS")? {
            cfg.idle.fallback_delay_ms = v;
        }
        if let Ok(mode) = env::var("PRELOAD_CANCEL_MODE") {
            cfg.cancel_mode = serde_json::from_value(serde_json::Value::String(mode.clone()))
                .with_context(|| format!("PRELOAD_CANCEL_MODE has unknown value `{mode}`"))?;
        }

        cfg.validate().context("preload configuration from environment")?;
        Ok(cfg)
    }
}

fn env_var<T>(name: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("{name} is not a valid number: `{raw}`"))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_count_formula() {
        let idle = IdleConfig::default();
        let ms = Duration::from_millis;
        assert_eq!(idle.candidate_count(ms(0)), 0);
        assert_eq!(idle.candidate_count(ms(12)), 0);
        assert_eq!(idle.candidate_count(ms(14)), 0);
        assert_eq!(idle.candidate_count(ms(15)), 1);
        assert_eq!(idle.candidate_count(ms(17)), 1);
        assert_eq!(idle.candidate_count(ms(18)), 2);
        assert_eq!(idle.candidate_count(ms(50)), 2);
    }

    #[test]
    fn test_default_fallback_deadline_drains() {
        let idle = IdleConfig::default();
        assert_eq!(
            idle.candidate_count(Duration::from_millis(idle.fallback_time_remaining_ms)),
            2
        );
    }
}
