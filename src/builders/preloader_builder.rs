//! Builder assembling a [`Preloader`] from configuration and host ports.

use std::sync::Arc;

use anyhow::{anyhow, Context};

use crate::config::PreloadConfig;
use crate::core::{AppResult, IdleYield, Preloader, ResourceFetcher, Spawn, VisibilityProbe};
use crate::infra::host::{AlwaysVisible, TimerFallbackYield};
use crate::runtime::TokioSpawner;

/// Builds a [`Preloader`].
///
/// Unset ports fall back to what a host without those capabilities gets:
/// the timer-driven idle fallback and an always-visible page.
pub struct PreloaderBuilder<S = TokioSpawner> {
    fetcher: Arc<dyn ResourceFetcher>,
    idle: Option<Arc<dyn IdleYield>>,
    visibility: Option<Arc<dyn VisibilityProbe>>,
    spawner: Option<S>,
    config: PreloadConfig,
}

impl PreloaderBuilder<TokioSpawner> {
    /// Start a builder spawning onto the current tokio runtime, if any.
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            fetcher,
            idle: None,
            visibility: None,
            spawner: TokioSpawner::current().ok(),
            config: PreloadConfig::default(),
        }
    }
}

impl<S> PreloaderBuilder<S> {
    /// Use `config` instead of the defaults.
    #[must_use]
    pub fn with_config(mut self, config: PreloadConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a host idle-slot source.
    #[must_use]
    pub fn with_idle(mut self, idle: Arc<dyn IdleYield>) -> Self {
        self.idle = Some(idle);
        self
    }

    /// Use a host visibility signal.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Arc<dyn VisibilityProbe>) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Spawn work with `spawner`.
    pub fn with_spawner<T>(self, spawner: T) -> PreloaderBuilder<T> {
        PreloaderBuilder {
            fetcher: self.fetcher,
            idle: self.idle,
            visibility: self.visibility,
            spawner: Some(spawner),
            config: self.config,
        }
    }
}

impl<S> PreloaderBuilder<S>
where
    S: Spawn + Clone + Send + Sync + 'static,
{
    /// Validate configuration and assemble the preloader.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or when no spawner is available.
    pub fn build(self) -> AppResult<Preloader<S>> {
        self.config.validate().context("invalid preload configuration")?;
        let spawner = self
            .spawner
            .ok_or_else(|| anyhow!("no spawner configured and no tokio runtime is running"))?;

        let idle: Arc<dyn IdleYield> = match self.idle {
            Some(idle) => idle,
            None => {
                tracing::debug!("no idle source supplied, using timer fallback");
                Arc::new(TimerFallbackYield::from_config(&self.config.idle))
            }
        };
        let visibility: Arc<dyn VisibilityProbe> = match self.visibility {
            Some(visibility) => visibility,
            None => Arc::new(AlwaysVisible),
        };

        tracing::info!(
            max_concurrency = self.config.max_concurrency,
            default_timeout_ms = self.config.default_timeout_ms,
            cancel_mode = ?self.config.cancel_mode,
            "preloader initialized"
        );
        Ok(Preloader::new(self.fetcher, idle, visibility, spawner, self.config))
    }
}
