//! # Prometheus Preload
//!
//! Resource preloading that never competes with interactive work.
//!
//! Two strategies are offered:
//!
//! - **Immediate**: critical resources are loaded right away in strictly
//!   sequential chunks of at most two concurrent loads, so foreground traffic
//!   keeps most of the connection budget.
//! - **Idle**: non-critical resources are queued as task groups and drained a
//!   few at a time inside idle windows granted by the host. Work pauses while
//!   the host reports itself hidden.
//!
//! Every load is bounded by a timeout, and no failure is ever fatal: failures
//! are logged and handed to an optional caller callback whose own panics are
//! contained.
//!
//! ## Host ports
//!
//! The crate does not talk to a browser. Hosts plug in:
//!
//! - a [`ResourceFetcher`](core::ResourceFetcher) that performs the actual load,
//! - an [`IdleYield`](core::IdleYield) source of idle slots (defaults to a
//!   timer fallback),
//! - a [`VisibilityProbe`](core::VisibilityProbe) (defaults to always visible),
//! - a [`Spawn`](core::Spawn) implementation (defaults to the current tokio runtime).
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prometheus_preload::builders::PreloaderBuilder;
//! use prometheus_preload::core::{LoadOptions, Strategy};
//!
//! let preloader = PreloaderBuilder::new(Arc::new(my_fetcher)).build()?;
//!
//! // Critical: now, two at a time.
//! preloader.load_resources(["hero.webp", "logo.svg"], LoadOptions::default().with_batch_size(2));
//!
//! // Everything else: when the host is idle.
//! preloader.load_resources(
//!     vec!["gallery/1.jpg", "gallery/2.jpg", "ambient.mp3"],
//!     LoadOptions::default()
//!         .with_strategy(Strategy::Idle)
//!         .with_on_error(|url, err| eprintln!("{url}: {err}")),
//! );
//! ```
//!
//! See `tests/idle_scheduler_test.rs` for the scheduling behavior end to end.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Loading strategies, timeout contract and failure reporting.
pub mod core;
/// Configuration models for loaders, the idle scheduler, and timeouts.
pub mod config;
/// Builders to construct preloaders from configuration.
pub mod builders;
/// Host capability and fetcher adapters.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
