//! Core loading strategies, the timeout contract and failure reporting.

pub mod batch_loader;
pub mod error;
pub mod fetcher;
pub mod host;
pub mod idle_scheduler;
pub mod options;
pub mod preloader;
pub mod reporter;
pub mod resource;
pub mod stats;
pub mod timeout_guard;
pub mod validate;

pub use batch_loader::{BatchLoader, BatchReport};
pub use error::{AppResult, ConfigError, PreloadError};
pub use fetcher::ResourceFetcher;
pub use host::{IdleDeadline, IdleYield, Spawn, VisibilityProbe};
pub use idle_scheduler::{IdleScheduler, TaskGroup};
pub use options::{LoadOptions, Strategy, MAX_CONCURRENCY};
pub use preloader::Preloader;
pub use reporter::{ErrorCallback, ErrorReporter};
pub use resource::{CacheMode, FetchRequest, LoadMechanism, RequestMode, ResourceCategory, ResourceList};
pub use stats::PreloadStats;
pub use timeout_guard::{AbortSignal, CancelMode, TimeoutGuard, DEFAULT_TIMEOUT};
pub use validate::is_safe_url;
