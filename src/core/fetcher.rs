//! Fetcher abstraction implemented by the host.

use async_trait::async_trait;

use super::error::PreloadError;
use super::resource::FetchRequest;

/// Loads a single resource using the mechanism named in the request.
///
/// The returned future settles once the host reports success or failure.
/// Implementations should stop work early when `request.signal` is tripped.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_preload::core::{FetchRequest, PreloadError, ResourceFetcher};
///
/// struct LoggingFetcher;
///
/// #[async_trait]
/// impl ResourceFetcher for LoggingFetcher {
///     async fn fetch(&self, request: FetchRequest) -> Result<(), PreloadError> {
///         println!("{} via {:?}", request.url, request.mechanism);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ResourceFetcher: Send + Sync + 'static {
    /// Load the resource described by `request`.
    async fn fetch(&self, request: FetchRequest) -> Result<(), PreloadError>;
}

