//! Fetcher adapters.

#[cfg(feature = "http-fetcher")]
pub mod http;
pub mod router;

#[cfg(feature = "http-fetcher")]
pub use http::HttpFetcher;
pub use router::CategoryRouter;
