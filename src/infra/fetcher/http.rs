//! Network fetcher backed by `reqwest`.
//!
//! Every category is loaded with a GET that settles as soon as response
//! headers arrive; the status code is not inspected and the body is dropped
//! unread, matching opaque no-cors semantics. The request runs inline, so
//! the abort signal is not consulted.

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::core::error::PreloadError;
use crate::core::fetcher::ResourceFetcher;
use crate::core::resource::FetchRequest;

/// Fetcher issuing plain HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Option<Url>,
}

impl HttpFetcher {
    /// Fetcher for absolute URLs only.
    pub fn new(client: Client) -> Self {
        Self { client, base: None }
    }

    /// Resolve relative and protocol-relative URLs against `base`.
    #[must_use]
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    fn resolve(&self, request: &FetchRequest) -> Result<Url, PreloadError> {
        let parsed = match &self.base {
            Some(base) => base.join(&request.url),
            None => Url::parse(&request.url),
        };
        parsed.map_err(|e| PreloadError::load(&request.url, request.category, format!("bad url: {e}")))
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<(), PreloadError> {
        let url = self.resolve(&request)?;
        // Dropping this future on timeout cancels the request.
        match self.client.get(url).send().await {
            Ok(resp) => {
                tracing::trace!(url = %request.url, status = resp.status().as_u16(), "response received");
                Ok(())
            }
            Err(e) => Err(PreloadError::load(&request.url, request.category, e.to_string())),
        }
    }
}
