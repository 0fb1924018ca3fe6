//! Routes loads to per-category fetchers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::PreloadError;
use crate::core::fetcher::ResourceFetcher;
use crate::core::resource::{FetchRequest, ResourceCategory};

/// Dispatches each request to the fetcher registered for its category,
/// falling back to a default fetcher.
pub struct CategoryRouter {
    routes: HashMap<ResourceCategory, Arc<dyn ResourceFetcher>>,
    fallback: Arc<dyn ResourceFetcher>,
}

impl CategoryRouter {
    /// Route everything to `fallback` until categories are registered.
    pub fn new(fallback: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            routes: HashMap::new(),
            fallback,
        }
    }

    /// Register `fetcher` for `category`.
    #[must_use]
    pub fn route(mut self, category: ResourceCategory, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        self.routes.insert(category, fetcher);
        self
    }

    fn fetcher_for(&self, category: ResourceCategory) -> &dyn ResourceFetcher {
        self.routes
            .get(&category)
            .map_or(self.fallback.as_ref(), |f| f.as_ref())
    }
}

#[async_trait]
impl ResourceFetcher for CategoryRouter {
    async fn fetch(&self, request: FetchRequest) -> Result<(), PreloadError> {
        tracing::trace!(url = %request.url, category = %request.category, "routing load");
        self.fetcher_for(request.category).fetch(request).await
    }
}
