//! SearchBackend trait — the abstraction over the web-search service.

use crate::error::ProviderError;
use async_trait::async_trait;

/// A service that answers a free-text query with summarized text.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "exa").
    fn name(&self) -> &str;

    /// Run a query and return the backend's summarized answer.
    async fn search(&self, query: &str) -> Result<String, ProviderError>;
}
