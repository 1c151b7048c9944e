//! Search client abstraction.

use crate::types::{SearchDocument, SearchRequest};
use chatread_core::AppResult;

/// Trait for search providers.
///
/// Ranking is entirely the service's business: implementations return
/// documents in the order the service produced them.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Get the provider name (e.g., "azure-search").
    fn provider_name(&self) -> &str;

    /// Run one query and return at most `request.top` documents.
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<SearchDocument>>;
}
