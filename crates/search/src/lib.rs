//! Search service integration for chatread.
//!
//! Sends the rewritten query to a managed search index and hands back the
//! documents in the service's relevance order. No ranking happens here.

pub mod client;
pub mod factory;
pub mod filter;
pub mod providers;
pub mod types;

pub use client::SearchClient;
pub use factory::create_search_client;
pub use filter::RetrievalFilter;
pub use providers::AzureSearchClient;
pub use types::{
    QueryType, SearchCaption, SearchDocument, SearchRequest, SemanticOptions, EXTRACTIVE_CAPTIONS,
};
