//! Document retrieval and snippet extraction.

use crate::overrides::RequestOverrides;
use crate::types::SourceSnippet;
use chatread_core::{AppResult, SearchSettings};
use chatread_search::{
    SearchClient, SearchDocument, SearchRequest, SemanticOptions, EXTRACTIVE_CAPTIONS,
};
use std::sync::Arc;

/// Separator between caption texts of one document.
const CAPTION_SEPARATOR: &str = " . ";

/// Index-side semantic ranking settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticSettings {
    pub query_language: String,
    pub speller: String,
    pub configuration: String,
}

impl Default for SemanticSettings {
    fn default() -> Self {
        Self {
            query_language: "ja-jp".to_string(),
            speller: "none".to_string(),
            configuration: "default".to_string(),
        }
    }
}

impl From<&SearchSettings> for SemanticSettings {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            query_language: settings.query_language.clone(),
            speller: settings.query_speller.clone(),
            configuration: settings.semantic_configuration.clone(),
        }
    }
}

/// Runs the search and turns hits into single-line snippets.
pub struct Retriever {
    search: Arc<dyn SearchClient>,
    sourcepage_field: String,
    content_field: String,
    semantic: SemanticSettings,
}

impl Retriever {
    pub fn new(
        search: Arc<dyn SearchClient>,
        sourcepage_field: impl Into<String>,
        content_field: impl Into<String>,
        semantic: SemanticSettings,
    ) -> Self {
        Self {
            search,
            sourcepage_field: sourcepage_field.into(),
            content_field: content_field.into(),
            semantic,
        }
    }

    /// Build the search request for `query` under `overrides`.
    pub fn build_request(&self, query: &str, overrides: &RequestOverrides) -> SearchRequest {
        let top = overrides.top();
        let filter = overrides.filter().map(|f| f.into_string());

        let request = if overrides.semantic_ranker() {
            let captions = overrides
                .semantic_captions()
                .then(|| EXTRACTIVE_CAPTIONS.to_string());
            SearchRequest::semantic(
                query,
                top,
                SemanticOptions {
                    query_language: self.semantic.query_language.clone(),
                    speller: self.semantic.speller.clone(),
                    configuration: self.semantic.configuration.clone(),
                    captions,
                },
            )
        } else {
            SearchRequest::keyword(query, top)
        };

        request.with_filter(filter)
    }

    /// Search and map every hit to a snippet, in service order.
    pub async fn retrieve(
        &self,
        query: &str,
        overrides: &RequestOverrides,
    ) -> AppResult<Vec<SourceSnippet>> {
        let request = self.build_request(query, overrides);
        tracing::debug!(
            query_type = ?request.query_type(),
            top = request.top,
            filter = ?request.filter,
            "Searching index"
        );

        let documents = self.search.search(&request).await?;
        tracing::debug!(hits = documents.len(), "Search returned");

        let use_captions = overrides.semantic_captions();
        documents
            .iter()
            .map(|doc| self.to_snippet(doc, use_captions))
            .collect()
    }

    fn to_snippet(&self, doc: &SearchDocument, use_captions: bool) -> AppResult<SourceSnippet> {
        let locator = doc.text_field(&self.sourcepage_field)?.to_string();

        let text = if use_captions {
            doc.captions()
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(CAPTION_SEPARATOR)
        } else {
            doc.text_field(&self.content_field)?.to_string()
        };

        Ok(SourceSnippet {
            locator,
            excerpt: nonewlines(&text),
            score: doc.best_score(),
        })
    }
}

/// Replace line breaks with spaces.
pub fn nonewlines(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}
