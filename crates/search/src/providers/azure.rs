//! Azure Cognitive Search provider.
//!
//! REST: `POST {endpoint}/indexes/{index}/docs/search?api-version={v}` with an
//! `api-key` header. Only the query surface used by the flow is modelled.

use crate::client::SearchClient;
use crate::types::{SearchDocument, SearchRequest};
use chatread_core::{AppError, AppResult};
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    search: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a str>,
    top: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speller: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    semantic_configuration: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    captions: Option<&'a str>,
}

/// Search response body.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<SearchDocument>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Client for one Azure Cognitive Search index.
pub struct AzureSearchClient {
    search_url: String,
    client: reqwest::Client,
}

impl AzureSearchClient {
    /// Create a client for `index` on the service at `endpoint`.
    pub fn new(
        endpoint: &str,
        index: &str,
        api_key: &str,
        api_version: &str,
        timeout: Duration,
    ) -> AppResult<Self> {
        let endpoint = endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "Invalid search endpoint: '{}'",
                endpoint
            )));
        }
        if index.is_empty() {
            return Err(AppError::Config("Search index name cannot be empty".to_string()));
        }

        let mut key = header::HeaderValue::from_str(api_key)
            .map_err(|e| AppError::Config(format!("Invalid search API key header: {}", e)))?;
        key.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::HeaderName::from_static("api-key"), key);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let search_url = format!(
            "{}/indexes/{}/docs/search?api-version={}",
            endpoint.trim_end_matches('/'),
            index,
            api_version
        );

        tracing::debug!(url = %search_url, "Search client initialized");

        Ok(Self { search_url, client })
    }

    fn to_body<'a>(&self, request: &'a SearchRequest) -> SearchBody<'a> {
        let semantic = request.semantic.as_ref();

        SearchBody {
            search: &request.search,
            filter: request.filter.as_deref(),
            top: request.top,
            query_type: semantic.map(|_| "semantic"),
            query_language: semantic.map(|s| s.query_language.as_str()),
            speller: semantic.map(|s| s.speller.as_str()),
            semantic_configuration: semantic.map(|s| s.configuration.as_str()),
            captions: semantic.and_then(|s| s.captions.as_deref()),
        }
    }
}

#[async_trait::async_trait]
impl SearchClient for AzureSearchClient {
    fn provider_name(&self) -> &str {
        "azure-search"
    }

    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<SearchDocument>> {
        tracing::debug!(
            query = %request.search,
            filter = ?request.filter,
            top = request.top,
            query_type = ?request.query_type(),
            "POST {}",
            self.search_url
        );

        let response = self
            .client
            .post(&self.search_url)
            .json(&self.to_body(request))
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to send search request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(parsed) => match parsed.error.code {
                    Some(code) => format!("{}: {}", code, parsed.error.message),
                    None => parsed.error.message,
                },
                Err(_) => body,
            };
            return Err(AppError::Search(format!(
                "Search API error ({}): {}",
                status, message
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse search response: {}", e)))?;

        tracing::debug!(hits = parsed.value.len(), "Received search results");

        Ok(parsed.value)
    }
}
