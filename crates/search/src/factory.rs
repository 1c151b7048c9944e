//! Search provider factory.

use crate::client::SearchClient;
use crate::providers::AzureSearchClient;
use chatread_core::{AppError, AppResult, SearchSettings};
use std::sync::Arc;
use std::time::Duration;

/// Create a search client from settings.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown, or the endpoint or
/// API key is missing or malformed.
pub fn create_search_client(
    settings: &SearchSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn SearchClient>> {
    match settings.provider.to_lowercase().as_str() {
        "azure-search" | "azure" => {
            let endpoint = settings.endpoint.as_deref().ok_or_else(|| {
                AppError::Config("azure-search provider requires an endpoint".to_string())
            })?;
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(format!(
                    "azure-search provider requires API key (set {})",
                    settings.api_key_env
                ))
            })?;

            let client = AzureSearchClient::new(
                endpoint,
                &settings.index,
                api_key,
                &settings.api_version,
                Duration::from_secs(settings.timeout),
            )?;
            Ok(Arc::new(client))
        }
        other => Err(AppError::Config(format!("Unknown search provider: {}", other))),
    }
}
