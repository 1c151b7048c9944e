//! Completion provider factory.
//!
//! Resolves the configured provider into a shared `LlmClient`.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiCompletionClient};
use crate::types::ProviderType;
use chatread_core::{AppError, AppResult, LlmSettings};
use std::sync::Arc;
use std::time::Duration;

/// Create a completion client from settings.
///
/// # Arguments
/// * `settings` - The `llm:` configuration section
/// * `api_key` - Key resolved from `settings.api_key_env` (ignored by Ollama)
///
/// # Errors
/// Returns `AppError::Config` if:
/// - The provider is unknown
/// - A required endpoint or API key is missing
/// - The HTTP client cannot be built
pub fn create_client(settings: &LlmSettings, api_key: Option<&str>) -> AppResult<Arc<dyn LlmClient>> {
    let provider = ProviderType::parse(&settings.provider).ok_or_else(|| {
        AppError::Config(format!("Unknown LLM provider: {}", settings.provider))
    })?;

    let endpoint = settings
        .endpoint
        .as_deref()
        .or(provider.default_endpoint())
        .ok_or_else(|| {
            AppError::Config(format!("{} provider requires an endpoint", provider.as_str()))
        })?;

    let api_key = match (provider.requires_api_key(), api_key) {
        (true, None) => {
            return Err(AppError::Config(format!(
                "{} provider requires API key (set {})",
                provider.as_str(),
                settings.api_key_env
            )))
        }
        (_, key) => key.unwrap_or_default(),
    };

    let timeout = Duration::from_secs(settings.timeout);
    tracing::debug!(provider = provider.as_str(), endpoint = %endpoint, "Creating LLM client");

    match provider {
        ProviderType::AzureOpenAi => Ok(Arc::new(OpenAiCompletionClient::azure(
            endpoint,
            api_key,
            settings.api_version.clone(),
            timeout,
        )?)),
        ProviderType::OpenAi => Ok(Arc::new(OpenAiCompletionClient::openai(
            endpoint, api_key, timeout,
        )?)),
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::with_timeout(endpoint, timeout)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str, endpoint: Option<&str>) -> LlmSettings {
        LlmSettings {
            provider: provider.to_string(),
            endpoint: endpoint.map(str::to_string),
            ..LlmSettings::default()
        }
    }

    #[test]
    fn test_create_ollama_client() {
        let client = create_client(&settings("ollama", None), None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_azure_client() {
        let client = create_client(
            &settings("azure-openai", Some("https://contoso.openai.azure.com")),
            Some("key"),
        )
        .unwrap();
        assert_eq!(client.provider_name(), "azure-openai");
    }

    #[test]
    fn test_azure_requires_endpoint() {
        match create_client(&settings("azure-openai", None), Some("key")) {
            Err(err) => assert!(err.to_string().contains("requires an endpoint")),
            Ok(_) => panic!("Expected error for Azure without endpoint"),
        }
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client(&settings("openai", None), None) {
            Err(err) => assert!(err.to_string().contains("requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client(&settings("unknown", None), None) {
            Err(err) => assert!(err.to_string().contains("Unknown LLM provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
