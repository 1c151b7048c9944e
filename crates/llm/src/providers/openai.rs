//! OpenAI-compatible text completion provider.
//!
//! Serves both Azure OpenAI and the public OpenAI API; they share the
//! `/completions` wire format and differ only in URL layout and auth header:
//! - Azure: `POST {endpoint}/openai/deployments/{deployment}/completions?api-version={v}`, `api-key` header
//! - OpenAI: `POST {endpoint}/v1/completions`, `Authorization: Bearer`, model in body

use crate::client::{LlmChoice, LlmClient, LlmRequest, LlmResponse, LlmUsage};
use chatread_core::{AppError, AppResult};
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which OpenAI-compatible API the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFlavor {
    /// Azure OpenAI; the request model is a deployment name
    Azure { api_version: String },
    /// Public OpenAI API
    OpenAi,
}

/// Completion request body.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

/// Completion response body.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
    #[serde(default)]
    index: u32,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for OpenAI-compatible `/completions` endpoints.
pub struct OpenAiCompletionClient {
    base_url: String,
    flavor: ApiFlavor,
    client: reqwest::Client,
}

impl OpenAiCompletionClient {
    /// Create a client for an Azure OpenAI resource.
    pub fn azure(
        endpoint: &str,
        api_key: &str,
        api_version: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let flavor = ApiFlavor::Azure {
            api_version: api_version.into(),
        };
        let auth = header::HeaderValue::from_str(api_key)
            .map_err(|e| AppError::Config(format!("Invalid API key header: {}", e)))?;
        Self::build(endpoint, flavor, header::HeaderName::from_static("api-key"), auth, timeout)
    }

    /// Create a client for the public OpenAI API (or a compatible server).
    pub fn openai(endpoint: &str, api_key: &str, timeout: Duration) -> AppResult<Self> {
        let auth = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| AppError::Config(format!("Invalid API key header: {}", e)))?;
        Self::build(endpoint, ApiFlavor::OpenAi, header::AUTHORIZATION, auth, timeout)
    }

    fn build(
        endpoint: &str,
        flavor: ApiFlavor,
        auth_name: header::HeaderName,
        mut auth_value: header::HeaderValue,
        timeout: Duration,
    ) -> AppResult<Self> {
        let endpoint = endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "Invalid completion endpoint: '{}'",
                endpoint
            )));
        }

        auth_value.set_sensitive(true);
        let mut headers = header::HeaderMap::new();
        headers.insert(auth_name, auth_value);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(endpoint = %endpoint, flavor = ?flavor, "Completion client initialized");

        Ok(Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            flavor,
            client,
        })
    }

    /// URL of the completions endpoint for a deployment or model.
    fn completions_url(&self, model: &str) -> String {
        match &self.flavor {
            ApiFlavor::Azure { api_version } => format!(
                "{}/openai/deployments/{}/completions?api-version={}",
                self.base_url, model, api_version
            ),
            ApiFlavor::OpenAi => format!("{}/v1/completions", self.base_url),
        }
    }

    fn to_completion_request<'a>(&self, request: &'a LlmRequest) -> CompletionRequest<'a> {
        let model = match self.flavor {
            ApiFlavor::Azure { .. } => None,
            ApiFlavor::OpenAi => Some(request.model.as_str()),
        };

        CompletionRequest {
            model,
            prompt: &request.prompt,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            n: request.n,
            stop: if request.stop.is_empty() {
                None
            } else {
                Some(&request.stop)
            },
        }
    }

    fn convert_response(&self, request: &LlmRequest, response: CompletionResponse) -> LlmResponse {
        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        LlmResponse {
            choices: response
                .choices
                .into_iter()
                .map(|c| LlmChoice {
                    text: c.text,
                    index: c.index,
                    finish_reason: c.finish_reason,
                })
                .collect(),
            model: response.model.unwrap_or_else(|| request.model.clone()),
            usage,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiCompletionClient {
    fn provider_name(&self) -> &str {
        match self.flavor {
            ApiFlavor::Azure { .. } => "azure-openai",
            ApiFlavor::OpenAi => "openai",
        }
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let url = self.completions_url(&request.model);
        tracing::debug!(
            model = %request.model,
            prompt_len = request.prompt.len(),
            max_tokens = ?request.max_tokens,
            "POST {}",
            url
        );

        let response = self
            .client
            .post(&url)
            .json(&self.to_completion_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send completion request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AppError::Llm(format!(
                "{} API error ({}): {}",
                self.provider_name(),
                status,
                message
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse completion response: {}", e)))?;

        tracing::debug!(
            model = %request.model,
            choices = completion.choices.len(),
            "Received completion"
        );

        Ok(self.convert_response(request, completion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn azure() -> OpenAiCompletionClient {
        OpenAiCompletionClient::azure(
            "https://contoso.openai.azure.com/",
            "secret",
            "2022-12-01",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_azure_url_uses_deployment() {
        let client = azure();
        assert_eq!(client.provider_name(), "azure-openai");
        assert_eq!(
            client.completions_url("davinci"),
            "https://contoso.openai.azure.com/openai/deployments/davinci/completions?api-version=2022-12-01"
        );
    }

    #[test]
    fn test_openai_url_and_model_in_body() {
        let client =
            OpenAiCompletionClient::openai("https://api.openai.com", "sk-x", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.provider_name(), "openai");
        assert_eq!(
            client.completions_url("gpt-3.5-turbo-instruct"),
            "https://api.openai.com/v1/completions"
        );

        let request = LlmRequest::new("hi", "gpt-3.5-turbo-instruct");
        let body = serde_json::to_value(client.to_completion_request(&request)).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo-instruct");
    }

    #[test]
    fn test_azure_body_carries_decoding_parameters() {
        let client = azure();
        let request = LlmRequest::new("Search query:", "davinci")
            .with_temperature(0.0)
            .with_max_tokens(32)
            .with_n(1)
            .with_stop(["\n"]);

        let body = serde_json::to_value(client.to_completion_request(&request)).unwrap();
        assert!(body.get("model").is_none());
        assert_eq!(body["prompt"], "Search query:");
        assert_eq!(body["max_tokens"], 32);
        assert_eq!(body["n"], 1);
        assert_eq!(body["stop"], serde_json::json!(["\n"]));
    }

    #[test]
    fn test_empty_stop_is_omitted() {
        let client = azure();
        let request = LlmRequest::new("p", "chat");
        let body = serde_json::to_value(client.to_completion_request(&request)).unwrap();
        assert!(body.get("stop").is_none());
    }

    #[test]
    fn test_convert_response_keeps_choice_order() {
        let client = azure();
        let raw = r#"{
            "id": "cmpl-1",
            "object": "text_completion",
            "choices": [
                {"text": " 辛口 日本酒", "index": 0, "finish_reason": "stop"},
                {"text": "other", "index": 1, "finish_reason": "length"}
            ],
            "usage": {"prompt_tokens": 90, "completion_tokens": 4, "total_tokens": 94}
        }"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        let request = LlmRequest::new("p", "davinci");

        let response = client.convert_response(&request, parsed);
        assert_eq!(response.model, "davinci");
        assert_eq!(response.first_text().unwrap(), " 辛口 日本酒");
        assert_eq!(response.choices[1].finish_reason.as_deref(), Some("length"));
        assert_eq!(response.usage.total_tokens, 94);
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let result =
            OpenAiCompletionClient::azure("contoso", "k", "2022-12-01", Duration::from_secs(5));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
