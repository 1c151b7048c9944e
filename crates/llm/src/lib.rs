//! Completion service integration for chatread.
//!
//! Provider-agnostic access to text completion endpoints through the
//! [`LlmClient`] trait.
//!
//! # Providers
//! - **azure-openai**: Azure OpenAI deployments (default)
//! - **openai**: public OpenAI `/v1/completions`
//! - **ollama**: local model runtime
//!
//! # Example
//! ```no_run
//! use chatread_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3").with_max_tokens(32);
//! let response = client.complete(&request).await?;
//! println!("{}", response.first_text()?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmChoice, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiCompletionClient};
pub use types::ProviderType;
