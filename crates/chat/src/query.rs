//! Search query generation.

use crate::history::{format_history, DEFAULT_HISTORY_TOKENS};
use crate::types::ConversationTurn;
use chatread_core::{AppError, AppResult};
use chatread_llm::{LlmClient, LlmRequest};
use chatread_prompt::{render_query_prompt, TemplateSet};
use std::sync::Arc;

pub const QUERY_TEMPERATURE: f32 = 0.0;
pub const QUERY_MAX_TOKENS: u32 = 32;
pub const QUERY_STOP: [&str; 1] = ["\n"];

/// Turns the conversation into a keyword query for the search index.
pub struct QueryRewriter {
    llm: Arc<dyn LlmClient>,
    deployment: String,
}

impl QueryRewriter {
    pub fn new(llm: Arc<dyn LlmClient>, deployment: impl Into<String>) -> Self {
        Self {
            llm,
            deployment: deployment.into(),
        }
    }

    /// Ask the completion service for a search query.
    ///
    /// The prompt sees the history without its last turn, and the last
    /// turn's user text as the question. The first choice is returned as-is.
    pub async fn rewrite(
        &self,
        templates: &TemplateSet,
        history: &[ConversationTurn],
    ) -> AppResult<String> {
        let last = history
            .last()
            .ok_or_else(|| AppError::Request("History has no turns".to_string()))?;

        let chat_history = format_history(history, false, DEFAULT_HISTORY_TOKENS);
        let prompt = render_query_prompt(templates, &chat_history, &last.user)?;

        tracing::debug!(prompt_len = prompt.len(), "Rendered query prompt");

        let request = LlmRequest::new(prompt, &self.deployment)
            .with_temperature(QUERY_TEMPERATURE)
            .with_max_tokens(QUERY_MAX_TOKENS)
            .with_n(1)
            .with_stop(QUERY_STOP);

        let response = self.llm.complete(&request).await?;
        let query = response.first_text()?.to_string();

        tracing::debug!(query = %query, "Generated search query");
        Ok(query)
    }
}
