//! Answer generation.

use chatread_core::AppResult;
use chatread_llm::{LlmClient, LlmRequest};
use std::sync::Arc;

pub const ANSWER_MAX_TOKENS: u32 = 2048;

/// Chat markup tokens; generation stops before the model opens a new turn.
pub const ANSWER_STOP: [&str; 2] = ["<|im_end|>", "<|im_start|>"];

/// Completes the assembled answer prompt.
pub struct AnswerGenerator {
    llm: Arc<dyn LlmClient>,
    deployment: String,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, deployment: impl Into<String>) -> Self {
        Self {
            llm,
            deployment: deployment.into(),
        }
    }

    /// Generate the answer text, returned verbatim.
    pub async fn generate(&self, prompt: &str, temperature: f32) -> AppResult<String> {
        let request = LlmRequest::new(prompt, &self.deployment)
            .with_temperature(temperature)
            .with_max_tokens(ANSWER_MAX_TOKENS)
            .with_n(1)
            .with_stop(ANSWER_STOP);

        let response = self.llm.complete(&request).await?;
        let answer = response.first_text()?.to_string();

        tracing::debug!(
            answer_len = answer.len(),
            completion_tokens = response.usage.completion_tokens,
            "Generated answer"
        );
        Ok(answer)
    }
}
