//! The chat-read-retrieve-read approach.
//!
//! One request runs five steps in order: format the history, rewrite the
//! last question into a search query, retrieve sources, assemble the answer
//! prompt, and generate the answer. Every step's error ends the request.

use crate::answer::AnswerGenerator;
use crate::history::{format_history, DEFAULT_HISTORY_TOKENS};
use crate::overrides::RequestOverrides;
use crate::query::QueryRewriter;
use crate::retriever::{Retriever, SemanticSettings};
use crate::types::{AnswerResult, ConversationTurn};
use chatread_core::{AppConfig, AppError, AppResult};
use chatread_llm::LlmClient;
use chatread_prompt::{assemble_answer_prompt, AnswerContext, TemplateSet};
use chatread_search::SearchClient;
use std::sync::Arc;
use tracing::Instrument;

/// Deployments and index fields an approach needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproachSettings {
    /// Deployment used to rewrite the search query
    pub query_deployment: String,

    /// Deployment used to answer
    pub answer_deployment: String,

    /// Index field naming the source page
    pub sourcepage_field: String,

    /// Index field holding the document text
    pub content_field: String,

    pub semantic: SemanticSettings,
}

impl ApproachSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            query_deployment: config.llm.query_deployment.clone(),
            answer_deployment: config.llm.answer_deployment.clone(),
            sourcepage_field: config.search.sourcepage_field.clone(),
            content_field: config.search.content_field.clone(),
            semantic: SemanticSettings::from(&config.search),
        }
    }
}

/// A configured approach; cheap to share, safe to run concurrently.
pub struct ChatReadRetrieveRead {
    templates: TemplateSet,
    rewriter: QueryRewriter,
    retriever: Retriever,
    generator: AnswerGenerator,
}

impl ChatReadRetrieveRead {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        search: Arc<dyn SearchClient>,
        templates: TemplateSet,
        settings: ApproachSettings,
    ) -> Self {
        Self {
            templates,
            rewriter: QueryRewriter::new(Arc::clone(&llm), settings.query_deployment),
            retriever: Retriever::new(
                search,
                settings.sourcepage_field,
                settings.content_field,
                settings.semantic,
            ),
            generator: AnswerGenerator::new(llm, settings.answer_deployment),
        }
    }

    /// Template set this approach answers with.
    pub fn template_set(&self) -> &TemplateSet {
        &self.templates
    }

    /// Answer the last turn of `history`.
    ///
    /// # Errors
    /// `AppError::Request` for an empty history; otherwise whatever the
    /// completion service, search service or prompt rendering returns.
    pub async fn run(
        &self,
        history: &[ConversationTurn],
        overrides: &RequestOverrides,
    ) -> AppResult<AnswerResult> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "chat",
            request_id = %request_id,
            approach = %self.templates.id
        );

        self.run_steps(history, overrides).instrument(span).await
    }

    async fn run_steps(
        &self,
        history: &[ConversationTurn],
        overrides: &RequestOverrides,
    ) -> AppResult<AnswerResult> {
        if history.is_empty() {
            return Err(AppError::Request(
                "Chat history must contain at least one turn".to_string(),
            ));
        }

        tracing::info!(turns = history.len(), "Generating search query");
        let query = self.rewriter.rewrite(&self.templates, history).await?;

        tracing::info!(query = %query, "Retrieving sources");
        let snippets = self.retriever.retrieve(&query, overrides).await?;
        let data_points: Vec<String> = snippets.iter().map(ToString::to_string).collect();
        let sources = data_points.join("\n");

        let chat_history = format_history(history, true, DEFAULT_HISTORY_TOKENS);
        let context = AnswerContext {
            sources: &sources,
            chat_history: &chat_history,
            suggest_follow_up_questions: overrides.suggest_followup_questions(),
        };
        let prompt =
            assemble_answer_prompt(&self.templates, &context, overrides.prompt_template.as_deref())?;

        tracing::info!(
            sources = data_points.len(),
            prompt_len = prompt.text.len(),
            override_mode = ?prompt.metadata.override_mode,
            "Generating answer"
        );
        let answer = self
            .generator
            .generate(&prompt.text, overrides.temperature())
            .await?;

        Ok(AnswerResult::new(data_points, answer, &query, &prompt.text))
    }
}
