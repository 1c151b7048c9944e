//! Ask command handler.
//!
//! Runs one chat request: history and overrides come from optional JSON
//! files, individual flags take precedence over the overrides file.

use chatread_chat::{
    ApproachSettings, ChatReadRetrieveRead, ConversationTurn, RequestOverrides,
};
use chatread_core::{config::AppConfig, AppError, AppResult};
use chatread_llm::create_client;
use chatread_prompt::load_template_set;
use chatread_search::create_search_client;
use clap::Args;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Answer a question, optionally continuing a conversation
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask; appended to the history as the last turn
    pub question: Option<String>,

    /// JSON file with prior turns: [{"user": "...", "bot": "..."}, ...]
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// JSON file with request overrides
    #[arg(long)]
    pub overrides: Option<PathBuf>,

    /// Number of documents to retrieve (default: 3)
    #[arg(long)]
    pub top: Option<u32>,

    /// Use the semantic ranker
    #[arg(long)]
    pub semantic_ranker: bool,

    /// Use semantic captions as source text
    #[arg(long)]
    pub semantic_captions: bool,

    /// Leave documents of this category out of retrieval
    #[arg(long)]
    pub exclude_category: Option<String>,

    /// Ask the model to suggest follow-up questions
    #[arg(long)]
    pub suggest_followup_questions: bool,

    /// Replacement answer template, or text prefixed with ">>>" to inject
    #[arg(long)]
    pub prompt_template: Option<String>,

    /// Temperature for answer generation (0.0-2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Output the full result as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let history = self.conversation()?;
        let overrides = self.request_overrides()?;

        config.validate()?;

        let llm = create_client(&config.llm, config.llm_api_key().as_deref())?;
        let search = create_search_client(&config.search, config.search_api_key().as_deref())?;
        let templates = load_template_set(&config.workspace, &config.approach)?;

        let approach = ChatReadRetrieveRead::new(
            llm,
            search,
            templates,
            ApproachSettings::from_config(config),
        );

        let result = approach.run(&history, &overrides).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", result.answer);

            tracing::debug!("Sources: {:?}", result.data_points);
            tracing::debug!("Thoughts:\n{}", result.thoughts);
        }

        Ok(())
    }

    /// History from `--history`, with the question appended.
    fn conversation(&self) -> AppResult<Vec<ConversationTurn>> {
        let mut history: Vec<ConversationTurn> = match &self.history {
            Some(path) => read_json(path)?,
            None => Vec::new(),
        };

        if let Some(question) = &self.question {
            history.push(ConversationTurn::question(question.clone()));
        }

        if history.is_empty() {
            return Err(AppError::Request(
                "No question provided (pass QUESTION or --history)".to_string(),
            ));
        }

        Ok(history)
    }

    /// Flag overrides, falling back to `--overrides`.
    fn request_overrides(&self) -> AppResult<RequestOverrides> {
        let from_file: RequestOverrides = match &self.overrides {
            Some(path) => read_json(path)?,
            None => RequestOverrides::default(),
        };

        let from_flags = RequestOverrides {
            semantic_captions: self.semantic_captions.then_some(true),
            top: self.top,
            exclude_category: self.exclude_category.clone(),
            semantic_ranker: self.semantic_ranker.then_some(true),
            suggest_followup_questions: self.suggest_followup_questions.then_some(true),
            prompt_template: self.prompt_template.clone(),
            temperature: self.temperature,
        };

        Ok(from_flags.or(from_file))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Request(format!("Failed to read {:?}: {}", path, e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| AppError::Request(format!("Failed to parse {:?}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        ask: AskCommand,
    }

    fn parse(args: &[&str]) -> AskCommand {
        let mut argv = vec!["chatread"];
        argv.extend_from_slice(args);
        TestCli::parse_from(argv).ask
    }

    #[test]
    fn test_question_becomes_last_turn() {
        let dir = tempfile::tempdir().unwrap();
        let history_path = dir.path().join("history.json");
        std::fs::write(
            &history_path,
            r#"[{"user": "日本酒A：9", "bot": "日本酒B：8"}]"#,
        )
        .unwrap();

        let cmd = parse(&["辛口の日本酒を教えて", "--history", history_path.to_str().unwrap()]);
        let history = cmd.conversation().unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[1], ConversationTurn::question("辛口の日本酒を教えて"));
    }

    #[test]
    fn test_no_question_is_an_error() {
        let cmd = parse(&[]);
        assert!(matches!(cmd.conversation(), Err(AppError::Request(_))));
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let overrides_path = dir.path().join("overrides.json");
        std::fs::write(
            &overrides_path,
            r#"{"top": 5, "semantic_captions": true, "exclude_category": "perfume"}"#,
        )
        .unwrap();

        let cmd = parse(&[
            "q",
            "--overrides",
            overrides_path.to_str().unwrap(),
            "--top",
            "1",
            "--semantic-ranker",
        ]);
        let overrides = cmd.request_overrides().unwrap();

        assert_eq!(overrides.top(), 1);
        assert!(overrides.semantic_ranker());
        assert!(overrides.semantic_captions());
        assert_eq!(overrides.exclude_category.as_deref(), Some("perfume"));
        assert!(overrides.suggest_followup_questions.is_none());
    }

    #[test]
    fn test_malformed_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let overrides_path = dir.path().join("overrides.json");
        std::fs::write(&overrides_path, "{not json").unwrap();

        let cmd = parse(&["q", "--overrides", overrides_path.to_str().unwrap()]);
        assert!(cmd.request_overrides().is_err());
    }
}
