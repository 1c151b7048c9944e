//! Prompt types for chatread.
//!
//! A [`TemplateSet`] is the whole difference between one answering approach
//! and another: the query-rewrite template, the answer template and the
//! follow-up-question instructions. Control flow never varies.

use serde::{Deserialize, Serialize};

/// Prefix marking a prompt override as text to inject into the default template.
pub const INJECTION_MARKER: &str = ">>>";

/// A named set of templates, loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSet {
    /// Unique identifier (e.g., "default", "approach2")
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    pub api_version: String,

    /// Creator identifier
    #[serde(default)]
    pub created_by: String,

    /// What this approach is for
    #[serde(default)]
    pub description: String,

    /// Template asking for a search query; slots: `chat_history`, `question`
    pub query_template: String,

    /// Template for the final answer; slots: `sources`, `chat_history`,
    /// `follow_up_questions_prompt`, `injected_prompt`
    pub answer_template: String,

    /// Instructions bound to `follow_up_questions_prompt` when requested
    #[serde(default)]
    pub follow_up_questions_prompt: String,
}

/// Named placeholders a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptSlot {
    Sources,
    ChatHistory,
    FollowUpQuestions,
    InjectedPrompt,
    Question,
}

impl PromptSlot {
    /// Placeholder name as written in templates (`{{name}}`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sources => "sources",
            Self::ChatHistory => "chat_history",
            Self::FollowUpQuestions => "follow_up_questions_prompt",
            Self::InjectedPrompt => "injected_prompt",
            Self::Question => "question",
        }
    }
}

/// How a client-supplied prompt template is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOverride<'a> {
    /// Use the template set's answer template unchanged
    Default,
    /// Inject the text into the default template's `injected_prompt` slot
    Inject(&'a str),
    /// Use the text as the complete answer template
    Replace(&'a str),
}

impl<'a> PromptOverride<'a> {
    /// Classify a raw `prompt_template` override.
    ///
    /// Absent or blank overrides select the default template. A blank string
    /// is never treated as an (empty) full replacement.
    pub fn parse(raw: Option<&'a str>) -> Self {
        match raw {
            None => Self::Default,
            Some(text) if text.trim().is_empty() => Self::Default,
            Some(text) => match text.strip_prefix(INJECTION_MARKER) {
                Some(rest) => Self::Inject(rest),
                None => Self::Replace(text),
            },
        }
    }

    /// Mode recorded in prompt metadata.
    pub fn mode(&self) -> OverrideMode {
        match self {
            Self::Default => OverrideMode::Default,
            Self::Inject(_) => OverrideMode::Injected,
            Self::Replace(_) => OverrideMode::Replaced,
        }
    }
}

/// Serializable record of which override path was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideMode {
    Default,
    Injected,
    Replaced,
}

/// A fully rendered answer prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Prompt text sent to the completion service
    pub text: String,

    /// Metadata about how it was built
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltPromptMetadata {
    /// Template set the prompt came from
    pub template_set_id: String,

    /// Override path taken
    pub override_mode: OverrideMode,

    /// Whether follow-up-question instructions were included
    pub follow_up_included: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_set_deserialization() {
        let yaml = r#"
id: test.set
title: Test Set
apiVersion: "1.0"
queryTemplate: "{{chat_history}} {{question}}"
answerTemplate: "{{sources}}"
"#;

        let set: TemplateSet = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(set.id, "test.set");
        assert_eq!(set.api_version, "1.0");
        assert!(set.created_by.is_empty());
        assert!(set.follow_up_questions_prompt.is_empty());
    }

    #[test]
    fn test_override_parse() {
        assert_eq!(PromptOverride::parse(None), PromptOverride::Default);
        assert_eq!(PromptOverride::parse(Some("")), PromptOverride::Default);
        assert_eq!(PromptOverride::parse(Some("  ")), PromptOverride::Default);
        assert_eq!(
            PromptOverride::parse(Some(">>>Answer in English.")),
            PromptOverride::Inject("Answer in English.")
        );
        assert_eq!(
            PromptOverride::parse(Some("Sources: {{sources}}")),
            PromptOverride::Replace("Sources: {{sources}}")
        );
    }

    #[test]
    fn test_marker_must_be_a_prefix() {
        assert_eq!(
            PromptOverride::parse(Some("x >>> y")),
            PromptOverride::Replace("x >>> y")
        );
        assert_eq!(PromptOverride::parse(Some(">>>")).mode(), OverrideMode::Injected);
    }

    #[test]
    fn test_override_mode_serialization() {
        let json = serde_json::to_string(&OverrideMode::Injected).unwrap();
        assert_eq!(json, "\"injected\"");
    }
}
