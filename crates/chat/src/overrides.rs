//! Per-request overrides.

use chatread_search::RetrievalFilter;
use serde::{Deserialize, Serialize};

/// Number of documents retrieved when `top` is not set.
pub const DEFAULT_TOP: u32 = 3;

/// Answer temperature when `temperature` is not set.
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Optional knobs a client may send with a request. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RequestOverrides {
    /// Use semantic captions as source text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_captions: Option<bool>,

    /// Number of documents to retrieve
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,

    /// Category to leave out of retrieval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_category: Option<String>,

    /// Rank with the semantic ranker instead of plain keyword search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_ranker: Option<bool>,

    /// Ask the model for follow-up questions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggest_followup_questions: Option<bool>,

    /// Replacement answer template, or `>>>`-prefixed text to inject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,

    /// Answer sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl RequestOverrides {
    /// Effective `top`; zero counts as unset.
    pub fn top(&self) -> u32 {
        match self.top {
            Some(top) if top > 0 => top,
            _ => DEFAULT_TOP,
        }
    }

    /// Effective answer temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn semantic_ranker(&self) -> bool {
        self.semantic_ranker.unwrap_or(false)
    }

    pub fn semantic_captions(&self) -> bool {
        self.semantic_captions.unwrap_or(false)
    }

    pub fn suggest_followup_questions(&self) -> bool {
        self.suggest_followup_questions.unwrap_or(false)
    }

    /// Filter excluding `exclude_category`, if one was given.
    pub fn filter(&self) -> Option<RetrievalFilter> {
        self.exclude_category
            .as_deref()
            .and_then(RetrievalFilter::exclude_category)
    }

    /// Fill every unset field from `fallback`.
    pub fn or(self, fallback: RequestOverrides) -> Self {
        Self {
            semantic_captions: self.semantic_captions.or(fallback.semantic_captions),
            top: self.top.or(fallback.top),
            exclude_category: self.exclude_category.or(fallback.exclude_category),
            semantic_ranker: self.semantic_ranker.or(fallback.semantic_ranker),
            suggest_followup_questions: self
                .suggest_followup_questions
                .or(fallback.suggest_followup_questions),
            prompt_template: self.prompt_template.or(fallback.prompt_template),
            temperature: self.temperature.or(fallback.temperature),
        }
    }
}
