//! Chat flow type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One exchange of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// What the user said
    pub user: String,

    /// The assistant's reply, absent for the turn being answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<String>,
}

impl ConversationTurn {
    /// A turn that has not been answered yet.
    pub fn question(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: None,
        }
    }

    /// A completed exchange.
    pub fn answered(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: Some(bot.into()),
        }
    }
}

/// A retrieved excerpt and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSnippet {
    /// Page or file the excerpt was drawn from
    pub locator: String,

    /// Single-line excerpt text
    pub excerpt: String,

    /// Service relevance score, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl fmt::Display for SourceSnippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.locator, self.excerpt)
    }
}

/// Result of one chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Source display strings, in retrieval order
    pub data_points: Vec<String>,

    /// Generated answer, verbatim
    pub answer: String,

    /// Rewritten query and final prompt, for diagnostics
    pub thoughts: String,
}

impl AnswerResult {
    /// Assemble a result; `thoughts` records the query and the prompt.
    pub fn new(data_points: Vec<String>, answer: String, query: &str, prompt: &str) -> Self {
        Self {
            data_points,
            answer,
            thoughts: format!("Searched for:\n{}\n\nPrompt:\n{}", query, prompt),
        }
    }

    /// `thoughts` with line breaks as `<br>`, for HTML front ends.
    pub fn thoughts_html(&self) -> String {
        self.thoughts.replace('\n', "<br>")
    }
}
