//! Chat-read-retrieve-read question answering.
//!
//! Given a conversation, produce an answer grounded in documents pulled from
//! a search index:
//!
//! 1. [`history::format_history`] renders the turns as chat markup
//! 2. [`query::QueryRewriter`] asks the model for a search query
//! 3. [`retriever::Retriever`] searches and extracts source snippets
//! 4. `chatread_prompt::assemble_answer_prompt` fills the answer template
//! 5. [`answer::AnswerGenerator`] completes it
//!
//! [`ChatReadRetrieveRead`] wires the steps together.

pub mod answer;
pub mod approach;
pub mod history;
pub mod overrides;
pub mod query;
pub mod retriever;
pub mod types;

pub use approach::{ApproachSettings, ChatReadRetrieveRead};
pub use history::{format_history, DEFAULT_HISTORY_TOKENS};
pub use overrides::RequestOverrides;
pub use retriever::SemanticSettings;
pub use types::{AnswerResult, ConversationTurn, SourceSnippet};

#[cfg(test)]
mod tests;
