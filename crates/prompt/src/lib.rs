//! Prompt system for chatread.
//!
//! - YAML template sets, built-in and per-workspace
//! - Strict Handlebars rendering of the query and answer prompts
//! - Client prompt overrides (`>>>` injection or full replacement)

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{assemble_answer_prompt, render_query_prompt, AnswerContext};
pub use loader::{list_template_sets, load_template_set};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, OverrideMode, PromptOverride, PromptSlot, TemplateSet,
    INJECTION_MARKER,
};
