//! Prompt rendering.
//!
//! Templates are Handlebars, rendered in strict mode with HTML escaping off:
//! every `{{slot}}` a template references must be bound, otherwise rendering
//! fails with `AppError::Prompt`. Nothing is silently left blank.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptOverride, PromptSlot, TemplateSet};
use chatread_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Inputs of the answer prompt.
#[derive(Debug, Clone, Copy)]
pub struct AnswerContext<'a> {
    /// Newline-joined source display strings
    pub sources: &'a str,

    /// Formatted chat history, including the latest turn
    pub chat_history: &'a str,

    /// Include the template set's follow-up-question instructions
    pub suggest_follow_up_questions: bool,
}

/// Render the query-rewrite prompt of a template set.
pub fn render_query_prompt(set: &TemplateSet, chat_history: &str, question: &str) -> AppResult<String> {
    let variables = HashMap::from([
        (PromptSlot::ChatHistory.name(), chat_history),
        (PromptSlot::Question.name(), question),
    ]);

    render_template(&set.query_template, &variables)
}

/// Assemble the answer prompt, honouring a client-supplied override.
///
/// - No override: the set's answer template, `injected_prompt` bound to "".
/// - `>>>` override: the set's answer template with the remainder (plus a
///   newline) bound to `injected_prompt`.
/// - Any other override: rendered as the whole template with `sources`,
///   `chat_history` and `follow_up_questions_prompt` bound. Referencing any
///   other slot is an error.
///
/// # Example
/// ```no_run
/// use chatread_prompt::{assemble_answer_prompt, load_template_set, AnswerContext};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let set = load_template_set(Path::new("."), "default")?;
/// let context = AnswerContext {
///     sources: "doc1.pdf: 日本酒A: flavor_score 8",
///     chat_history: "<|im_start|>user\n日本酒A：9\n<|im_end|>\n<|im_start|>assistant\n\n",
///     suggest_follow_up_questions: false,
/// };
/// let built = assemble_answer_prompt(&set, &context, Some(">>>Answer briefly."))?;
/// println!("{}", built.text);
/// # Ok(())
/// # }
/// ```
pub fn assemble_answer_prompt(
    set: &TemplateSet,
    context: &AnswerContext<'_>,
    prompt_override: Option<&str>,
) -> AppResult<BuiltPrompt> {
    let follow_up = if context.suggest_follow_up_questions {
        set.follow_up_questions_prompt.as_str()
    } else {
        ""
    };

    let parsed = PromptOverride::parse(prompt_override);
    tracing::debug!(
        template_set = %set.id,
        override_mode = ?parsed.mode(),
        "Assembling answer prompt"
    );

    let injected = match parsed {
        PromptOverride::Inject(extra) => format!("{}\n", extra),
        _ => String::new(),
    };

    let mut variables = HashMap::from([
        (PromptSlot::Sources.name(), context.sources),
        (PromptSlot::ChatHistory.name(), context.chat_history),
        (PromptSlot::FollowUpQuestions.name(), follow_up),
    ]);

    let text = match parsed {
        PromptOverride::Replace(template) => render_template(template, &variables)?,
        PromptOverride::Default | PromptOverride::Inject(_) => {
            variables.insert(PromptSlot::InjectedPrompt.name(), injected.as_str());
            render_template(&set.answer_template, &variables)?
        }
    };

    Ok(BuiltPrompt {
        text,
        metadata: BuiltPromptMetadata {
            template_set_id: set.id.clone(),
            override_mode: parsed.mode(),
            follow_up_included: context.suggest_follow_up_questions,
        },
    })
}

/// Fail early if a template does not parse.
pub(crate) fn compile_check(template: &str) -> AppResult<()> {
    new_registry()
        .register_template_string("check", template)
        .map_err(|e| AppError::Prompt(format!("Invalid template: {}", e)))
}

fn new_registry() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();

    // Plain text prompts: no HTML escaping, no unbound placeholders
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<&str, &str>) -> AppResult<String> {
    let mut handlebars = new_registry();

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_set() -> TemplateSet {
        TemplateSet {
            id: "test.set".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            description: String::new(),
            query_template: "History:\n{{chat_history}}\nQuestion:\n{{question}}\nSearch query:\n"
                .to_string(),
            answer_template:
                "<|im_start|>system\n{{follow_up_questions_prompt}}\n{{injected_prompt}}\nSources:\n{{sources}}\n<|im_end|>\n{{chat_history}}\n"
                    .to_string(),
            follow_up_questions_prompt: "Suggest three follow-up questions.".to_string(),
        }
    }

    const SOURCES: &str = "doc1.pdf: 日本酒A: flavor_score 8\ndoc2.pdf: 日本酒B: flavor_score 3";
    const HISTORY: &str = "<|im_start|>user\n辛口の日本酒を教えて\n<|im_end|>\n<|im_start|>assistant\n\n";

    fn context(follow_up: bool) -> AnswerContext<'static> {
        AnswerContext {
            sources: SOURCES,
            chat_history: HISTORY,
            suggest_follow_up_questions: follow_up,
        }
    }

    #[test]
    fn test_render_query_prompt() {
        let rendered = render_query_prompt(&test_set(), "", "辛口の日本酒を教えて").unwrap();
        assert_eq!(
            rendered,
            "History:\n\nQuestion:\n辛口の日本酒を教えて\nSearch query:\n"
        );
    }

    #[test]
    fn test_default_prompt_contains_sources_and_history_verbatim() {
        let built = assemble_answer_prompt(&test_set(), &context(false), None).unwrap();

        assert!(built.text.contains(SOURCES));
        assert!(built.text.contains(HISTORY));
        assert!(!built.text.contains("follow-up"));
        assert_eq!(built.metadata.override_mode, crate::types::OverrideMode::Default);
        assert!(!built.metadata.follow_up_included);
    }

    #[test]
    fn test_follow_up_instructions_only_when_requested() {
        let built = assemble_answer_prompt(&test_set(), &context(true), None).unwrap();
        assert!(built.text.contains("Suggest three follow-up questions."));
        assert!(built.metadata.follow_up_included);
    }

    #[test]
    fn test_injection_changes_only_the_injection_slot() {
        let set = test_set();
        let built =
            assemble_answer_prompt(&set, &context(false), Some(">>>Answer in English.")).unwrap();

        let expected = set
            .answer_template
            .replace("{{follow_up_questions_prompt}}", "")
            .replace("{{injected_prompt}}", "Answer in English.\n")
            .replace("{{sources}}", SOURCES)
            .replace("{{chat_history}}", HISTORY);

        assert_eq!(built.text, expected);
        assert_eq!(built.metadata.override_mode, crate::types::OverrideMode::Injected);
    }

    #[test]
    fn test_full_override_replaces_template() {
        let built = assemble_answer_prompt(
            &test_set(),
            &context(false),
            Some("Use only these:\n{{sources}}\n---\n{{chat_history}}"),
        )
        .unwrap();

        assert_eq!(built.text, format!("Use only these:\n{}\n---\n{}", SOURCES, HISTORY));
        assert_eq!(built.metadata.override_mode, crate::types::OverrideMode::Replaced);
    }

    #[test]
    fn test_full_override_with_unknown_placeholder_fails() {
        let result = assemble_answer_prompt(
            &test_set(),
            &context(false),
            Some("Sources: {{sources}} Tone: {{tone}}"),
        );
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_full_override_cannot_use_injection_slot() {
        let result = assemble_answer_prompt(
            &test_set(),
            &context(false),
            Some("{{injected_prompt}}{{sources}}"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_override_fails() {
        let result = assemble_answer_prompt(&test_set(), &context(false), Some("{{#each sources}"));
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_braces_in_sources_are_not_reinterpreted() {
        let ctx = AnswerContext {
            sources: "doc.pdf: {{chat_history}} literally",
            chat_history: "",
            suggest_follow_up_questions: false,
        };
        let built = assemble_answer_prompt(&test_set(), &ctx, None).unwrap();
        assert!(built.text.contains("doc.pdf: {{chat_history}} literally"));
    }
}
