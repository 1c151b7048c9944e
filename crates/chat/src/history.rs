//! Chat history formatting.
//!
//! Renders turns in the `<|im_start|>` / `<|im_end|>` markup the answer
//! templates expect, newest turns kept first when the budget runs out.

use crate::types::ConversationTurn;

/// Default history budget, in approximate tokens.
pub const DEFAULT_HISTORY_TOKENS: usize = 1000;

/// Characters per token used to turn the token budget into a character budget.
pub const CHARS_PER_TOKEN: usize = 4;

/// Format `history` as one text block, oldest included turn first.
///
/// Turns are prepended from the most recent backwards; the walk stops right
/// after the accumulated text grows past `approx_max_tokens * 4` characters,
/// so the result can overshoot the budget by at most one turn.
pub fn format_history(
    history: &[ConversationTurn],
    include_last_turn: bool,
    approx_max_tokens: usize,
) -> String {
    let turns = if include_last_turn {
        history
    } else {
        &history[..history.len().saturating_sub(1)]
    };

    let budget = approx_max_tokens * CHARS_PER_TOKEN;
    let mut text = String::new();
    let mut chars = 0;

    for turn in turns.iter().rev() {
        let formatted = format_turn(turn);
        chars += formatted.chars().count();
        text.insert_str(0, &formatted);

        if chars > budget {
            break;
        }
    }

    text
}

fn format_turn(turn: &ConversationTurn) -> String {
    let reply = match turn.bot.as_deref() {
        Some(bot) if !bot.is_empty() => format!("{}<|im_end|>", bot),
        _ => String::new(),
    };

    format!(
        "<|im_start|>user\n{}\n<|im_end|>\n<|im_start|>assistant\n{}\n",
        turn.user, reply
    )
}
