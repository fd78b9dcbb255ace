//! Context window accounting over the retained history suffix.
//!
//! Token counts are a character-based estimate, not a tokenizer run; the
//! point is a stable usage indicator, not billing-grade accuracy.

use serde::Serialize;

use crate::core::message::Message;

/// Usage bands for rendering the context indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageBand {
    Normal,
    Warning,
    Critical,
}

impl UsageBand {
    fn from_percentage(pct: f64) -> Self {
        if pct < 70.0 {
            UsageBand::Normal
        } else if pct < 90.0 {
            UsageBand::Warning
        } else {
            UsageBand::Critical
        }
    }
}

/// Point-in-time accounting of context window usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSnapshot {
    /// Messages in the whole history.
    pub total_messages: usize,
    /// Messages in the retained suffix sent to the backend.
    pub context_messages: usize,
    /// Estimated tokens across the retained suffix.
    pub estimated_tokens: u64,
    /// Context window size in tokens.
    pub context_limit: u64,
    /// `estimated_tokens / context_limit * 100`; deliberately not clamped so
    /// overflow is visible as > 100.
    pub usage_percentage: f64,
}

impl ContextSnapshot {
    pub fn band(&self) -> UsageBand {
        UsageBand::from_percentage(self.usage_percentage)
    }
}

/// Estimated tokens for one message: `round(chars / 4)`.
fn estimate_message_tokens(message: &Message) -> u64 {
    let chars = message.content.chars().count();
    (chars as f64 / 4.0).round() as u64
}

/// Accounts for usage of the backend's context window.
///
/// `retained_suffix` is the number of most recent messages sent with each
/// request; zero means the whole history is sent.
pub fn estimate(history: &[Message], retained_suffix: usize, context_limit: u64) -> ContextSnapshot {
    let suffix = retained(history, retained_suffix);

    let estimated_tokens: u64 = suffix.iter().map(estimate_message_tokens).sum();
    let usage_percentage = if context_limit == 0 {
        0.0
    } else {
        estimated_tokens as f64 / context_limit as f64 * 100.0
    };

    ContextSnapshot {
        total_messages: history.len(),
        context_messages: suffix.len(),
        estimated_tokens,
        context_limit,
        usage_percentage,
    }
}

/// Returns the history suffix that should be sent to the backend.
pub fn retained<'a>(history: &'a [Message], retained_suffix: usize) -> &'a [Message] {
    if retained_suffix == 0 || retained_suffix >= history.len() {
        history
    } else {
        &history[history.len() - retained_suffix..]
    }
}
