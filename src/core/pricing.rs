//! Token estimation and cost calculation.
//!
//! Costs are estimated from message length (about four characters per
//! token) rather than a real tokenizer; routing only needs a consistent
//! relative figure, not metered usage.

use super::models::ChatMessage;
use super::provider::ProviderProfile;

/// Characters per token used by the estimator.
pub const CHARS_PER_TOKEN: u64 = 4;

/// Approximate prompt tokens for a set of messages (never zero).
#[must_use]
pub fn estimate_tokens(messages: &[ChatMessage]) -> u64 {
    let chars: u64 = messages
        .iter()
        .map(|m| m.content.chars().count() as u64)
        .sum();
    chars.div_ceil(CHARS_PER_TOKEN).max(1)
}

/// `cost_per_1k_tokens * tokens / 1000`, in USD.
#[must_use]
pub fn estimate_cost(provider: &ProviderProfile, tokens: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let tokens = tokens as f64;
    provider.cost_per_1k_tokens * tokens / 1000.0
}
