//! Request and decision data models.
//!
//! These types are the wire contract between the router and its callers:
//! a [`ChatRequest`] goes in, a [`RoutingDecision`] comes out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::strategy::Strategy;

// =============================================================================
// Request
// =============================================================================

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the author (`system`, `user`, `assistant`).
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a message with an arbitrary role.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a `user` message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create a `system` message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

/// Inbound chat-style request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages. Must be non-empty to be routable.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Per-request strategy override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    /// Upper bound on completion tokens, forwarded to the provider client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a request from messages.
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            strategy: None,
            max_tokens: None,
        }
    }

    /// Convenience: a request with a single user message.
    #[must_use]
    pub fn from_user(content: impl Into<String>) -> Self {
        Self::new(vec![ChatMessage::user(content)])
    }

    /// Override the router's configured strategy for this request only.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

// =============================================================================
// Decision
// =============================================================================

/// Why a provider was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    /// Sensitive content, served by a local provider.
    SensitiveContent,
    /// Sensitive content but no local provider was eligible; strategy applied.
    SensitiveFallback,
    /// Sensitive content served locally even though every candidate was over budget.
    SensitiveBudgetExceeded,
    /// Every healthy candidate was over budget; strategy applied to all of them.
    BudgetExceeded,
    /// Plain strategy ranking.
    Strategy(Strategy),
}

impl ReasonCode {
    /// Short label used in logs and JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SensitiveContent => "sensitive_content",
            Self::SensitiveFallback => "sensitive_fallback",
            Self::SensitiveBudgetExceeded => "sensitive_budget_exceeded",
            Self::BudgetExceeded => "budget_exceeded",
            Self::Strategy(strategy) => strategy.as_str(),
        }
    }

    /// Whether the decision involved any privacy handling.
    #[must_use]
    pub const fn is_sensitive(self) -> bool {
        matches!(
            self,
            Self::SensitiveContent | Self::SensitiveFallback | Self::SensitiveBudgetExceeded
        )
    }

    /// Whether the decision was made with every candidate over budget.
    #[must_use]
    pub const fn is_over_budget(self) -> bool {
        matches!(self, Self::BudgetExceeded | Self::SensitiveBudgetExceeded)
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReasonCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of one `route` call. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecision {
    /// Name of the chosen provider.
    pub provider: String,
    /// Why it was chosen.
    pub reason: ReasonCode,
    /// Strategy in effect for this request.
    pub strategy: Strategy,
    /// Estimated cost in USD, as recorded against the budget.
    pub estimated_cost_usd: f64,
    /// Expected latency of the chosen provider.
    pub latency_ms: u64,
    /// Approximate prompt tokens.
    pub estimated_tokens: u64,
    /// Whether the content was classified sensitive.
    pub sensitive: bool,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_have_stable_labels() {
        assert_eq!(ReasonCode::SensitiveContent.as_str(), "sensitive_content");
        assert_eq!(ReasonCode::SensitiveFallback.as_str(), "sensitive_fallback");
        assert_eq!(ReasonCode::BudgetExceeded.as_str(), "budget_exceeded");
        assert_eq!(
            ReasonCode::Strategy(Strategy::PrivacyFirst).as_str(),
            "privacy-first"
        );
    }

    #[test]
    fn reason_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&ReasonCode::Strategy(Strategy::Cheapest)).unwrap();
        assert_eq!(json, "\"cheapest\"");
    }

    #[test]
    fn request_deserializes_without_optional_fields() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert_eq!(req.messages.len(), 1);
        assert!(req.strategy.is_none());
    }

    #[test]
    fn request_missing_messages_is_empty() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.messages.is_empty());
    }
}
