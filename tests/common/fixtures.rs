//! Test fixtures and factory functions for integration tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::fixtures::*;
//!
//! let toml = load_fixture_text("config_full.toml");
//! let providers = mixed_providers();
//! ```
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

pub use llmroute::core::models::{ChatMessage, ChatRequest};
pub use llmroute::core::provider::{PrivacyClass, ProviderProfile};

// =============================================================================
// Fixture Loading
// =============================================================================

/// Get the path to the fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Absolute path of a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Load a fixture file as text.
///
/// # Panics
///
/// Panics if the file cannot be read.
pub fn load_fixture_text(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()))
}

// =============================================================================
// Provider Sets
// =============================================================================

/// Two cloud providers and one local, with distinct cost and latency
/// orderings: `cheap-slow` is cheapest, `fast` is fastest, `onprem` is local.
pub fn mixed_providers() -> Vec<ProviderProfile> {
    vec![
        ProviderProfile::new("cheap-slow", 0.001, 3000, PrivacyClass::Cloud).with_reliability(0.95),
        ProviderProfile::new("fast", 0.05, 200, PrivacyClass::Cloud).with_reliability(0.999),
        ProviderProfile::new("onprem", 0.01, 1200, PrivacyClass::Local).with_reliability(0.9),
    ]
}

/// Cloud-only providers.
pub fn cloud_only() -> Vec<ProviderProfile> {
    mixed_providers()
        .into_iter()
        .filter(|p| p.privacy == PrivacyClass::Cloud)
        .collect()
}

/// Provider pointing at a mock server.
pub fn provider_at(name: &str, base_url: &str, privacy: PrivacyClass) -> ProviderProfile {
    ProviderProfile::new(name, 0.01, 500, privacy)
        .with_endpoint(format!("{base_url}/v1"))
        .with_health_url(format!("{base_url}/health"))
}

// =============================================================================
// Requests
// =============================================================================

/// Messages that trip the sensitive-content detector, one per category.
pub const SENSITIVE_SAMPLES: &[&str] = &[
    "my api_key is abc",
    "Authorization: Bearer eyJhbGciOi",
    "the password is hunter2",
    "use sk_live_abcdef123456",
    "SSN 123-45-6789",
    "card 4111 1111 1111 1111",
    "patient diagnosis attached",
    "this is confidential",
];

/// Messages that must not be classified as sensitive.
pub const PLAIN_SAMPLES: &[&str] = &[
    "What is the capital of France?",
    "Write a limerick about rust",
    "Summarize this paragraph",
];

/// Conversation with a system prompt and a user turn.
pub fn conversation(system: &str, user: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        ..ChatRequest::default()
    }
}
