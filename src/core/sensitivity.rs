//! Sensitive content detection.
//!
//! Classifies chat messages as sensitive when any message matches any of a
//! fixed set of privacy-risk patterns. Matching is over-broad: substrings
//! such as "tokenizer" or "secretary" also count.
//!
//! Pure and stateless; the compiled pattern set is shared process-wide.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::models::ChatMessage;

/// Kind of privacy risk a pattern detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveCategory {
    /// `api_key`, `apikey`, long opaque tokens.
    ApiKey,
    /// `Bearer …` and `Authorization:` headers.
    AuthToken,
    /// Mentions of password/secret/token.
    CredentialKeyword,
    /// Well-known secret key prefixes (`sk_live_`, `sk-`, `ghp_`, `AKIA`).
    CredentialPrefix,
    /// `123-45-6789`.
    SocialSecurityNumber,
    /// Sixteen digits in groups of four.
    CreditCard,
    /// Health and medical vocabulary.
    Medical,
    /// Confidentiality and privacy vocabulary.
    Confidential,
}

impl SensitiveCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::AuthToken => "auth_token",
            Self::CredentialKeyword => "credential_keyword",
            Self::CredentialPrefix => "credential_prefix",
            Self::SocialSecurityNumber => "ssn",
            Self::CreditCard => "credit_card",
            Self::Medical => "medical",
            Self::Confidential => "confidential",
        }
    }
}

impl std::fmt::Display for SensitiveCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static PATTERNS: LazyLock<Vec<(SensitiveCategory, Regex)>> = LazyLock::new(|| {
    [
        (SensitiveCategory::ApiKey, r"(?i)api[_\- ]?key"),
        (SensitiveCategory::ApiKey, r"\b[A-Za-z0-9]{32,}\b"),
        (
            SensitiveCategory::AuthToken,
            r"(?i)\bbearer\s+[a-z0-9._\-~+/]+=*",
        ),
        (SensitiveCategory::AuthToken, r"(?i)\bauthorization\s*:"),
        // No word boundaries: "tokenizer" and "secretary" count too.
        (
            SensitiveCategory::CredentialKeyword,
            r"(?i)password|passwd|passphrase|secret|token",
        ),
        (
            SensitiveCategory::CredentialPrefix,
            r"(?i)\b(?:sk|pk|rk)_(?:live|test)_[a-z0-9]+",
        ),
        (SensitiveCategory::CredentialPrefix, r"(?i)\bsk-[a-z0-9_\-]{8,}"),
        (SensitiveCategory::CredentialPrefix, r"(?i)\bgh[pousr]_[a-z0-9]{20,}"),
        (SensitiveCategory::CredentialPrefix, r"(?i)\bakia[0-9a-z]{16}\b"),
        (SensitiveCategory::SocialSecurityNumber, r"\b\d{3}-\d{2}-\d{4}\b"),
        (SensitiveCategory::CreditCard, r"\b(?:\d{4}[ \-]?){3}\d{4}\b"),
        (
            SensitiveCategory::Medical,
            r"(?i)medical|diagnos|patient|prescription|hipaa|health\s*record|symptom|therapy|disease|medication",
        ),
        (
            SensitiveCategory::Confidential,
            r"(?i)confidential|private|privacy|classified|proprietary|\bnda\b|personal\s+data",
        ),
    ]
    .into_iter()
    .map(|(category, pattern)| {
        (
            category,
            Regex::new(pattern).expect("sensitive content pattern must compile"),
        )
    })
    .collect()
});

/// A pattern hit, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitiveMatch {
    /// Category of the pattern that matched.
    pub category: SensitiveCategory,
    /// Index of the message that matched.
    pub message_index: usize,
}

/// Check a single piece of text.
#[must_use]
pub fn text_is_sensitive(text: &str) -> bool {
    PATTERNS.iter().any(|(_, re)| re.is_match(text))
}

/// Whether any message is sensitive.
#[must_use]
pub fn is_sensitive(messages: &[ChatMessage]) -> bool {
    messages.iter().any(|m| text_is_sensitive(&m.content))
}

/// Like [`is_sensitive`], but reports which pattern fired first.
#[must_use]
pub fn detect(messages: &[ChatMessage]) -> Option<SensitiveMatch> {
    messages.iter().enumerate().find_map(|(message_index, m)| {
        PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(&m.content))
            .map(|(category, _)| SensitiveMatch {
                category: *category,
                message_index,
            })
    })
}

/// Every category that fires, per message, without duplicates.
#[must_use]
pub fn detect_all(messages: &[ChatMessage]) -> Vec<SensitiveMatch> {
    let mut matches = Vec::new();
    for (message_index, m) in messages.iter().enumerate() {
        for (category, re) in PATTERNS.iter() {
            let seen = matches
                .iter()
                .any(|hit: &SensitiveMatch| hit.message_index == message_index && hit.category == *category);
            if !seen && re.is_match(&m.content) {
                matches.push(SensitiveMatch {
                    category: *category,
                    message_index,
                });
            }
        }
    }
    matches
}

/// Classification result with every hit, as shown by `check-sensitive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityReport {
    pub sensitive: bool,
    pub matches: Vec<SensitiveMatch>,
}

impl SensitivityReport {
    #[must_use]
    pub fn for_messages(messages: &[ChatMessage]) -> Self {
        let matches = detect_all(messages);
        Self {
            sensitive: !matches.is_empty(),
            matches,
        }
    }
}
