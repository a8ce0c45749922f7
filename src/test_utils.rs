//! Test utilities for llmroute.
//!
//! Fakes for the probe and client seams, data factories, and a temp
//! directory helper for config files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use llmroute::test_utils::*;
//!
//! let (router, clock) = make_test_router(Strategy::Cheapest, BudgetLimits::daily(1.0));
//! router.route(&make_test_request("hello")).unwrap();
//! clock.advance(chrono::Duration::days(1));
//! ```

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::core::budgets::BudgetLimits;
use crate::core::client::{ProviderClient, ProviderResponse};
use crate::core::clock::ManualClock;
use crate::core::health::HealthProbe;
use crate::core::models::ChatRequest;
use crate::core::provider::{PrivacyClass, ProviderProfile};
use crate::core::router::Router;
use crate::core::strategy::Strategy;
use crate::error::{Result, RouterError};

// =============================================================================
// Test Data Factories
// =============================================================================

/// Fixed start time for deterministic clocks: 2026-03-15 12:00 UTC.
#[must_use]
pub fn test_start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A healthy provider with the given cost, latency and privacy.
#[must_use]
pub fn make_test_provider(
    name: &str,
    cost_per_1k_tokens: f64,
    latency_ms: u64,
    privacy: PrivacyClass,
) -> ProviderProfile {
    ProviderProfile::new(name, cost_per_1k_tokens, latency_ms, privacy)
}

/// A single-user-message request.
#[must_use]
pub fn make_test_request(content: &str) -> ChatRequest {
    ChatRequest::from_user(content)
}

/// Request whose estimated size is exactly `tokens`.
///
/// Built from short words: one long unbroken run would look like an API key.
#[must_use]
pub fn make_test_request_of_tokens(tokens: usize) -> ChatRequest {
    ChatRequest::from_user("abc ".repeat(tokens.max(1)))
}

/// Router over the built-in providers with a manual clock at
/// [`test_start_time`].
///
/// # Panics
///
/// Panics if `budget` is invalid.
#[must_use]
pub fn make_test_router(strategy: Strategy, budget: BudgetLimits) -> (Router, Arc<ManualClock>) {
    make_test_router_with(strategy, budget, ProviderProfile::builtin())
}

/// Like [`make_test_router`] with an explicit provider set.
///
/// # Panics
///
/// Panics if `budget` or a provider is invalid.
#[must_use]
pub fn make_test_router_with(
    strategy: Strategy,
    budget: BudgetLimits,
    providers: Vec<ProviderProfile>,
) -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(test_start_time()));
    let router = Router::builder()
        .strategy(strategy)
        .budget(budget)
        .providers(providers)
        .clock(clock.clone())
        .build()
        .expect("test router configuration is valid");
    (router, clock)
}

// =============================================================================
// Fake Probe
// =============================================================================

/// Health probe answering from per-provider scripts.
///
/// Each provider pops one answer per check; when its script is empty the
/// fallback answer is used. Calls are counted.
#[derive(Debug)]
pub struct ScriptedProbe {
    scripts: Mutex<HashMap<String, VecDeque<bool>>>,
    fallback: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    /// Probe that answers `fallback` for everything.
    #[must_use]
    pub fn always(fallback: bool) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue answers for one provider.
    #[must_use]
    pub fn script(self, provider: &str, answers: impl IntoIterator<Item = bool>) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(provider.to_string())
            .or_default()
            .extend(answers);
        self
    }

    /// Sleep this long before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of checks performed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn check(&self, provider: &ProviderProfile) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&provider.name)
            .and_then(VecDeque::pop_front)
            .unwrap_or(self.fallback)
    }
}

// =============================================================================
// Fake Client
// =============================================================================

/// Provider client that echoes the last message back.
///
/// Providers listed in `failing` return a provider API error instead.
#[derive(Debug, Default)]
pub struct FakeClient {
    failing: Vec<String>,
    sent: Mutex<Vec<String>>,
}

impl FakeClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sends to `provider` fail with a 503.
    #[must_use]
    pub fn failing_for(mut self, provider: &str) -> Self {
        self.failing.push(provider.to_string());
        self
    }

    /// Providers that received a request, in order.
    #[must_use]
    pub fn sent_to(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ProviderClient for FakeClient {
    async fn send(
        &self,
        provider: &ProviderProfile,
        request: &ChatRequest,
    ) -> Result<ProviderResponse> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(provider.name.clone());
        if self.failing.contains(&provider.name) {
            return Err(RouterError::ProviderApiError {
                provider: provider.name.clone(),
                status_code: Some(503),
                message: "unavailable".to_string(),
            });
        }
        let content = request
            .messages
            .last()
            .map(|m| format!("echo: {}", m.content))
            .unwrap_or_default();
        Ok(ProviderResponse {
            provider: provider.name.clone(),
            content,
            model: None,
            prompt_tokens: None,
            completion_tokens: None,
        })
    }
}

// =============================================================================
// Temporary Directory
// =============================================================================

/// An isolated temporary directory, removed on drop.
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Write `content` to `name`, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.inner.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Path to a file inside the directory (it need not exist).
    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.inner.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample config exercising every section.
#[must_use]
pub fn make_test_config_toml() -> String {
    r#"[routing]
strategy = "cheapest"

[budget]
daily_limit_usd = 5.0
monthly_limit_usd = 100.0
alert_at_percent = [50, 90]

[health]
interval_seconds = 10
failure_threshold = 2
probe_timeout_seconds = 1

[providers.openai]
cost_per_1k_tokens = 0.02

[providers.ollama]
cost_per_1k_tokens = 0.0
latency_ms = 1500
privacy = "local"
endpoint = "http://localhost:11434/v1"

[providers.anthropic]
enabled = false
"#
    .to_string()
}

// =============================================================================
// Test Helpers
// =============================================================================

/// Check if a string contains ANSI escape sequences.
#[must_use]
pub fn has_ansi_codes(text: &str) -> bool {
    text.contains('\x1b')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_probe_pops_then_falls_back() {
        let probe = ScriptedProbe::always(true).script("openai", [false, false]);
        let openai = make_test_provider("openai", 0.03, 800, PrivacyClass::Cloud);
        assert!(!probe.check(&openai).await);
        assert!(!probe.check(&openai).await);
        assert!(probe.check(&openai).await);
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test]
    async fn fake_client_echoes_and_fails_on_demand() {
        let client = FakeClient::new().failing_for("openai");
        let local = make_test_provider("local", 0.0, 2000, PrivacyClass::Local);
        let reply = client.send(&local, &make_test_request("ping")).await.unwrap();
        assert_eq!(reply.content, "echo: ping");

        let openai = make_test_provider("openai", 0.03, 800, PrivacyClass::Cloud);
        let err = client.send(&openai, &make_test_request("ping")).await.unwrap_err();
        assert!(matches!(err, RouterError::ProviderApiError { status_code: Some(503), .. }));
        assert_eq!(client.sent_to(), vec!["local", "openai"]);
    }

    #[test]
    fn test_dir_writes_files() {
        let dir = TestDir::new();
        let path = dir.create_file("nested/config.toml", &make_test_config_toml());
        assert!(path.exists());
        assert_eq!(path, dir.file_path("nested/config.toml"));
    }
}
