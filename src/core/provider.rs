//! Provider profiles and the live provider registry.
//!
//! A [`ProviderProfile`] carries the cost/latency/reliability/privacy profile
//! of one backend plus its current [`HealthStatus`]. The [`ProviderRegistry`]
//! is shared by every routing task; only the health monitor writes status.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, RouterError};

/// Reliability assumed for providers that do not declare one.
pub const DEFAULT_RELIABILITY: f64 = 0.95;

/// Name of the conventional local provider.
pub const LOCAL_PROVIDER: &str = "local";

// =============================================================================
// Enums
// =============================================================================

/// Where a provider processes data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyClass {
    /// Third-party hosted API.
    Cloud,
    /// Runs on infrastructure we control; safe for sensitive content.
    Local,
}

impl PrivacyClass {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::Local => "local",
        }
    }

    /// Parse from a config/CLI value.
    ///
    /// # Errors
    ///
    /// [`RouterError::ConfigInvalid`] for anything but `cloud` or `local`.
    pub fn from_arg(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "cloud" => Ok(Self::Cloud),
            "local" => Ok(Self::Local),
            other => Err(RouterError::ConfigInvalid {
                key: "privacy".to_string(),
                message: format!("expected \"cloud\" or \"local\", got \"{other}\""),
            }),
        }
    }
}

impl std::fmt::Display for PrivacyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary availability state derived from health probes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }

    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Provider Profile
// =============================================================================

/// Identity and cost/quality profile for one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Unique identifier. Immutable once registered.
    pub name: String,
    /// USD per 1 000 tokens.
    pub cost_per_1k_tokens: f64,
    /// Expected latency; a ranking signal only.
    pub latency_ms: u64,
    /// Success probability in `[0, 1]`; `None` means [`DEFAULT_RELIABILITY`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability: Option<f64>,
    /// Cloud or local.
    pub privacy: PrivacyClass,
    /// Current health. Written only by the health monitor.
    #[serde(default)]
    pub status: HealthStatus,
    /// Base URL for the OpenAI-compatible HTTP client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// URL probed by the HTTP health probe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_url: Option<String>,
}

impl ProviderProfile {
    /// Create a healthy provider profile.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        cost_per_1k_tokens: f64,
        latency_ms: u64,
        privacy: PrivacyClass,
    ) -> Self {
        Self {
            name: name.into(),
            cost_per_1k_tokens,
            latency_ms,
            reliability: None,
            privacy,
            status: HealthStatus::Healthy,
            endpoint: None,
            health_url: None,
        }
    }

    /// Set an explicit reliability.
    #[must_use]
    pub const fn with_reliability(mut self, reliability: f64) -> Self {
        self.reliability = Some(reliability);
        self
    }

    /// Set the client endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the health probe URL.
    #[must_use]
    pub fn with_health_url(mut self, url: impl Into<String>) -> Self {
        self.health_url = Some(url.into());
        self
    }

    /// Reliability with the default applied.
    #[must_use]
    pub fn effective_reliability(&self) -> f64 {
        self.reliability.unwrap_or(DEFAULT_RELIABILITY)
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        self.privacy == PrivacyClass::Local
    }

    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`RouterError::ConfigInvalid`] for an empty name, a negative cost or
    /// a reliability outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| RouterError::ConfigInvalid {
            key: format!("providers.{}", self.name),
            message,
        };

        if self.name.trim().is_empty() {
            return Err(RouterError::ConfigInvalid {
                key: "providers".to_string(),
                message: "provider name must not be empty".to_string(),
            });
        }
        if !self.cost_per_1k_tokens.is_finite() || self.cost_per_1k_tokens < 0.0 {
            return Err(invalid(format!(
                "cost_per_1k_tokens must be a non-negative number, got {}",
                self.cost_per_1k_tokens
            )));
        }
        if let Some(r) = self.reliability {
            if !(0.0..=1.0).contains(&r) {
                return Err(invalid(format!("reliability must be in [0, 1], got {r}")));
            }
        }
        Ok(())
    }

    /// Built-in defaults: two cloud APIs and one local model.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new("openai", 0.03, 800, PrivacyClass::Cloud).with_reliability(0.99),
            Self::new("anthropic", 0.015, 1000, PrivacyClass::Cloud).with_reliability(0.98),
            Self::new(LOCAL_PROVIDER, 0.0, 2000, PrivacyClass::Local).with_reliability(0.90),
        ]
    }
}

// =============================================================================
// Provider Registry
// =============================================================================

/// Registry of provider profiles and their live health state.
///
/// Reads clone out whole profiles under a read lock, so a routing task never
/// observes a half-updated provider.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, ProviderProfile>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the given providers.
    #[must_use]
    pub fn with_providers(providers: impl IntoIterator<Item = ProviderProfile>) -> Self {
        let registry = Self::new();
        for provider in providers {
            registry.register(provider);
        }
        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ProviderProfile>> {
        self.providers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ProviderProfile>> {
        self.providers.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace a provider definition (last write wins, by name).
    ///
    /// Replacing keeps the provider's current health status.
    pub fn register(&self, mut provider: ProviderProfile) {
        let mut providers = self.write();
        if let Some(existing) = providers.get(&provider.name) {
            provider.status = existing.status;
        }
        tracing::debug!(
            provider = %provider.name,
            privacy = %provider.privacy,
            cost_per_1k = provider.cost_per_1k_tokens,
            latency_ms = provider.latency_ms,
            "Registered provider"
        );
        providers.insert(provider.name.clone(), provider);
    }

    /// All providers, sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<ProviderProfile> {
        let mut all: Vec<_> = self.read().values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Healthy providers, sorted by name.
    #[must_use]
    pub fn healthy(&self) -> Vec<ProviderProfile> {
        let mut healthy: Vec<_> = self
            .read()
            .values()
            .filter(|p| p.is_healthy())
            .cloned()
            .collect();
        healthy.sort_by(|a, b| a.name.cmp(&b.name));
        healthy
    }

    /// Look up a provider by name.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownProvider`] when `name` is not registered.
    pub fn get(&self, name: &str) -> Result<ProviderProfile> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| RouterError::UnknownProvider(name.to_string()))
    }

    /// Update health status. Returns the previous status.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownProvider`] when `name` is not registered.
    pub fn set_status(&self, name: &str, status: HealthStatus) -> Result<HealthStatus> {
        let mut providers = self.write();
        let provider = providers
            .get_mut(name)
            .ok_or_else(|| RouterError::UnknownProvider(name.to_string()))?;
        let previous = provider.status;
        provider.status = status;
        Ok(previous)
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
