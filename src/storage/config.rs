//! Configuration file loading and resolution.
//!
//! Loads configuration from:
//! - Linux: `~/.config/llmroute/config.toml`
//! - macOS: `~/Library/Application Support/llmroute/config.toml`
//! - Windows: `%APPDATA%\llmroute\config\config.toml`
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `LLMROUTE_CONFIG`: Override config file path
//! - `LLMROUTE_STRATEGY`: Default routing strategy
//! - `LLMROUTE_DAILY_LIMIT`: Daily spend limit in USD
//! - `LLMROUTE_MONTHLY_LIMIT`: Monthly spend limit in USD
//! - `LLMROUTE_API_KEY`: Bearer token for `route --send`
//!
//! ## Example
//!
//! ```toml
//! [routing]
//! strategy = "cheapest"
//!
//! [budget]
//! daily_limit_usd = 10.0
//! alert_at_percent = [50, 75, 90]
//!
//! [health]
//! interval_seconds = 30
//!
//! [providers.openai]
//! cost_per_1k_tokens = 0.03
//! endpoint = "https://api.openai.com/v1"
//!
//! [providers.ollama]
//! privacy = "local"
//! cost_per_1k_tokens = 0.0
//! latency_ms = 1500
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::core::budgets::BudgetLimits;
use crate::core::health::{
    DEFAULT_FAILURE_THRESHOLD, DEFAULT_INTERVAL, DEFAULT_PROBE_TIMEOUT, HealthConfig,
};
use crate::core::provider::{PrivacyClass, ProviderProfile};
use crate::core::router::{Router, RouterConfig};
use crate::core::strategy::Strategy;
use crate::error::{Result, RouterError};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable to override config file path.
pub const ENV_CONFIG: &str = "LLMROUTE_CONFIG";
/// Environment variable for the default strategy.
pub const ENV_STRATEGY: &str = "LLMROUTE_STRATEGY";
/// Environment variable for the daily limit in USD.
pub const ENV_DAILY_LIMIT: &str = "LLMROUTE_DAILY_LIMIT";
/// Environment variable for the monthly limit in USD.
pub const ENV_MONTHLY_LIMIT: &str = "LLMROUTE_MONTHLY_LIMIT";
/// Bearer token sent by `route --send`.
pub const ENV_API_KEY: &str = "LLMROUTE_API_KEY";

// =============================================================================
// Sources
// =============================================================================

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Tracks the source of each resolved value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSources {
    pub config_path: ConfigSource,
    pub strategy: ConfigSource,
    pub daily_limit: ConfigSource,
    pub monthly_limit: ConfigSource,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub strategy: Option<Strategy>,
    pub daily_limit_usd: Option<f64>,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved configuration after merging CLI, env vars, and config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Config file that was consulted (it may not exist).
    pub config_path: PathBuf,
    pub strategy: Strategy,
    pub budget: BudgetLimits,
    pub health: HealthConfig,
    /// Built-ins merged with `[providers.*]`, sorted by name.
    pub providers: Vec<ProviderProfile>,
    pub sources: ConfigSources,
}

impl ResolvedConfig {
    /// Resolve against the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but is invalid, or any
    /// resolved value is out of range.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        Self::resolve_with_env(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// See [`ResolvedConfig::resolve`].
    pub fn resolve_with_env<F>(overrides: &ConfigOverrides, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            env(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut sources = ConfigSources::default();

        let config_path = if let Some(path) = &overrides.config_path {
            sources.config_path = ConfigSource::Cli;
            path.clone()
        } else if let Some(path) = lookup(ENV_CONFIG) {
            sources.config_path = ConfigSource::Env;
            PathBuf::from(path)
        } else {
            Config::default_path()
        };

        let config = Config::load_from(&config_path)?;
        config.validate()?;

        let strategy = if let Some(strategy) = overrides.strategy {
            sources.strategy = ConfigSource::Cli;
            strategy
        } else if let Some(value) = lookup(ENV_STRATEGY) {
            sources.strategy = ConfigSource::Env;
            value.parse::<Strategy>()?
        } else if let Some(value) = &config.routing.strategy {
            sources.strategy = ConfigSource::ConfigFile;
            value.parse::<Strategy>()?
        } else {
            Strategy::default()
        };

        let daily_limit_usd = if let Some(limit) = overrides.daily_limit_usd {
            sources.daily_limit = ConfigSource::Cli;
            Some(limit)
        } else if let Some(value) = lookup(ENV_DAILY_LIMIT) {
            sources.daily_limit = ConfigSource::Env;
            Some(parse_limit(ENV_DAILY_LIMIT, &value)?)
        } else if let Some(limit) = config.budget.daily_limit_usd {
            sources.daily_limit = ConfigSource::ConfigFile;
            Some(limit)
        } else {
            None
        };

        let monthly_limit_usd = if let Some(value) = lookup(ENV_MONTHLY_LIMIT) {
            sources.monthly_limit = ConfigSource::Env;
            Some(parse_limit(ENV_MONTHLY_LIMIT, &value)?)
        } else if let Some(limit) = config.budget.monthly_limit_usd {
            sources.monthly_limit = ConfigSource::ConfigFile;
            Some(limit)
        } else {
            None
        };

        let budget = BudgetLimits {
            daily_limit_usd,
            monthly_limit_usd,
            alert_at_percent: config.budget.alert_at_percent.clone(),
        };
        budget.validate()?;

        Ok(Self {
            config_path,
            strategy,
            budget,
            health: config.health.to_health_config(),
            providers: config.provider_profiles()?,
            sources,
        })
    }

    /// Engine-level settings.
    #[must_use]
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            strategy: self.strategy,
            budget: self.budget.clone(),
            health: self.health,
        }
    }

    /// Build a router over the resolved providers.
    ///
    /// # Errors
    ///
    /// Invalid engine settings.
    pub fn build_router(&self) -> Result<Router> {
        Router::builder()
            .config(self.router_config())
            .providers(self.providers.clone())
            .build()
    }
}

fn parse_limit(key: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|e| RouterError::ConfigInvalid {
            key: key.to_string(),
            message: format!("expected a number in USD, got \"{value}\" ({e})"),
        })
}

// =============================================================================
// Config File
// =============================================================================

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub routing: RoutingSection,
    pub budget: BudgetSection,
    pub health: HealthSection,
    /// Per-provider entries, merged over the built-ins by name.
    pub providers: BTreeMap<String, ProviderSettings>,
}

/// `[routing]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSection {
    /// Default strategy name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

/// `[budget]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_limit_usd: Option<f64>,
    pub alert_at_percent: Vec<u8>,
}

/// `[health]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSection {
    pub interval_seconds: u64,
    pub failure_threshold: u32,
    pub probe_timeout_seconds: u64,
}

impl Default for HealthSection {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_INTERVAL.as_secs(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            probe_timeout_seconds: DEFAULT_PROBE_TIMEOUT.as_secs(),
        }
    }
}

impl HealthSection {
    #[must_use]
    pub const fn to_health_config(self) -> HealthConfig {
        HealthConfig {
            interval: Duration::from_secs(self.interval_seconds),
            failure_threshold: self.failure_threshold,
            probe_timeout: Duration::from_secs(self.probe_timeout_seconds),
        }
    }
}

/// `[providers.NAME]`
///
/// For built-in names every field is optional. New names must set
/// `privacy`, `cost_per_1k_tokens` and `latency_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// `false` removes the provider (including a built-in) from the registry.
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_1k_tokens: Option<f64>,
    /// Signed; negative values fail validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reliability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            cost_per_1k_tokens: None,
            latency_ms: None,
            reliability: None,
            privacy: None,
            endpoint: None,
            health_url: None,
        }
    }
}

impl ProviderSettings {
    fn invalid(name: &str, field: &str, message: impl Into<String>) -> RouterError {
        RouterError::ConfigInvalid {
            key: format!("providers.{name}.{field}"),
            message: message.into(),
        }
    }

    fn latency(&self, name: &str) -> Result<Option<u64>> {
        self.latency_ms
            .map(|ms| {
                u64::try_from(ms)
                    .map_err(|_| Self::invalid(name, "latency_ms", format!("must be >= 0, got {ms}")))
            })
            .transpose()
    }

    fn privacy(&self, name: &str) -> Result<Option<PrivacyClass>> {
        self.privacy
            .as_deref()
            .map(|p| {
                PrivacyClass::from_arg(p).map_err(|_| {
                    Self::invalid(name, "privacy", format!("expected \"cloud\" or \"local\", got \"{p}\""))
                })
            })
            .transpose()
    }

    /// Overlay these settings on an existing profile.
    fn apply_to(&self, mut profile: ProviderProfile) -> Result<ProviderProfile> {
        let name = profile.name.clone();
        if let Some(cost) = self.cost_per_1k_tokens {
            profile.cost_per_1k_tokens = cost;
        }
        if let Some(latency) = self.latency(&name)? {
            profile.latency_ms = latency;
        }
        if let Some(reliability) = self.reliability {
            profile.reliability = Some(reliability);
        }
        if let Some(privacy) = self.privacy(&name)? {
            profile.privacy = privacy;
        }
        if let Some(endpoint) = &self.endpoint {
            profile.endpoint = Some(endpoint.clone());
        }
        if let Some(url) = &self.health_url {
            profile.health_url = Some(url.clone());
        }
        Ok(profile)
    }

    /// Build a profile for a provider that is not built in.
    fn to_new_profile(&self, name: &str) -> Result<ProviderProfile> {
        let required = |field: &str| {
            Self::invalid(name, field, "required for providers that are not built in")
        };
        let privacy = self.privacy(name)?.ok_or_else(|| required("privacy"))?;
        let cost = self
            .cost_per_1k_tokens
            .ok_or_else(|| required("cost_per_1k_tokens"))?;
        let latency = self.latency(name)?.ok_or_else(|| required("latency_ms"))?;
        self.apply_to(ProviderProfile::new(name, cost, latency, privacy))
    }
}

impl Config {
    /// Default config file path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        AppPaths::new().config_file()
    }

    /// Load configuration from the default config file path.
    ///
    /// # Errors
    ///
    /// The file exists but is unreadable or invalid TOML.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from a specific path.
    ///
    /// Returns default config if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// The file exists but is unreadable or invalid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| RouterError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Invalid TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RouterError::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// - unknown strategy name
    /// - negative limits, alert percents outside `1..=100`
    /// - zero health interval, threshold or probe timeout
    /// - provider entries with negative cost/latency, reliability outside
    ///   `[0, 1]`, bad privacy class, or missing fields for new providers
    pub fn validate(&self) -> Result<()> {
        let strategy = match &self.routing.strategy {
            Some(name) => name.parse()?,
            None => Strategy::default(),
        };

        RouterConfig {
            strategy,
            budget: BudgetLimits {
                daily_limit_usd: self.budget.daily_limit_usd,
                monthly_limit_usd: self.budget.monthly_limit_usd,
                alert_at_percent: self.budget.alert_at_percent.clone(),
            },
            health: self.health.to_health_config(),
        }
        .validate()?;

        self.provider_profiles().map(|_| ())
    }

    /// Built-in providers with `[providers.*]` entries merged in, sorted by name.
    ///
    /// # Errors
    ///
    /// Invalid provider entries.
    pub fn provider_profiles(&self) -> Result<Vec<ProviderProfile>> {
        let mut profiles: BTreeMap<String, ProviderProfile> = ProviderProfile::builtin()
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();

        for (name, settings) in &self.providers {
            if !settings.enabled {
                profiles.remove(name);
                continue;
            }
            let profile = match profiles.remove(name) {
                Some(base) => settings.apply_to(base)?,
                None => settings.to_new_profile(name)?,
            };
            profile.validate()?;
            profiles.insert(name.clone(), profile);
        }

        Ok(profiles.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn overrides_for(file: &NamedTempFile) -> ConfigOverrides {
        ConfigOverrides {
            config_path: Some(file.path().to_path_buf()),
            ..ConfigOverrides::default()
        }
    }

    #[test]
    fn config_source_display() {
        assert_eq!(format!("{}", ConfigSource::Cli), "CLI flag");
        assert_eq!(format!("{}", ConfigSource::Env), "environment variable");
        assert_eq!(format!("{}", ConfigSource::ConfigFile), "config file");
        assert_eq!(format!("{}", ConfigSource::Default), "default");
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.health.failure_threshold, 3);
        assert_eq!(config.provider_profiles().unwrap().len(), 3);
    }

    #[test]
    fn load_missing_file_returns_default() {
        let config = Config::load_from(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_invalid_toml_returns_parse_error() {
        let file = write_config("this is not valid toml {{{{");
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, RouterError::ConfigParse { .. }));
    }

    #[test]
    fn load_full_file() {
        let file = write_config(
            r#"
[routing]
strategy = "cheapest"

[budget]
daily_limit_usd = 10.0
monthly_limit_usd = 200.0
alert_at_percent = [50, 75, 90]

[health]
interval_seconds = 10
failure_threshold = 5
probe_timeout_seconds = 2

[providers.openai]
cost_per_1k_tokens = 0.02
endpoint = "https://api.openai.com/v1"

[providers.ollama]
privacy = "local"
cost_per_1k_tokens = 0.0
latency_ms = 1500
"#,
        );

        let config = Config::load_from(file.path()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.routing.strategy.as_deref(), Some("cheapest"));
        assert_eq!(config.budget.alert_at_percent, vec![50, 75, 90]);
        assert_eq!(config.health.failure_threshold, 5);

        let profiles = config.provider_profiles().unwrap();
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["anthropic", "local", "ollama", "openai"]);

        let openai = profiles.iter().find(|p| p.name == "openai").unwrap();
        assert!((openai.cost_per_1k_tokens - 0.02).abs() < 1e-12);
        assert_eq!(openai.latency_ms, 800);
        assert_eq!(openai.endpoint.as_deref(), Some("https://api.openai.com/v1"));
    }

    #[test]
    fn disabled_builtin_is_removed() {
        let config = Config::from_toml("[providers.anthropic]\nenabled = false\n").unwrap();
        let names: Vec<String> = config
            .provider_profiles()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["local", "openai"]);
    }

    #[test]
    fn validate_rejects_unknown_strategy() {
        let config = Config::from_toml("[routing]\nstrategy = \"random\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(RouterError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_provider_values() {
        for body in [
            "[providers.openai]\ncost_per_1k_tokens = -1.0\n",
            "[providers.openai]\nlatency_ms = -5\n",
            "[providers.openai]\nreliability = 1.5\n",
            "[providers.openai]\nprivacy = \"onprem\"\n",
            "[providers.newbie]\ncost_per_1k_tokens = 0.01\nlatency_ms = 10\n",
        ] {
            let config = Config::from_toml(body).unwrap();
            assert!(
                matches!(config.validate(), Err(RouterError::ConfigInvalid { .. })),
                "accepted: {body}"
            );
        }
    }

    #[test]
    fn validate_rejects_bad_budget_and_health() {
        for body in [
            "[budget]\ndaily_limit_usd = -1.0\n",
            "[budget]\nalert_at_percent = [0]\n",
            "[budget]\nalert_at_percent = [150]\n",
            "[health]\ninterval_seconds = 0\n",
            "[health]\nfailure_threshold = 0\n",
        ] {
            let config = Config::from_toml(body).unwrap();
            assert!(
                matches!(config.validate(), Err(RouterError::ConfigInvalid { .. })),
                "accepted: {body}"
            );
        }
    }

    #[test]
    fn resolve_defaults_without_file() {
        let overrides = ConfigOverrides {
            config_path: Some(PathBuf::from("/nonexistent/llmroute.toml")),
            ..ConfigOverrides::default()
        };
        let resolved = ResolvedConfig::resolve_with_env(&overrides, env_of(&[])).unwrap();
        assert_eq!(resolved.strategy, Strategy::Balanced);
        assert_eq!(resolved.sources.strategy, ConfigSource::Default);
        assert!(resolved.budget.is_unbounded());
        assert_eq!(resolved.sources.config_path, ConfigSource::Cli);
    }

    #[test]
    fn precedence_cli_over_env_over_file() {
        let file = write_config("[routing]\nstrategy = \"fastest\"\n[budget]\ndaily_limit_usd = 5.0\n");

        let from_file = ResolvedConfig::resolve_with_env(&overrides_for(&file), env_of(&[])).unwrap();
        assert_eq!(from_file.strategy, Strategy::Fastest);
        assert_eq!(from_file.sources.strategy, ConfigSource::ConfigFile);
        assert_eq!(from_file.budget.daily_limit_usd, Some(5.0));

        let env = env_of(&[(ENV_STRATEGY, "privacy_first"), (ENV_DAILY_LIMIT, "2.5")]);
        let from_env = ResolvedConfig::resolve_with_env(&overrides_for(&file), env).unwrap();
        assert_eq!(from_env.strategy, Strategy::PrivacyFirst);
        assert_eq!(from_env.sources.strategy, ConfigSource::Env);
        assert_eq!(from_env.budget.daily_limit_usd, Some(2.5));
        assert_eq!(from_env.sources.daily_limit, ConfigSource::Env);

        let mut overrides = overrides_for(&file);
        overrides.strategy = Some(Strategy::Reliability);
        overrides.daily_limit_usd = Some(1.0);
        let env = env_of(&[(ENV_STRATEGY, "cheapest"), (ENV_DAILY_LIMIT, "2.5")]);
        let from_cli = ResolvedConfig::resolve_with_env(&overrides, env).unwrap();
        assert_eq!(from_cli.strategy, Strategy::Reliability);
        assert_eq!(from_cli.sources.strategy, ConfigSource::Cli);
        assert_eq!(from_cli.budget.daily_limit_usd, Some(1.0));
    }

    #[test]
    fn env_config_path_is_used() {
        let file = write_config("[routing]\nstrategy = \"cheapest\"\n");
        let path = file.path().to_string_lossy().to_string();
        let resolved =
            ResolvedConfig::resolve_with_env(&ConfigOverrides::default(), env_of(&[(ENV_CONFIG, &path)]))
                .unwrap();
        assert_eq!(resolved.sources.config_path, ConfigSource::Env);
        assert_eq!(resolved.strategy, Strategy::Cheapest);
    }

    #[test]
    fn bad_env_values_are_errors() {
        let file = write_config("");
        let err = ResolvedConfig::resolve_with_env(
            &overrides_for(&file),
            env_of(&[(ENV_DAILY_LIMIT, "lots")]),
        )
        .unwrap_err();
        assert!(matches!(err, RouterError::ConfigInvalid { ref key, .. } if key == ENV_DAILY_LIMIT));

        let err = ResolvedConfig::resolve_with_env(
            &overrides_for(&file),
            env_of(&[(ENV_MONTHLY_LIMIT, "-3")]),
        )
        .unwrap_err();
        assert!(matches!(err, RouterError::ConfigInvalid { .. }));

        let err = ResolvedConfig::resolve_with_env(
            &overrides_for(&file),
            env_of(&[(ENV_STRATEGY, "random")]),
        )
        .unwrap_err();
        assert!(matches!(err, RouterError::UnknownStrategy(_)));
    }

    #[test]
    fn resolved_config_builds_router() {
        let file = write_config("[providers.local]\nenabled = false\n");
        let resolved = ResolvedConfig::resolve_with_env(&overrides_for(&file), env_of(&[])).unwrap();
        let router = resolved.build_router().unwrap();
        assert_eq!(router.registry().len(), 2);
        assert!(router.registry().get("local").is_err());
    }
}
