//! Config command implementation.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::GlobalOptions;
use crate::core::budgets::BudgetLimits;
use crate::core::provider::ProviderProfile;
use crate::core::strategy::Strategy;
use crate::error::Result;
use crate::render::human;
use crate::storage::config::{ConfigSources, ResolvedConfig};

/// Health settings in whole seconds.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub interval_seconds: u64,
    pub failure_threshold: u32,
    pub probe_timeout_seconds: u64,
}

/// Output of `llmroute config`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReport {
    pub config_path: PathBuf,
    pub config_exists: bool,
    pub strategy: Strategy,
    pub budget: BudgetLimits,
    pub health: HealthReport,
    pub providers: Vec<ProviderProfile>,
    pub sources: ConfigSources,
}

impl From<&ResolvedConfig> for ConfigReport {
    fn from(resolved: &ResolvedConfig) -> Self {
        Self {
            config_path: resolved.config_path.clone(),
            config_exists: resolved.config_path.exists(),
            strategy: resolved.strategy,
            budget: resolved.budget.clone(),
            health: HealthReport {
                interval_seconds: resolved.health.interval.as_secs(),
                failure_threshold: resolved.health.failure_threshold,
                probe_timeout_seconds: resolved.health.probe_timeout.as_secs(),
            },
            providers: resolved.providers.clone(),
            sources: resolved.sources,
        }
    }
}

/// Execute the config command.
///
/// # Errors
/// Returns an error if the config file cannot be read or is invalid.
pub fn execute(opts: GlobalOptions<'_>) -> Result<()> {
    let resolved = opts.resolve(None, None)?;
    opts.emit("config", &ConfigReport::from(&resolved), |_| {
        human::render_config(&resolved)
    })
}
