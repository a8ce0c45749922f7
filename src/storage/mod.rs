//! Configuration storage.

pub mod config;
pub mod paths;

pub use config::{
    BudgetSection, Config, ConfigOverrides, ConfigSource, ConfigSources, ENV_API_KEY, ENV_CONFIG,
    ENV_DAILY_LIMIT, ENV_MONTHLY_LIMIT, ENV_STRATEGY, HealthSection, ProviderSettings,
    ResolvedConfig, RoutingSection,
};
pub use paths::AppPaths;
