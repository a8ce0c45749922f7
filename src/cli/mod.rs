//! CLI argument parsing and command dispatch.

pub mod args;
pub mod config;
pub mod providers;
pub mod route;
pub mod sensitive;
pub mod simulate;

use std::path::Path;

pub use args::{Cli, Commands, OutputFormat};

use crate::core::strategy::Strategy;
use crate::error::Result;
use crate::storage::config::{ConfigOverrides, ResolvedConfig};

/// Flags shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct GlobalOptions<'a> {
    pub config_path: Option<&'a Path>,
    pub format: OutputFormat,
    pub pretty: bool,
}

impl<'a> GlobalOptions<'a> {
    #[must_use]
    pub fn from_cli(cli: &'a Cli) -> Self {
        Self {
            config_path: cli.config.as_deref(),
            format: cli.effective_format(),
            pretty: cli.pretty,
        }
    }

    /// Resolve configuration with this invocation's overrides.
    ///
    /// # Errors
    ///
    /// Invalid config file, environment value, or strategy name.
    pub fn resolve(
        &self,
        strategy: Option<&str>,
        daily_limit_usd: Option<f64>,
    ) -> Result<ResolvedConfig> {
        let overrides = ConfigOverrides {
            config_path: self.config_path.map(Path::to_path_buf),
            strategy: parse_strategy(strategy)?,
            daily_limit_usd,
        };
        ResolvedConfig::resolve(&overrides)
    }

    /// Print a command's output in the selected format.
    ///
    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn emit<T: serde::Serialize>(
        &self,
        command: &str,
        data: &T,
        human: impl FnOnce(&T) -> String,
    ) -> Result<()> {
        let output = crate::render::render(command, data, self.format, self.pretty, human)?;
        if self.format == OutputFormat::Json {
            println!("{output}");
        } else {
            print!("{output}");
        }
        Ok(())
    }
}

/// Parse an optional strategy flag.
///
/// # Errors
///
/// [`crate::error::RouterError::UnknownStrategy`] for unrecognized names.
pub fn parse_strategy(value: Option<&str>) -> Result<Option<Strategy>> {
    value.map(str::parse::<Strategy>).transpose()
}
