//! Application paths.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// File name of the configuration file inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Application paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Configuration directory.
    pub config: PathBuf,
}

impl AppPaths {
    /// Platform config directory for llmroute.
    ///
    /// Linux: `~/.config/llmroute`, macOS: `~/Library/Application Support/llmroute`,
    /// Windows: `%APPDATA%\llmroute\config`.
    #[must_use]
    pub fn new() -> Self {
        ProjectDirs::from("", "", "llmroute").map_or_else(
            || {
                let home = BaseDirs::new()
                    .map_or_else(|| PathBuf::from("."), |d| d.home_dir().to_path_buf());
                Self {
                    config: home.join(".config").join("llmroute"),
                }
            },
            |dirs| Self {
                config: dirs.config_dir().to_path_buf(),
            },
        )
    }

    /// Path to `config.toml`.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.join(CONFIG_FILE)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
