//! Diagnostic logging setup.
//!
//! Everything logs through `tracing`; this module only installs the
//! subscriber. Settings come from CLI flags, falling back to
//! `LLMROUTE_LOG`, `LLMROUTE_LOG_FORMAT` and `LLMROUTE_LOG_FILE`. A
//! `RUST_LOG` filter, when present, overrides the level entirely.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

pub const LOG_LEVEL_ENV: &str = "LLMROUTE_LOG";
pub const LOG_FORMAT_ENV: &str = "LLMROUTE_LOG_FORMAT";
pub const LOG_FILE_ENV: &str = "LLMROUTE_LOG_FILE";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-field, no timestamps.
    #[default]
    Human,
    /// One JSON object per event.
    Json,
    /// Single line, terse.
    Compact,
}

impl LogFormat {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" | "pretty" => Some(Self::Human),
            "json" | "jsonl" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    /// Parse from CLI argument.
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "verbose" | "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" | "critical" => Some(Self::Error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    #[must_use]
    pub const fn as_tracing_level(self) -> Level {
        match self {
            Self::Trace => Level::TRACE,
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warn => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Level from `LLMROUTE_LOG`, if set and recognised.
#[must_use]
pub fn parse_log_level_from_env() -> Option<LogLevel> {
    env_value(LOG_LEVEL_ENV).and_then(|v| LogLevel::from_arg(&v))
}

/// Format from `LLMROUTE_LOG_FORMAT`, if set and recognised.
#[must_use]
pub fn parse_log_format_from_env() -> Option<LogFormat> {
    env_value(LOG_FORMAT_ENV).and_then(|v| LogFormat::from_arg(&v))
}

/// Path from `LLMROUTE_LOG_FILE`, if set.
#[must_use]
pub fn parse_log_file_from_env() -> Option<PathBuf> {
    env_value(LOG_FILE_ENV).map(PathBuf::from)
}

/// Resolved logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// CLI values win; unset ones fall back to the environment, then defaults.
    ///
    /// `verbose` raises the default level to `debug` but never overrides an
    /// explicit level.
    #[must_use]
    pub fn resolve(
        level: Option<LogLevel>,
        format: Option<LogFormat>,
        file: Option<PathBuf>,
        verbose: bool,
    ) -> Self {
        let level = level
            .or_else(parse_log_level_from_env)
            .unwrap_or(if verbose {
                LogLevel::Debug
            } else {
                LogLevel::default()
            });
        Self {
            level,
            format: format
                .or_else(parse_log_format_from_env)
                .unwrap_or_default(),
            file: file.or_else(parse_log_file_from_env),
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("llmroute={}", self.level.as_filter())))
    }
}

/// Install the global subscriber. A second call is a no-op.
///
/// Logs go to stderr unless a file is configured; an unopenable file falls
/// back to stderr with a warning.
pub fn init(settings: &LogSettings) {
    let mut open_error = None;
    let file: Option<File> = settings.file.as_ref().and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| open_error = Some(format!("{}: {e}", path.display())))
            .ok()
    });

    let writer = match file {
        Some(file) => BoxMakeWriter::new(file),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let filter = settings.filter();

    let installed = match settings.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_writer(writer)
            .with_span_events(FmtSpan::CLOSE)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .with_writer(writer)
            .with_target(true)
            .try_init(),
        LogFormat::Human => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_target(false)
            .without_time()
            .try_init(),
    };

    if installed.is_ok() {
        if let Some(error) = open_error {
            tracing::warn!(error = %error, "Could not open log file; logging to stderr");
        }
    }
}
