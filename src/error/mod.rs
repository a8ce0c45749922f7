//! Error types for llmroute.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized into four main categories:
//! - **Request**: Malformed input handed to the router
//! - **Routing**: No provider could be chosen for an otherwise valid request
//! - **Configuration**: Unknown strategy/provider names, invalid config values
//! - **Provider**: Transport failures talking to a chosen provider
//!
//! plus **Internal** for I/O, serialization and invariant violations.
//!
//! Each error has a stable error code (e.g., `ROUTE-R001`) for programmatic handling.
//!
//! Budget exhaustion and the sensitive-content fallback are deliberately
//! absent: both are successful decisions carrying a reason code.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed request (no messages).
    Request,
    /// Nothing routable (all providers unhealthy).
    Routing,
    /// Configuration issues (unknown names, invalid values, parse errors).
    Configuration,
    /// Provider transport issues (timeouts, HTTP errors, bad payloads).
    Provider,
    /// Internal errors (bugs, I/O, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Request => "Request error",
            Self::Routing => "Routing error",
            Self::Configuration => "Configuration error",
            Self::Provider => "Provider error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Request => "Q",
            Self::Routing => "R",
            Self::Configuration => "C",
            Self::Provider => "P",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes for the `llmroute` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// No provider available for the request
    NoProvider = 2,
    /// Invalid configuration or request
    ConfigError = 3,
    /// Timeout
    Timeout = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

/// Main error type for llmroute operations.
#[derive(Error, Debug)]
pub enum RouterError {
    // ==========================================================================
    // Request errors
    // ==========================================================================
    /// The request carried no messages.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // ==========================================================================
    // Routing errors
    // ==========================================================================
    /// Every registered provider is currently unhealthy.
    #[error("no available providers: all {registered} registered provider(s) are unhealthy")]
    NoAvailableProviders { registered: usize },

    /// The selector was handed an empty candidate pool.
    ///
    /// The orchestrator never does this; seeing it means a routing bug.
    #[error("no candidates to select from for strategy {strategy}")]
    NoCandidates { strategy: String },

    // ==========================================================================
    // Configuration errors
    // ==========================================================================
    /// Strategy name is not one of the supported strategies.
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    /// Provider name is not registered.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// Error parsing configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Invalid value in configuration.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid { key: String, message: String },

    // ==========================================================================
    // Provider errors
    // ==========================================================================
    /// Request to a provider timed out.
    #[error("request timeout after {seconds}s for {provider}")]
    Timeout { provider: String, seconds: u64 },

    /// Provider API returned a non-success status.
    #[error("provider {provider} API error: {message}")]
    ProviderApiError {
        provider: String,
        status_code: Option<u16>,
        message: String,
    },

    /// Provider has no endpoint to send requests to.
    #[error("provider {0} has no endpoint configured")]
    MissingEndpoint(String),

    /// Generic network error.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("failed to parse response: {0}")]
    ParseResponse(String),

    // ==========================================================================
    // Internal errors
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RouterError {
    /// Map error to a process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::NoAvailableProviders { .. } | Self::NoCandidates { .. } => ExitCode::NoProvider,

            Self::InvalidRequest(_)
            | Self::UnknownStrategy(_)
            | Self::UnknownProvider(_)
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::MissingEndpoint(_) => ExitCode::ConfigError,

            Self::Timeout { .. } => ExitCode::Timeout,

            Self::ProviderApiError { .. }
            | Self::Network(_)
            | Self::ParseResponse(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest(_) => ErrorCategory::Request,

            Self::NoAvailableProviders { .. } => ErrorCategory::Routing,

            Self::UnknownStrategy(_)
            | Self::UnknownProvider(_)
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::MissingEndpoint(_) => ErrorCategory::Configuration,

            Self::Timeout { .. }
            | Self::ProviderApiError { .. }
            | Self::Network(_)
            | Self::ParseResponse(_) => ErrorCategory::Provider,

            Self::NoCandidates { .. } | Self::Io(_) | Self::Json(_) | Self::Other(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `ROUTE-{category}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "ROUTE-Q001",

            Self::NoAvailableProviders { .. } => "ROUTE-R001",

            Self::UnknownStrategy(_) => "ROUTE-C001",
            Self::UnknownProvider(_) => "ROUTE-C002",
            Self::ConfigParse { .. } => "ROUTE-C003",
            Self::ConfigInvalid { .. } => "ROUTE-C004",
            Self::MissingEndpoint(_) => "ROUTE-C005",

            Self::Timeout { .. } => "ROUTE-P001",
            Self::ProviderApiError { .. } => "ROUTE-P002",
            Self::Network(_) => "ROUTE-P003",
            Self::ParseResponse(_) => "ROUTE-P004",

            Self::NoCandidates { .. } => "ROUTE-X001",
            Self::Io(_) => "ROUTE-X002",
            Self::Json(_) => "ROUTE-X003",
            Self::Other(_) => "ROUTE-X099",
        }
    }

    /// Returns whether the caller may reasonably retry later.
    ///
    /// The router itself never retries.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NoAvailableProviders { .. } | Self::Timeout { .. } | Self::Network(_)
        )
    }

    /// Suggested wait before retrying, when one is meaningful.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            // One health-check round is the earliest anything can change.
            Self::NoAvailableProviders { .. } => Some(Duration::from_secs(30)),
            Self::Timeout { .. } | Self::Network(_) => Some(Duration::from_secs(1)),
            _ => None,
        }
    }

    /// Returns the provider name if this error is provider-specific.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Timeout { provider, .. } | Self::ProviderApiError { provider, .. } => {
                Some(provider)
            }
            Self::UnknownProvider(p) | Self::MissingEndpoint(p) => Some(p),
            _ => None,
        }
    }

    /// One-line hint for human output.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::UnknownStrategy(_) => Some(format!(
                "valid strategies: {}",
                crate::core::Strategy::ALL
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            Self::NoAvailableProviders { .. } => {
                Some("wait for the next health check or register another provider".to_string())
            }
            Self::InvalidRequest(_) => Some("pass at least one message".to_string()),
            Self::MissingEndpoint(p) => {
                Some(format!("set providers.{p}.endpoint in the config file"))
            }
            _ => None,
        }
    }
}

/// Result type alias for llmroute operations.
pub type Result<T> = std::result::Result<T, RouterError>;
