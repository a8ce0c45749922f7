//! Error rendering.
//!
//! Human mode prints a one-line header with the stable error code plus an
//! optional hint. JSON mode prints a structured object for scripts.

use colored::Colorize;
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::RouterError;

/// Render an error for stderr.
#[must_use]
pub fn render_error(error: &RouterError, format: OutputFormat, pretty: bool) -> String {
    match format {
        OutputFormat::Json => render_error_json(error, pretty),
        OutputFormat::Human => render_simple(error),
    }
}

/// Render error as structured JSON for machine consumption.
#[must_use]
pub fn render_error_json(error: &RouterError, pretty: bool) -> String {
    let error_json = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&error_json)
    } else {
        serde_json::to_string(&error_json)
    };
    rendered.unwrap_or_else(|_| render_plain(error))
}

fn render_simple(error: &RouterError) -> String {
    let mut lines = vec![format!(
        "{} {}",
        format!("error[{}]:", error.error_code()).red().bold(),
        error
    )];
    if let Some(hint) = error.hint() {
        lines.push(format!("  {} {hint}", "hint:".cyan()));
    }
    lines.join("\n")
}

fn render_plain(error: &RouterError) -> String {
    format!("Error [{}]: {}", error.error_code(), error)
}

/// JSON representation of an error.
#[derive(Debug, Serialize)]
struct ErrorJson {
    error_code: &'static str,
    category: String,
    message: String,
    is_retryable: bool,
    exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl ErrorJson {
    fn from_error(error: &RouterError) -> Self {
        Self {
            error_code: error.error_code(),
            category: error.category().to_string(),
            message: error.to_string(),
            is_retryable: error.is_retryable(),
            exit_code: error.exit_code().into(),
            provider: error.provider().map(String::from),
            retry_after_seconds: error.retry_after().map(|d| d.as_secs()),
            hint: error.hint(),
        }
    }
}
