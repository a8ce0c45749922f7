//! Robot-mode output (JSON).
//!
//! Every command wraps its payload in the same envelope so scripts can
//! dispatch on `command` and check `schemaVersion`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

/// Envelope schema identifier.
pub const SCHEMA_VERSION: &str = "llmroute.v1";

/// JSON envelope for command output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,
}

impl<T> RobotOutput<T> {
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            command: command.into(),
            data,
        }
    }
}

/// Serialize `data` inside an envelope for `command`.
///
/// # Errors
///
/// Serialization failure.
pub fn render_json<T: Serialize>(command: &str, data: &T, pretty: bool) -> Result<String> {
    let output = RobotOutput::new(command, data);
    Ok(if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    })
}
