//! Check-sensitive command implementation.

use crate::cli::GlobalOptions;
use crate::cli::args::CheckSensitiveArgs;
use crate::core::models::ChatMessage;
use crate::core::sensitivity::SensitivityReport;
use crate::error::Result;
use crate::render::human;

/// Execute the check-sensitive command.
///
/// # Errors
/// Returns an error if the report fails to render.
pub fn execute(args: &CheckSensitiveArgs, opts: GlobalOptions<'_>) -> Result<()> {
    let messages: Vec<ChatMessage> = args
        .message
        .iter()
        .map(|m| ChatMessage::user(m.as_str()))
        .collect();
    let report = SensitivityReport::for_messages(&messages);
    tracing::debug!(
        sensitive = report.sensitive,
        matches = report.matches.len(),
        "Classified messages"
    );
    opts.emit("check-sensitive", &report, human::render_sensitivity)
}
