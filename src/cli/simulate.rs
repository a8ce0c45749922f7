//! Simulate command implementation.
//!
//! Routes a batch of JSON-lines requests through one router so budget
//! state and analytics accumulate the way they would in a long-running
//! process.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::cli::GlobalOptions;
use crate::cli::args::SimulateArgs;
use crate::core::analytics::AnalyticsSummary;
use crate::core::models::ChatRequest;
use crate::core::router::Router;
use crate::error::{Result, RouterError};
use crate::render::human;

/// Output of `llmroute simulate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    /// Decisions per reason code.
    pub reasons: BTreeMap<String, u64>,
    pub summary: AnalyticsSummary,
}

/// Parse JSON lines into requests. Blank lines are skipped.
///
/// # Errors
///
/// [`RouterError::InvalidRequest`] naming the first malformed line.
pub fn parse_requests(input: &str) -> Result<Vec<ChatRequest>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<ChatRequest>(line)
                .map_err(|e| RouterError::InvalidRequest(format!("line {}: {e}", i + 1)))
        })
        .collect()
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Route every request and collect the report.
///
/// # Errors
///
/// The first routing error aborts the run.
pub fn run(router: &Router, requests: &[ChatRequest]) -> Result<SimulationReport> {
    let mut reasons: BTreeMap<String, u64> = BTreeMap::new();
    for request in requests {
        let decision = router.route(request)?;
        *reasons.entry(decision.reason.as_str().to_string()).or_default() += 1;
    }
    Ok(SimulationReport {
        reasons,
        summary: router.summary(),
    })
}

/// Execute the simulate command.
///
/// # Errors
/// Returns an error if the input cannot be read or parsed, or if any
/// request fails to route.
pub fn execute(args: &SimulateArgs, opts: GlobalOptions<'_>) -> Result<()> {
    let resolved = opts.resolve(args.strategy.as_deref(), args.daily_limit)?;
    let requests = parse_requests(&read_input(&args.input)?)?;
    tracing::info!(
        requests = requests.len(),
        strategy = %resolved.strategy,
        "Starting simulation"
    );

    let router = resolved.build_router()?;
    let report = run(&router, &requests)?;
    opts.emit("simulate", &report, human::render_simulation)
}
