//! Providers command implementation.

use std::sync::Arc;

use serde::Serialize;

use crate::cli::GlobalOptions;
use crate::cli::args::ProvidersArgs;
use crate::core::health::ProbeOutcome;
use crate::core::http::{HEALTH_TIMEOUT, HttpHealthProbe};
use crate::core::provider::ProviderProfile;
use crate::error::Result;
use crate::render::human;

/// Output of `llmroute providers`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersReport {
    pub providers: Vec<ProviderProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probes: Option<Vec<ProbeOutcome>>,
}

/// Execute the providers command.
///
/// # Errors
/// Returns an error if the config cannot be resolved or output fails to render.
pub async fn execute(args: &ProvidersArgs, opts: GlobalOptions<'_>) -> Result<()> {
    let resolved = opts.resolve(None, None)?;

    let probes = if args.probe {
        let router = resolved.build_router()?;
        let probe = Arc::new(HttpHealthProbe::new(HEALTH_TIMEOUT)?);
        let outcomes = router.probe_once(probe).await;
        tracing::debug!(
            probed = outcomes.len(),
            failed = outcomes.iter().filter(|o| !o.healthy).count(),
            "Probe pass finished"
        );
        Some(outcomes)
    } else {
        None
    };

    let report = ProvidersReport {
        providers: resolved.providers,
        probes,
    };
    opts.emit("providers", &report, |r| {
        let mut out = human::render_providers(&r.providers);
        if let Some(probes) = &r.probes {
            out.push('\n');
            out.push_str(&human::render_probes(probes));
        }
        out
    })
}
