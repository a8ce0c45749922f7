//! Human-readable output.
//!
//! Plain aligned text with `colored` highlights. Colors are switched off
//! globally by the binary when `--no-color`, `NO_COLOR` or a non-TTY
//! stdout says so.

use std::fmt::Write as _;

use colored::{ColoredString, Colorize};

use crate::core::analytics::AnalyticsSummary;
use crate::cli::simulate::SimulationReport;
use crate::core::budgets::{AlertKind, BudgetStatus};
use crate::core::client::ProviderResponse;
use crate::core::health::{HealthTransition, ProbeOutcome};
use crate::core::models::{ReasonCode, RoutingDecision};
use crate::core::provider::ProviderProfile;
use crate::core::router::CandidateView;
use crate::core::sensitivity::SensitivityReport;
use crate::storage::config::ResolvedConfig;
use crate::util::format::{
    format_cost, format_latency, format_percent, format_tokens, format_uptime,
};

fn reason_label(reason: ReasonCode) -> ColoredString {
    let label = reason.as_str();
    if reason.is_over_budget() {
        label.yellow().bold()
    } else if reason.is_sensitive() {
        label.magenta().bold()
    } else {
        label.green().bold()
    }
}

fn limit_label(limit: Option<f64>) -> String {
    limit.map_or_else(|| "unlimited".to_string(), format_cost)
}

/// Render one routing decision, optionally with the ranked candidates.
#[must_use]
pub fn render_decision(decision: &RoutingDecision, candidates: Option<&[CandidateView]>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({})",
        "→".cyan(),
        decision.provider.bold(),
        reason_label(decision.reason)
    );
    let _ = writeln!(out, "  Strategy:   {}", decision.strategy);
    let _ = writeln!(
        out,
        "  Sensitive:  {}",
        if decision.sensitive { "yes".magenta() } else { "no".normal() }
    );
    let _ = writeln!(
        out,
        "  Tokens:     ~{}",
        format_tokens(decision.estimated_tokens)
    );
    let _ = writeln!(out, "  Est. cost:  {}", format_cost(decision.estimated_cost_usd));
    let _ = writeln!(out, "  Latency:    {}", format_latency(decision.latency_ms));

    if let Some(candidates) = candidates {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Candidates (best first)".bold());
        let _ = writeln!(
            out,
            "  {:<3} {:<14} {:>10} {:>12} {:>9}  {}",
            "#", "Provider", "Score", "Est. cost", "Latency", "Notes"
        );
        for (i, c) in candidates.iter().enumerate() {
            let mut notes = Vec::new();
            if c.local {
                notes.push("local".cyan().to_string());
            }
            if !c.within_budget {
                notes.push("over budget".yellow().to_string());
            }
            let name = if c.provider == decision.provider {
                c.provider.bold().to_string()
            } else {
                c.provider.clone()
            };
            let _ = writeln!(
                out,
                "  {:<3} {:<14} {:>10.4} {:>12} {:>9}  {}",
                i + 1,
                name,
                c.score,
                format_cost(c.estimated_cost_usd),
                format_latency(c.latency_ms),
                notes.join(", ")
            );
        }
    }
    out
}

/// Render the provider table.
#[must_use]
pub fn render_providers(providers: &[ProviderProfile]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<14} {:<7} {:>10} {:>9} {:>11}  {}",
        "Provider".bold(),
        "Privacy".bold(),
        "$/1k tok".bold(),
        "Latency".bold(),
        "Reliability".bold(),
        "Status".bold()
    );
    for p in providers {
        let privacy = if p.is_local() {
            p.privacy.as_str().cyan()
        } else {
            p.privacy.as_str().normal()
        };
        let status = if p.is_healthy() {
            p.status.as_str().green()
        } else {
            p.status.as_str().red()
        };
        let _ = writeln!(
            out,
            "{:<14} {:<7} {:>10} {:>9} {:>11}  {}",
            p.name,
            privacy,
            format!("{:.4}", p.cost_per_1k_tokens),
            format_latency(p.latency_ms),
            format_percent(p.effective_reliability() * 100.0),
            status
        );
        if let Some(endpoint) = &p.endpoint {
            let _ = writeln!(out, "  {} {}", "endpoint:".dimmed(), endpoint);
        }
    }
    out
}

/// Render one probe pass.
#[must_use]
pub fn render_probes(outcomes: &[ProbeOutcome]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Probe results".bold());
    for o in outcomes {
        let result = if o.healthy {
            "reachable".green()
        } else {
            "unreachable".red()
        };
        let transition = match o.transition {
            Some(HealthTransition::BecameUnhealthy) => " (now unhealthy)".red().to_string(),
            Some(HealthTransition::Recovered) => " (recovered)".green().to_string(),
            None => String::new(),
        };
        let _ = writeln!(out, "  {:<14} {}{}", o.provider, result, transition);
    }
    out
}

/// Render a provider's reply.
#[must_use]
pub fn render_response(response: &ProviderResponse) -> String {
    let mut out = String::new();
    let model = response.model.as_deref().unwrap_or(&response.provider);
    let _ = writeln!(out, "{} {}", "Reply from".bold(), model.cyan());
    if let (Some(prompt), Some(completion)) = (response.prompt_tokens, response.completion_tokens)
    {
        let _ = writeln!(
            out,
            "  {} prompt + {} completion tokens",
            format_tokens(prompt),
            format_tokens(completion)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", response.content);
    out
}

/// Render a sensitivity check.
#[must_use]
pub fn render_sensitivity(report: &SensitivityReport) -> String {
    let mut out = String::new();
    if !report.sensitive {
        let _ = writeln!(out, "{} not sensitive", "✓".green());
        return out;
    }
    let _ = writeln!(
        out,
        "{} sensitive: routed to a local provider when one is healthy",
        "!".magenta().bold()
    );
    for hit in &report.matches {
        let _ = writeln!(
            out,
            "  - {} (message {})",
            hit.category.as_str().magenta(),
            hit.message_index + 1
        );
    }
    out
}

fn render_budget(out: &mut String, budget: &BudgetStatus) {
    let _ = writeln!(out, "{}", "Budget".bold());
    let _ = writeln!(
        out,
        "  Daily:    {} of {}{}",
        format_cost(budget.daily_spent_usd),
        limit_label(budget.daily_limit_usd),
        budget
            .daily_percent_used
            .map(|p| format!(" ({})", format_percent(p)))
            .unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "  Monthly:  {} of {}",
        format_cost(budget.monthly_spent_usd),
        limit_label(budget.monthly_limit_usd)
    );
    for alert in &budget.alerts {
        let label = match alert.kind {
            AlertKind::BudgetExceeded => "budget exceeded".red().to_string(),
            AlertKind::ThresholdReached { percent } => {
                format!("{percent}% of daily limit").yellow().to_string()
            }
        };
        let _ = writeln!(
            out,
            "  {} {} via {} at {}",
            "alert:".yellow(),
            label,
            alert.provider,
            alert.timestamp.format("%H:%M:%S")
        );
    }
}

/// Render an analytics summary.
#[must_use]
pub fn render_summary(summary: &AnalyticsSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Routing summary".bold());
    let _ = writeln!(out, "  Requests:     {}", summary.total_requests);
    let _ = writeln!(out, "  Total cost:   {}", format_cost(summary.total_cost_usd));
    let _ = writeln!(
        out,
        "  Avg latency:  {:.0}ms",
        summary.average_latency_ms
    );
    let _ = writeln!(out, "  Uptime:       {}", format_uptime(summary.uptime_seconds));

    if !summary.providers.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  {:<14} {:>8} {:>12} {:>12}",
            "Provider", "Requests", "Cost", "Avg latency"
        );
        for (name, p) in &summary.providers {
            let _ = writeln!(
                out,
                "  {:<14} {:>8} {:>12} {:>10.0}ms",
                name,
                p.requests,
                format_cost(p.cost_usd),
                p.average_latency_ms
            );
        }
    }

    let _ = writeln!(out);
    render_budget(&mut out, &summary.budget);
    out
}

/// Render a simulation run: reason counts, then the summary.
#[must_use]
pub fn render_simulation(report: &SimulationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Decisions by reason".bold());
    for (reason, count) in &report.reasons {
        let _ = writeln!(out, "  {reason:<26} {count:>6}");
    }
    let _ = writeln!(out);
    out.push_str(&render_summary(&report.summary));
    out
}

/// Render resolved configuration with value sources.
#[must_use]
pub fn render_config(config: &ResolvedConfig) -> String {
    let mut out = String::new();
    let source = |s: crate::storage::config::ConfigSource| format!("({s})").dimmed();
    let exists = if config.config_path.exists() {
        String::new()
    } else {
        " [not found]".dimmed().to_string()
    };

    let _ = writeln!(out, "{}", "Configuration".bold());
    let _ = writeln!(
        out,
        "  Config file:    {}{} {}",
        config.config_path.display(),
        exists,
        source(config.sources.config_path)
    );
    let _ = writeln!(
        out,
        "  Strategy:       {} {}",
        config.strategy,
        source(config.sources.strategy)
    );
    let _ = writeln!(
        out,
        "  Daily limit:    {} {}",
        limit_label(config.budget.daily_limit_usd),
        source(config.sources.daily_limit)
    );
    let _ = writeln!(
        out,
        "  Monthly limit:  {} {}",
        limit_label(config.budget.monthly_limit_usd),
        source(config.sources.monthly_limit)
    );
    if !config.budget.alert_at_percent.is_empty() {
        let thresholds: Vec<String> = config
            .budget
            .alert_at_percent
            .iter()
            .map(|p| format!("{p}%"))
            .collect();
        let _ = writeln!(out, "  Alerts at:      {}", thresholds.join(", "));
    }
    let _ = writeln!(
        out,
        "  Health:         every {}s, unhealthy after {} failures, probe timeout {}s",
        config.health.interval.as_secs(),
        config.health.failure_threshold,
        config.health.probe_timeout.as_secs()
    );
    let _ = writeln!(out);
    out.push_str(&render_providers(&config.providers));
    out
}
