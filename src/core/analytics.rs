//! Routing analytics.
//!
//! Append-only per-provider counters fed by every routing decision. The
//! summary is a plain fold over current state: totals, averages and a
//! per-provider breakdown. No windows, no percentiles.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::budgets::BudgetStatus;

#[derive(Debug, Default)]
struct ProviderStats {
    requests: u64,
    cost_usd: f64,
    latencies_ms: Vec<u64>,
}

/// Shared analytics state for one router.
#[derive(Debug)]
pub struct Analytics {
    started_at: DateTime<Utc>,
    stats: Mutex<HashMap<String, ProviderStats>>,
}

impl Analytics {
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            stats: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ProviderStats>> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Count one request served by `provider`.
    pub fn record_request(&self, provider: &str, cost_usd: f64, latency_ms: u64) {
        let mut stats = self.lock();
        let entry = stats.entry(provider.to_string()).or_default();
        entry.requests += 1;
        entry.cost_usd += cost_usd;
        entry.latencies_ms.push(latency_ms);
    }

    /// Recorded latencies for one provider, in arrival order.
    #[must_use]
    pub fn latencies(&self, provider: &str) -> Vec<u64> {
        self.lock()
            .get(provider)
            .map(|s| s.latencies_ms.clone())
            .unwrap_or_default()
    }

    /// Read-only snapshot.
    ///
    /// `now` only feeds `uptime_seconds`; with a fixed clock two calls
    /// without an intervening record are identical.
    #[must_use]
    pub fn summary(&self, budget: BudgetStatus, now: DateTime<Utc>) -> AnalyticsSummary {
        let stats = self.lock();

        let providers: BTreeMap<String, ProviderSummary> = stats
            .iter()
            .map(|(name, s)| {
                (
                    name.clone(),
                    ProviderSummary {
                        requests: s.requests,
                        cost_usd: s.cost_usd,
                        average_latency_ms: average(&s.latencies_ms),
                    },
                )
            })
            .collect();

        let total_requests = providers.values().map(|p| p.requests).sum();
        let total_cost_usd = providers.values().map(|p| p.cost_usd).sum();
        let all_latencies: Vec<u64> = stats
            .values()
            .flat_map(|s| s.latencies_ms.iter().copied())
            .collect();

        AnalyticsSummary {
            total_requests,
            total_cost_usd,
            average_latency_ms: average(&all_latencies),
            providers,
            budget,
            started_at: self.started_at,
            uptime_seconds: (now - self.started_at).num_seconds().max(0),
        }
    }
}

fn average(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let sum = values.iter().sum::<u64>() as f64;
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    sum / len
}

/// Per-provider slice of the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    pub requests: u64,
    pub cost_usd: f64,
    pub average_latency_ms: f64,
}

/// Snapshot consumed by presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_requests: u64,
    pub total_cost_usd: f64,
    pub average_latency_ms: f64,
    pub providers: BTreeMap<String, ProviderSummary>,
    pub budget: BudgetStatus,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
}
