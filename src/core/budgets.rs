//! Spend tracking against daily and monthly budgets.
//!
//! The [`BudgetTracker`] accumulates estimated spend per provider and per
//! period, answers "does this request still fit?", and keeps an append-only
//! alert log. Limits are advisory: an over-budget request is still routed,
//! it just leaves an alert behind.
//!
//! ## Periods
//!
//! Daily and monthly totals reset lazily: the first call that observes a
//! later UTC day (or month) than the last one seen resets the counters.
//! The check and the reset happen under one lock, so concurrent callers
//! crossing the same boundary reset exactly once, and spend is always
//! attributed to the period of its own timestamp.
//!
//! ## TOML Configuration Format
//!
//! ```toml
//! [budget]
//! daily_limit_usd = 10.0
//! monthly_limit_usd = 150.0
//! alert_at_percent = [50, 75, 90]
//! ```

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Result, RouterError};

// =============================================================================
// Budget Limits
// =============================================================================

/// Configured spend limits. `None` means unbounded, which is distinct from
/// `Some(0.0)` (nothing fits).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetLimits {
    /// Daily cost limit in USD.
    pub daily_limit_usd: Option<f64>,
    /// Monthly cost limit in USD.
    pub monthly_limit_usd: Option<f64>,
    /// Alert thresholds as percentages of the daily limit (e.g., [50, 75, 90]).
    pub alert_at_percent: Vec<u8>,
}

impl BudgetLimits {
    /// No limits, no alerts.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Only a daily limit.
    #[must_use]
    pub fn daily(limit_usd: f64) -> Self {
        Self {
            daily_limit_usd: Some(limit_usd),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.daily_limit_usd.is_none() && self.monthly_limit_usd.is_none()
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`RouterError::ConfigInvalid`] for a negative or non-finite limit, or
    /// an alert threshold outside 1..=100.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("budget.daily_limit_usd", self.daily_limit_usd),
            ("budget.monthly_limit_usd", self.monthly_limit_usd),
        ] {
            if let Some(limit) = value {
                if !limit.is_finite() || limit < 0.0 {
                    return Err(RouterError::ConfigInvalid {
                        key: key.to_string(),
                        message: format!("must be a non-negative number, got {limit}"),
                    });
                }
            }
        }
        if let Some(bad) = self
            .alert_at_percent
            .iter()
            .find(|p| **p == 0 || **p > 100)
        {
            return Err(RouterError::ConfigInvalid {
                key: "budget.alert_at_percent".to_string(),
                message: format!("thresholds must be within 1..=100, got {bad}"),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Alerts
// =============================================================================

/// Kind of budget alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AlertKind {
    /// A request was routed although no candidate fit the budget.
    BudgetExceeded,
    /// Daily spend crossed a configured percentage of the daily limit.
    ThresholdReached { percent: u8 },
}

impl AlertKind {
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::BudgetExceeded => "Budget exceeded",
            Self::ThresholdReached { .. } => "Alert threshold reached",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BudgetExceeded => f.write_str(self.description()),
            Self::ThresholdReached { percent } => {
                write!(f, "{} ({percent}%)", self.description())
            }
        }
    }
}

/// One entry in the alert log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAlert {
    pub kind: AlertKind,
    /// Provider whose spend triggered the alert.
    pub provider: String,
    pub timestamp: DateTime<Utc>,
    /// Daily spend right after the triggering record.
    pub daily_spent_usd: f64,
}

// =============================================================================
// Tracker
// =============================================================================

#[derive(Debug)]
struct BudgetState {
    daily_spent: f64,
    monthly_spent: f64,
    /// Since the last daily reset; sums to `daily_spent`.
    spent_by_provider: HashMap<String, f64>,
    lifetime_by_provider: HashMap<String, f64>,
    alerts: Vec<BudgetAlert>,
    /// Thresholds already alerted on in the current day.
    thresholds_fired: Vec<u8>,
    day: NaiveDate,
    month: (i32, u32),
}

impl BudgetState {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            daily_spent: 0.0,
            monthly_spent: 0.0,
            spent_by_provider: HashMap::new(),
            lifetime_by_provider: HashMap::new(),
            alerts: Vec::new(),
            thresholds_fired: Vec::new(),
            day: now.date_naive(),
            month: month_key(now),
        }
    }

    fn roll(&mut self, now: DateTime<Utc>) -> PeriodRollover {
        let mut rolled = PeriodRollover::default();
        let month = month_key(now);
        if month > self.month {
            self.monthly_spent = 0.0;
            self.month = month;
            rolled.monthly = true;
        }
        let day = now.date_naive();
        if day > self.day {
            self.daily_spent = 0.0;
            self.spent_by_provider.clear();
            self.thresholds_fired.clear();
            self.day = day;
            rolled.daily = true;
        }
        rolled
    }
}

fn month_key(now: DateTime<Utc>) -> (i32, u32) {
    (now.year(), now.month())
}

/// Which periods a rollover check reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodRollover {
    pub daily: bool,
    pub monthly: bool,
}

/// Shared spend accounting for one router.
#[derive(Debug)]
pub struct BudgetTracker {
    limits: BudgetLimits,
    state: Mutex<BudgetState>,
}

impl BudgetTracker {
    /// Create a tracker whose first period starts at `now`.
    #[must_use]
    pub fn new(limits: BudgetLimits, now: DateTime<Utc>) -> Self {
        let mut limits = limits;
        limits.alert_at_percent.sort_unstable();
        limits.alert_at_percent.dedup();
        Self {
            limits,
            state: Mutex::new(BudgetState::new(now)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BudgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn limits(&self) -> &BudgetLimits {
        &self.limits
    }

    /// Reset daily/monthly totals if `now` is in a later period.
    ///
    /// Idempotent: a second call for the same period is a no-op.
    pub fn reset_if_period_rolled(&self, now: DateTime<Utc>) -> PeriodRollover {
        let rolled = self.lock().roll(now);
        if rolled.daily || rolled.monthly {
            tracing::info!(
                daily = rolled.daily,
                monthly = rolled.monthly,
                day = %now.date_naive(),
                "Budget period rolled over"
            );
        }
        rolled
    }

    /// Whether spending `estimated_cost` now stays within every limit.
    #[must_use]
    pub fn fits(&self, estimated_cost: f64) -> bool {
        let state = self.lock();
        let within = |limit: Option<f64>, spent: f64| {
            limit.is_none_or(|limit| spent + estimated_cost <= limit)
        };
        within(self.limits.daily_limit_usd, state.daily_spent)
            && within(self.limits.monthly_limit_usd, state.monthly_spent)
    }

    /// Record spend for `provider` at `now`.
    ///
    /// `over_budget` marks a request the caller routed even though no
    /// candidate fit; it leaves a [`AlertKind::BudgetExceeded`] alert.
    pub fn record(&self, provider: &str, cost: f64, over_budget: bool, now: DateTime<Utc>) {
        let mut state = self.lock();
        state.roll(now);

        *state
            .lifetime_by_provider
            .entry(provider.to_string())
            .or_insert(0.0) += cost;

        // Spend stamped before the current period stays out of its totals.
        if month_key(now) == state.month {
            state.monthly_spent += cost;
        }
        if now.date_naive() == state.day {
            state.daily_spent += cost;
            *state
                .spent_by_provider
                .entry(provider.to_string())
                .or_insert(0.0) += cost;
        }

        if over_budget {
            tracing::warn!(
                provider,
                cost_usd = cost,
                daily_spent_usd = state.daily_spent,
                "Routed over budget"
            );
            let alert = BudgetAlert {
                kind: AlertKind::BudgetExceeded,
                provider: provider.to_string(),
                timestamp: now,
                daily_spent_usd: state.daily_spent,
            };
            state.alerts.push(alert);
        }

        self.fire_thresholds(&mut state, provider, now);
    }

    fn fire_thresholds(&self, state: &mut BudgetState, provider: &str, now: DateTime<Utc>) {
        let Some(limit) = self.limits.daily_limit_usd.filter(|l| *l > 0.0) else {
            return;
        };
        let percent_used = state.daily_spent / limit * 100.0;
        for &threshold in &self.limits.alert_at_percent {
            if percent_used >= f64::from(threshold) && !state.thresholds_fired.contains(&threshold)
            {
                state.thresholds_fired.push(threshold);
                tracing::info!(provider, threshold, percent_used, "Budget alert threshold reached");
                let alert = BudgetAlert {
                    kind: AlertKind::ThresholdReached { percent: threshold },
                    provider: provider.to_string(),
                    timestamp: now,
                    daily_spent_usd: state.daily_spent,
                };
                state.alerts.push(alert);
            }
        }
    }

    /// Alert log, oldest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<BudgetAlert> {
        self.lock().alerts.clone()
    }

    /// Point-in-time view of spend and limits.
    #[must_use]
    pub fn status(&self) -> BudgetStatus {
        let state = self.lock();
        let remaining = |limit: Option<f64>, spent: f64| limit.map(|l| (l - spent).max(0.0));
        let daily_percent_used = self.limits.daily_limit_usd.map(|limit| {
            if limit > 0.0 {
                state.daily_spent / limit * 100.0
            } else if state.daily_spent > 0.0 {
                100.0
            } else {
                0.0
            }
        });

        BudgetStatus {
            daily_limit_usd: self.limits.daily_limit_usd,
            monthly_limit_usd: self.limits.monthly_limit_usd,
            daily_spent_usd: state.daily_spent,
            monthly_spent_usd: state.monthly_spent,
            daily_remaining_usd: remaining(self.limits.daily_limit_usd, state.daily_spent),
            monthly_remaining_usd: remaining(self.limits.monthly_limit_usd, state.monthly_spent),
            daily_percent_used,
            spent_by_provider: state
                .spent_by_provider
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            lifetime_by_provider: state
                .lifetime_by_provider
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            alerts: state.alerts.clone(),
            period_day: state.day,
        }
    }
}

/// Snapshot returned by [`BudgetTracker::status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub daily_limit_usd: Option<f64>,
    pub monthly_limit_usd: Option<f64>,
    pub daily_spent_usd: f64,
    pub monthly_spent_usd: f64,
    pub daily_remaining_usd: Option<f64>,
    pub monthly_remaining_usd: Option<f64>,
    pub daily_percent_used: Option<f64>,
    /// Spend per provider in the current day.
    pub spent_by_provider: BTreeMap<String, f64>,
    /// Spend per provider since the tracker was created.
    pub lifetime_by_provider: BTreeMap<String, f64>,
    pub alerts: Vec<BudgetAlert>,
    /// UTC day the daily totals belong to.
    pub period_day: NaiveDate,
}

impl BudgetStatus {
    /// Whether a daily or monthly limit is already used up.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.daily_remaining_usd.is_some_and(|r| r <= 0.0)
            || self.monthly_remaining_usd.is_some_and(|r| r <= 0.0)
    }
}
