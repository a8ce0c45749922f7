//! Routing orchestrator.
//!
//! [`Router`] owns the registry, budget tracker and analytics by
//! composition and answers one question per request: which provider
//! should serve it, and why. Precedence is privacy, then health, then
//! budget, then strategy preference.
//!
//! The decision path is synchronous and performs no I/O, so `route` can be
//! called from any number of tasks sharing an `Arc<Router>`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use super::analytics::{Analytics, AnalyticsSummary};
use super::budgets::{BudgetLimits, BudgetTracker};
use super::client::{Dispatched, ProviderClient};
use super::clock::{Clock, SystemClock};
use super::health::{
    HealthConfig, HealthMonitor, HealthProbe, HealthRecord, HealthTask, ProbeOutcome,
};
use super::models::{ChatRequest, ReasonCode, RoutingDecision};
use super::pricing::{estimate_cost, estimate_tokens};
use super::provider::{ProviderProfile, ProviderRegistry};
use super::sensitivity;
use super::strategy::{self, Strategy};
use crate::error::{Result, RouterError};

// =============================================================================
// Configuration
// =============================================================================

/// Engine-level settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouterConfig {
    /// Strategy used when a request carries no override.
    pub strategy: Strategy,
    pub budget: BudgetLimits,
    pub health: HealthConfig,
}

impl RouterConfig {
    /// # Errors
    ///
    /// Invalid budget limits or health settings.
    pub fn validate(&self) -> Result<()> {
        self.budget.validate()?;
        if self.health.interval.is_zero() {
            return Err(RouterError::ConfigInvalid {
                key: "health.interval_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.health.failure_threshold == 0 {
            return Err(RouterError::ConfigInvalid {
                key: "health.failure_threshold".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.health.probe_timeout.is_zero() {
            return Err(RouterError::ConfigInvalid {
                key: "health.probe_timeout_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`Router`].
pub struct RouterBuilder {
    config: RouterConfig,
    providers: Option<Vec<ProviderProfile>>,
    clock: Arc<dyn Clock>,
    probe: Option<Arc<dyn HealthProbe>>,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self {
            config: RouterConfig::default(),
            providers: None,
            clock: Arc::new(SystemClock),
            probe: None,
        }
    }
}

impl RouterBuilder {
    #[must_use]
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    #[must_use]
    pub fn budget(mut self, limits: BudgetLimits) -> Self {
        self.config.budget = limits;
        self
    }

    /// Replace the built-in providers.
    #[must_use]
    pub fn providers(mut self, providers: impl IntoIterator<Item = ProviderProfile>) -> Self {
        self.providers = Some(providers.into_iter().collect());
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start a health monitor with this probe when the router is built.
    ///
    /// Building then requires a running tokio runtime.
    #[must_use]
    pub fn health_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// # Errors
    ///
    /// Invalid configuration or provider profiles, or a health probe
    /// without a tokio runtime.
    pub fn build(self) -> Result<Router> {
        self.config.validate()?;
        let providers = self.providers.unwrap_or_else(ProviderProfile::builtin);
        for provider in &providers {
            provider.validate()?;
        }

        let now = self.clock.now();
        let router = Router {
            registry: Arc::new(ProviderRegistry::with_providers(providers)),
            budget: BudgetTracker::new(self.config.budget.clone(), now),
            analytics: Analytics::new(now),
            clock: self.clock,
            config: self.config,
            monitor: Mutex::new(None),
        };

        if let Some(probe) = self.probe {
            router.start_health_monitor(probe)?;
        }
        Ok(router)
    }
}

// =============================================================================
// Router
// =============================================================================

struct RunningMonitor {
    monitor: Arc<HealthMonitor>,
    task: HealthTask,
}

/// One candidate as seen by the selector, for explain output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateView {
    pub provider: String,
    pub score: f64,
    pub estimated_cost_usd: f64,
    pub latency_ms: u64,
    pub local: bool,
    pub within_budget: bool,
}

/// The routing engine.
pub struct Router {
    registry: Arc<ProviderRegistry>,
    budget: BudgetTracker,
    analytics: Analytics,
    clock: Arc<dyn Clock>,
    config: RouterConfig,
    monitor: Mutex<Option<RunningMonitor>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry)
            .field("budget", &self.budget)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Router {
    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Router over the built-in providers.
    ///
    /// # Errors
    ///
    /// Invalid configuration.
    pub fn new(config: RouterConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    #[must_use]
    pub const fn budget(&self) -> &BudgetTracker {
        &self.budget
    }

    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    fn lock_monitor(&self) -> MutexGuard<'_, Option<RunningMonitor>> {
        self.monitor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pick a provider for `request` and record the spend.
    ///
    /// # Errors
    ///
    /// - [`RouterError::InvalidRequest`] when the request has no messages
    /// - [`RouterError::NoAvailableProviders`] when every provider is unhealthy
    pub fn route(&self, request: &ChatRequest) -> Result<RoutingDecision> {
        let now = self.clock.now();
        self.budget.reset_if_period_rolled(now);

        if request.messages.is_empty() {
            return Err(RouterError::InvalidRequest(
                "request has no messages".to_string(),
            ));
        }

        let sensitive = sensitivity::is_sensitive(&request.messages);
        let healthy = self.healthy_or_error()?;
        let tokens = estimate_tokens(&request.messages);
        let strategy = request.strategy.unwrap_or(self.config.strategy);

        let (pool, over_budget) = self.candidate_pool(healthy, tokens, sensitive);
        let selection = strategy::select(strategy, &pool, sensitive)?;

        let reason = if over_budget {
            match selection.reason {
                ReasonCode::SensitiveContent => ReasonCode::SensitiveBudgetExceeded,
                ReasonCode::Strategy(_) => ReasonCode::BudgetExceeded,
                other => other,
            }
        } else {
            selection.reason
        };

        if reason == ReasonCode::SensitiveFallback {
            tracing::warn!(
                provider = %selection.provider.name,
                "Sensitive content routed to a cloud provider: no healthy local provider"
            );
        }

        let chosen = selection.provider;
        let cost = estimate_cost(&chosen, tokens);
        self.budget.record(&chosen.name, cost, over_budget, now);
        self.analytics
            .record_request(&chosen.name, cost, chosen.latency_ms);

        tracing::debug!(
            provider = %chosen.name,
            reason = %reason,
            strategy = %strategy,
            sensitive,
            tokens,
            cost_usd = cost,
            "Routing decision"
        );

        Ok(RoutingDecision {
            provider: chosen.name,
            reason,
            strategy,
            estimated_cost_usd: cost,
            latency_ms: chosen.latency_ms,
            estimated_tokens: tokens,
            sensitive,
            decided_at: now,
        })
    }

    fn healthy_or_error(&self) -> Result<Vec<ProviderProfile>> {
        let healthy = self.registry.healthy();
        if healthy.is_empty() {
            let registered = self.registry.len();
            tracing::warn!(registered, "No healthy providers");
            return Err(RouterError::NoAvailableProviders { registered });
        }
        Ok(healthy)
    }

    /// Budget-filtered pool and whether the request is routed over budget.
    ///
    /// Falls back to every healthy provider when nothing fits. A sensitive
    /// request also falls back when a healthy local provider exists but only
    /// cloud providers fit, so privacy outranks budget.
    fn candidate_pool(
        &self,
        healthy: Vec<ProviderProfile>,
        tokens: u64,
        sensitive: bool,
    ) -> (Vec<ProviderProfile>, bool) {
        let within: Vec<ProviderProfile> = healthy
            .iter()
            .filter(|p| self.budget.fits(estimate_cost(p, tokens)))
            .cloned()
            .collect();

        if within.is_empty() {
            tracing::warn!(candidates = healthy.len(), "All candidates over budget");
            return (healthy, true);
        }

        let local_dropped =
            sensitive && healthy.iter().any(ProviderProfile::is_local)
                && !within.iter().any(ProviderProfile::is_local);
        if local_dropped {
            tracing::warn!("Local provider over budget; keeping it for sensitive content");
            return (healthy, true);
        }

        (within, false)
    }

    /// Healthy candidates ranked for `request`, without recording anything.
    ///
    /// # Errors
    ///
    /// Same validation as [`Router::route`].
    pub fn explain(&self, request: &ChatRequest) -> Result<Vec<CandidateView>> {
        self.budget.reset_if_period_rolled(self.clock.now());

        if request.messages.is_empty() {
            return Err(RouterError::InvalidRequest(
                "request has no messages".to_string(),
            ));
        }
        let healthy = self.healthy_or_error()?;
        let tokens = estimate_tokens(&request.messages);
        let strategy = request.strategy.unwrap_or(self.config.strategy);

        Ok(strategy::rank(strategy, &healthy)
            .into_iter()
            .map(|p| {
                let cost = estimate_cost(&p, tokens);
                CandidateView {
                    score: strategy.score(&p),
                    estimated_cost_usd: cost,
                    latency_ms: p.latency_ms,
                    local: p.is_local(),
                    within_budget: self.budget.fits(cost),
                    provider: p.name,
                }
            })
            .collect())
    }

    /// Read-only analytics snapshot.
    #[must_use]
    pub fn summary(&self) -> AnalyticsSummary {
        self.analytics
            .summary(self.budget.status(), self.clock.now())
    }

    /// Route `request`, then forward it to the chosen provider.
    ///
    /// # Errors
    ///
    /// Routing errors, or whatever the client reports.
    pub async fn dispatch(
        &self,
        request: &ChatRequest,
        client: &dyn ProviderClient,
    ) -> Result<Dispatched> {
        let decision = self.route(request)?;
        let provider = self.registry.get(&decision.provider)?;
        let response = client.send(&provider, request).await?;
        Ok(Dispatched { decision, response })
    }

    /// Start the periodic health monitor, replacing any running one.
    ///
    /// # Errors
    ///
    /// Returns error when called outside a tokio runtime.
    pub fn start_health_monitor(&self, probe: Arc<dyn HealthProbe>) -> Result<()> {
        tokio::runtime::Handle::try_current().map_err(|e| {
            RouterError::Other(anyhow::anyhow!("health monitor needs a tokio runtime: {e}"))
        })?;

        let monitor = Arc::new(HealthMonitor::new(
            Arc::clone(&self.registry),
            probe,
            Arc::clone(&self.clock),
            self.config.health,
        ));
        let task = monitor.spawn();
        tracing::info!(
            interval_secs = self.config.health.interval.as_secs(),
            failure_threshold = self.config.health.failure_threshold,
            "Health monitor started"
        );

        if let Some(previous) = self.lock_monitor().replace(RunningMonitor { monitor, task }) {
            previous.task.signal_stop();
        }
        Ok(())
    }

    /// Whether a health monitor task is running.
    #[must_use]
    pub fn health_monitor_running(&self) -> bool {
        self.lock_monitor()
            .as_ref()
            .is_some_and(|m| !m.task.is_finished())
    }

    /// Probe history from the running monitor, if any.
    #[must_use]
    pub fn health_records(&self) -> BTreeMap<String, HealthRecord> {
        self.lock_monitor()
            .as_ref()
            .map(|m| m.monitor.records())
            .unwrap_or_default()
    }

    /// Run one probe pass outside the periodic loop.
    ///
    /// When a periodic monitor is active its probe and failure history are
    /// used and `probe` is ignored.
    pub async fn probe_once(&self, probe: Arc<dyn HealthProbe>) -> Vec<ProbeOutcome> {
        let running = self.lock_monitor().as_ref().map(|m| Arc::clone(&m.monitor));
        let monitor = running.unwrap_or_else(|| {
            Arc::new(HealthMonitor::new(
                Arc::clone(&self.registry),
                probe,
                Arc::clone(&self.clock),
                self.config.health,
            ))
        });
        monitor.check_all().await
    }

    /// Stop the health monitor and wait for it to exit.
    pub async fn shutdown(&self) {
        let running = self.lock_monitor().take();
        if let Some(running) = running {
            running.task.stop().await;
            tracing::info!("Health monitor stopped");
        }
    }
}
