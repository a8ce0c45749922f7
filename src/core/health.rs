//! Provider health monitoring.
//!
//! The [`HealthMonitor`] probes every registered provider on a fixed
//! interval and drives a per-provider state machine:
//!
//! - a failed probe increments `consecutive_failures`; at `failure_threshold`
//!   (default 3) the provider turns `unhealthy`
//! - one successful probe resets the counter and turns it `healthy` again
//!
//! Probes run with no lock held. A probe that panics or exceeds
//! `probe_timeout` counts as a failed check; nothing propagates to the
//! caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::clock::Clock;
use super::provider::{HealthStatus, ProviderProfile, ProviderRegistry};

/// Default interval between probe rounds.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
/// Default consecutive failures before a provider is marked unhealthy.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness check for one provider.
///
/// Implementations report failure as `false`; they should not panic, but a
/// panic is treated the same as `false`.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self, provider: &ProviderProfile) -> bool;
}

/// Monitor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthConfig {
    pub interval: Duration,
    pub failure_threshold: u32,
    pub probe_timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Per-provider probe history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub consecutive_failures: u32,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
}

/// Status change caused by a probe result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthTransition {
    BecameUnhealthy,
    Recovered,
}

/// Result of probing one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub provider: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<HealthTransition>,
}

/// Failure-threshold state machine over a shared registry.
pub struct HealthMonitor {
    registry: Arc<ProviderRegistry>,
    probe: Arc<dyn HealthProbe>,
    clock: Arc<dyn Clock>,
    config: HealthConfig,
    records: Mutex<HashMap<String, HealthRecord>>,
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("config", &self.config)
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

impl HealthMonitor {
    #[must_use]
    pub fn new(
        registry: Arc<ProviderRegistry>,
        probe: Arc<dyn HealthProbe>,
        clock: Arc<dyn Clock>,
        config: HealthConfig,
    ) -> Self {
        Self {
            registry,
            probe,
            clock,
            config,
            records: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, HealthRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn config(&self) -> HealthConfig {
        self.config
    }

    /// Probe history per provider, sorted by name.
    #[must_use]
    pub fn records(&self) -> BTreeMap<String, HealthRecord> {
        self.lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Feed one probe result into the state machine.
    pub fn apply(&self, provider: &str, healthy: bool) -> Option<HealthTransition> {
        let now = self.clock.now();
        let mut records = self.lock();
        let record = records.entry(provider.to_string()).or_default();
        record.last_checked = Some(now);

        let target = if healthy {
            record.consecutive_failures = 0;
            record.last_success = Some(now);
            Some(HealthStatus::Healthy)
        } else {
            record.consecutive_failures = record.consecutive_failures.saturating_add(1);
            (record.consecutive_failures >= self.config.failure_threshold)
                .then_some(HealthStatus::Unhealthy)
        };
        let failures = record.consecutive_failures;

        let target = target?;
        let previous = match self.registry.set_status(provider, target) {
            Ok(previous) => previous,
            Err(e) => {
                tracing::debug!(provider, error = %e, "Probe result for unregistered provider");
                return None;
            }
        };
        drop(records);

        match (previous, target) {
            (HealthStatus::Healthy, HealthStatus::Unhealthy) => {
                tracing::warn!(provider, failures, "Provider marked unhealthy");
                Some(HealthTransition::BecameUnhealthy)
            }
            (HealthStatus::Unhealthy, HealthStatus::Healthy) => {
                tracing::info!(provider, "Provider recovered");
                Some(HealthTransition::Recovered)
            }
            _ => None,
        }
    }

    /// Run one probe round over every registered provider.
    pub async fn check_all(&self) -> Vec<ProbeOutcome> {
        let providers = self.registry.list();
        let timeout = self.config.probe_timeout;

        let probes = providers.into_iter().map(|provider| {
            let probe = Arc::clone(&self.probe);
            async move {
                let name = provider.name.clone();
                let mut handle = tokio::spawn(async move { probe.check(&provider).await });
                let healthy = match tokio::time::timeout(timeout, &mut handle).await {
                    Ok(Ok(healthy)) => healthy,
                    Ok(Err(e)) => {
                        tracing::debug!(provider = %name, error = %e, "Health probe panicked");
                        false
                    }
                    Err(_) => {
                        handle.abort();
                        tracing::debug!(
                            provider = %name,
                            timeout_ms = timeout.as_millis(),
                            "Health probe timed out"
                        );
                        false
                    }
                };
                (name, healthy)
            }
        });

        let results = futures::future::join_all(probes).await;
        results
            .into_iter()
            .map(|(provider, healthy)| ProbeOutcome {
                transition: self.apply(&provider, healthy),
                provider,
                healthy,
            })
            .collect()
    }

    /// Start the periodic probe loop on the current tokio runtime.
    ///
    /// The first round runs immediately.
    #[must_use]
    pub fn spawn(self: &Arc<Self>) -> HealthTask {
        let (shutdown, mut stop) = watch::channel(false);
        let monitor = Arc::clone(self);
        let interval = self.config.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let outcomes = monitor.check_all().await;
                        let unhealthy = outcomes.iter().filter(|o| !o.healthy).count();
                        tracing::debug!(probed = outcomes.len(), failed = unhealthy, "Health check round");
                    }
                    _ = stop.changed() => {
                        tracing::debug!("Health monitor shutdown signal received");
                        break;
                    }
                }
            }
        });

        HealthTask {
            shutdown,
            handle: Some(handle),
        }
    }
}

/// Handle to a running health loop. Dropping it signals the loop to stop.
#[derive(Debug)]
pub struct HealthTask {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl HealthTask {
    /// Signal the loop and wait for it to exit.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::debug!(error = %e, "Health monitor task ended abnormally");
            }
        }
    }

    /// Signal the loop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.shutdown.send(true);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for HealthTask {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::SystemClock;
    use crate::core::provider::PrivacyClass;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Toggle {
        up: AtomicBool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HealthProbe for Toggle {
        async fn check(&self, _provider: &ProviderProfile) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.up.load(Ordering::SeqCst)
        }
    }

    struct Hangs;

    #[async_trait]
    impl HealthProbe for Hangs {
        async fn check(&self, _provider: &ProviderProfile) -> bool {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            true
        }
    }

    struct Panics;

    #[async_trait]
    impl HealthProbe for Panics {
        async fn check(&self, _provider: &ProviderProfile) -> bool {
            panic!("probe blew up");
        }
    }

    fn registry() -> Arc<ProviderRegistry> {
        Arc::new(ProviderRegistry::with_providers([ProviderProfile::new(
            "openai",
            0.03,
            800,
            PrivacyClass::Cloud,
        )]))
    }

    fn monitor(registry: &Arc<ProviderRegistry>, probe: Arc<dyn HealthProbe>) -> HealthMonitor {
        HealthMonitor::new(
            Arc::clone(registry),
            probe,
            Arc::new(SystemClock),
            HealthConfig {
                probe_timeout: Duration::from_millis(50),
                ..HealthConfig::default()
            },
        )
    }

    fn toggle(up: bool) -> Arc<Toggle> {
        Arc::new(Toggle {
            up: AtomicBool::new(up),
            calls: AtomicUsize::new(0),
        })
    }

    fn status(registry: &ProviderRegistry) -> HealthStatus {
        registry.get("openai").unwrap().status
    }

    #[test]
    fn slow_failure_fast_recovery() {
        let registry = registry();
        let monitor = monitor(&registry, toggle(true));

        assert_eq!(monitor.apply("openai", false), None);
        assert_eq!(monitor.apply("openai", false), None);
        assert_eq!(status(&registry), HealthStatus::Healthy);
        assert_eq!(
            monitor.apply("openai", false),
            Some(HealthTransition::BecameUnhealthy)
        );
        assert_eq!(status(&registry), HealthStatus::Unhealthy);

        // Further failures keep it down without another transition.
        assert_eq!(monitor.apply("openai", false), None);

        assert_eq!(
            monitor.apply("openai", true),
            Some(HealthTransition::Recovered)
        );
        assert_eq!(status(&registry), HealthStatus::Healthy);
        assert_eq!(monitor.records()["openai"].consecutive_failures, 0);
    }

    #[test]
    fn success_resets_counter_before_threshold() {
        let registry = registry();
        let monitor = monitor(&registry, toggle(true));
        monitor.apply("openai", false);
        monitor.apply("openai", false);
        monitor.apply("openai", true);
        monitor.apply("openai", false);
        monitor.apply("openai", false);
        assert_eq!(status(&registry), HealthStatus::Healthy);
        assert_eq!(monitor.records()["openai"].consecutive_failures, 2);
    }

    #[test]
    fn unregistered_provider_is_ignored() {
        let registry = registry();
        let monitor = monitor(&registry, toggle(true));
        for _ in 0..5 {
            assert_eq!(monitor.apply("ghost", false), None);
        }
    }

    #[tokio::test]
    async fn check_all_probes_every_provider() {
        let registry = registry();
        registry.register(ProviderProfile::new("local", 0.0, 2000, PrivacyClass::Local));
        let probe = toggle(false);
        let monitor = monitor(&registry, probe.clone());

        for _ in 0..3 {
            let outcomes = monitor.check_all().await;
            assert_eq!(outcomes.len(), 2);
        }
        assert_eq!(probe.calls.load(Ordering::SeqCst), 6);
        assert!(registry.healthy().is_empty());

        probe.up.store(true, Ordering::SeqCst);
        let outcomes = monitor.check_all().await;
        assert!(
            outcomes
                .iter()
                .all(|o| o.transition == Some(HealthTransition::Recovered))
        );
        assert_eq!(registry.healthy().len(), 2);
    }

    #[tokio::test]
    async fn timed_out_probe_counts_as_failure() {
        let registry = registry();
        let monitor = monitor(&registry, Arc::new(Hangs));
        let outcomes = monitor.check_all().await;
        assert!(!outcomes[0].healthy);
        assert_eq!(monitor.records()["openai"].consecutive_failures, 1);
    }

    #[tokio::test]
    async fn panicking_probe_counts_as_failure() {
        let registry = registry();
        let monitor = monitor(&registry, Arc::new(Panics));
        for _ in 0..3 {
            monitor.check_all().await;
        }
        assert_eq!(status(&registry), HealthStatus::Unhealthy);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_loop_runs_and_stops() {
        let registry = registry();
        let probe = toggle(false);
        let monitor = Arc::new(HealthMonitor::new(
            Arc::clone(&registry),
            probe.clone(),
            Arc::new(SystemClock),
            HealthConfig {
                interval: Duration::from_secs(10),
                failure_threshold: 3,
                probe_timeout: Duration::from_secs(1),
            },
        ));

        let task = monitor.spawn();
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(status(&registry), HealthStatus::Unhealthy);

        task.stop().await;
        let calls = probe.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(probe.calls.load(Ordering::SeqCst), calls);
    }
}
