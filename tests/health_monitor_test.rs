//! Health monitor integration with the router.
//!
//! Time is paused, so interval ticks and probe timeouts advance instantly.

mod common;

use std::sync::Arc;
use std::time::Duration;

use llmroute::core::budgets::BudgetLimits;
use llmroute::core::health::{HealthConfig, HealthTransition};
use llmroute::core::provider::HealthStatus;
use llmroute::core::router::{Router, RouterConfig};
use llmroute::core::strategy::Strategy;
use llmroute::test_utils::{ScriptedProbe, make_test_request};

use common::fixtures::mixed_providers;

fn config(threshold: u32) -> RouterConfig {
    RouterConfig {
        strategy: Strategy::Fastest,
        budget: BudgetLimits::unbounded(),
        health: HealthConfig {
            interval: Duration::from_secs(10),
            failure_threshold: threshold,
            probe_timeout: Duration::from_secs(1),
        },
    }
}

fn pick(router: &Router) -> String {
    router.route(&make_test_request("hello")).unwrap().provider
}

#[tokio::test(start_paused = true)]
async fn provider_leaves_and_rejoins_the_pool() {
    let probe = Arc::new(ScriptedProbe::always(true).script("fast", [false, false, true]));
    let router = Router::builder()
        .config(config(2))
        .providers(mixed_providers())
        .health_probe(probe.clone())
        .build()
        .unwrap();
    assert!(router.health_monitor_running());

    // t=0: first failure, still below threshold.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(pick(&router), "fast");
    assert_eq!(router.health_records()["fast"].consecutive_failures, 1);

    // t=10: second failure crosses the threshold.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(
        router.registry().get("fast").unwrap().status,
        HealthStatus::Unhealthy
    );
    assert_eq!(pick(&router), "onprem");

    // t=20: one success restores it.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(pick(&router), "fast");
    assert_eq!(router.health_records()["fast"].consecutive_failures, 0);

    router.shutdown().await;
    assert!(!router.health_monitor_running());
    assert!(probe.calls() >= 9);
}

#[tokio::test(start_paused = true)]
async fn slow_probe_counts_as_failure() {
    let probe = Arc::new(ScriptedProbe::always(true).with_delay(Duration::from_secs(5)));
    let router = Router::builder()
        .config(config(1))
        .providers(mixed_providers())
        .build()
        .unwrap();

    let outcomes = router.probe_once(probe).await;
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| !o.healthy));
    assert!(
        outcomes
            .iter()
            .all(|o| o.transition == Some(HealthTransition::BecameUnhealthy))
    );
    assert!(router.registry().healthy().is_empty());
}

#[tokio::test(start_paused = true)]
async fn probe_once_reuses_running_monitor_history() {
    let running_probe = Arc::new(ScriptedProbe::always(true).script("onprem", [false, false]));
    let router = Router::builder()
        .config(config(2))
        .providers(mixed_providers())
        .health_probe(running_probe)
        .build()
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(router.health_records()["onprem"].consecutive_failures, 1);

    // The argument is ignored while a monitor runs; its probe fails again.
    let outcomes = router.probe_once(Arc::new(ScriptedProbe::always(true))).await;
    let onprem = outcomes.iter().find(|o| o.provider == "onprem").unwrap();
    assert_eq!(onprem.transition, Some(HealthTransition::BecameUnhealthy));

    router.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn restarting_the_monitor_replaces_the_old_loop() {
    let router = Router::builder()
        .config(config(3))
        .providers(mixed_providers())
        .build()
        .unwrap();
    assert!(!router.health_monitor_running());

    let first = Arc::new(ScriptedProbe::always(true));
    router.start_health_monitor(first.clone()).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    let first_calls = first.calls();
    assert_eq!(first_calls, 3);

    let second = Arc::new(ScriptedProbe::always(true));
    router.start_health_monitor(second.clone()).unwrap();
    tokio::time::sleep(Duration::from_secs(25)).await;

    assert_eq!(first.calls(), first_calls);
    assert!(second.calls() >= 9);
    router.shutdown().await;
}
