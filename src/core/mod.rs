//! Routing engine: models, registry, selection, budget, health, analytics.

pub mod analytics;
pub mod budgets;
pub mod client;
pub mod clock;
pub mod health;
pub mod http;
pub mod logging;
pub mod models;
pub mod pricing;
pub mod provider;
pub mod router;
pub mod sensitivity;
pub mod strategy;

pub use analytics::{Analytics, AnalyticsSummary, ProviderSummary};
pub use budgets::{AlertKind, BudgetAlert, BudgetLimits, BudgetStatus, BudgetTracker};
pub use client::{Dispatched, ProviderClient, ProviderResponse};
pub use clock::{Clock, ManualClock, SystemClock};
pub use health::{
    HealthConfig, HealthMonitor, HealthProbe, HealthRecord, HealthTask, HealthTransition,
    ProbeOutcome,
};
pub use http::{HttpHealthProbe, HttpProviderClient};
pub use models::{ChatMessage, ChatRequest, ReasonCode, RoutingDecision};
pub use pricing::{estimate_cost, estimate_tokens};
pub use provider::{HealthStatus, PrivacyClass, ProviderProfile, ProviderRegistry};
pub use router::{CandidateView, Router, RouterBuilder, RouterConfig};
pub use sensitivity::{SensitiveCategory, SensitiveMatch, SensitivityReport};
pub use strategy::{Selection, Strategy};
