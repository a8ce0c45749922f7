//! Strategy-based provider ranking.
//!
//! A [`Strategy`] is a closed set of ranking policies. [`select`] applies the
//! sensitivity override first and then the strategy; every ordering is
//! total, with exact ties broken by provider name so the same candidates
//! always yield the same winner.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use super::models::ReasonCode;
use super::provider::{LOCAL_PROVIDER, PrivacyClass, ProviderProfile};
use crate::error::{Result, RouterError};

/// Reference cost (USD per 1k tokens) for the balanced score.
pub const BASELINE_COST_PER_1K: f64 = 0.03;

/// Reference latency for the balanced score.
pub const BASELINE_LATENCY_MS: f64 = 1000.0;

/// Named optimization policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Lowest cost per token.
    Cheapest,
    /// Lowest expected latency.
    Fastest,
    /// Equal-weight blend of normalized cost and latency.
    #[default]
    Balanced,
    /// Local providers first, then cheapest.
    PrivacyFirst,
    /// Highest reliability.
    Reliability,
}

impl Strategy {
    /// All strategies in display order.
    pub const ALL: &'static [Self] = &[
        Self::Cheapest,
        Self::Fastest,
        Self::Balanced,
        Self::PrivacyFirst,
        Self::Reliability,
    ];

    /// Canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cheapest => "cheapest",
            Self::Fastest => "fastest",
            Self::Balanced => "balanced",
            Self::PrivacyFirst => "privacy-first",
            Self::Reliability => "reliability",
        }
    }

    /// Ranking score; lower ranks first except for [`Strategy::Reliability`],
    /// where the score is the reliability itself and higher ranks first.
    #[must_use]
    pub fn score(self, provider: &ProviderProfile) -> f64 {
        match self {
            Self::Cheapest | Self::PrivacyFirst => provider.cost_per_1k_tokens,
            #[allow(clippy::cast_precision_loss)]
            Self::Fastest => provider.latency_ms as f64,
            Self::Balanced => balanced_score(provider),
            Self::Reliability => provider.effective_reliability(),
        }
    }

    /// Total order over providers for this strategy.
    fn compare(self, a: &ProviderProfile, b: &ProviderProfile) -> Ordering {
        let primary = match self {
            Self::Cheapest | Self::Fastest | Self::Balanced => {
                self.score(a).total_cmp(&self.score(b))
            }
            Self::PrivacyFirst => privacy_rank(a.privacy)
                .cmp(&privacy_rank(b.privacy))
                .then_with(|| self.score(a).total_cmp(&self.score(b))),
            Self::Reliability => self.score(b).total_cmp(&self.score(a)),
        };
        primary.then_with(|| a.name.cmp(&b.name))
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .find(|strategy| strategy.as_str() == normalized)
            .copied()
            .ok_or_else(|| RouterError::UnknownStrategy(s.to_string()))
    }
}

/// `0.5 * cost/baseline + 0.5 * latency/baseline`.
#[must_use]
pub fn balanced_score(provider: &ProviderProfile) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let latency = provider.latency_ms as f64;
    0.5f64.mul_add(
        provider.cost_per_1k_tokens / BASELINE_COST_PER_1K,
        0.5 * (latency / BASELINE_LATENCY_MS),
    )
}

const fn privacy_rank(privacy: PrivacyClass) -> u8 {
    match privacy {
        PrivacyClass::Local => 0,
        PrivacyClass::Cloud => 1,
    }
}

/// Outcome of a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub provider: ProviderProfile,
    pub reason: ReasonCode,
}

/// Candidates ordered best-first for `strategy`.
#[must_use]
pub fn rank(strategy: Strategy, candidates: &[ProviderProfile]) -> Vec<ProviderProfile> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| strategy.compare(a, b));
    ranked
}

/// Pick one provider from `candidates`.
///
/// When `sensitive` is set, a healthy local provider wins regardless of
/// strategy: the one named `local` if present, otherwise the first local
/// provider by name. Without one, the strategy is applied and the reason
/// becomes [`ReasonCode::SensitiveFallback`].
///
/// # Errors
///
/// [`RouterError::NoCandidates`] when `candidates` is empty.
pub fn select(
    strategy: Strategy,
    candidates: &[ProviderProfile],
    sensitive: bool,
) -> Result<Selection> {
    if candidates.is_empty() {
        return Err(RouterError::NoCandidates {
            strategy: strategy.to_string(),
        });
    }

    if sensitive {
        if let Some(local) = pick_local(candidates) {
            return Ok(Selection {
                provider: local.clone(),
                reason: ReasonCode::SensitiveContent,
            });
        }
    }

    let best = candidates
        .iter()
        .min_by(|a, b| strategy.compare(a, b))
        .ok_or_else(|| RouterError::NoCandidates {
            strategy: strategy.to_string(),
        })?;

    let reason = if sensitive {
        ReasonCode::SensitiveFallback
    } else {
        ReasonCode::Strategy(strategy)
    };

    Ok(Selection {
        provider: best.clone(),
        reason,
    })
}

fn pick_local(candidates: &[ProviderProfile]) -> Option<&ProviderProfile> {
    let locals = || {
        candidates
            .iter()
            .filter(|p| p.is_local() && p.is_healthy())
    };
    locals()
        .find(|p| p.name == LOCAL_PROVIDER)
        .or_else(|| locals().min_by(|a, b| a.name.cmp(&b.name)))
}
