//! Provider client capability.
//!
//! The router only decides; forwarding the request is delegated to a
//! [`ProviderClient`]. The HTTP implementation lives in [`super::http`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::models::{ChatRequest, RoutingDecision};
use super::provider::ProviderProfile;
use crate::error::Result;

/// Sends a chat request to one concrete provider.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// # Errors
    ///
    /// Transport, HTTP status and payload errors from the provider.
    async fn send(&self, provider: &ProviderProfile, request: &ChatRequest)
    -> Result<ProviderResponse>;
}

/// Completion returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub provider: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
}

/// Decision plus the provider's answer, returned by `Router::dispatch`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispatched {
    pub decision: RoutingDecision,
    pub response: ProviderResponse,
}
