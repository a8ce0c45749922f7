//! HTTP client utilities.
//!
//! Shared reqwest client plus the HTTP implementations of
//! [`ProviderClient`] and [`HealthProbe`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};

use super::client::{ProviderClient, ProviderResponse};
use super::health::HealthProbe;
use super::models::{ChatMessage, ChatRequest};
use super::provider::ProviderProfile;
use crate::error::{Result, RouterError};

/// Default timeout for completion requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for health endpoint requests.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("llmroute/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| RouterError::Network(e.to_string()))
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

// =============================================================================
// Completion client
// =============================================================================

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
}

/// OpenAI-compatible client: `POST {endpoint}/chat/completions`.
#[derive(Debug, Clone)]
pub struct HttpProviderClient {
    client: Client,
    timeout: Duration,
    api_key: Option<String>,
}

impl HttpProviderClient {
    /// # Errors
    ///
    /// Returns error if the underlying client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            timeout,
            api_key: None,
        })
    }

    /// Send `Authorization: Bearer <key>` with every request.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn send(
        &self,
        provider: &ProviderProfile,
        request: &ChatRequest,
    ) -> Result<ProviderResponse> {
        let endpoint = provider
            .endpoint
            .as_deref()
            .ok_or_else(|| RouterError::MissingEndpoint(provider.name.clone()))?;
        let url = join_url(endpoint, "chat/completions");

        let body = CompletionBody {
            model: &provider.name,
            messages: &request.messages,
            max_tokens: request.max_tokens,
        };

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        tracing::debug!(provider = %provider.name, url = %url, "Sending completion request");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                RouterError::Timeout {
                    provider: provider.name.clone(),
                    seconds: self.timeout.as_secs(),
                }
            } else {
                RouterError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RouterError::ProviderApiError {
                provider: provider.name.clone(),
                status_code: Some(status.as_u16()),
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
            });
        }

        let reply: CompletionReply = response
            .json()
            .await
            .map_err(|e| RouterError::ParseResponse(e.to_string()))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| RouterError::ParseResponse("response has no choices".to_string()))?;

        Ok(ProviderResponse {
            provider: provider.name.clone(),
            content,
            model: reply.model,
            prompt_tokens: reply.usage.as_ref().and_then(|u| u.prompt_tokens),
            completion_tokens: reply.usage.as_ref().and_then(|u| u.completion_tokens),
        })
    }
}

// =============================================================================
// Health probe
// =============================================================================

/// `GET {health_url}`; any 2xx is healthy.
///
/// Providers without a `health_url` are always reported healthy, so a
/// registry of unprobeable providers is never drained by the monitor.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: Client,
}

impl HttpHealthProbe {
    /// # Errors
    ///
    /// Returns error if the underlying client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self, provider: &ProviderProfile) -> bool {
        let Some(url) = provider.health_url.as_deref() else {
            return true;
        };
        match self.client.get(url).send().await {
            Ok(response) => {
                let ok = response.status().is_success();
                if !ok {
                    tracing::debug!(
                        provider = %provider.name,
                        status = %response.status(),
                        "Health endpoint returned non-success"
                    );
                }
                ok
            }
            Err(e) => {
                tracing::debug!(provider = %provider.name, error = %e, "Health probe failed");
                false
            }
        }
    }
}
