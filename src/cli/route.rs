//! Route command implementation.

use serde::Serialize;

use crate::cli::GlobalOptions;
use crate::cli::args::RouteArgs;
use crate::core::client::ProviderResponse;
use crate::core::http::{DEFAULT_TIMEOUT, HttpProviderClient};
use crate::core::models::{ChatMessage, ChatRequest, RoutingDecision};
use crate::core::router::CandidateView;
use crate::error::Result;
use crate::render::human;
use crate::storage::config::ENV_API_KEY;

/// Output of `llmroute route`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteReport {
    pub decision: RoutingDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<CandidateView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ProviderResponse>,
}

/// Build the request from command-line messages.
#[must_use]
pub fn build_request(args: &RouteArgs) -> ChatRequest {
    let mut messages: Vec<ChatMessage> = args
        .system
        .iter()
        .map(|s| ChatMessage::system(s.as_str()))
        .collect();
    messages.extend(args.message.iter().map(|m| ChatMessage::user(m.as_str())));
    ChatRequest {
        messages,
        ..ChatRequest::default()
    }
}

/// Execute the route command.
///
/// # Errors
/// Returns an error if routing fails, or if `--send` is given and the
/// provider call fails.
pub async fn execute(args: &RouteArgs, opts: GlobalOptions<'_>) -> Result<()> {
    let resolved = opts.resolve(None, args.daily_limit)?;
    let mut request = build_request(args);
    request.strategy = crate::cli::parse_strategy(args.strategy.as_deref())?;

    tracing::debug!(
        messages = request.messages.len(),
        strategy = ?request.strategy,
        explain = args.explain,
        send = args.send,
        "Routing request from CLI"
    );

    let router = resolved.build_router()?;
    let candidates = if args.explain {
        Some(router.explain(&request)?)
    } else {
        None
    };

    let (decision, response) = if args.send {
        let mut client = HttpProviderClient::new(DEFAULT_TIMEOUT)?;
        if let Some(key) = std::env::var(ENV_API_KEY).ok().filter(|k| !k.trim().is_empty()) {
            client = client.with_api_key(key);
        }
        let dispatched = router.dispatch(&request, &client).await?;
        (dispatched.decision, Some(dispatched.response))
    } else {
        (router.route(&request)?, None)
    };

    let report = RouteReport {
        decision,
        candidates,
        response,
    };
    opts.emit("route", &report, |r| {
        let mut out = human::render_decision(&r.decision, r.candidates.as_deref());
        if let Some(response) = &r.response {
            out.push('\n');
            out.push_str(&human::render_response(response));
        }
        out
    })
}
