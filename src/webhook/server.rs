//! HTTP surface for inbound webhooks.
//!
//! The router is a thin edge: it completes the subscription handshake,
//! decodes payloads into typed events, and hands them to the automation
//! engine one batch at a time. Event batches are serialized behind the
//! engine mutex so concurrent deliveries never interleave against the
//! ledger.

use crate::scheduling::{
    domain::SectionGid,
    ports::{ExtensionLedger, TaskStore},
    services::AutomationEngine,
};
use crate::webhook::events::{WebhookEnvelope, section_events};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use mockable::Clock;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Header used by the subscription handshake.
const HOOK_SECRET_HEADER: &str = "x-hook-secret";

/// Shared state for the webhook routes.
pub struct WebhookState<S, L, C>
where
    S: TaskStore,
    L: ExtensionLedger,
    C: Clock + Send + Sync,
{
    engine: Arc<Mutex<AutomationEngine<S, L, C>>>,
    tracked_section: SectionGid,
}

impl<S, L, C> WebhookState<S, L, C>
where
    S: TaskStore,
    L: ExtensionLedger,
    C: Clock + Send + Sync,
{
    /// Creates webhook state around a shared engine.
    #[must_use]
    pub const fn new(
        engine: Arc<Mutex<AutomationEngine<S, L, C>>>,
        tracked_section: SectionGid,
    ) -> Self {
        Self {
            engine,
            tracked_section,
        }
    }
}

impl<S, L, C> Clone for WebhookState<S, L, C>
where
    S: TaskStore,
    L: ExtensionLedger,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            tracked_section: self.tracked_section.clone(),
        }
    }
}

/// Builds the webhook router.
pub fn build_router<S, L, C>(state: WebhookState<S, L, C>) -> Router
where
    S: TaskStore + 'static,
    L: ExtensionLedger + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/webhook", post(webhook_handler::<S, L, C>))
        // Liveness probe.
        .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }))
        .with_state(state)
}

/// Handles webhook deliveries and the subscription handshake.
///
/// Once a payload decodes, the caller always receives a success
/// acknowledgment; per-task failures are observable via logs only.
async fn webhook_handler<S, L, C>(
    State(state): State<WebhookState<S, L, C>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: TaskStore + 'static,
    L: ExtensionLedger + 'static,
    C: Clock + Send + Sync + 'static,
{
    if let Some(secret) = headers.get(HOOK_SECRET_HEADER) {
        info!("completing webhook subscription handshake");
        return handshake_response(secret.clone());
    }

    let envelope: WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!("rejecting undecodable webhook payload: {err}");
            return bad_request(format!("undecodable payload: {err}"));
        }
    };

    let events = match section_events(&envelope, &state.tracked_section) {
        Ok(events) => events,
        Err(err) => {
            warn!("rejecting malformed webhook event: {err}");
            return bad_request(err.to_string());
        }
    };
    debug!(
        "webhook delivery carried {} events, {} relevant",
        envelope.events.len(),
        events.len()
    );

    let mut handled = 0_usize;
    let mut item_failures = 0_usize;
    let mut aborted = 0_usize;
    let mut engine = state.engine.lock().await;
    for event in &events {
        match engine.handle_event(event).await {
            Ok(report) => {
                handled += 1;
                item_failures += report.failures.len();
            }
            Err(err) => {
                warn!("event for task {} not applied: {err}", event.task());
                aborted += 1;
            }
        }
    }
    drop(engine);

    Json(json!({
        "status": "ok",
        "handled": handled,
        "item_failures": item_failures,
        "not_applied": aborted,
    }))
    .into_response()
}

fn handshake_response(secret: HeaderValue) -> Response {
    let mut response = StatusCode::OK.into_response();
    response.headers_mut().insert(HOOK_SECRET_HEADER, secret);
    response
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
