//! HTTP Handlers

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use serde::Serialize;

use stripe_webhook::{WebhookResponse, signature::SIGNATURE_HEADER};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub handlers: Vec<String>,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let handlers = state
        .endpoint
        .registry()
        .event_types()
        .into_iter()
        .map(str::to_owned)
        .collect();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        handlers,
    })
}

/// Stripe webhook handler
///
/// The body is taken as raw bytes so the signature is checked against
/// exactly what Stripe sent, before any decoding.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("stripe_webhook", %request_id);

    span.in_scope(|| state.endpoint.handle_bytes(&body, signature))
}
