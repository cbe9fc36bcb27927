//! Application State

use std::sync::Arc;

use stripe_webhook::WebhookEndpoint;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Webhook endpoint with its handler registry
    pub endpoint: Arc<WebhookEndpoint>,
}

impl AppState {
    pub fn new(endpoint: WebhookEndpoint) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
        }
    }
}
