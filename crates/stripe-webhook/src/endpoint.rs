//! Webhook Endpoint
//!
//! Verify, parse, dispatch, respond. One call per delivery, no state kept
//! between calls.

use std::sync::Arc;

use crate::config::WebhookConfig;
use crate::dispatch::{DispatchOutcome, EventDispatcher, HandlerRegistry};
use crate::error::{Result, WebhookError};
use crate::event::{IncomingEvent, WebhookResponse};
use crate::signature;

/// Stripe webhook endpoint
pub struct WebhookEndpoint {
    config: WebhookConfig,
    dispatcher: EventDispatcher,
}

impl WebhookEndpoint {
    pub fn new(config: WebhookConfig, registry: HandlerRegistry) -> Self {
        Self {
            config,
            dispatcher: EventDispatcher::new(Arc::new(registry)),
        }
    }

    /// Create from environment variables with the default handlers
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(WebhookConfig::from_env()?, HandlerRegistry::with_defaults()))
    }

    pub fn registry(&self) -> &HandlerRegistry {
        self.dispatcher.registry()
    }

    /// Handle one delivery
    pub fn handle(&self, event: &IncomingEvent) -> WebhookResponse {
        self.handle_raw(&event.body, event.signature())
    }

    /// Handle a delivery whose signature header was already extracted
    pub fn handle_raw(&self, body: &str, signature: &str) -> WebhookResponse {
        self.handle_bytes(body.as_bytes(), signature)
    }

    /// Handle a delivery given the raw body bytes
    pub fn handle_bytes(&self, body: &[u8], signature: &str) -> WebhookResponse {
        match self.process_bytes(body, signature) {
            Ok(_) => WebhookResponse::ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Rejected Stripe webhook");
                WebhookResponse::from_error(&e)
            }
        }
    }

    /// Verify and dispatch, returning what happened
    pub fn process(&self, body: &str, signature: &str) -> Result<DispatchOutcome> {
        self.process_bytes(body.as_bytes(), signature)
    }

    /// Verify the raw bytes, then decode and dispatch
    ///
    /// The signature is checked before the body is decoded, so an unsigned
    /// request is rejected as unauthorized whatever its content.
    pub fn process_bytes(&self, body: &[u8], signature: &str) -> Result<DispatchOutcome> {
        if !signature::verify(body, signature, self.config.webhook_secret()) {
            return Err(WebhookError::SignatureMismatch);
        }

        let body = std::str::from_utf8(body)
            .map_err(|e| WebhookError::Parse(format!("body is not UTF-8: {e}")))?;
        self.dispatcher.dispatch(body)
    }
}
