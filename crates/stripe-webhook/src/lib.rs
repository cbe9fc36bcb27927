//! # stripe-webhook
//!
//! Stripe webhook verification and event dispatch.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌─────────┐   ┌────────────┐   ┌──────────┐
//! │ request  │──▶│ verify HMAC  │──▶│  parse  │──▶│  dispatch  │──▶│  200 OK  │
//! └──────────┘   └──────────────┘   └─────────┘   └────────────┘   └──────────┘
//!                       │ mismatch       │ malformed
//!                       ▼                ▼
//!               401 Invalid signature   400 Invalid payload
//! ```
//!
//! The signature header is `sha256=<hex>`, the lowercase HMAC-SHA256 of the
//! raw body keyed with the endpoint secret, compared in constant time.
//! Unknown event types are acknowledged with `200 OK` and otherwise ignored.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stripe_webhook::{HandlerRegistry, IncomingEvent, WebhookConfig, WebhookEndpoint};
//!
//! let mut registry = HandlerRegistry::with_defaults();
//! registry.register_fn("invoice.paid", |object| {
//!     tracing::info!(invoice = ?object.get("id"), "Invoice paid");
//!     Ok(())
//! });
//!
//! let endpoint = WebhookEndpoint::new(WebhookConfig::from_env()?, registry);
//! let response = endpoint.handle(&IncomingEvent::new(body).with_header("stripe-signature", sig));
//! ```

mod config;
mod dispatch;
mod endpoint;
mod error;
mod event;
pub mod handlers;
mod payload;
pub mod signature;

pub use config::{WEBHOOK_SECRET_VAR, WebhookConfig};
pub use dispatch::{DispatchOutcome, EventDispatcher, HandlerRegistry};
pub use endpoint::WebhookEndpoint;
pub use error::{Result, WebhookError};
pub use event::{IncomingEvent, WebhookResponse};
pub use handlers::EventHandler;
pub use payload::{WebhookPayload, object_id};
