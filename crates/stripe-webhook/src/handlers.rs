//! Event Handlers
//!
//! A handler receives the `data.object` of one event type. The built-in
//! handlers only record what arrived; implement [`EventHandler`] (or pass a
//! closure to [`HandlerRegistry::register_fn`](crate::HandlerRegistry::register_fn))
//! to react to more events.

use serde_json::Value;

use crate::error::Result;
use crate::payload::object_id;

pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const PAYMENT_INTENT_FAILED: &str = "payment_intent.failed";
pub const SUBSCRIPTION_CREATED: &str = "customer.subscription.created";

/// Handler trait - implement to react to an event type
pub trait EventHandler: Send + Sync {
    /// Event type this handler is registered under
    fn event_type(&self) -> &str;

    /// Handle the event's `data.object`
    fn handle(&self, object: &Value) -> Result<()>;
}

/// Adapter turning a closure into a handler
pub struct FnHandler<F> {
    event_type: String,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&Value) -> Result<()> + Send + Sync,
{
    pub fn new(event_type: impl Into<String>, f: F) -> Self {
        Self {
            event_type: event_type.into(),
            f,
        }
    }
}

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&Value) -> Result<()> + Send + Sync,
{
    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn handle(&self, object: &Value) -> Result<()> {
        (self.f)(object)
    }
}

// ============================================================================
// Built-in Handlers
// ============================================================================

/// `payment_intent.succeeded`
pub struct PaymentSucceededHandler;

impl EventHandler for PaymentSucceededHandler {
    fn event_type(&self) -> &str {
        PAYMENT_INTENT_SUCCEEDED
    }

    fn handle(&self, object: &Value) -> Result<()> {
        let id = object_id(object)?;
        tracing::info!(payment_intent = %id, "Payment succeeded");
        Ok(())
    }
}

/// `payment_intent.failed`
pub struct PaymentFailedHandler;

impl EventHandler for PaymentFailedHandler {
    fn event_type(&self) -> &str {
        PAYMENT_INTENT_FAILED
    }

    fn handle(&self, object: &Value) -> Result<()> {
        let id = object_id(object)?;
        tracing::warn!(payment_intent = %id, "Payment failed");
        Ok(())
    }
}

/// `customer.subscription.created`
pub struct SubscriptionCreatedHandler;

impl EventHandler for SubscriptionCreatedHandler {
    fn event_type(&self) -> &str {
        SUBSCRIPTION_CREATED
    }

    fn handle(&self, object: &Value) -> Result<()> {
        let id = object_id(object)?;
        tracing::info!(subscription = %id, "Subscription created");
        Ok(())
    }
}
