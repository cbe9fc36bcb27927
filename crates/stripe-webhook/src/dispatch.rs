//! Event Dispatch
//!
//! Routes a verified body to the handler registered for its `type`.
//! Unknown types are acknowledged without doing anything, which is what
//! Stripe expects from endpoints that only care about a few events.

use serde_json::Value;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{Result, WebhookError};
use crate::handlers::{
    EventHandler, FnHandler, PaymentFailedHandler, PaymentSucceededHandler,
    SubscriptionCreatedHandler,
};
use crate::payload::{WebhookPayload, object_id};

/// Registry mapping event types to handlers
///
/// Built once at startup and shared read-only afterwards.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl HandlerRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with the payment and subscription handlers installed
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PaymentSucceededHandler);
        registry.register(PaymentFailedHandler);
        registry.register(SubscriptionCreatedHandler);
        registry
    }

    /// Register a handler, replacing any previous one for the same type
    pub fn register<H: EventHandler + 'static>(&mut self, handler: H) {
        self.register_boxed(Arc::new(handler));
    }

    /// Register a shared handler
    pub fn register_boxed(&mut self, handler: Arc<dyn EventHandler>) {
        let event_type = handler.event_type().to_string();
        if self.handlers.insert(event_type.clone(), handler).is_some() {
            tracing::debug!(event_type = %event_type, "Replaced webhook handler");
        }
    }

    /// Register a closure as the handler for `event_type`
    pub fn register_fn<F>(&mut self, event_type: impl Into<String>, f: F)
    where
        F: Fn(&Value) -> Result<()> + Send + Sync + 'static,
    {
        self.register(FnHandler::new(event_type, f));
    }

    pub fn get(&self, event_type: &str) -> Option<Arc<dyn EventHandler>> {
        self.handlers.get(event_type).cloned()
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Registered event types, sorted
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// What the dispatcher did with one delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handler ran to completion
    Handled {
        event_type: String,
        object_id: Option<String>,
    },

    /// No handler for this type (or no type at all)
    Ignored { event_type: Option<String> },

    /// Known type but `data.object` was absent
    Skipped { event_type: String, reason: String },

    /// Handler returned an error or panicked
    HandlerFailed { event_type: String, message: String },
}

impl DispatchOutcome {
    pub const fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }
}

/// Dispatches verified bodies through a [`HandlerRegistry`]
#[derive(Clone)]
pub struct EventDispatcher {
    registry: Arc<HandlerRegistry>,
}

impl EventDispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Parse `body` and invoke the matching handler
    ///
    /// Only a body that is not a JSON object is an error. Handler failures
    /// are contained here and reported through the outcome.
    pub fn dispatch(&self, body: &str) -> Result<DispatchOutcome> {
        let payload = WebhookPayload::parse(body)?;

        let Some(event_type) = payload.event_type.clone() else {
            tracing::debug!("Webhook payload has no event type");
            return Ok(DispatchOutcome::Ignored { event_type: None });
        };

        let Some(handler) = self.registry.get(&event_type) else {
            tracing::debug!(event_type = %event_type, "Unhandled webhook event");
            return Ok(DispatchOutcome::Ignored {
                event_type: Some(event_type),
            });
        };

        tracing::info!(
            event_type = %event_type,
            event_id = ?payload.id,
            created = ?payload.created_at(),
            livemode = ?payload.livemode,
            "Processing Stripe webhook"
        );

        let object = match payload.into_object() {
            Ok(object) => object,
            Err(e) => {
                tracing::warn!(event_type = %event_type, error = %e, "Skipping webhook event");
                return Ok(DispatchOutcome::Skipped {
                    event_type,
                    reason: e.to_string(),
                });
            }
        };

        Ok(invoke(handler.as_ref(), event_type, &object))
    }
}

fn invoke(handler: &dyn EventHandler, event_type: String, object: &Value) -> DispatchOutcome {
    let result = match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(object))) {
        Ok(result) => result,
        Err(_) => Err(WebhookError::Handler {
            event_type: event_type.clone(),
            message: "handler panicked".into(),
        }),
    };

    match result {
        Ok(()) => DispatchOutcome::Handled {
            object_id: object_id(object).ok().map(str::to_owned),
            event_type,
        },
        Err(e) => {
            tracing::error!(event_type = %event_type, error = %e, "Webhook handler failed");
            DispatchOutcome::HandlerFailed {
                event_type,
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{PAYMENT_INTENT_FAILED, PAYMENT_INTENT_SUCCEEDED};
    use serde_json::json;
    use std::sync::Mutex;

    fn recording_dispatcher(event_type: &str) -> (EventDispatcher, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut registry = HandlerRegistry::with_defaults();
        registry.register_fn(event_type, move |object: &Value| {
            sink.lock().unwrap().push(object.clone());
            Ok(())
        });

        (EventDispatcher::new(Arc::new(registry)), seen)
    }

    #[test]
    fn test_default_registry() {
        let registry = HandlerRegistry::with_defaults();
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.event_types(),
            vec![
                "customer.subscription.created",
                "payment_intent.failed",
                "payment_intent.succeeded",
            ]
        );
        assert!(HandlerRegistry::new().is_empty());
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = HandlerRegistry::with_defaults();
        registry.register_fn(PAYMENT_INTENT_SUCCEEDED, |_: &Value| Ok(()));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_dispatch_known_type() {
        let (dispatcher, seen) = recording_dispatcher(PAYMENT_INTENT_SUCCEEDED);
        let body = json!({
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": "pi_123" } }
        })
        .to_string();

        let outcome = dispatcher.dispatch(&body).unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Handled {
                event_type: "payment_intent.succeeded".into(),
                object_id: Some("pi_123".into()),
            }
        );
        assert_eq!(*seen.lock().unwrap(), vec![json!({ "id": "pi_123" })]);
    }

    #[test]
    fn test_dispatch_unknown_type_is_ignored() {
        let (dispatcher, seen) = recording_dispatcher(PAYMENT_INTENT_SUCCEEDED);
        let body = json!({
            "type": "charge.refunded",
            "data": { "object": { "id": "ch_1" } }
        })
        .to_string();

        let outcome = dispatcher.dispatch(&body).unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Ignored {
                event_type: Some("charge.refunded".into())
            }
        );
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_without_type_is_ignored() {
        let (dispatcher, _) = recording_dispatcher(PAYMENT_INTENT_SUCCEEDED);
        let outcome = dispatcher.dispatch("{}").unwrap();
        assert_eq!(outcome, DispatchOutcome::Ignored { event_type: None });
    }

    #[test]
    fn test_dispatch_missing_object_is_skipped() {
        let (dispatcher, seen) = recording_dispatcher(PAYMENT_INTENT_FAILED);
        let outcome = dispatcher
            .dispatch(r#"{"type":"payment_intent.failed","data":{}}"#)
            .unwrap();
        assert!(matches!(outcome, DispatchOutcome::Skipped { .. }));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_malformed_json() {
        let (dispatcher, _) = recording_dispatcher(PAYMENT_INTENT_SUCCEEDED);
        assert!(matches!(
            dispatcher.dispatch("{\"type\":"),
            Err(WebhookError::Parse(_))
        ));
    }

    #[test]
    fn test_handler_error_is_contained() {
        let mut registry = HandlerRegistry::new();
        registry.register_fn("invoice.paid", |_: &Value| {
            Err(WebhookError::MissingField("customer".into()))
        });
        let dispatcher = EventDispatcher::new(Arc::new(registry));

        let outcome = dispatcher
            .dispatch(r#"{"type":"invoice.paid","data":{"object":{"id":"in_1"}}}"#)
            .unwrap();
        assert!(matches!(outcome, DispatchOutcome::HandlerFailed { .. }));
    }

    #[test]
    fn test_handler_panic_is_contained() {
        let mut registry = HandlerRegistry::new();
        registry.register_fn("invoice.paid", |_: &Value| panic!("boom"));
        let dispatcher = EventDispatcher::new(Arc::new(registry));

        let outcome = dispatcher
            .dispatch(r#"{"type":"invoice.paid","data":{"object":{"id":"in_1"}}}"#)
            .unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::HandlerFailed {
                event_type: "invoice.paid".into(),
                message: "Handler for invoice.paid failed: handler panicked".into(),
            }
        );
    }

    #[test]
    fn test_builtin_missing_id_fails_softly() {
        let dispatcher = EventDispatcher::new(Arc::new(HandlerRegistry::with_defaults()));
        let outcome = dispatcher
            .dispatch(r#"{"type":"payment_intent.succeeded","data":{"object":{}}}"#)
            .unwrap();
        assert!(matches!(outcome, DispatchOutcome::HandlerFailed { .. }));
    }
}
