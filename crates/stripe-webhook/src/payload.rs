//! Webhook Payload
//!
//! The subset of the Stripe event envelope the dispatcher reads.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{Result, WebhookError};

/// Parsed webhook body
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WebhookPayload {
    /// Stripe event ID (`evt_...`)
    pub id: Option<String>,

    /// Event type, e.g. `payment_intent.succeeded`
    pub event_type: Option<String>,

    /// Creation time in unix seconds
    pub created: Option<i64>,

    /// Whether the event came from live mode
    pub livemode: Option<bool>,

    /// `data.object`, the resource the event is about
    pub object: Option<Value>,
}

impl WebhookPayload {
    /// Parse a verified request body
    ///
    /// Fails only when the body is not a JSON object. Envelope fields with an
    /// unexpected JSON type are treated as absent.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        let Value::Object(mut fields) = value else {
            return Err(WebhookError::Parse("payload is not a JSON object".into()));
        };

        let object = fields
            .get_mut("data")
            .and_then(|data| data.get_mut("object"))
            .map(Value::take)
            .filter(|object| !object.is_null());

        Ok(Self {
            id: string_field(&fields, "id"),
            event_type: string_field(&fields, "type"),
            created: fields.get("created").and_then(Value::as_i64),
            livemode: fields.get("livemode").and_then(Value::as_bool),
            object,
        })
    }

    /// Creation time as a UTC timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Take `data.object`, failing if it was absent
    pub fn into_object(self) -> Result<Value> {
        self.object
            .ok_or_else(|| WebhookError::MissingField("data.object".into()))
    }
}

fn string_field(fields: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Read the `id` of a Stripe object
pub fn object_id(object: &Value) -> Result<&str> {
    object
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| WebhookError::MissingField("data.object.id".into()))
}
