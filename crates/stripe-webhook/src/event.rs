//! Request and Response Types
//!
//! Host-agnostic shapes for one webhook delivery, so the endpoint can sit
//! behind axum, a serverless runtime, or a test harness alike.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::WebhookError;
use crate::signature::SIGNATURE_HEADER;

/// An inbound webhook request
///
/// Header names are stored lowercased, so lookups ignore case and a name
/// given in several casings resolves to one value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IncomingEvent {
    /// Raw request body, exactly as sent
    #[serde(default)]
    pub body: String,

    /// Request headers, keyed by lowercase name
    #[serde(default, deserialize_with = "lowercase_keys")]
    headers: HashMap<String, String>,
}

impl IncomingEvent {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    /// Add a header, replacing any value stored under the same name
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Look up a header, ignoring ASCII case in the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The `stripe-signature` header, or an empty string when absent
    pub fn signature(&self) -> &str {
        self.header(SIGNATURE_HEADER).unwrap_or_default()
    }
}

/// Lowercase header names on the way in
///
/// Names are visited in sorted order, so when casings collide the
/// all-lowercase spelling (which sorts last) wins.
fn lowercase_keys<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value))
        .collect())
}

/// Fixed response returned to Stripe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub status_code: u16,
    pub body: String,
}

impl WebhookResponse {
    pub fn ok() -> Self {
        Self {
            status_code: 200,
            body: "OK".into(),
        }
    }

    pub fn from_error(err: &WebhookError) -> Self {
        Self {
            status_code: err.status_code(),
            body: err.user_message().into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }
}

#[cfg(feature = "axum-handlers")]
impl axum::response::IntoResponse for WebhookResponse {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status_code)
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.body).into_response()
    }
}
