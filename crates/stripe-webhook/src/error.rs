//! Webhook Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, WebhookError>;

/// Webhook-related errors
#[derive(Error, Debug)]
pub enum WebhookError {
    /// Signature header missing or not matching the body
    #[error("Webhook signature invalid")]
    SignatureMismatch,

    /// Body is not a JSON object
    #[error("Webhook parse error: {0}")]
    Parse(String),

    /// A field the handler needs is absent
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Handler reported a failure
    #[error("Handler for {event_type} failed: {message}")]
    Handler { event_type: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl WebhookError {
    /// HTTP status this error maps to at the endpoint
    ///
    /// Missing fields and handler failures are still acknowledged with 200.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::SignatureMismatch => 401,
            Self::Parse(_) => 400,
            Self::MissingField(_) | Self::Handler { .. } => 200,
            Self::Config(_) => 500,
        }
    }

    /// Response body sent to the caller
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::SignatureMismatch => "Invalid signature",
            Self::Parse(_) => "Invalid payload",
            Self::MissingField(_) | Self::Handler { .. } => "OK",
            Self::Config(_) => "Service configuration error",
        }
    }
}
