//! Endpoint Configuration

use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, WebhookError};

/// Environment variable holding the signing secret
pub const WEBHOOK_SECRET_VAR: &str = "STRIPE_WEBHOOK_SECRET";

/// Webhook endpoint configuration
///
/// The secret is wrapped in [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Debug)]
pub struct WebhookConfig {
    webhook_secret: SecretString,
}

impl WebhookConfig {
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: SecretString::from(webhook_secret.into()),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(WEBHOOK_SECRET_VAR)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| WebhookError::Config(format!("{WEBHOOK_SECRET_VAR} not set")))?;

        Ok(Self::new(secret))
    }

    /// Get the webhook secret
    pub fn webhook_secret(&self) -> &str {
        self.webhook_secret.expose_secret()
    }
}
