//! stripe-webhook HTTP Server
//!
//! Axum-based server exposing the Stripe webhook endpoint.

mod config;
mod handlers;
mod routes;
mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stripe_webhook::{HandlerRegistry, WebhookConfig, WebhookEndpoint};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server_config = ServerConfig::from_env()?;
    let webhook_config = WebhookConfig::from_env().inspect_err(|_| {
        tracing::error!("Set STRIPE_WEBHOOK_SECRET in the environment or .env");
    })?;

    let registry = HandlerRegistry::with_defaults();
    tracing::info!("Registered {} webhook handlers:", registry.len());
    for event_type in registry.event_types() {
        tracing::info!("  • {}", event_type);
    }

    let state = AppState::new(WebhookEndpoint::new(webhook_config, registry));
    let app = routes::app(state, server_config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr).await?;

    tracing::info!("stripe-webhook server running on http://{}", server_config.bind_addr);
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  POST /webhook/stripe  - Stripe webhook");

    axum::serve(listener, app).await?;

    Ok(())
}
