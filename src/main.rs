//! apipay-webhook - ApiPay.kz webhook receiver.
//!
//! Binds an HTTP server that accepts `POST /webhook` deliveries from
//! ApiPay, verifies their HMAC-SHA256 signatures, and logs invoice status
//! changes. Configuration comes from `APIPAY__*` environment variables
//! (see `config::AppConfig`).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use apipay::adapters::apipay::{ApiPayClient, ApiPayConfig};
use apipay::adapters::http::{webhook_router, WebhookAppState};
use apipay::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Fail fast on bad configuration, before binding anything.
    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    // The receiver only verifies signatures, so the API key is not
    // required here; an empty key keeps the gateway constructible.
    let gateway_config =
        ApiPayConfig::new("").with_webhook_secret(config.webhook.secret.clone());
    let gateway = Arc::new(ApiPayClient::new(gateway_config));

    let state = WebhookAppState::new(gateway);
    let app = webhook_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config
        .server
        .socket_addr()
        .context("Invalid server address")?;
    info!(%addr, "Starting webhook receiver");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
