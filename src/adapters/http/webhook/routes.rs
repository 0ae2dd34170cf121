//! Axum router configuration for the webhook receiver.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

use super::handlers::{handle_apipay_webhook, WebhookAppState};

/// Create the webhook receiver router.
///
/// # Routes
/// - `POST /webhook` - Handle ApiPay invoice notifications (no auth,
///   signature verified)
/// - `GET /health` - Liveness probe
pub fn webhook_router(state: WebhookAppState) -> Router {
    Router::new()
        .route("/webhook", post(handle_apipay_webhook))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}
