//! HTTP handlers for the webhook receiver.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::dto::{AckResponse, ErrorResponse};
use crate::application::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, WebhookHandlerError,
};
use crate::ports::PaymentGateway;

/// Header carrying the HMAC-SHA256 signature of the body.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// Shared state for webhook routes.
#[derive(Clone)]
pub struct WebhookAppState {
    pub gateway: Arc<dyn PaymentGateway>,
}

impl WebhookAppState {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// Create the handler on demand from the shared state.
    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(self.gateway.clone())
    }
}

/// POST /webhook
///
/// Receives ApiPay invoice status notifications. The signature is verified
/// over the raw body bytes; only then is the JSON parsed. Always responds
/// 200 to verified deliveries so the provider stops redelivering, even when
/// the event type is unknown.
pub async fn handle_apipay_webhook(
    State(state): State<WebhookAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookApiError::MissingSignature)?;

    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    handler.handle(cmd).await?;

    Ok((StatusCode::OK, Json(AckResponse::ok())))
}

/// API error type that converts handler errors to HTTP responses.
#[derive(Debug)]
pub enum WebhookApiError {
    MissingSignature,
    Handler(WebhookHandlerError),
}

impl From<WebhookHandlerError> for WebhookApiError {
    fn from(err: WebhookHandlerError) -> Self {
        Self::Handler(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code, message) = match &self {
            Self::MissingSignature => (
                StatusCode::UNAUTHORIZED,
                "MISSING_SIGNATURE",
                format!("Missing {} header", SIGNATURE_HEADER),
            ),
            Self::Handler(WebhookHandlerError::InvalidSignature) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_WEBHOOK_SIGNATURE",
                "Invalid webhook signature".to_string(),
            ),
            Self::Handler(WebhookHandlerError::InvalidPayload(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_PAYLOAD", msg.clone())
            }
            Self::Handler(WebhookHandlerError::NotConfigured) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Webhook receiver is misconfigured".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, "Webhook request failed");
        } else {
            tracing::warn!(error = ?self, "Webhook request rejected");
        }

        let body = ErrorResponse::new(error_code, message);
        (status, Json(body)).into_response()
    }
}
