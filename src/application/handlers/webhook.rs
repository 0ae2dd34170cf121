//! HandlePaymentWebhookHandler - Command handler for processing ApiPay webhooks.

use std::sync::Arc;

use crate::ports::{
    GatewayError, GatewayErrorCode, InvoiceStatus, PaymentGateway, WebhookEventData,
    WebhookEventType, WebhookInvoice,
};

/// Command to handle a payment webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook payload, exactly as received on the wire.
    pub payload: Vec<u8>,
    /// Value of the `X-Webhook-Signature` header.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// Invoice was paid.
    InvoicePaid { invoice_id: i64 },
    /// Invoice was cancelled.
    InvoiceCancelled { invoice_id: i64 },
    /// Invoice expired unpaid.
    InvoiceExpired { invoice_id: i64 },
    /// Event verified but no action taken (unknown status or event type).
    Acknowledged,
}

/// Errors surfaced to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookHandlerError {
    /// Signature did not match the payload.
    InvalidSignature,
    /// Signature matched but the body was not a well-formed event.
    InvalidPayload(String),
    /// Receiver is missing its webhook secret.
    NotConfigured,
}

impl std::fmt::Display for WebhookHandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "Invalid webhook signature"),
            Self::InvalidPayload(msg) => write!(f, "Invalid webhook payload: {}", msg),
            Self::NotConfigured => write!(f, "Webhook secret is not configured"),
        }
    }
}

impl std::error::Error for WebhookHandlerError {}

/// Handler for processing ApiPay webhook deliveries.
///
/// Verifies the signature through the gateway, then dispatches on the
/// invoice status. Delivery is at-least-once; processing the same event
/// twice must land in the same state, so handlers only log and acknowledge
/// here. Anything stateful belongs behind the gateway port.
pub struct HandlePaymentWebhookHandler {
    gateway: Arc<dyn PaymentGateway>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookHandlerError> {
        // 1. Verify the signature and parse the event
        let event = self
            .gateway
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(map_gateway_error)?;

        // 2. Dispatch on event type
        match event.event_type {
            WebhookEventType::InvoiceStatusChanged => match &event.data {
                WebhookEventData::Invoice(invoice) => Ok(self.handle_status_change(invoice)),
                WebhookEventData::Raw { .. } => {
                    // Verified but missing the invoice body; acknowledge so the
                    // provider does not redeliver forever.
                    tracing::warn!("invoice.status_changed event without invoice body");
                    Ok(HandlePaymentWebhookResult::Acknowledged)
                }
            },
            WebhookEventType::Unknown(ref name) => {
                tracing::info!(event = %name, "Ignoring unknown webhook event type");
                Ok(HandlePaymentWebhookResult::Acknowledged)
            }
        }
    }

    fn handle_status_change(&self, invoice: &WebhookInvoice) -> HandlePaymentWebhookResult {
        match invoice.status {
            InvoiceStatus::Paid => {
                tracing::info!(
                    invoice_id = invoice.id,
                    amount = invoice.amount,
                    client_name = invoice.client_name.as_deref(),
                    paid_at = invoice.paid_at.as_deref(),
                    external_order_id = invoice.external_order_id.as_deref(),
                    "Invoice paid"
                );
                HandlePaymentWebhookResult::InvoicePaid {
                    invoice_id: invoice.id,
                }
            }
            InvoiceStatus::Cancelled => {
                tracing::info!(
                    invoice_id = invoice.id,
                    cancelled_at = invoice.cancelled_at.as_deref(),
                    "Invoice cancelled"
                );
                HandlePaymentWebhookResult::InvoiceCancelled {
                    invoice_id: invoice.id,
                }
            }
            InvoiceStatus::Expired => {
                tracing::info!(
                    invoice_id = invoice.id,
                    expired_at = invoice.expired_at.as_deref(),
                    "Invoice expired"
                );
                HandlePaymentWebhookResult::InvoiceExpired {
                    invoice_id: invoice.id,
                }
            }
            _ => {
                tracing::warn!(
                    invoice_id = invoice.id,
                    status = ?invoice.status,
                    "Unhandled invoice status in webhook"
                );
                HandlePaymentWebhookResult::Acknowledged
            }
        }
    }
}

fn map_gateway_error(err: GatewayError) -> WebhookHandlerError {
    match err.code {
        GatewayErrorCode::AuthenticationError => WebhookHandlerError::NotConfigured,
        GatewayErrorCode::InvalidWebhook => {
            if err.message.starts_with("Invalid JSON") {
                WebhookHandlerError::InvalidPayload(err.message)
            } else {
                WebhookHandlerError::InvalidSignature
            }
        }
        _ => WebhookHandlerError::InvalidSignature,
    }
}
