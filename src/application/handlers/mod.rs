//! Application handlers.

pub mod webhook;

pub use webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    WebhookHandlerError,
};
