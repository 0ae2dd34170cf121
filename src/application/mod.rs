//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates operations between the HTTP surface and the
//! payment gateway port.

pub mod handlers;

pub use handlers::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    WebhookHandlerError,
};
