//! Webhook receiver HTTP adapter.
//!
//! Exposes `POST /webhook` for ApiPay invoice status notifications. The
//! body is read raw so the signature can be verified over the exact bytes
//! received, before any JSON parsing.

mod dto;
mod handlers;
mod routes;

pub use dto::ErrorResponse;
pub use handlers::WebhookAppState;
pub use routes::webhook_router;
