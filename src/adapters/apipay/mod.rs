//! ApiPay.kz payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the ApiPay.kz REST API,
//! including:
//! - Invoice creation
//! - Recurring subscriptions
//! - Catalog management (image upload, batch create, listing)
//! - Organization verification with polling
//! - Webhook signature verification
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - All secrets are handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! Required environment variables:
//! - `APIPAY_API_KEY`: ApiPay API key
//! - `APIPAY_WEBHOOK_SECRET`: Webhook signing secret (receiver only)

mod client;
mod mock_gateway;
pub mod signature;
mod wire_types;

pub use client::{ApiPayClient, ApiPayConfig};
pub use mock_gateway::MockPaymentGateway;
pub use signature::{expected_header, verify_signature};
