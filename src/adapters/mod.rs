//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `apipay` - ApiPay.kz REST client and webhook verifier
//! - `http` - Axum webhook receiver

pub mod apipay;
pub mod http;
