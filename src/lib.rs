//! ApiPay.kz - Payment API client and webhook receiver
//!
//! This crate provides a typed client for the ApiPay.kz payment REST API
//! (invoices, subscriptions, catalog, organization verification) and an
//! HMAC-SHA256 webhook signature verifier with its axum receiver.

pub mod adapters;
pub mod application;
pub mod config;
pub mod ports;
