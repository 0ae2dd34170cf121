//! HTTP adapters - webhook receiver endpoints.

pub mod webhook;

// Re-export key types for convenience
pub use webhook::webhook_router;
pub use webhook::WebhookAppState;
