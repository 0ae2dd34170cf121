//! HTTP DTOs for the webhook receiver.

use serde::{Deserialize, Serialize};

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

/// Acknowledgement body returned for accepted deliveries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub received: bool,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { received: true }
    }
}
