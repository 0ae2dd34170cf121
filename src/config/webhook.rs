//! Webhook configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Webhook verification configuration (ApiPay)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookConfig {
    /// Shared signing secret agreed with ApiPay
    pub secret: String,
}

impl WebhookConfig {
    /// Validate webhook configuration
    ///
    /// An empty secret would make every signature verify against a
    /// predictable key, so it is rejected at startup rather than at
    /// request time.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.secret.is_empty() {
            return Err(ValidationError::MissingRequired("WEBHOOK__SECRET"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_missing_secret() {
        let config = WebhookConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("WEBHOOK__SECRET"))
        ));
    }

    #[test]
    fn test_validation_valid_secret() {
        let config = WebhookConfig {
            secret: "whk_abc123".to_string(),
        };
        assert!(config.validate().is_ok());
    }
}
