//! ApiPay payment gateway adapter.
//!
//! Implements the `PaymentGateway` trait against the ApiPay.kz REST API.
//! Handles invoices, subscriptions, catalog management, organization
//! verification polling, and webhook verification.
//!
//! # Security
//!
//! - API key and webhook secret are handled via `secrecy::SecretString`
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//!
//! # Configuration
//!
//! ```ignore
//! let config = ApiPayConfig::new(api_key).with_webhook_secret(secret);
//! let client = ApiPayClient::new(config);
//! ```

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use crate::ports::{
    CreateInvoiceRequest, CreateSubscriptionRequest, GatewayError, GatewayErrorCode, Invoice,
    NewCatalogItem, Organization, OrganizationStatus, PaymentGateway, Subscription, UploadedImage,
    WebhookEvent,
};

use super::signature;
use super::wire_types::{
    ApiCatalogPage, ApiErrorBody, ApiInvoice, ApiOrganizationEnvelope, ApiSubscription,
    ApiUploadedImage, ApiWebhookEvent,
};

/// Production API base URL.
const DEFAULT_BASE_URL: &str = "https://bpapi.bazarbay.site/api";

/// Interval between verification status polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Total budget for a verification wait (matches the 2-minute confirmation
/// window in the Kaspi Business app).
const DEFAULT_VERIFICATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Maximum catalog items per batch create.
const MAX_CATALOG_BATCH: usize = 50;

/// ApiPay API configuration.
#[derive(Clone)]
pub struct ApiPayConfig {
    /// Merchant API key, sent as `X-API-Key`.
    api_key: SecretString,

    /// Webhook signing secret; only needed when verifying webhooks.
    webhook_secret: Option<SecretString>,

    /// Base URL for the ApiPay API (default: https://bpapi.bazarbay.site/api).
    base_url: String,

    /// Interval between verification status polls.
    poll_interval: Duration,

    /// Total budget for `wait_for_verification`.
    verification_timeout: Duration,
}

impl ApiPayConfig {
    /// Create a new ApiPay configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            verification_timeout: DEFAULT_VERIFICATION_TIMEOUT,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `APIPAY_API_KEY` (required)
    /// - `APIPAY_WEBHOOK_SECRET` (optional, needed for webhook verification)
    /// - `APIPAY_BASE_URL` (optional)
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let api_key = std::env::var("APIPAY_API_KEY")?;

        let mut config = Self::new(api_key);
        if let Ok(secret) = std::env::var("APIPAY_WEBHOOK_SECRET") {
            config = config.with_webhook_secret(secret);
        }
        if let Ok(base_url) = std::env::var("APIPAY_BASE_URL") {
            config = config.with_base_url(base_url);
        }

        Ok(config)
    }

    /// Set the webhook signing secret.
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(SecretString::new(secret.into()));
        self
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the verification poll interval (for testing).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the total verification wait budget (for testing).
    pub fn with_verification_timeout(mut self, timeout: Duration) -> Self {
        self.verification_timeout = timeout;
        self
    }
}

/// ApiPay payment gateway adapter.
///
/// Implements `PaymentGateway` against the ApiPay REST API.
pub struct ApiPayClient {
    config: ApiPayConfig,
    http_client: reqwest::Client,
}

impl ApiPayClient {
    /// Create a new ApiPay client with the given configuration.
    pub fn new(config: ApiPayConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    /// Attach the merchant API key to a request.
    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header("X-API-Key", self.config.api_key.expose_secret())
    }

    /// Map a non-success response to a typed gateway error.
    async fn error_from_response(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> GatewayError {
        let status = response.status();
        let body: Option<ApiErrorBody> = response.json().await.ok();
        let provider_message = body.and_then(|b| b.message);

        tracing::error!(
            operation,
            status = %status,
            provider_message = provider_message.as_deref().unwrap_or(""),
            "ApiPay request failed"
        );

        let code = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                GatewayErrorCode::AuthenticationError
            }
            StatusCode::NOT_FOUND => GatewayErrorCode::NotFound,
            StatusCode::TOO_MANY_REQUESTS => GatewayErrorCode::RateLimitExceeded,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                GatewayErrorCode::ValidationFailed
            }
            _ => GatewayErrorCode::ProviderError,
        };

        let message = provider_message
            .clone()
            .unwrap_or_else(|| format!("{} failed with status {}", operation, status));

        let mut err = GatewayError::new(code, message);
        if let Some(provider_message) = provider_message {
            err = err.with_provider_message(provider_message);
        }
        err
    }

    /// Decode a JSON response body, mapping parse failures to provider errors.
    async fn decode<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        response.json().await.map_err(|e| {
            GatewayError::provider(format!("Failed to parse {} response: {}", operation, e))
        })
    }
}

#[async_trait]
impl PaymentGateway for ApiPayClient {
    async fn start_verification(&self, idn: &str) -> Result<Organization, GatewayError> {
        let response = self
            .authed(self.http_client.post(self.url("organizations/verify")))
            .json(&serde_json::json!({ "idn": idn }))
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.error_from_response("start_verification", response).await);
        }

        let envelope: ApiOrganizationEnvelope =
            self.decode("start_verification", response).await?;
        Ok(envelope.organization.into_organization())
    }

    async fn check_verification(
        &self,
        organization_id: i64,
    ) -> Result<Organization, GatewayError> {
        let path = format!("organizations/{}/status", organization_id);
        let response = self
            .authed(self.http_client.get(self.url(&path)))
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.error_from_response("check_verification", response).await);
        }

        let envelope: ApiOrganizationEnvelope =
            self.decode("check_verification", response).await?;
        Ok(envelope.organization.into_organization())
    }

    async fn wait_for_verification(
        &self,
        organization_id: i64,
    ) -> Result<Organization, GatewayError> {
        let deadline = tokio::time::Instant::now() + self.config.verification_timeout;

        loop {
            let organization = self.check_verification(organization_id).await?;

            tracing::info!(
                organization_id,
                status = ?organization.status,
                time_remaining = organization.time_remaining.unwrap_or_default(),
                "Verification status"
            );

            match organization.status {
                OrganizationStatus::Verified => return Ok(organization),
                OrganizationStatus::Failed => {
                    return Err(GatewayError::verification_failed(format!(
                        "Verification of organization {} failed",
                        organization_id
                    )));
                }
                _ => {}
            }

            if tokio::time::Instant::now() + self.config.poll_interval > deadline {
                return Err(GatewayError::verification_timeout(format!(
                    "Organization {} not verified within {:?}",
                    organization_id, self.config.verification_timeout
                )));
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
    ) -> Result<Invoice, GatewayError> {
        let response = self
            .authed(self.http_client.post(self.url("invoices")))
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.error_from_response("create_invoice", response).await);
        }

        let invoice: ApiInvoice = self.decode("create_invoice", response).await?;
        Ok(invoice.into_invoice())
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, GatewayError> {
        let response = self
            .authed(self.http_client.post(self.url("v1/subscriptions")))
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.error_from_response("create_subscription", response).await);
        }

        let subscription: ApiSubscription = self.decode("create_subscription", response).await?;
        Ok(subscription.into_subscription())
    }

    async fn upload_catalog_image(&self, path: &Path) -> Result<UploadedImage, GatewayError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            GatewayError::new(
                GatewayErrorCode::ValidationFailed,
                format!("Cannot read image {}: {}", path.display(), e),
            )
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        let form = reqwest::multipart::Form::new()
            .part("image", reqwest::multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .authed(self.http_client.post(self.url("v1/catalog/upload-image")))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.error_from_response("upload_catalog_image", response).await);
        }

        let uploaded: ApiUploadedImage = self.decode("upload_catalog_image", response).await?;
        Ok(uploaded.into_uploaded_image())
    }

    async fn create_catalog_items(
        &self,
        items: Vec<NewCatalogItem>,
    ) -> Result<(), GatewayError> {
        if items.is_empty() || items.len() > MAX_CATALOG_BATCH {
            return Err(GatewayError::new(
                GatewayErrorCode::ValidationFailed,
                format!("Catalog batch must contain 1-{} items", MAX_CATALOG_BATCH),
            ));
        }

        let response = self
            .authed(self.http_client.post(self.url("v1/catalog")))
            .json(&serde_json::json!({ "items": items }))
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        // The API answers 202 Accepted and processes the batch asynchronously.
        if !response.status().is_success() {
            return Err(self.error_from_response("create_catalog_items", response).await);
        }

        Ok(())
    }

    async fn list_catalog_items(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<crate::ports::CatalogPage, GatewayError> {
        let response = self
            .authed(self.http_client.get(self.url("v1/catalog")))
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.error_from_response("list_catalog_items", response).await);
        }

        let catalog: ApiCatalogPage = self.decode("list_catalog_items", response).await?;
        Ok(catalog.into_page())
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, GatewayError> {
        let secret = self.config.webhook_secret.as_ref().ok_or_else(|| {
            GatewayError::authentication("Webhook secret is not configured")
        })?;

        if !signature::verify_signature(
            payload,
            signature_header,
            secret.expose_secret().as_bytes(),
        ) {
            tracing::warn!("Invalid webhook signature");
            return Err(GatewayError::invalid_webhook("Invalid signature"));
        }

        let event: ApiWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            GatewayError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        let event = event.into_event();

        tracing::info!(
            event_type = ?event.event_type,
            "Webhook signature verified"
        );

        Ok(event)
    }
}
