//! Payment gateway port for the ApiPay.kz API.
//!
//! Defines the contract between callers and the ApiPay HTTP adapter.
//! Implementations handle invoice creation, recurring subscriptions, catalog
//! management, organization verification, and webhook signature checks.
//!
//! # Design
//!
//! - **Gateway agnostic callers**: code depends on this trait, not on reqwest
//! - **Typed errors**: every failure carries a [`GatewayErrorCode`]
//! - **Webhooks**: signature verification happens before any JSON parsing

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Port for the ApiPay payment gateway.
///
/// Covers every operation the ApiPay REST API exposes to merchants plus
/// webhook verification for inbound event deliveries.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Start organization verification for an IIN/BIN.
    ///
    /// The merchant must confirm the request in the Kaspi Business app;
    /// poll with [`check_verification`](Self::check_verification) afterwards.
    async fn start_verification(&self, idn: &str) -> Result<Organization, GatewayError>;

    /// Fetch the current verification status of an organization.
    async fn check_verification(&self, organization_id: i64)
        -> Result<Organization, GatewayError>;

    /// Poll verification status until it is terminal or the budget expires.
    ///
    /// Returns the organization once `verified`; fails with
    /// [`GatewayErrorCode::VerificationFailed`] on `failed` and
    /// [`GatewayErrorCode::VerificationTimeout`] when the budget runs out.
    async fn wait_for_verification(
        &self,
        organization_id: i64,
    ) -> Result<Organization, GatewayError>;

    /// Create a payment invoice.
    ///
    /// Returns the invoice including the `payment_url` to redirect the
    /// customer to.
    async fn create_invoice(&self, request: CreateInvoiceRequest)
        -> Result<Invoice, GatewayError>;

    /// Create a recurring subscription.
    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, GatewayError>;

    /// Upload a catalog image, returning its hosted URL.
    async fn upload_catalog_image(&self, path: &Path) -> Result<UploadedImage, GatewayError>;

    /// Create catalog items in one batch (1-50 items).
    ///
    /// The API accepts the batch with `202 Accepted` and processes it
    /// asynchronously.
    async fn create_catalog_items(&self, items: Vec<NewCatalogItem>)
        -> Result<(), GatewayError>;

    /// List catalog items, paginated.
    async fn list_catalog_items(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<CatalogPage, GatewayError>;

    /// Verify a webhook signature and parse the event.
    ///
    /// `payload` must be the raw request body bytes; the signature covers
    /// them exactly as received. Returns the parsed event if the signature
    /// is valid, [`GatewayErrorCode::InvalidWebhook`] otherwise.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, GatewayError>;
}

// ════════════════════════════════════════════════════════════════════════════════
// Invoices
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a payment invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Amount in KZT.
    pub amount: i64,

    /// Customer phone number (e.g. `87001234567`).
    pub phone_number: String,

    /// Human-readable payment description.
    pub description: String,

    /// Merchant's own order identifier, echoed back in webhooks.
    pub external_order_id: Option<String>,
}

/// Payment invoice as known to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Gateway invoice ID.
    pub id: i64,

    /// Kaspi-side invoice ID, present once issued.
    pub kaspi_invoice_id: Option<String>,

    /// Amount in KZT.
    pub amount: i64,

    /// Current invoice status.
    pub status: InvoiceStatus,

    /// URL the customer completes payment at.
    pub payment_url: Option<String>,

    /// Merchant's order identifier, if one was supplied.
    pub external_order_id: Option<String>,
}

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Invoice created, payment not started.
    Created,

    /// Customer opened the payment page, payment in flight.
    Pending,

    /// Payment received.
    Paid,

    /// Invoice was cancelled before payment.
    Cancelled,

    /// Invoice expired unpaid.
    Expired,

    /// Unknown status from the provider.
    Unknown,
}

impl InvoiceStatus {
    /// Check whether the invoice can still transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Paid | InvoiceStatus::Cancelled | InvoiceStatus::Expired
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Subscriptions
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a recurring subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    /// Amount charged each billing period, in KZT.
    pub amount: i64,

    /// Subscriber phone number.
    pub phone_number: String,

    /// Billing cadence.
    pub billing_period: BillingPeriod,

    /// Day of the period billing runs on (1-28 for monthly).
    pub billing_day: u32,

    /// Subscriber display name.
    pub subscriber_name: String,

    /// Human-readable subscription description.
    pub description: String,
}

/// Recurring subscription as known to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Gateway subscription ID.
    pub id: i64,

    /// Amount charged each billing period, in KZT.
    pub amount: i64,

    /// Billing cadence.
    pub billing_period: BillingPeriod,

    /// Current subscription status.
    pub status: SubscriptionStatus,

    /// Next billing date (ISO 8601 date), once scheduled.
    pub next_billing_date: Option<String>,
}

/// Subscription billing cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Weekly,
    Monthly,
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingPeriod::Weekly => write!(f, "weekly"),
            BillingPeriod::Monthly => write!(f, "monthly"),
        }
    }
}

/// Subscription status from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Subscription is active and billing.
    Active,

    /// Billing is paused.
    Paused,

    /// Subscription was cancelled.
    Cancelled,

    /// Unknown status from the provider.
    Unknown,
}

// ════════════════════════════════════════════════════════════════════════════════
// Catalog
// ════════════════════════════════════════════════════════════════════════════════

/// A catalog item to create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCatalogItem {
    /// Item display name.
    pub name: String,

    /// Selling price in KZT.
    pub selling_price: i64,

    /// Measurement unit identifier.
    pub unit_id: i64,

    /// Hosted image URL from a prior upload, if any.
    pub image_url: Option<String>,
}

/// An existing catalog item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Item ID.
    pub id: i64,

    /// Item display name.
    pub name: String,

    /// Selling price in KZT.
    pub selling_price: i64,

    /// Measurement unit identifier.
    pub unit_id: i64,

    /// Hosted image URL, if one is attached.
    pub image_url: Option<String>,
}

/// One page of catalog items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPage {
    /// Items on this page.
    pub items: Vec<CatalogItem>,

    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageMeta {
    /// Total item count across all pages.
    pub total: u64,

    /// Current page (1-based).
    pub page: u32,

    /// Page size.
    pub per_page: u32,
}

/// Result of a catalog image upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Hosted image URL to reference from catalog items.
    pub url: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Organization Verification
// ════════════════════════════════════════════════════════════════════════════════

/// Merchant organization undergoing or past verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Gateway organization ID.
    pub id: i64,

    /// IIN/BIN of the organization.
    pub idn: String,

    /// Current verification status.
    pub status: OrganizationStatus,

    /// Seconds left for the merchant to confirm, while pending.
    pub time_remaining: Option<i64>,
}

/// Organization verification status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStatus {
    /// Waiting for confirmation in the Kaspi Business app.
    Pending,

    /// Verification succeeded; the merchant can create invoices.
    Verified,

    /// Verification failed or was declined.
    Failed,

    /// Unknown status from the provider.
    Unknown,
}

impl OrganizationStatus {
    /// Check whether polling can stop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrganizationStatus::Verified | OrganizationStatus::Failed)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Events
// ════════════════════════════════════════════════════════════════════════════════

/// Webhook event delivered by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event type.
    pub event_type: WebhookEventType,

    /// When the event occurred, if the delivery carried a timestamp.
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,

    /// Event payload.
    pub data: WebhookEventData,
}

/// Types of webhook events the gateway delivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// An invoice moved to a new status.
    InvoiceStatusChanged,

    /// Unknown event type (forward compatibility).
    Unknown(String),
}

/// Webhook event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebhookEventData {
    /// Invoice snapshot attached to `invoice.status_changed`.
    #[serde(rename = "invoice")]
    Invoice(WebhookInvoice),

    /// Raw JSON for unknown event types.
    #[serde(rename = "raw")]
    Raw { json: String },
}

/// Invoice snapshot as delivered in webhook payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookInvoice {
    /// Gateway invoice ID.
    pub id: i64,

    /// Status the invoice moved to.
    pub status: InvoiceStatus,

    /// Amount in KZT.
    pub amount: Option<i64>,

    /// Paying customer's name, present on paid invoices.
    pub client_name: Option<String>,

    /// When payment landed (ISO 8601).
    pub paid_at: Option<String>,

    /// When the invoice was cancelled (ISO 8601).
    pub cancelled_at: Option<String>,

    /// When the invoice expired (ISO 8601).
    pub expired_at: Option<String>,

    /// Merchant's order identifier, if one was supplied at creation.
    pub external_order_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════════

/// Errors from payment gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error message (if the API returned one).
    pub provider_message: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_message: None,
            retryable: code.is_retryable(),
        }
    }

    /// Attach the provider's own error message.
    pub fn with_provider_message(mut self, message: impl Into<String>) -> Self {
        self.provider_message = Some(message.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationError, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(GatewayErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Create an invalid webhook error.
    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidWebhook, message)
    }

    /// Create a verification failure error.
    pub fn verification_failed(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::VerificationFailed, message)
    }

    /// Create a verification timeout error.
    pub fn verification_timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::VerificationTimeout, message)
    }

    /// Create a provider API error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API key rejected.
    AuthenticationError,

    /// Request payload rejected by the API.
    ValidationFailed,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Invalid webhook signature or payload.
    InvalidWebhook,

    /// Organization verification was declined.
    VerificationFailed,

    /// Organization verification did not complete within the budget.
    VerificationTimeout,

    /// Provider API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError | GatewayErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::ValidationFailed => "validation_failed",
            GatewayErrorCode::NotFound => "not_found",
            GatewayErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            GatewayErrorCode::InvalidWebhook => "invalid_webhook",
            GatewayErrorCode::VerificationFailed => "verification_failed",
            GatewayErrorCode::VerificationTimeout => "verification_timeout",
            GatewayErrorCode::ProviderError => "provider_error",
            GatewayErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
