//! ApiPay-specific wire types.
//!
//! These types represent ApiPay API objects as they appear in HTTP responses
//! and webhook payloads. They are designed to:
//! - Parse the actual ApiPay JSON accurately
//! - Map to the port types for further processing
//! - Tolerate unknown enum values for forward compatibility

use serde::{Deserialize, Serialize};

use crate::ports::{
    CatalogItem, CatalogPage, Invoice, InvoiceStatus, Organization, OrganizationStatus, PageMeta,
    Subscription, SubscriptionStatus, UploadedImage, WebhookEvent, WebhookEventData,
    WebhookEventType, WebhookInvoice,
};

// ════════════════════════════════════════════════════════════════════════════════
// Error Envelope
// ════════════════════════════════════════════════════════════════════════════════

/// Error body returned by the ApiPay API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable error message.
    #[serde(default)]
    pub message: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Invoices
// ════════════════════════════════════════════════════════════════════════════════

/// Invoice object as returned by `POST /invoices`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiInvoice {
    /// Gateway invoice ID.
    pub id: i64,

    /// Kaspi-side invoice ID, present once issued.
    pub kaspi_invoice_id: Option<String>,

    /// Amount in KZT.
    pub amount: i64,

    /// Invoice status string.
    pub status: String,

    /// Payment page URL for the customer.
    pub payment_url: Option<String>,

    /// Merchant's order identifier.
    pub external_order_id: Option<String>,
}

impl ApiInvoice {
    /// Convert to the port type.
    pub fn into_invoice(self) -> Invoice {
        Invoice {
            id: self.id,
            kaspi_invoice_id: self.kaspi_invoice_id,
            amount: self.amount,
            status: map_invoice_status(&self.status),
            payment_url: self.payment_url,
            external_order_id: self.external_order_id,
        }
    }
}

/// Map an ApiPay invoice status string to the port enum.
pub fn map_invoice_status(status: &str) -> InvoiceStatus {
    match status {
        "created" => InvoiceStatus::Created,
        "pending" => InvoiceStatus::Pending,
        "paid" => InvoiceStatus::Paid,
        "cancelled" => InvoiceStatus::Cancelled,
        "expired" => InvoiceStatus::Expired,
        _ => InvoiceStatus::Unknown,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Subscriptions
// ════════════════════════════════════════════════════════════════════════════════

/// Subscription object as returned by `POST /v1/subscriptions`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSubscription {
    /// Gateway subscription ID.
    pub id: i64,

    /// Amount in KZT per billing period.
    pub amount: i64,

    /// Billing cadence string ("monthly", "weekly").
    pub billing_period: String,

    /// Subscription status string.
    pub status: String,

    /// Next billing date (ISO 8601 date).
    pub next_billing_date: Option<String>,
}

impl ApiSubscription {
    /// Convert to the port type.
    pub fn into_subscription(self) -> Subscription {
        Subscription {
            id: self.id,
            amount: self.amount,
            billing_period: match self.billing_period.as_str() {
                "weekly" => crate::ports::BillingPeriod::Weekly,
                _ => crate::ports::BillingPeriod::Monthly,
            },
            status: map_subscription_status(&self.status),
            next_billing_date: self.next_billing_date,
        }
    }
}

/// Map an ApiPay subscription status string to the port enum.
pub fn map_subscription_status(status: &str) -> SubscriptionStatus {
    match status {
        "active" => SubscriptionStatus::Active,
        "paused" => SubscriptionStatus::Paused,
        "cancelled" => SubscriptionStatus::Cancelled,
        _ => SubscriptionStatus::Unknown,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Catalog
// ════════════════════════════════════════════════════════════════════════════════

/// Catalog item object as returned by `GET /v1/catalog`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiCatalogItem {
    /// Item ID.
    pub id: i64,

    /// Item display name.
    pub name: String,

    /// Selling price in KZT.
    pub selling_price: i64,

    /// Measurement unit identifier.
    pub unit_id: i64,

    /// Hosted image URL.
    pub image_url: Option<String>,
}

/// Paginated catalog listing envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiCatalogPage {
    /// Items on this page.
    #[serde(default)]
    pub items: Vec<ApiCatalogItem>,

    /// Pagination metadata.
    pub meta: ApiPageMeta,
}

/// Pagination metadata envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiPageMeta {
    /// Total item count across all pages.
    pub total: u64,

    /// Current page (1-based).
    pub page: u32,

    /// Page size.
    pub per_page: u32,
}

impl ApiCatalogPage {
    /// Convert to the port type.
    pub fn into_page(self) -> CatalogPage {
        CatalogPage {
            items: self
                .items
                .into_iter()
                .map(|item| CatalogItem {
                    id: item.id,
                    name: item.name,
                    selling_price: item.selling_price,
                    unit_id: item.unit_id,
                    image_url: item.image_url,
                })
                .collect(),
            meta: PageMeta {
                total: self.meta.total,
                page: self.meta.page,
                per_page: self.meta.per_page,
            },
        }
    }
}

/// Upload response from `POST /v1/catalog/upload-image`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiUploadedImage {
    /// Hosted image URL.
    pub url: String,
}

impl ApiUploadedImage {
    /// Convert to the port type.
    pub fn into_uploaded_image(self) -> UploadedImage {
        UploadedImage { url: self.url }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Organization Verification
// ════════════════════════════════════════════════════════════════════════════════

/// Envelope wrapping organization responses.
///
/// Both `POST /organizations/verify` and `GET /organizations/{id}/status`
/// nest the organization under an `organization` key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiOrganizationEnvelope {
    /// The wrapped organization.
    pub organization: ApiOrganization,
}

/// Organization object as returned by the verification endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiOrganization {
    /// Gateway organization ID.
    pub id: i64,

    /// IIN/BIN of the organization.
    #[serde(default)]
    pub idn: String,

    /// Verification status string.
    pub status: String,

    /// Seconds left for the merchant to confirm, while pending.
    pub time_remaining: Option<i64>,
}

impl ApiOrganization {
    /// Convert to the port type.
    pub fn into_organization(self) -> Organization {
        Organization {
            id: self.id,
            idn: self.idn,
            status: map_organization_status(&self.status),
            time_remaining: self.time_remaining,
        }
    }
}

/// Map an ApiPay organization status string to the port enum.
pub fn map_organization_status(status: &str) -> OrganizationStatus {
    match status {
        "pending" => OrganizationStatus::Pending,
        "verified" => OrganizationStatus::Verified,
        "failed" => OrganizationStatus::Failed,
        _ => OrganizationStatus::Unknown,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Events
// ════════════════════════════════════════════════════════════════════════════════

/// Raw webhook event envelope as received from ApiPay.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiWebhookEvent {
    /// Event type (e.g. "invoice.status_changed").
    pub event: String,

    /// When the event occurred.
    #[serde(default)]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,

    /// Invoice snapshot for invoice events.
    #[serde(default)]
    pub invoice: Option<ApiWebhookInvoice>,
}

/// Invoice snapshot inside a webhook payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiWebhookInvoice {
    /// Gateway invoice ID.
    pub id: i64,

    /// Status the invoice moved to.
    pub status: String,

    /// Amount in KZT.
    #[serde(default)]
    pub amount: Option<i64>,

    /// Paying customer's name.
    #[serde(default)]
    pub client_name: Option<String>,

    /// When payment landed.
    #[serde(default)]
    pub paid_at: Option<String>,

    /// When the invoice was cancelled.
    #[serde(default)]
    pub cancelled_at: Option<String>,

    /// When the invoice expired.
    #[serde(default)]
    pub expired_at: Option<String>,

    /// Merchant's order identifier.
    #[serde(default)]
    pub external_order_id: Option<String>,
}

impl ApiWebhookEvent {
    /// Convert to the port event, preserving unknown types as raw JSON.
    pub fn into_event(self) -> WebhookEvent {
        let event_type = match self.event.as_str() {
            "invoice.status_changed" => WebhookEventType::InvoiceStatusChanged,
            other => WebhookEventType::Unknown(other.to_string()),
        };

        let data = match (&event_type, self.invoice) {
            (WebhookEventType::InvoiceStatusChanged, Some(invoice)) => {
                WebhookEventData::Invoice(WebhookInvoice {
                    id: invoice.id,
                    status: map_invoice_status(&invoice.status),
                    amount: invoice.amount,
                    client_name: invoice.client_name,
                    paid_at: invoice.paid_at,
                    cancelled_at: invoice.cancelled_at,
                    expired_at: invoice.expired_at,
                    external_order_id: invoice.external_order_id,
                })
            }
            (_, invoice) => WebhookEventData::Raw {
                json: serde_json::to_string(&invoice).unwrap_or_default(),
            },
        };

        WebhookEvent {
            event_type,
            timestamp: self.timestamp,
            data,
        }
    }
}
