//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! callers and the outside world. Adapters implement these ports.
//!
//! - `PaymentGateway` - the ApiPay payment API (invoices, subscriptions,
//!   catalog, organization verification, webhook verification)

mod payment_gateway;

pub use payment_gateway::{
    BillingPeriod, CatalogItem, CatalogPage, CreateInvoiceRequest, CreateSubscriptionRequest,
    GatewayError, GatewayErrorCode, Invoice, InvoiceStatus, NewCatalogItem, Organization,
    OrganizationStatus, PageMeta, PaymentGateway, Subscription, SubscriptionStatus, UploadedImage,
    WebhookEvent, WebhookEventData, WebhookEventType, WebhookInvoice,
};
