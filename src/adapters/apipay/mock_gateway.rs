//! Mock payment gateway for testing.
//!
//! Provides a configurable mock implementation of `PaymentGateway` for unit
//! and integration tests. Supports:
//! - Pre-configured responses
//! - Error injection
//! - Call tracking
//! - Webhook event simulation

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{
    BillingPeriod, CatalogItem, CatalogPage, CreateInvoiceRequest, CreateSubscriptionRequest,
    GatewayError, Invoice, InvoiceStatus, NewCatalogItem, Organization, OrganizationStatus,
    PageMeta, PaymentGateway, Subscription, SubscriptionStatus, UploadedImage, WebhookEvent,
    WebhookEventData, WebhookEventType, WebhookInvoice,
};

/// Mock payment gateway for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentGateway::new();
///
/// // Configure responses
/// mock.set_organization(Organization { status: OrganizationStatus::Verified, .. });
///
/// // Inject errors
/// mock.set_error(GatewayError::invalid_webhook("Test rejection"));
///
/// // Use in tests
/// let result = mock.create_invoice(request).await;
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentGateway {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Next organization to return from verification calls.
    next_organization: Option<Organization>,

    /// Next invoice to return.
    next_invoice: Option<Invoice>,

    /// Next subscription to return.
    next_subscription: Option<Subscription>,

    /// Next catalog page to return.
    next_catalog_page: Option<CatalogPage>,

    /// Next webhook event to return.
    next_webhook_event: Option<WebhookEvent>,

    /// Error to return on the next call.
    next_error: Option<GatewayError>,

    /// Catalog batches received by `create_catalog_items`.
    catalog_batches: Vec<Vec<NewCatalogItem>>,

    /// Number of calls made, per operation name.
    calls: Vec<&'static str>,
}

impl MockPaymentGateway {
    /// Create a new mock with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the organization returned by verification calls.
    pub fn set_organization(&self, organization: Organization) {
        self.inner.lock().unwrap().next_organization = Some(organization);
    }

    /// Configure the invoice returned by `create_invoice`.
    pub fn set_invoice(&self, invoice: Invoice) {
        self.inner.lock().unwrap().next_invoice = Some(invoice);
    }

    /// Configure the subscription returned by `create_subscription`.
    pub fn set_subscription(&self, subscription: Subscription) {
        self.inner.lock().unwrap().next_subscription = Some(subscription);
    }

    /// Configure the catalog page returned by `list_catalog_items`.
    pub fn set_catalog_page(&self, page: CatalogPage) {
        self.inner.lock().unwrap().next_catalog_page = Some(page);
    }

    /// Configure the event returned by `verify_webhook`.
    pub fn set_webhook_event(&self, event: WebhookEvent) {
        self.inner.lock().unwrap().next_webhook_event = Some(event);
    }

    /// Inject an error returned by the next call.
    pub fn set_error(&self, error: GatewayError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Catalog batches received so far.
    pub fn catalog_batches(&self) -> Vec<Vec<NewCatalogItem>> {
        self.inner.lock().unwrap().catalog_batches.clone()
    }

    /// Number of calls made to the given operation.
    pub fn call_count(&self, operation: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    fn begin(&self, operation: &'static str) -> Result<(), GatewayError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(operation);
        match state.next_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn default_organization() -> Organization {
        Organization {
            id: 314,
            idn: "123456789012".to_string(),
            status: OrganizationStatus::Verified,
            time_remaining: None,
        }
    }

    fn default_invoice() -> Invoice {
        Invoice {
            id: 42,
            kaspi_invoice_id: Some("KSP-0042".to_string()),
            amount: 10000,
            status: InvoiceStatus::Created,
            payment_url: Some("https://pay.example.kz/i/42".to_string()),
            external_order_id: Some("order_123".to_string()),
        }
    }

    fn default_subscription() -> Subscription {
        Subscription {
            id: 9,
            amount: 5000,
            billing_period: BillingPeriod::Monthly,
            status: SubscriptionStatus::Active,
            next_billing_date: Some("2026-09-01".to_string()),
        }
    }

    fn default_catalog_page() -> CatalogPage {
        CatalogPage {
            items: vec![CatalogItem {
                id: 1,
                name: "Coffee Latte".to_string(),
                selling_price: 1500,
                unit_id: 1,
                image_url: None,
            }],
            meta: PageMeta {
                total: 1,
                page: 1,
                per_page: 50,
            },
        }
    }

    fn default_webhook_event() -> WebhookEvent {
        WebhookEvent {
            event_type: WebhookEventType::InvoiceStatusChanged,
            timestamp: None,
            data: WebhookEventData::Invoice(WebhookInvoice {
                id: 42,
                status: InvoiceStatus::Paid,
                amount: Some(10000),
                client_name: Some("John Doe".to_string()),
                paid_at: Some("2026-08-23T10:14:58Z".to_string()),
                cancelled_at: None,
                expired_at: None,
                external_order_id: Some("order_123".to_string()),
            }),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn start_verification(&self, idn: &str) -> Result<Organization, GatewayError> {
        self.begin("start_verification")?;
        let state = self.inner.lock().unwrap();
        Ok(state.next_organization.clone().unwrap_or_else(|| Organization {
            idn: idn.to_string(),
            status: OrganizationStatus::Pending,
            time_remaining: Some(120),
            ..Self::default_organization()
        }))
    }

    async fn check_verification(
        &self,
        organization_id: i64,
    ) -> Result<Organization, GatewayError> {
        self.begin("check_verification")?;
        let state = self.inner.lock().unwrap();
        Ok(state.next_organization.clone().unwrap_or_else(|| Organization {
            id: organization_id,
            ..Self::default_organization()
        }))
    }

    async fn wait_for_verification(
        &self,
        organization_id: i64,
    ) -> Result<Organization, GatewayError> {
        self.begin("wait_for_verification")?;
        let state = self.inner.lock().unwrap();
        Ok(state.next_organization.clone().unwrap_or_else(|| Organization {
            id: organization_id,
            ..Self::default_organization()
        }))
    }

    async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
    ) -> Result<Invoice, GatewayError> {
        self.begin("create_invoice")?;
        let state = self.inner.lock().unwrap();
        Ok(state.next_invoice.clone().unwrap_or_else(|| Invoice {
            amount: request.amount,
            external_order_id: request.external_order_id,
            ..Self::default_invoice()
        }))
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, GatewayError> {
        self.begin("create_subscription")?;
        let state = self.inner.lock().unwrap();
        Ok(state.next_subscription.clone().unwrap_or_else(|| Subscription {
            amount: request.amount,
            billing_period: request.billing_period,
            ..Self::default_subscription()
        }))
    }

    async fn upload_catalog_image(&self, path: &Path) -> Result<UploadedImage, GatewayError> {
        self.begin("upload_catalog_image")?;
        Ok(UploadedImage {
            url: format!(
                "https://cdn.example.kz/{}",
                path.file_name().and_then(|n| n.to_str()).unwrap_or("image")
            ),
        })
    }

    async fn create_catalog_items(
        &self,
        items: Vec<NewCatalogItem>,
    ) -> Result<(), GatewayError> {
        self.begin("create_catalog_items")?;
        self.inner.lock().unwrap().catalog_batches.push(items);
        Ok(())
    }

    async fn list_catalog_items(
        &self,
        _page: u32,
        _per_page: u32,
    ) -> Result<CatalogPage, GatewayError> {
        self.begin("list_catalog_items")?;
        let state = self.inner.lock().unwrap();
        Ok(state
            .next_catalog_page
            .clone()
            .unwrap_or_else(Self::default_catalog_page))
    }

    async fn verify_webhook(
        &self,
        _payload: &[u8],
        _signature: &str,
    ) -> Result<WebhookEvent, GatewayError> {
        self.begin("verify_webhook")?;
        let state = self.inner.lock().unwrap();
        Ok(state
            .next_webhook_event
            .clone()
            .unwrap_or_else(Self::default_webhook_event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::GatewayErrorCode;

    #[tokio::test]
    async fn mock_returns_defaults() {
        let mock = MockPaymentGateway::new();

        let invoice = mock
            .create_invoice(CreateInvoiceRequest {
                amount: 2500,
                phone_number: "87001234567".to_string(),
                description: "Test".to_string(),
                external_order_id: None,
            })
            .await
            .unwrap();

        assert_eq!(invoice.amount, 2500);
        assert_eq!(mock.call_count("create_invoice"), 1);
    }

    #[tokio::test]
    async fn mock_error_injection_is_one_shot() {
        let mock = MockPaymentGateway::new();
        mock.set_error(GatewayError::network("connection refused"));

        let err = mock.check_verification(1).await.unwrap_err();
        assert_eq!(err.code, GatewayErrorCode::NetworkError);

        // Next call succeeds again.
        assert!(mock.check_verification(1).await.is_ok());
    }

    #[tokio::test]
    async fn mock_tracks_catalog_batches() {
        let mock = MockPaymentGateway::new();
        mock.create_catalog_items(vec![NewCatalogItem {
            name: "Cookie".to_string(),
            selling_price: 500,
            unit_id: 1,
            image_url: None,
        }])
        .await
        .unwrap();

        let batches = mock.catalog_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0].name, "Cookie");
    }
}
