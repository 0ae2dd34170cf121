//! Integration tests for the ApiPay REST client.
//!
//! These tests run the client against a local wiremock server to verify:
//! 1. Request shape (paths, auth header, JSON bodies)
//! 2. Response decoding into port types
//! 3. Error mapping from HTTP status codes
//! 4. The verification polling loop (pending -> terminal, timeout)

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use apipay::adapters::apipay::{ApiPayClient, ApiPayConfig};
use apipay::ports::{
    BillingPeriod, CreateInvoiceRequest, CreateSubscriptionRequest, GatewayErrorCode,
    InvoiceStatus, NewCatalogItem, OrganizationStatus, PaymentGateway, SubscriptionStatus,
};

const API_KEY: &str = "test_api_key";

async fn client_for(server: &MockServer) -> ApiPayClient {
    let config = ApiPayConfig::new(API_KEY)
        .with_base_url(server.uri())
        .with_poll_interval(Duration::from_millis(10))
        .with_verification_timeout(Duration::from_millis(200));
    ApiPayClient::new(config)
}

fn organization_body(status: &str, time_remaining: Option<i64>) -> serde_json::Value {
    json!({
        "organization": {
            "id": 314,
            "idn": "123456789012",
            "status": status,
            "time_remaining": time_remaining
        }
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Invoices
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn create_invoice_sends_auth_header_and_decodes_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoices"))
        .and(header("X-API-Key", API_KEY))
        .and(body_json(json!({
            "amount": 10000,
            "phone_number": "87001234567",
            "description": "Test payment",
            "external_order_id": "order_123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "kaspi_invoice_id": "KSP-0042",
            "amount": 10000,
            "status": "created",
            "payment_url": "https://pay.example.kz/i/42",
            "external_order_id": "order_123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let invoice = client
        .create_invoice(CreateInvoiceRequest {
            amount: 10000,
            phone_number: "87001234567".to_string(),
            description: "Test payment".to_string(),
            external_order_id: Some("order_123".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(invoice.id, 42);
    assert_eq!(invoice.status, InvoiceStatus::Created);
    assert_eq!(
        invoice.payment_url.as_deref(),
        Some("https://pay.example.kz/i/42")
    );
}

#[tokio::test]
async fn create_invoice_maps_validation_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoices"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "message": "Amount must be positive" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .create_invoice(CreateInvoiceRequest {
            amount: -1,
            phone_number: "87001234567".to_string(),
            description: "Bad".to_string(),
            external_order_id: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, GatewayErrorCode::ValidationFailed);
    assert_eq!(err.provider_message.as_deref(), Some("Amount must be positive"));
    assert!(!err.code.is_retryable());
}

#[tokio::test]
async fn invalid_api_key_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoices"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid API key" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .create_invoice(CreateInvoiceRequest {
            amount: 100,
            phone_number: "87001234567".to_string(),
            description: "Test".to_string(),
            external_order_id: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, GatewayErrorCode::AuthenticationError);
}

#[tokio::test]
async fn rate_limit_is_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoices"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "message": "Too many requests" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .create_invoice(CreateInvoiceRequest {
            amount: 100,
            phone_number: "87001234567".to_string(),
            description: "Test".to_string(),
            external_order_id: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, GatewayErrorCode::RateLimitExceeded);
    assert!(err.code.is_retryable());
}

// ════════════════════════════════════════════════════════════════════════════
// Subscriptions
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn create_subscription_uses_v1_path_and_wire_period() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/subscriptions"))
        .and(header("X-API-Key", API_KEY))
        .and(body_json(json!({
            "amount": 5000,
            "phone_number": "87001234567",
            "billing_period": "monthly",
            "billing_day": 1,
            "subscriber_name": "John Doe",
            "description": "Monthly subscription"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9,
            "amount": 5000,
            "billing_period": "monthly",
            "status": "active",
            "next_billing_date": "2026-09-01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let subscription = client
        .create_subscription(CreateSubscriptionRequest {
            amount: 5000,
            phone_number: "87001234567".to_string(),
            billing_period: BillingPeriod::Monthly,
            billing_day: 1,
            subscriber_name: "John Doe".to_string(),
            description: "Monthly subscription".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(subscription.id, 9);
    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert_eq!(subscription.billing_period, BillingPeriod::Monthly);
}

// ════════════════════════════════════════════════════════════════════════════
// Catalog
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn list_catalog_items_sends_pagination_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/catalog"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10"))
        .and(header("X-API-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": 11, "name": "Coffee Latte", "selling_price": 1500, "unit_id": 1}
            ],
            "meta": {"total": 11, "page": 2, "per_page": 10}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let page = client.list_catalog_items(2, 10).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.meta.total, 11);
    assert_eq!(page.meta.page, 2);
}

#[tokio::test]
async fn create_catalog_items_accepts_202() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/catalog"))
        .and(body_json(json!({
            "items": [
                {"name": "Coffee Latte", "selling_price": 1500, "unit_id": 1, "image_url": null}
            ]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client
        .create_catalog_items(vec![NewCatalogItem {
            name: "Coffee Latte".to_string(),
            selling_price: 1500,
            unit_id: 1,
            image_url: None,
        }])
        .await
        .unwrap();
}

#[tokio::test]
async fn upload_catalog_image_posts_multipart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/catalog/upload-image"))
        .and(header("X-API-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://cdn.example.kz/latte.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("latte.png");
    std::fs::write(&image_path, b"\x89PNG\r\n\x1a\nfake").unwrap();

    let client = client_for(&server).await;
    let uploaded = client.upload_catalog_image(&image_path).await.unwrap();

    assert_eq!(uploaded.url, "https://cdn.example.kz/latte.png");

    // The image must travel as a multipart part named "image".
    let requests = server.received_requests().await.unwrap();
    let upload: &Request = &requests[0];
    let content_type = upload
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("name=\"image\""));
    assert!(body.contains("filename=\"latte.png\""));
}

#[tokio::test]
async fn upload_catalog_image_missing_file_fails_without_request() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    let err = client
        .upload_catalog_image(std::path::Path::new("/nonexistent/image.png"))
        .await
        .unwrap_err();

    assert_eq!(err.code, GatewayErrorCode::ValidationFailed);
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ════════════════════════════════════════════════════════════════════════════
// Organization Verification
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn start_verification_posts_idn() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/organizations/verify"))
        .and(body_json(json!({ "idn": "123456789012" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(organization_body("pending", Some(120))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let organization = client.start_verification("123456789012").await.unwrap();

    assert_eq!(organization.id, 314);
    assert_eq!(organization.status, OrganizationStatus::Pending);
    assert_eq!(organization.time_remaining, Some(120));
}

#[tokio::test]
async fn wait_for_verification_polls_until_verified() {
    let server = MockServer::start().await;

    // First two polls pending, then verified.
    Mock::given(method("GET"))
        .and(path("/organizations/314/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(organization_body("pending", Some(100))),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/organizations/314/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(organization_body("verified", None)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let organization = client.wait_for_verification(314).await.unwrap();

    assert_eq!(organization.status, OrganizationStatus::Verified);
    assert!(server.received_requests().await.unwrap().len() >= 3);
}

#[tokio::test]
async fn wait_for_verification_stops_on_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/organizations/314/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(organization_body("failed", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.wait_for_verification(314).await.unwrap_err();

    assert_eq!(err.code, GatewayErrorCode::VerificationFailed);
}

#[tokio::test]
async fn wait_for_verification_times_out_while_pending() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/organizations/314/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(organization_body("pending", Some(1))),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.wait_for_verification(314).await.unwrap_err();

    assert_eq!(err.code, GatewayErrorCode::VerificationTimeout);
}

#[tokio::test]
async fn check_verification_unknown_organization_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/organizations/999/status"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Not found" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.check_verification(999).await.unwrap_err();

    assert_eq!(err.code, GatewayErrorCode::NotFound);
}
