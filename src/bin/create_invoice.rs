//! Create a payment invoice.
//!
//! Usage: APIPAY_API_KEY=your_key cargo run --bin create_invoice

use std::process::exit;

use apipay::adapters::apipay::{ApiPayClient, ApiPayConfig};
use apipay::ports::{CreateInvoiceRequest, PaymentGateway};

#[tokio::main]
async fn main() {
    let config = match ApiPayConfig::from_env() {
        Ok(config) => config,
        Err(_) => {
            eprintln!("Error: APIPAY_API_KEY environment variable is required");
            eprintln!("Usage: APIPAY_API_KEY=your_key cargo run --bin create_invoice");
            exit(1);
        }
    };
    let client = ApiPayClient::new(config);

    println!("Creating invoice...");

    let request = CreateInvoiceRequest {
        // amount in KZT
        amount: 10000,
        // customer phone
        phone_number: "87001234567".to_string(),
        description: "Test payment".to_string(),
        // your order ID
        external_order_id: Some("order_123".to_string()),
    };

    match client.create_invoice(request).await {
        Ok(invoice) => {
            println!();
            println!("Invoice created successfully!");
            println!("----------------------------");
            println!("Invoice ID: {}", invoice.id);
            println!("Amount: {} KZT", invoice.amount);
            println!("Status: {:?}", invoice.status);
            if let Some(url) = &invoice.payment_url {
                println!("Payment URL: {}", url);
            }
            println!();
            println!("The customer will receive a payment notification in the Kaspi app.");
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            exit(1);
        }
    }
}
