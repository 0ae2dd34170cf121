//! Organization verification flow:
//! 1. Start verification with IIN/BIN
//! 2. Poll for status until verified or timeout
//!
//! Prerequisites: add phone 77056610934 to Kaspi Business as "Cashier".
//!
//! Usage: APIPAY_API_KEY=your_key IDN=123456789012 cargo run --bin verify_organization

use std::process::exit;

use apipay::adapters::apipay::{ApiPayClient, ApiPayConfig};
use apipay::ports::PaymentGateway;

#[tokio::main]
async fn main() {
    // Polling progress is reported through tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let idn = match std::env::var("IDN") {
        Ok(idn) if !idn.is_empty() => idn,
        _ => {
            eprintln!("Error: APIPAY_API_KEY and IDN environment variables are required");
            eprintln!(
                "Usage: APIPAY_API_KEY=your_key IDN=123456789012 cargo run --bin verify_organization"
            );
            exit(1);
        }
    };
    let config = match ApiPayConfig::from_env() {
        Ok(config) => config,
        Err(_) => {
            eprintln!("Error: APIPAY_API_KEY and IDN environment variables are required");
            eprintln!(
                "Usage: APIPAY_API_KEY=your_key IDN=123456789012 cargo run --bin verify_organization"
            );
            exit(1);
        }
    };
    let client = ApiPayClient::new(config);

    println!("Starting organization verification...");
    println!("IIN/BIN: {}", idn);
    println!();
    println!("Please confirm in Kaspi Business app within 2 minutes.");
    println!("---");

    let started = match client.start_verification(&idn).await {
        Ok(organization) => organization,
        Err(err) => {
            eprintln!();
            eprintln!("Error: {}", err);
            exit(1);
        }
    };

    println!("Organization ID: {}", started.id);
    println!("Waiting for confirmation...");
    println!();

    match client.wait_for_verification(started.id).await {
        Ok(organization) => {
            println!();
            println!("Verification successful!");
            println!("------------------------");
            println!("Organization ID: {}", organization.id);
            println!("IIN/BIN: {}", organization.idn);
            println!("Status: {:?}", organization.status);
            println!();
            println!("You can now create invoices!");
        }
        Err(err) => {
            eprintln!();
            eprintln!("Error: {}", err);
            exit(1);
        }
    }
}
