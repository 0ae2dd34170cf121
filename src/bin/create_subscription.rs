//! Create a recurring subscription.
//!
//! Usage: APIPAY_API_KEY=your_key cargo run --bin create_subscription

use std::process::exit;

use apipay::adapters::apipay::{ApiPayClient, ApiPayConfig};
use apipay::ports::{BillingPeriod, CreateSubscriptionRequest, PaymentGateway};

#[tokio::main]
async fn main() {
    let config = match ApiPayConfig::from_env() {
        Ok(config) => config,
        Err(_) => {
            eprintln!("Error: APIPAY_API_KEY environment variable is required");
            eprintln!("Usage: APIPAY_API_KEY=your_key cargo run --bin create_subscription");
            exit(1);
        }
    };
    let client = ApiPayClient::new(config);

    println!("Creating subscription...");

    let request = CreateSubscriptionRequest {
        amount: 5000,
        phone_number: "87001234567".to_string(),
        billing_period: BillingPeriod::Monthly,
        billing_day: 1,
        subscriber_name: "John Doe".to_string(),
        description: "Monthly subscription".to_string(),
    };

    match client.create_subscription(request).await {
        Ok(subscription) => {
            println!();
            println!("Subscription created successfully!");
            println!("----------------------------------");
            println!("Subscription ID: {}", subscription.id);
            println!("Amount: {} KZT", subscription.amount);
            println!("Period: {}", subscription.billing_period);
            println!("Status: {:?}", subscription.status);
            println!(
                "Next billing: {}",
                subscription.next_billing_date.as_deref().unwrap_or("-")
            );
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            exit(1);
        }
    }
}
