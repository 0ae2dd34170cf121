//! Manage catalog items: list existing items and create new ones.
//!
//! Usage: APIPAY_API_KEY=your_key cargo run --bin manage_catalog

use std::process::exit;

use apipay::adapters::apipay::{ApiPayClient, ApiPayConfig};
use apipay::ports::{NewCatalogItem, PaymentGateway};

#[tokio::main]
async fn main() {
    let config = match ApiPayConfig::from_env() {
        Ok(config) => config,
        Err(_) => {
            eprintln!("Error: APIPAY_API_KEY environment variable is required");
            eprintln!("Usage: APIPAY_API_KEY=your_key cargo run --bin manage_catalog");
            exit(1);
        }
    };
    let client = ApiPayClient::new(config);

    if let Err(err) = run(&client).await {
        eprintln!("Error: {}", err);
        exit(1);
    }
}

async fn run(client: &ApiPayClient) -> Result<(), apipay::ports::GatewayError> {
    // List existing items
    println!("Fetching catalog...");
    let catalog = client.list_catalog_items(1, 50).await?;
    println!("Found {} items", catalog.meta.total);

    // Optionally upload an image to attach to the first item
    let image_url = match std::env::var("IMAGE_PATH") {
        Ok(path) if !path.is_empty() => {
            println!();
            println!("Uploading image {}...", path);
            let uploaded = client
                .upload_catalog_image(std::path::Path::new(&path))
                .await?;
            println!("Uploaded: {}", uploaded.url);
            Some(uploaded.url)
        }
        _ => None,
    };

    // Create new items
    println!();
    println!("Creating catalog items...");
    client
        .create_catalog_items(vec![
            NewCatalogItem {
                name: "Coffee Latte".to_string(),
                selling_price: 1500,
                unit_id: 1,
                image_url,
            },
            NewCatalogItem {
                name: "Cookie".to_string(),
                selling_price: 500,
                unit_id: 1,
                image_url: None,
            },
        ])
        .await?;
    println!("Items created (202 Accepted - processing async)");

    Ok(())
}
