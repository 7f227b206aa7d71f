//! # Seed Data Generator
//!
//! Populates the configured repository with sample products.
//!
//! ## Usage
//! ```bash
//! # 200 products into the configured backend (INVENTORY_BACKEND, default json)
//! cargo run -p inventory-store --bin seed
//!
//! # Custom amount into a SQLite file
//! cargo run -p inventory-store --bin seed -- --backend sqlite --path ./data/inventory.db --count 1000
//! ```
//!
//! ## Generated Products
//! Cycles through the four product types:
//! - generic: stationery and household items
//! - electronic: warranty of 0-3 years
//! - food: expiration date 1-90 days from today
//! - clothing: size from XS to XL, every third without a color
//!
//! Each product has:
//! - Unique code: `{PREFIX}-{INDEX:05}`
//! - Price: 0.99 - 49.99
//! - Stock: 0 - 60 (zero stock is never available)

use chrono::{Duration, Utc};
use inventory_core::{Money, NewProduct, Product, ProductDetails, ProductType};
use inventory_store::{open_repository, StorageBackend, StoreConfig};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_COUNT: usize = 200;

/// Names per product type, in `ProductType::ALL` order.
const NAMES: [&[&str]; 4] = [
    &["Notebook", "Stapler", "Desk Lamp", "Mug", "Umbrella", "Backpack"],
    &["Headphones", "Keyboard", "Webcam", "Charger", "Speaker", "Router"],
    &["Yogurt", "Bread", "Cheese", "Apples", "Orange Juice", "Granola"],
    &["T-Shirt", "Jeans", "Rain Jacket", "Sweater", "Socks", "Scarf"],
];

const SIZES: &[&str] = &["XS", "S", "M", "L", "XL"];
const COLORS: &[&str] = &["black", "white", "navy", "red", "green"];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,inventory=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_help() {
    println!("Inventory Seed Data Generator");
    println!();
    println!("Usage: seed [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --count <N>         Number of products to generate (default: {DEFAULT_COUNT})");
    println!("  -b, --backend <NAME>    list | map | json | sqlite (default: $INVENTORY_BACKEND or json)");
    println!("  -p, --path <PATH>       JSON file or database file for the chosen backend");
    println!("  -h, --help              Show this help message");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut config = StoreConfig::from_env()?;
    let mut count = DEFAULT_COUNT;
    let mut path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if let Some(value) = args.get(i + 1) {
                    count = value.parse()?;
                    i += 1;
                }
            }
            "--backend" | "-b" => {
                if let Some(value) = args.get(i + 1) {
                    config.backend = value.parse::<StorageBackend>()?;
                    i += 1;
                }
            }
            "--path" | "-p" => {
                if let Some(value) = args.get(i + 1) {
                    path = Some(value.clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    // Applied after the loop so --path follows whichever --backend was given
    if let Some(path) = path {
        config = config.path(path);
    }

    if !config.backend.is_persistent() {
        warn!(backend = %config.backend, "In-memory backend: seeded data is discarded on exit");
    }

    info!(backend = %config.backend, count, "Seeding product catalog");
    let repo = open_repository(&config).await?;

    let start = std::time::Instant::now();
    let mut added = 0usize;
    let mut skipped = 0usize;

    for index in 0..count {
        let product = generate_product(index)?;
        match repo.add(&product).await {
            Ok(true) => added += 1,
            Ok(false) => skipped += 1,
            Err(err) => {
                warn!(code = %product.code(), error = %err, "Failed to add product");
                continue;
            }
        }

        if (index + 1) % 100 == 0 {
            info!(progress = index + 1, "Generated products");
        }
    }

    let total = repo.list().await?.len();
    info!(
        added,
        skipped,
        total,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );

    Ok(())
}

/// Builds the `index`-th sample product.
fn generate_product(index: usize) -> Result<Product, inventory_core::ValidationError> {
    let type_index = index % ProductType::ALL.len();
    let product_type = ProductType::ALL[type_index];
    let names = NAMES[type_index];
    let name = names[(index / ProductType::ALL.len()) % names.len()];

    let code = format!("{}-{:05}", product_type.as_str()[..3].to_uppercase(), index);
    let price = Money::from_cents(99 + ((index * 137) % 4_900) as i64);
    let stock = ((index * 7) % 61) as i64;

    let details = match product_type {
        ProductType::Generic => ProductDetails::Generic,
        ProductType::Electronic => ProductDetails::Electronic {
            warranty: (index % 4) as i64,
        },
        ProductType::Food => ProductDetails::Food {
            expiration_date: Some(
                Utc::now().date_naive() + Duration::days(1 + (index % 90) as i64),
            ),
        },
        ProductType::Clothing => ProductDetails::Clothing {
            size: SIZES[index % SIZES.len()].to_string(),
            color: (index % 3 != 0).then(|| COLORS[index % COLORS.len()].to_string()),
        },
    };

    NewProduct::new(code, name, price)
        .description(format!("Sample {} #{}", product_type, index))
        .stock(stock)
        .available(true)
        .details(details)
        .build()
}
