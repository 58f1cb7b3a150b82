//! # Seed Data Generator
//!
//! Populates a development database with one seller and a catalogue of
//! products.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products (default)
//! cargo run -p market-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p market-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p market-db --bin seed -- --db ./data/marketplace.db
//! ```
//!
//! The seed seller's password hash is a non-PHC placeholder, so the account
//! cannot log in. Sign up a real seller through the API for that.

use anyhow::Context;
use market_core::{Money, NewProduct, ProductType};
use market_db::{Database, DbConfig};
use std::env;

const SEED_SELLER_EMAIL: &str = "seed-seller@marketplace.local";
const SEED_SELLER_NAME: &str = "Seed Seller";

/// Product families for realistic test data: (title, description).
const CATALOGUE: &[(&str, &str)] = &[
    ("Film Camera", "35mm rangefinder, light seals replaced"),
    ("Mechanical Keyboard", "Tenkeyless, brown switches"),
    ("Road Bike", "Aluminium frame, 54cm"),
    ("Espresso Machine", "Single boiler, includes tamper"),
    ("Vinyl Record", "First pressing, sleeve has minor wear"),
    ("Desk Lamp", "Adjustable arm, warm LED"),
    ("Board Game", "Complete set, all cards sleeved"),
    ("Running Shoes", "Size 42, worn twice"),
    ("Headphones", "Closed-back, detachable cable"),
    ("Rice Cooker", "1.8L, non-stick inner pot"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./data/marketplace.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1]
                        .parse()
                        .with_context(|| format!("invalid --count value: {}", args[i + 1]))?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Marketplace Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./data/marketplace.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Marketplace Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("failed to open database")?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let seller = match db.sellers().get_by_email(SEED_SELLER_EMAIL).await? {
        Some(seller) => seller,
        None => {
            db.sellers()
                .insert(SEED_SELLER_EMAIL, SEED_SELLER_NAME, "!")
                .await?
        }
    };
    println!("✓ Seller #{} ({})", seller.seller_id, seller.seller_name);

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let product = generate_product(seller.seller_id, seed);

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.title, e);
            continue;
        }

        generated += 1;
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single product with deterministic data.
fn generate_product(seller_id: i64, seed: usize) -> NewProduct {
    let (title, description) = CATALOGUE[seed % CATALOGUE.len()];

    // S$5.00 - S$299.99
    let price_cents = 500 + ((seed * 7919) % 29500) as i64;

    let product_type = if seed % 4 == 0 {
        ProductType::PreOrder
    } else {
        ProductType::BuyNow
    };

    NewProduct {
        seller_id,
        title: format!("{} #{}", title, seed + 1),
        description: description.to_string(),
        product_type,
        price: Money::from_cents(price_cents),
        condition: (seed % 6) as i64,
        product_quantity: 1 + (seed % 10) as i64,
    }
}
