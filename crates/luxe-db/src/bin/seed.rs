//! # Seed Data Generator
//!
//! Populates the database with sample catalog products and promo codes for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p luxe-db --bin seed
//!
//! # Specify database path
//! cargo run -p luxe-db --bin seed -- --db ./data/luxe.db
//! ```
//!
//! Idempotent: refuses to seed a database that already has products.

use chrono::{Duration, Utc};
use std::env;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use luxe_core::{Product, PromoKind, Promotion};
use luxe_db::{Database, DbConfig};

/// Sample catalog: (name, description, price_cents, category, featured)
const PRODUCTS: &[(&str, &str, i64, &str, bool)] = &[
    (
        "Premium Leather Jacket",
        "High-quality leather jacket with modern design",
        29999,
        "Outerwear",
        true,
    ),
    (
        "Designer Handbag",
        "Luxury handbag with premium materials",
        49999,
        "Accessories",
        true,
    ),
    (
        "Silk Dress",
        "Elegant silk dress for special occasions",
        19999,
        "Dresses",
        false,
    ),
    (
        "Classic Watch",
        "Timeless watch with leather strap",
        39999,
        "Accessories",
        true,
    ),
    (
        "Cashmere Scarf",
        "Soft cashmere scarf in seasonal colors",
        8999,
        "Accessories",
        false,
    ),
    (
        "Wool Overcoat",
        "Tailored wool overcoat for winter",
        34999,
        "Outerwear",
        false,
    ),
    (
        "Linen Shirt",
        "Breathable linen shirt, relaxed fit",
        6999,
        "Shirts",
        false,
    ),
    (
        "Suede Boots",
        "Hand-finished suede ankle boots",
        24999,
        "Footwear",
        true,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./luxe_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Luxe Commerce Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./luxe_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, "Connecting");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    info!("Migrations applied");

    // Check existing products - seeding twice would duplicate the catalog
    let existing = db.products().count().await?;
    if existing > 0 {
        info!(
            existing,
            "Database already seeded; delete the file to regenerate"
        );
        return Ok(());
    }

    let now = Utc::now();

    for (name, description, price_cents, category, featured) in PRODUCTS {
        db.products()
            .insert(&Product {
                id: Uuid::new_v4().to_string(),
                name: (*name).to_string(),
                description: Some((*description).to_string()),
                price_cents: *price_cents,
                category: Some((*category).to_string()),
                image_url: Some("/placeholder.svg".to_string()),
                featured: *featured,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    info!(count = PRODUCTS.len(), "Products seeded");

    // A couple of live promo codes to exercise checkout against
    let promos = [
        Promotion {
            code: "WELCOME10".to_string(),
            kind: PromoKind::Percentage { bps: 1000 },
            usage_limit: None,
            uses: 0,
            per_customer_only: true,
            expires_at: None,
            active: true,
            created_at: now,
            updated_at: now,
        },
        Promotion {
            code: "SAVE20".to_string(),
            kind: PromoKind::Fixed { amount_cents: 2000 },
            usage_limit: Some(500),
            uses: 0,
            per_customer_only: false,
            expires_at: Some(now + Duration::days(90)),
            active: true,
            created_at: now,
            updated_at: now,
        },
    ];
    for promo in &promos {
        db.promos().insert(promo).await?;
    }
    info!(count = promos.len(), "Promotions seeded");

    info!("Seed complete");
    Ok(())
}
