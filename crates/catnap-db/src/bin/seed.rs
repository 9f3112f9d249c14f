//! # Seed Data Generator
//!
//! Populates the catalog with rooms, services and food for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p catnap-db --bin seed
//!
//! # Specify database path
//! cargo run -p catnap-db --bin seed -- --db ./data/catnap.db
//! ```
//!
//! ## Generated Catalog
//! - Rooms in three tiers (standard, deluxe, suite)
//! - Grooming and care services
//! - Food items
//!
//! Running twice is safe: an already seeded database is left alone.

use catnap_core::{Actor, Money};
use catnap_db::{Database, EngineConfig};
use std::env;
use tracing_subscriber::EnvFilter;

/// Room tiers: (name prefix, nightly price in cents, capacity, count)
const ROOMS: &[(&str, i64, i64, usize)] = &[
    ("Standard", 2000, 1, 6),
    ("Deluxe", 3500, 2, 4),
    ("Suite", 6000, 4, 2),
];

const SERVICES: &[(&str, i64)] = &[
    ("Grooming", 2500),
    ("Nail Trim", 800),
    ("Play Session", 500),
    ("Vet Check", 4000),
    ("Photo Update", 300),
];

const FOOD: &[(&str, i64)] = &[
    ("Premium Wet Food", 500),
    ("Grain-Free Kibble", 350),
    ("Salmon Treats", 250),
    ("Kitten Formula", 450),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = EngineConfig::load()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Catnap Hotel Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $CATNAP_DATABASE_PATH or ./catnap.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🐈 Catnap Hotel Seed Data Generator");
    println!("===================================");
    println!("Database: {}", config.database_path);
    println!();

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().count_rooms().await?;
    if existing > 0 {
        println!("⚠ Database already has {} rooms", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let admin = Actor::admin("seed");
    let catalog = db.catalog();

    let mut rooms = 0;
    for (tier, price_cents, capacity, count) in ROOMS {
        for n in 1..=*count {
            let name = format!("{} {}", tier, n);
            catalog
                .insert_room(&admin, &name, Money::from_cents(*price_cents), *capacity)
                .await?;
            rooms += 1;
        }
    }
    println!("✓ Created {} rooms", rooms);

    for (name, price_cents) in SERVICES {
        catalog
            .insert_service(&admin, name, Money::from_cents(*price_cents))
            .await?;
    }
    println!("✓ Created {} services", SERVICES.len());

    for (name, price_cents) in FOOD {
        catalog
            .insert_food(&admin, name, Money::from_cents(*price_cents))
            .await?;
    }
    println!("✓ Created {} food items", FOOD.len());

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
