//! # Seed Data Generator
//!
//! Populates the database with a small demo bar for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./tally_dev.db
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! ## Generated Data
//! - Cocktails made from recipes (spirits, citrus, syrups)
//! - Draft and bottled beer linked directly to kegs and cases
//! - Merch with no stock tracking
//! - A few tab customers, one close to their limit
//! - Today's first sale, ready to void

use chrono::Utc;
use std::collections::HashMap;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tally_core::Money;
use tally_db::{Database, DbConfig, NewCustomer, NewIngredient, NewProduct, NewSale, SettingsStore};

/// (name, unit, package size, on hand, par level, unit cost in cents)
const INGREDIENTS: &[(&str, &str, f64, f64, Option<f64>, Option<i64>)] = &[
    ("Bourbon", "oz", 25.4, 60.0, Some(50.0), Some(95)),
    ("Gin", "oz", 25.4, 18.0, Some(25.0), Some(80)),
    ("White Rum", "oz", 25.4, 40.0, Some(25.0), Some(70)),
    ("Lime Juice", "oz", 32.0, 6.0, Some(16.0), Some(12)),
    ("Simple Syrup", "oz", 32.0, 30.0, Some(8.0), Some(4)),
    ("Angostura Bitters", "dash", 200.0, 150.0, None, Some(2)),
    ("Tonic Water", "each", 1.0, 24.0, Some(12.0), Some(60)),
    ("House Lager Keg", "pint", 1.0, 110.0, Some(30.0), Some(140)),
    ("Stout Keg", "pint", 1.0, 4.0, Some(30.0), Some(170)),
    ("IPA Bottles", "each", 24.0, 96.0, Some(48.0), Some(110)),
];

/// (name, category, price in cents, linked ingredient, recipe lines)
type ProductSeed = (&'static str, &'static str, i64, Option<&'static str>, &'static [(&'static str, f64)]);

const PRODUCTS: &[ProductSeed] = &[
    (
        "Old Fashioned",
        "Cocktails",
        1400,
        None,
        &[("Bourbon", 2.0), ("Simple Syrup", 0.25), ("Angostura Bitters", 2.0)],
    ),
    (
        "Daiquiri",
        "Cocktails",
        1200,
        None,
        &[("White Rum", 2.0), ("Lime Juice", 1.0), ("Simple Syrup", 0.75)],
    ),
    (
        "Gin & Tonic",
        "Cocktails",
        1100,
        None,
        &[("Gin", 1.5), ("Tonic Water", 1.0), ("Lime Juice", 0.25)],
    ),
    ("House Lager", "Beer", 700, Some("House Lager Keg"), &[]),
    ("Stout", "Beer", 800, Some("Stout Keg"), &[]),
    ("IPA (case)", "Beer", 9600, Some("IPA Bottles"), &[]),
    ("Logo T-Shirt", "Merch", 2500, None, &[]),
];

/// (name, email, credit limit in cents, opening balance in cents)
const CUSTOMERS: &[(&str, Option<&str>, Option<i64>, i64)] = &[
    ("Jordan Reyes", Some("jordan@example.com"), Some(50_000), 12_500),
    ("Casey Lin", None, Some(20_000), 17_000),
    ("Morgan Blake", Some("morgan@example.com"), None, 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./tally_dev.db");

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
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let settings = SettingsStore::from_env()?.current().await;
    let catalog = db.catalog();

    println!("✓ Connected to database");

    let existing = catalog.count_products().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Ingredients
    let mut ingredient_ids: HashMap<&str, String> = HashMap::new();
    for (name, unit, package_size, on_hand, par_level, unit_cost) in INGREDIENTS {
        let ingredient = catalog
            .create_ingredient(NewIngredient {
                name: name.to_string(),
                unit: unit.to_string(),
                package_size: *package_size,
                par_level: *par_level,
                current_quantity: *on_hand,
                unit_cost: unit_cost.map(Money::from_cents),
            })
            .await?;
        ingredient_ids.insert(*name, ingredient.id);
    }
    println!("✓ Created {} ingredients", ingredient_ids.len());

    // Products
    let mut category_ids: HashMap<&str, String> = HashMap::new();
    for (name, category, price_cents, linked, recipe) in PRODUCTS {
        let category_id = match category_ids.get(category) {
            Some(id) => id.clone(),
            None => {
                let created = catalog.create_category(category).await?;
                category_ids.insert(*category, created.id.clone());
                created.id
            }
        };

        let product = catalog
            .create_product(NewProduct {
                name: name.to_string(),
                category_id: Some(category_id),
                price: Money::from_cents(*price_cents),
                linked_ingredient_id: linked.and_then(|l| ingredient_ids.get(l).cloned()),
            })
            .await?;

        for (ingredient, quantity) in recipe.iter() {
            if let Some(ingredient_id) = ingredient_ids.get(ingredient) {
                catalog
                    .add_recipe_item(&product.id, ingredient_id, *quantity)
                    .await?;
            }
        }

        let availability = catalog.availability(&product.id).await?;
        let margin = catalog.product_margin(&product.id).await?;
        println!(
            "  {:<16} {:>9}  {:?} ({})  margin {}",
            name,
            settings.format_currency(product.price()),
            availability.status,
            availability
                .quantity_available
                .map(|q| q.to_string())
                .unwrap_or_else(|| "unlimited".to_string()),
            margin
                .and_then(|m| m.margin_percent)
                .map(|p| format!("{p:.1}%"))
                .unwrap_or_else(|| "n/a".to_string()),
        );
    }
    println!("✓ Created {} products", PRODUCTS.len());

    for category in catalog.list_categories().await? {
        let health = catalog.category_health(&category.id).await?;
        println!(
            "  {:<10} {} products, {} need attention",
            category.name,
            health.total(),
            health.needing_attention()
        );
    }

    // Customers
    let tabs = db.tabs();
    for (name, email, limit, balance) in CUSTOMERS {
        let customer = tabs
            .create_customer(
                NewCustomer {
                    name: name.to_string(),
                    email: email.map(str::to_string),
                    credit_limit: limit.map(Money::from_cents),
                },
                &settings,
            )
            .await?;

        if *balance > 0 {
            tabs.charge(&customer.id, Money::from_cents(*balance), false)
                .await?;
        }

        let summary = tabs.credit_summary(&customer.id).await?;
        println!(
            "  {:<14} owes {} of {} ({:?})",
            name,
            settings.format_currency(summary.balance),
            settings.format_currency(summary.credit_limit),
            summary.level
        );
    }
    println!("✓ Created {} customers", CUSTOMERS.len());

    // One sale to practise voids on
    let sale = db
        .transactions()
        .record_sale(NewSale {
            customer_id: None,
            employee_id: "bartender-1".to_string(),
            total: Money::from_cents(2600),
            created_at: Utc::now(),
        })
        .await?;
    println!("✓ Recorded sale {}", sale.receipt_number);

    info!(path = %db_path, "Seed complete");
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tally_db=trace` - Show trace for the database layer only
/// - Default: INFO, DEBUG for tally crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();
}
