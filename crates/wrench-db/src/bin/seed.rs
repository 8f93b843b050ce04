//! # Demo Data Seeder
//!
//! Fills a database with a small bike shop: catalog, clients, a few
//! workorders taken through payment and refund, and one register closing.
//!
//! ## Usage
//! ```bash
//! # Use the configured database (wrench.toml / WRENCH_DB_PATH)
//! cargo run -p wrench-db --bin seed
//!
//! # Explicit paths
//! cargo run -p wrench-db --bin seed -- --db ./wrench_dev.db --config ./wrench.toml
//! ```
//!
//! The seeder refuses to touch a database that already has workorders.

use chrono::Utc;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wrench_core::{Client, InventoryItem, ItemType, Money, PaymentMethod, SpecialMeaning};
use wrench_db::{Database, ShopConfig};

/// `(name, cents, type, quick_add)`
const CATALOG: &[(&str, i64, ItemType, bool)] = &[
    ("Mise au point de base", 4500, ItemType::Labor, true),
    ("Mise au point complète", 7500, ItemType::Labor, true),
    ("Installation chambre à air", 1000, ItemType::Labor, true),
    ("Ajustement freins", 1500, ItemType::Labor, true),
    ("Chambre à air 700x25", 850, ItemType::Article, true),
    ("Chambre à air 26x2.1", 900, ItemType::Article, false),
    ("Chaîne KMC X10", 3499, ItemType::Article, true),
    ("Patins de frein", 1999, ItemType::Article, false),
    ("Câble de frein", 999, ItemType::Article, false),
    ("Pneu 700x28", 4299, ItemType::Article, false),
];

/// `(first, last, postal code)`
const CLIENTS: &[(&str, &str, &str)] = &[
    ("Marie", "Tremblay", "H2X 1Y4"),
    ("Luc", "Gagnon", "H2T 2B2"),
    ("Ana", "Roy", ""),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Wrench POS Demo Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: from config)");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = ShopConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = Some(path);
    }
    let taxes = config.tax_config()?;

    println!("Wrench POS Demo Seeder");
    println!("======================");
    println!("Shop:     {}", config.shop.name);
    println!("Database: {}", config.database_path().display());
    println!(
        "Taxes:    {} {} / {} {}",
        taxes.tax1.name, taxes.tax1.rate, taxes.tax2.name, taxes.tax2.rate
    );
    println!();

    let db = Database::new(config.db_config()).await?;

    if !db.workorders().list_page(1).await?.is_empty() {
        println!("Database already has workorders, skipping seed.");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    let mut catalog = Vec::new();
    for (name, cents, item_type, quick_add) in CATALOG {
        let mut item = InventoryItem::new(name, Money::from_cents(*cents), *item_type);
        item.quick_add = *quick_add;
        db.inventory().create(&item).await?;
        catalog.push(item);
    }
    let mut membership = InventoryItem::new("Membership (1 year)", Money::from_cents(2000), ItemType::Other);
    membership.taxable = false;
    membership.special_meaning = SpecialMeaning::Membership;
    db.inventory().create(&membership).await?;
    println!("✓ {} catalog items", catalog.len() + 1);

    // Clients
    let mut clients = Vec::new();
    for (first, last, postal_code) in CLIENTS {
        let mut client = Client::new(first, last, Utc::now());
        client.postal_code = postal_code.to_string();
        db.clients().create(&client).await?;
        clients.push(client);
    }
    println!("✓ {} clients", clients.len());

    // Workorders: one paid per client, each with a labor and an article line
    let methods = [PaymentMethod::Cash, PaymentMethod::Visa, PaymentMethod::Interac];
    let mut paid = Vec::new();
    for (n, (client, method)) in clients.iter().zip(methods).enumerate() {
        let wo = db.workorders().create(Some(&client.id)).await?;
        db.workorders()
            .edit_column(&wo.id, "bike_description", "Vélo hybride bleu")
            .await?;
        db.items().add_item(&wo.id, &catalog[n % 4].id).await?;
        db.items().add_item(&wo.id, &catalog[4 + n].id).await?;

        let wo = db.workorders().pay(&wo.id, method, &taxes).await?;
        if let Some(snapshot) = &wo.paid {
            println!("✓ Workorder for {} paid {} by {}", client.name(), snapshot.total, method);
        }
        paid.push(wo);
    }

    // One open workorder still in the shop
    let open = db.workorders().create(Some(&clients[0].id)).await?;
    db.items().add_item(&open.id, &catalog[1].id).await?;
    db.items().add_item(&open.id, &membership.id).await?;
    let totals = db.workorders().totals(&open.id, &taxes).await?;
    println!("✓ Open workorder, current total {}", totals.total);

    // Refund the article line of the first paid workorder
    let lines = db.items().list(&paid[0].id).await?;
    let selected: Vec<String> = lines.iter().skip(1).map(|l| l.id.clone()).collect();
    let refund_id = db.workorders().refund(&paid[0].id, &selected).await?;
    let refund = db.workorders().pay(&refund_id, PaymentMethod::Cash, &taxes).await?;
    if let Some(snapshot) = &refund.paid {
        println!("✓ Refund workorder paid {}", snapshot.total);
    }

    // Close the register on exactly what is expected
    let expected = db.register().expected_since_last_close().await?;
    let state = db
        .register()
        .close_register(
            expected,
            Money::from_cents(15000),
            Some("Demo closing"),
        )
        .await?;
    println!(
        "✓ Register closed: cash {} / visa {} / interac {}",
        state.confirmed.cash, state.confirmed.visa, state.confirmed.interac
    );

    let today = Utc::now().date_naive();
    let report = db.reports().sales_report(today, today, &taxes).await?;
    println!();
    println!("Sales today: {} workorders, total {}", report.workorder_count, report.total);
    for sold in &report.items_sold {
        println!("  {:>6}  {}", sold.quantity, sold.name);
    }
    println!("Clients by postal code:");
    for count in &report.postal_codes.top {
        println!("  {:>6}  {}", count.clients, count.prefix);
    }
    println!("  {:>6}  Others", report.postal_codes.others);
    println!("  {:>6}  Unknown", report.postal_codes.unknown);

    let integrity = db.check_integrity().await?;
    info!(clean = integrity.is_clean(), "Seed complete");
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Logs to stderr. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wrench_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
