//! # Repository Module
//!
//! Database repository implementations for Wrench POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  caller                                                                 │
//! │    │  db.workorders().pay(&id, PaymentMethod::Cash, &taxes)             │
//! │    ▼                                                                    │
//! │  WorkorderRepository ──► wrench-core decides (prepare_payment)          │
//! │    │                                                                    │
//! │    │  one sqlx transaction: guarded UPDATE + ledger INSERT             │
//! │    ▼                                                                    │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decimals live in TEXT columns in fixed form and are parsed back through
//! the helpers below. Row-level helpers take `&mut SqliteConnection` so the
//! same code runs on a pooled connection or inside a transaction.
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`] - Clients and their editable columns
//! - [`InventoryRepository`] - Catalog lookup
//! - [`WorkorderRepository`] - Workorders, pay, refund, totals
//! - [`ItemRepository`] - Line items on unpaid workorders
//! - [`TransactionRepository`] - Ledger reads and cash adjustments
//! - [`RegisterRepository`] - Register closings
//! - [`ReportRepository`] - Sales report

pub mod client;
pub mod inventory;
pub mod item;
pub mod register;
pub mod report;
pub mod transaction;
pub mod workorder;

pub use client::ClientRepository;
pub use inventory::InventoryRepository;
pub use item::ItemRepository;
pub use register::RegisterRepository;
pub use report::ReportRepository;
pub use transaction::TransactionRepository;
pub use workorder::WorkorderRepository;

use rust_decimal::Decimal;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use wrench_core::edit::ColumnValue;
use wrench_core::{Money, TaxRate};

use crate::error::{DbError, DbResult};

// =============================================================================
// Stored Value Helpers
// =============================================================================

pub(crate) fn parse_decimal(table: &'static str, column: &'static str, value: &str) -> DbResult<Decimal> {
    value
        .parse::<Decimal>()
        .map_err(|e| DbError::invalid_data(table, column, e))
}

pub(crate) fn parse_money(table: &'static str, column: &'static str, value: &str) -> DbResult<Money> {
    parse_decimal(table, column, value).map(Money::from_decimal)
}

pub(crate) fn parse_rate(table: &'static str, column: &'static str, value: &str) -> DbResult<TaxRate> {
    value
        .parse::<TaxRate>()
        .map_err(|e| DbError::invalid_data(table, column, e))
}

/// Binds a whitelisted edit value.
pub(crate) fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: ColumnValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        ColumnValue::Text(text) => query.bind(text),
        ColumnValue::Bool(flag) => query.bind(flag),
        ColumnValue::OptionalInt(number) => query.bind(number),
        ColumnValue::Timestamp(at) => query.bind(at),
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use wrench_core::{InventoryItem, ItemType, Money, TaxConfig};

    use crate::pool::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn taxes() -> TaxConfig {
        TaxConfig::default()
    }

    /// Inserts a taxable catalog item.
    pub async fn catalog(db: &Database, name: &str, cents: i64, item_type: ItemType) -> InventoryItem {
        let item = InventoryItem::new(name, Money::from_cents(cents), item_type);
        db.inventory().create(&item).await.unwrap();
        item
    }

    /// Creates a workorder with one line per catalog item.
    pub async fn workorder_with(db: &Database, catalog: &[&InventoryItem]) -> String {
        let wo = db.workorders().create(None).await.unwrap();
        for item in catalog {
            db.items().add_item(&wo.id, &item.id).await.unwrap();
        }
        wo.id
    }
}
