//! # wrench-db: Database Layer for Wrench POS
//!
//! SQLite storage for the workorder engine, with sqlx for async access.
//! Business decisions come from `wrench-core`; this crate loads rows,
//! asks the core what to do, and writes the result atomically.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Wrench POS Data Flow                             │
//! │                                                                         │
//! │  front end / seed binary                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    wrench-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ WorkorderRepo  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ItemRepo       │    │ 001_initial  │  │   │
//! │  │   │ ShopConfig    │    │ RegisterRepo   │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/wrench-pos/wrench.db                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Shop configuration (TOML file + environment)
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`integrity`] - Diagnostic pass over stored data
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wrench_db::{Database, ShopConfig};
//! use wrench_core::PaymentMethod;
//!
//! let config = ShopConfig::load(None)?;
//! let taxes = config.tax_config()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let wo = db.workorders().create(None).await?;
//! db.items().add_item(&wo.id, &tube_id).await?;
//! db.workorders().pay(&wo.id, PaymentMethod::Cash, &taxes).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod integrity;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, ConfigResult, ShopConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{
    ClientRepository, InventoryRepository, ItemRepository, RegisterRepository, ReportRepository,
    TransactionRepository, WorkorderRepository,
};
