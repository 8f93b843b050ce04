//! # wrench-core: Pure Business Logic for Wrench POS
//!
//! This crate is the **heart** of Wrench POS: the rules that price a
//! workorder, tax it under two jurisdictions, freeze its totals when it is
//! paid, and reverse selected lines into refund workorders.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Wrench POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ wrench-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │  money   │  │ pricing  │  │ payment  │  │    refund    │   │   │
//! │  │   │ TaxRate  │  │ subtotal │  │ snapshot │  │  RefundPlan  │   │   │
//! │  │   │  Money   │  │  taxes   │  │  freeze  │  │ RefundIndex  │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │ register │  │  views   │  │  report  │  │  integrity   │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO GLOBAL CONFIG • PURE FUNCTIONS     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    wrench-db (Database Layer)                   │   │
//! │  │     SQLite repositories, atomic pay / refund / register close  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Decimal `Money` with round-half-up at storage boundaries
//! - [`types`] - Domain types (Workorder, WorkorderItem, Transaction, ...)
//! - [`config`] - Tax configuration value passed into the engine
//! - [`pricing`] - Subtotal, taxes, totals and discounts of a workorder
//! - [`payment`] - The paid-state transition and its ledger entry
//! - [`refund`] - Refund planning and fully-refunded detection
//! - [`register`] - Cash register reconciliation math
//! - [`edit`] - Whitelisted column edits
//! - [`views`] - Presentation payloads
//! - [`report`] - Sales report aggregation
//! - [`integrity`] - Diagnostic findings about stored data
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use wrench_core::TaxRate;
//!
//! let tvq: TaxRate = "0.09975".parse().unwrap();
//! let tax = tvq.apply(Decimal::new(7500, 2)); // 75.00
//!
//! // 75.00 × 0.09975 = 7.48125 → 7.48
//! assert_eq!(tax.to_string(), "$7.48");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod edit;
pub mod error;
pub mod integrity;
pub mod money;
pub mod payment;
pub mod pricing;
pub mod refund;
pub mod register;
pub mod report;
pub mod types;
pub mod validation;
pub mod views;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{TaxConfig, TaxDefinition};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::Pricing;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum absolute quantity on a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Refund lines carry the negated quantity, so the bound is on `|qty|`.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit price of a line or catalog item, in dollars.
///
/// Keeps `quantity × price` sums far inside `Decimal` range.
pub const MAX_UNIT_PRICE: i64 = 1_000_000;

/// Workorders shown per page in listings.
pub const WORKORDERS_PER_PAGE: u32 = 25;

/// Status given to every new workorder, including refund workorders.
pub const DEFAULT_WORKORDER_STATUS: &str = "open";

/// Comment attached to the float transaction recorded at register closing.
pub const CASH_FUND_COMMENT: &str = "Cash fund";
