//! # Sales Report
//!
//! Aggregates paid workorders over an inclusive date range, plus where the
//! shop's clients live.
//!
//! ```text
//!  paid workorders with paid_at::date ∈ [start, end]
//!        │
//!        ├──► Σ frozen subtotal / taxes1 / taxes2 / taxes / total
//!        ├──► Σ total discounts, workorder count
//!        └──► article lines ──► quantity per catalog item, most sold first
//!
//!  all clients ──► postal code prefix (FSA, "H2X")
//!        └──► top 5 prefixes │ others │ unknown (blank postal code)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::Pricing;

/// Number of postal code prefixes listed individually in the report.
pub const TOP_POSTAL_PREFIXES: usize = 5;

/// Characters of a postal code that make up its prefix (the Canadian FSA).
pub const POSTAL_PREFIX_LEN: usize = 3;

/// Quantity sold of one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ItemSold {
    pub inventory_item_id: String,
    pub name: String,
    #[ts(as = "String")]
    pub quantity: Decimal,
}

/// Totals for the report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SalesReport {
    #[ts(as = "String")]
    pub date_start: NaiveDate,
    #[ts(as = "String")]
    pub date_end: NaiveDate,
    pub workorder_count: usize,
    #[ts(as = "String")]
    pub subtotal: Money,
    #[ts(as = "String")]
    pub taxes1: Money,
    #[ts(as = "String")]
    pub taxes2: Money,
    #[ts(as = "String")]
    pub taxes: Money,
    #[ts(as = "String")]
    pub total: Money,
    #[ts(as = "String")]
    pub total_discounts: Money,
    pub items_sold: Vec<ItemSold>,
    pub postal_codes: PostalCodeDistribution,
}

impl SalesReport {
    /// An empty report. `start` must not be after `end`.
    pub fn new(date_start: NaiveDate, date_end: NaiveDate) -> Result<Self, ValidationError> {
        if date_start > date_end {
            return Err(ValidationError::OutOfRange {
                field: "date_start".to_string(),
                min: "-".to_string(),
                max: date_end.to_string(),
            });
        }
        Ok(SalesReport {
            date_start,
            date_end,
            workorder_count: 0,
            subtotal: Money::zero(),
            taxes1: Money::zero(),
            taxes2: Money::zero(),
            taxes: Money::zero(),
            total: Money::zero(),
            total_discounts: Money::zero(),
            items_sold: Vec::new(),
            postal_codes: PostalCodeDistribution::default(),
        })
    }

    /// Whether a payment date falls in the window (by calendar day).
    pub fn includes(&self, paid_at: DateTime<Utc>) -> bool {
        let day = paid_at.date_naive();
        self.date_start <= day && day <= self.date_end
    }

    /// Adds one paid workorder's canonical values.
    pub fn add_workorder(&mut self, pricing: &Pricing<'_>) -> CoreResult<()> {
        self.subtotal += pricing.subtotal(false);
        self.taxes1 += pricing.taxes1(false);
        self.taxes2 += pricing.taxes2(false);
        self.taxes += pricing.taxes(false);
        self.total += pricing.total(false);
        self.total_discounts += pricing.total_discounts(false)?;
        self.workorder_count += 1;
        Ok(())
    }

    /// Sets the per-item quantities, most sold first (ties by name).
    pub fn set_items_sold(&mut self, items_sold: ItemsSoldTally) {
        self.items_sold = items_sold.finish();
    }

    pub fn set_postal_codes(&mut self, postal_codes: PostalCodeTally) {
        self.postal_codes = postal_codes.finish();
    }
}

/// Accumulates quantities per catalog item.
#[derive(Debug, Default)]
pub struct ItemsSoldTally {
    by_item: HashMap<String, ItemSold>,
}

impl ItemsSoldTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, inventory_item_id: &str, name: &str, quantity: Decimal) {
        self.by_item
            .entry(inventory_item_id.to_string())
            .and_modify(|sold| sold.quantity += quantity)
            .or_insert_with(|| ItemSold {
                inventory_item_id: inventory_item_id.to_string(),
                name: name.to_string(),
                quantity,
            });
    }

    fn finish(self) -> Vec<ItemSold> {
        let mut sold: Vec<_> = self.by_item.into_values().collect();
        sold.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
        sold
    }
}

// =============================================================================
// Client Postal Codes
// =============================================================================

/// Clients sharing one postal code prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PostalCodeCount {
    pub prefix: String,
    pub clients: usize,
}

/// Client distribution by postal code prefix.
///
/// `top` holds the [`TOP_POSTAL_PREFIXES`] most common prefixes, most
/// clients first (ties by prefix). Every client lands in exactly one of
/// `top`, `others` or `unknown`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PostalCodeDistribution {
    pub top: Vec<PostalCodeCount>,
    pub others: usize,
    pub unknown: usize,
}

impl PostalCodeDistribution {
    pub fn client_count(&self) -> usize {
        self.top.iter().map(|c| c.clients).sum::<usize>() + self.others + self.unknown
    }
}

/// Prefix of a postal code: first three characters, uppercased.
/// Blank codes have no prefix.
///
/// ## Example
/// ```rust
/// use wrench_core::report::postal_prefix;
///
/// assert_eq!(postal_prefix(" h2x 1y4"), Some("H2X".to_string()));
/// assert_eq!(postal_prefix("  "), None);
/// ```
pub fn postal_prefix(postal_code: &str) -> Option<String> {
    let code = postal_code.trim();
    if code.is_empty() {
        return None;
    }
    Some(code.chars().take(POSTAL_PREFIX_LEN).collect::<String>().to_uppercase())
}

/// Accumulates client counts per postal code prefix.
#[derive(Debug, Default)]
pub struct PostalCodeTally {
    by_prefix: HashMap<String, usize>,
    unknown: usize,
}

impl PostalCodeTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `clients` clients whose postal code starts with `prefix`.
    /// A blank prefix counts as unknown.
    pub fn record(&mut self, prefix: &str, clients: usize) {
        match postal_prefix(prefix) {
            Some(prefix) => *self.by_prefix.entry(prefix).or_insert(0) += clients,
            None => self.unknown += clients,
        }
    }

    fn finish(self) -> PostalCodeDistribution {
        let mut counts: Vec<_> = self
            .by_prefix
            .into_iter()
            .map(|(prefix, clients)| PostalCodeCount { prefix, clients })
            .collect();
        counts.sort_by(|a, b| b.clients.cmp(&a.clients).then_with(|| a.prefix.cmp(&b.prefix)));

        let rest = counts.split_off(counts.len().min(TOP_POSTAL_PREFIXES));
        PostalCodeDistribution {
            top: counts,
            others: rest.iter().map(|c| c.clients).sum(),
            unknown: self.unknown,
        }
    }
}
