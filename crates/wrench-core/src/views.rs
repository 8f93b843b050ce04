//! # Presentation Payloads
//!
//! JSON shapes consumed by the workorder screen. Amounts are 2-decimal
//! strings; refund links are a workorder id or `false`.
//!
//! ```json
//! {
//!   "id": "…", "name": "Chain KMC X10", "quantity": "-1.00", "taxable": true,
//!   "price": "34.99", "original_price": "34.99", "item_type": "article",
//!   "refund_source_workorder_id": "…", "refunded_into_workorder_id": false
//! }
//! ```

use serde::{Serialize, Serializer};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::{round_half_up, Money, MONEY_DP};
use crate::pricing::Pricing;
use crate::refund::RefundIndex;
use crate::types::{ItemType, WorkorderItem};

fn id_or_false<S: Serializer>(id: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match id {
        Some(id) => serializer.serialize_str(id),
        None => serializer.serialize_bool(false),
    }
}

fn two_decimals(value: rust_decimal::Decimal) -> String {
    let mut value = round_half_up(value, MONEY_DP);
    value.rescale(MONEY_DP);
    value.to_string()
}

// =============================================================================
// Line Item View
// =============================================================================

/// One line as the screen shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct LineItemView {
    pub id: String,
    pub name: String,
    pub quantity: String,
    pub taxable: bool,
    pub price: String,
    pub original_price: String,
    /// `None` for lines without a catalog entry.
    pub item_type: Option<ItemType>,
    /// Workorder holding the line this one reverses.
    #[serde(serialize_with = "id_or_false")]
    #[ts(type = "string | false")]
    pub refund_source_workorder_id: Option<String>,
    /// Workorder holding the line that reverses this one.
    #[serde(serialize_with = "id_or_false")]
    #[ts(type = "string | false")]
    pub refunded_into_workorder_id: Option<String>,
}

impl LineItemView {
    pub fn new(item: &WorkorderItem, item_type: Option<ItemType>, index: &RefundIndex) -> Self {
        LineItemView {
            id: item.id.clone(),
            name: item.name.clone(),
            quantity: two_decimals(item.quantity),
            taxable: item.taxable,
            price: two_decimals(item.unit_price),
            original_price: item.original_price.to_fixed(),
            item_type,
            refund_source_workorder_id: index.refund_source(&item.id).map(str::to_string),
            refunded_into_workorder_id: index.refunded_into(&item.id).map(str::to_string),
        }
    }
}

// =============================================================================
// Totals View
// =============================================================================

/// Totals box of the workorder screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct WorkorderTotalsView {
    pub subtotal: String,
    pub discount: String,
    pub taxes1: String,
    pub taxes2: String,
    pub taxes: String,
    pub total: String,
    pub item_count: usize,
    pub paid: bool,
}

impl WorkorderTotalsView {
    /// Canonical values: frozen once paid, live otherwise.
    pub fn new(pricing: &Pricing<'_>, paid: bool) -> CoreResult<Self> {
        let fixed = |m: Money| m.to_fixed();
        Ok(WorkorderTotalsView {
            subtotal: fixed(pricing.subtotal(false)),
            discount: fixed(pricing.total_discounts(false)?),
            taxes1: fixed(pricing.taxes1(false)),
            taxes2: fixed(pricing.taxes2(false)),
            taxes: fixed(pricing.taxes(false)),
            total: fixed(pricing.total(false)),
            item_count: pricing.item_count(),
            paid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaxConfig;
    use crate::types::{InventoryItem, Workorder};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_view_serialization() {
        let catalog = InventoryItem::new("Brake pads", Money::from_cents(1999), ItemType::Article);
        let mut line = WorkorderItem::from_catalog("wo-1", &catalog, Utc::now());
        line.unit_price = dec!(17.995);

        let view = LineItemView::new(&line, Some(ItemType::Article), &RefundIndex::new());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["price"], "18.00");
        assert_eq!(json["original_price"], "19.99");
        assert_eq!(json["quantity"], "1.00");
        assert_eq!(json["item_type"], "article");
        assert_eq!(json["refund_source_workorder_id"], false);
        assert_eq!(json["refunded_into_workorder_id"], false);
    }

    #[test]
    fn test_refund_links_exposed() {
        let catalog = InventoryItem::new("Tube", Money::from_cents(850), ItemType::Article);
        let source = WorkorderItem::from_catalog("wo-1", &catalog, Utc::now());
        let refund = source.refund_of("wo-2", Utc::now());

        let mut index = RefundIndex::new();
        index.record(&refund, "wo-1");

        let source_json = serde_json::to_value(LineItemView::new(&source, None, &index)).unwrap();
        assert_eq!(source_json["refunded_into_workorder_id"], "wo-2");
        assert_eq!(source_json["refund_source_workorder_id"], false);
        assert!(source_json["item_type"].is_null());

        let refund_json = serde_json::to_value(LineItemView::new(&refund, None, &index)).unwrap();
        assert_eq!(refund_json["refund_source_workorder_id"], "wo-1");
        assert_eq!(refund_json["quantity"], "-1.00");
    }

    #[test]
    fn test_totals_view() {
        let wo = Workorder::new(None, Utc::now());
        let catalog = InventoryItem::new("Overhaul", Money::from_cents(7500), ItemType::Labor);
        let items = vec![WorkorderItem::from_catalog(&wo.id, &catalog, Utc::now())];
        let taxes = TaxConfig::default();

        let view = WorkorderTotalsView::new(&Pricing::new(&wo, &items, &taxes), wo.is_paid()).unwrap();
        assert_eq!(view.subtotal, "75.00");
        assert_eq!(view.discount, "0.00");
        assert_eq!(view.taxes1, "3.75");
        assert_eq!(view.taxes2, "7.48");
        assert_eq!(view.taxes, "11.23");
        assert_eq!(view.total, "86.23");
        assert_eq!(view.item_count, 1);
        assert!(!view.paid);
    }
}
