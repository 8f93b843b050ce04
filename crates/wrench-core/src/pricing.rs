//! # Workorder Pricing Engine
//!
//! Subtotal, taxes, total and discounts of one workorder.
//!
//! ## Frozen vs Live
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Which value does a query return?                     │
//! │                                                                         │
//! │                     force_calc = false      force_calc = true           │
//! │                   ┌──────────────────────┬──────────────────────┐       │
//! │   paid            │  FROZEN snapshot     │  live recomputation  │       │
//! │                   ├──────────────────────┼──────────────────────┤       │
//! │   unpaid          │  live recomputation  │  live recomputation  │       │
//! │                   └──────────────────────┴──────────────────────┘       │
//! │                                                                         │
//! │   Once paid, the frozen snapshot is the canonical invoice value.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sum-then-round
//! ```text
//! lines:   1.15 (taxable)  1.10 (taxable)      rate 0.15
//!
//! subtotal = round(1.15 + 1.10, 2)             = 2.25
//! taxes    = round((1.15 + 1.10) × 0.15, 2)    = round(0.3375) = 0.34
//! total    = 2.25 + 0.34                       = 2.59
//! ```
//! Taxes are computed on the taxable-lines sum, never by adding per-line
//! rounded taxes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::TaxConfig;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaidSnapshot, Workorder, WorkorderItem};

/// Read-only pricing view over a workorder and its lines.
///
/// `taxes` are the currently configured rates; they only matter for live
/// computations.
#[derive(Debug, Clone, Copy)]
pub struct Pricing<'a> {
    workorder: &'a Workorder,
    items: &'a [WorkorderItem],
    taxes: &'a TaxConfig,
}

impl<'a> Pricing<'a> {
    pub fn new(workorder: &'a Workorder, items: &'a [WorkorderItem], taxes: &'a TaxConfig) -> Self {
        Pricing {
            workorder,
            items,
            taxes,
        }
    }

    /// The frozen snapshot, unless `force_calc` asks for live values.
    fn frozen(&self, force_calc: bool) -> Option<&'a PaidSnapshot> {
        if force_calc {
            None
        } else {
            self.workorder.paid.as_ref()
        }
    }

    fn taxable_base(&self) -> Decimal {
        self.items
            .iter()
            .filter(|item| item.taxable)
            .map(WorkorderItem::line_total)
            .sum()
    }

    /// Subtotal of all lines, taxable or not.
    pub fn subtotal(&self, force_calc: bool) -> Money {
        match self.frozen(force_calc) {
            Some(paid) => paid.subtotal,
            None => Money::from_decimal(self.items.iter().map(WorkorderItem::line_total).sum()),
        }
    }

    pub fn taxes1(&self, force_calc: bool) -> Money {
        match self.frozen(force_calc) {
            Some(paid) => paid.taxes1,
            None => self.taxes.tax1.rate.apply(self.taxable_base()),
        }
    }

    pub fn taxes2(&self, force_calc: bool) -> Money {
        match self.frozen(force_calc) {
            Some(paid) => paid.taxes2,
            None => self.taxes.tax2.rate.apply(self.taxable_base()),
        }
    }

    pub fn taxes(&self, force_calc: bool) -> Money {
        self.taxes1(force_calc) + self.taxes2(force_calc)
    }

    /// `subtotal + taxes1 + taxes2`.
    pub fn total(&self, force_calc: bool) -> Money {
        match self.frozen(force_calc) {
            Some(paid) => paid.total,
            None => self.subtotal(true) + self.taxes(true),
        }
    }

    /// Discounts shown on the receipt: lines sold under their original price.
    ///
    /// Always computed from the lines; there is no frozen discount figure, so
    /// `force_calc = true` is rejected.
    pub fn total_discounts(&self, force_calc: bool) -> CoreResult<Money> {
        if force_calc {
            return Err(CoreError::NotImplemented("forced recomputation of total discounts"));
        }
        Ok(Money::from_decimal(
            self.items.iter().map(WorkorderItem::discount).sum(),
        ))
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Computes the seven values frozen at payment, from live lines and
    /// the current rates.
    pub fn snapshot(&self, paid_at: DateTime<Utc>) -> PaidSnapshot {
        let taxes1 = self.taxes1(true);
        let taxes2 = self.taxes2(true);
        let subtotal = self.subtotal(true);

        PaidSnapshot {
            subtotal,
            tax1_rate: self.taxes.tax1.rate,
            tax2_rate: self.taxes.tax2.rate,
            taxes1,
            taxes2,
            total: subtotal + taxes1 + taxes2,
            paid_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InventoryItem, ItemType};
    use rust_decimal_macros::dec;

    fn line(wo: &Workorder, price: Decimal, qty: Decimal, taxable: bool) -> WorkorderItem {
        let mut catalog = InventoryItem::new("Part", Money::from_decimal(price), ItemType::Article);
        catalog.taxable = taxable;
        let mut item = WorkorderItem::from_catalog(&wo.id, &catalog, Utc::now());
        item.unit_price = price;
        item.quantity = qty;
        item
    }

    #[test]
    fn test_quebec_example() {
        let wo = Workorder::new(None, Utc::now());
        let items = vec![line(&wo, dec!(75.00), dec!(1), true)];
        let taxes = TaxConfig::default();
        let pricing = Pricing::new(&wo, &items, &taxes);

        assert_eq!(pricing.subtotal(false).amount(), dec!(75.00));
        assert_eq!(pricing.taxes1(false).amount(), dec!(3.75));
        assert_eq!(pricing.taxes2(false).amount(), dec!(7.48));
        assert_eq!(pricing.total(false).amount(), dec!(86.23));
    }

    #[test]
    fn test_sum_then_round() {
        let wo = Workorder::new(None, Utc::now());
        let items = vec![
            line(&wo, dec!(1.15), dec!(1), true),
            line(&wo, dec!(1.10), dec!(1), true),
        ];
        let taxes = TaxConfig::from_pairs(&[("HST", "0.15"), ("None", "0")]).unwrap();
        let pricing = Pricing::new(&wo, &items, &taxes);

        assert_eq!(pricing.total(false).amount(), dec!(2.59));
        assert_ne!(pricing.total(false).amount(), dec!(2.58));
    }

    #[test]
    fn test_subtotal_rounds_once() {
        let wo = Workorder::new(None, Utc::now());
        // 3 × 0.335 = 1.005 and 1 × 0.005: per-line rounding would give 1.02
        let items = vec![
            line(&wo, dec!(0.335), dec!(3), false),
            line(&wo, dec!(0.005), dec!(1), false),
        ];
        let taxes = TaxConfig::default();
        let pricing = Pricing::new(&wo, &items, &taxes);

        assert_eq!(pricing.subtotal(false).amount(), dec!(1.01));
        assert!(pricing.taxes(false).is_zero());
    }

    #[test]
    fn test_non_taxable_lines_not_taxed() {
        let wo = Workorder::new(None, Utc::now());
        let items = vec![
            line(&wo, dec!(40), dec!(1), true),
            line(&wo, dec!(10), dec!(2), false),
        ];
        let taxes = TaxConfig::default();
        let pricing = Pricing::new(&wo, &items, &taxes);

        assert_eq!(pricing.subtotal(false).amount(), dec!(60.00));
        assert_eq!(pricing.taxes1(false).amount(), dec!(2.00));
        assert_eq!(pricing.taxes2(false).amount(), dec!(3.99));
        assert_eq!(pricing.total(false).amount(), dec!(65.99));
    }

    #[test]
    fn test_total_is_subtotal_plus_taxes() {
        let wo = Workorder::new(None, Utc::now());
        let items = vec![
            line(&wo, dec!(12.345), dec!(3), true),
            line(&wo, dec!(0.999), dec!(7), true),
            line(&wo, dec!(19.99), dec!(-1), true),
            line(&wo, dec!(5.005), dec!(1.5), false),
        ];
        let taxes = TaxConfig::default();
        let pricing = Pricing::new(&wo, &items, &taxes);

        for force in [false, true] {
            assert_eq!(
                pricing.subtotal(force) + pricing.taxes(force),
                pricing.total(force)
            );
        }
    }

    #[test]
    fn test_paid_returns_frozen_values() {
        let mut wo = Workorder::new(None, Utc::now());
        let items = vec![line(&wo, dec!(75.00), dec!(1), true)];
        let taxes = TaxConfig::default();

        let snapshot = Pricing::new(&wo, &items, &taxes).snapshot(Utc::now());
        wo.paid = Some(snapshot.clone());

        // Later rate change does not alter the frozen invoice.
        let new_taxes = TaxConfig::from_pairs(&[("TPS", "0.06"), ("TVQ", "0.1")]).unwrap();
        let pricing = Pricing::new(&wo, &items, &new_taxes);

        assert_eq!(pricing.total(false), snapshot.total);
        assert_eq!(pricing.total(false).amount(), dec!(86.23));
        assert_eq!(pricing.total(true).amount(), dec!(87.00));

        for force in [false, true] {
            assert_eq!(
                pricing.subtotal(force) + pricing.taxes(force),
                pricing.total(force)
            );
        }
    }

    #[test]
    fn test_snapshot_matches_live() {
        let wo = Workorder::new(None, Utc::now());
        let items = vec![
            line(&wo, dec!(33.333), dec!(3), true),
            line(&wo, dec!(2.5), dec!(1), false),
        ];
        let taxes = TaxConfig::default();
        let pricing = Pricing::new(&wo, &items, &taxes);
        let snapshot = pricing.snapshot(Utc::now());

        assert_eq!(snapshot.subtotal, pricing.subtotal(true));
        assert_eq!(snapshot.taxes1, pricing.taxes1(true));
        assert_eq!(snapshot.taxes2, pricing.taxes2(true));
        assert_eq!(snapshot.taxes(), pricing.taxes(true));
        assert_eq!(snapshot.total, pricing.total(true));
        assert_eq!(snapshot.tax2_rate.rate(), dec!(0.09975));
    }

    #[test]
    fn test_total_discounts() {
        let wo = Workorder::new(None, Utc::now());
        let mut discounted = line(&wo, dec!(20), dec!(2), true);
        discounted.unit_price = dec!(17.5);
        let items = vec![discounted, line(&wo, dec!(10), dec!(1), true)];
        let taxes = TaxConfig::default();
        let pricing = Pricing::new(&wo, &items, &taxes);

        assert_eq!(pricing.total_discounts(false).unwrap().amount(), dec!(5.00));
        assert!(matches!(
            pricing.total_discounts(true),
            Err(CoreError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_empty_workorder_is_zero() {
        let wo = Workorder::new(None, Utc::now());
        let taxes = TaxConfig::default();
        let pricing = Pricing::new(&wo, &[], &taxes);

        assert!(pricing.total(false).is_zero());
        assert_eq!(pricing.item_count(), 0);
    }
}
