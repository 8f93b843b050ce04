//! # Payment State Transition
//!
//! Decides what paying a workorder writes. Storage applies the plan in one
//! database transaction.
//!
//! ```text
//!   unpaid ──pay(method)──► paid (snapshot frozen)        irreversible
//!     │                       │
//!     │ no lines?             └── total ≠ 0 ──► Transaction { total, method }
//!     ▼                           total = 0 ──► no ledger entry
//!   EmptyWorkorder
//! ```

use chrono::{DateTime, Utc};

use crate::config::TaxConfig;
use crate::error::{CoreError, CoreResult};
use crate::pricing::Pricing;
use crate::types::{PaidSnapshot, PaymentMethod, Transaction, Workorder, WorkorderItem};

/// Everything a successful payment writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPlan {
    pub snapshot: PaidSnapshot,
    /// `None` for a zero-total workorder.
    pub transaction: Option<Transaction>,
}

/// Validates the transition and computes the snapshot with the current rates.
///
/// ## Errors
/// - [`CoreError::AlreadyPaid`] if the workorder carries a snapshot
/// - [`CoreError::EmptyWorkorder`] if it has no lines (a zero-priced line is fine)
pub fn prepare_payment(
    workorder: &Workorder,
    items: &[WorkorderItem],
    taxes: &TaxConfig,
    method: PaymentMethod,
    now: DateTime<Utc>,
) -> CoreResult<PaymentPlan> {
    if workorder.is_paid() {
        return Err(CoreError::AlreadyPaid {
            workorder_id: workorder.id.clone(),
        });
    }

    if items.is_empty() {
        return Err(CoreError::EmptyWorkorder {
            workorder_id: workorder.id.clone(),
        });
    }

    let snapshot = Pricing::new(workorder, items, taxes).snapshot(now);

    let transaction = if snapshot.total.is_zero() {
        None
    } else {
        Some(Transaction::for_workorder(
            &workorder.id,
            snapshot.total,
            method,
            now,
        ))
    };

    Ok(PaymentPlan {
        snapshot,
        transaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{InventoryItem, ItemType};
    use rust_decimal_macros::dec;

    fn workorder_with(prices: &[Money]) -> (Workorder, Vec<WorkorderItem>) {
        let wo = Workorder::new(None, Utc::now());
        let items = prices
            .iter()
            .map(|p| {
                let catalog = InventoryItem::new("Tune-up", *p, ItemType::Labor);
                WorkorderItem::from_catalog(&wo.id, &catalog, Utc::now())
            })
            .collect();
        (wo, items)
    }

    #[test]
    fn test_pay_freezes_and_records_transaction() {
        let (wo, items) = workorder_with(&[Money::from_cents(7500)]);
        let now = Utc::now();
        let plan = prepare_payment(&wo, &items, &TaxConfig::default(), PaymentMethod::Visa, now)
            .unwrap();

        assert_eq!(plan.snapshot.total.amount(), dec!(86.23));
        assert_eq!(plan.snapshot.paid_at, now);

        let tx = plan.transaction.unwrap();
        assert_eq!(tx.amount, plan.snapshot.total);
        assert_eq!(tx.payment_method, PaymentMethod::Visa);
        assert_eq!(tx.workorder_id.as_deref(), Some(wo.id.as_str()));
        assert!(tx.comment.is_none());
    }

    #[test]
    fn test_zero_total_has_no_transaction() {
        let (wo, items) = workorder_with(&[Money::zero()]);
        let plan = prepare_payment(&wo, &items, &TaxConfig::default(), PaymentMethod::Cash, Utc::now())
            .unwrap();

        assert!(plan.snapshot.total.is_zero());
        assert!(plan.transaction.is_none());
    }

    #[test]
    fn test_empty_workorder_rejected() {
        let (wo, items) = workorder_with(&[]);
        let err = prepare_payment(&wo, &items, &TaxConfig::default(), PaymentMethod::Cash, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyWorkorder { .. }));
    }

    #[test]
    fn test_second_payment_rejected() {
        let (mut wo, items) = workorder_with(&[Money::from_cents(1000)]);
        let taxes = TaxConfig::default();
        let plan = prepare_payment(&wo, &items, &taxes, PaymentMethod::Cash, Utc::now()).unwrap();
        wo.paid = Some(plan.snapshot);

        let err = prepare_payment(&wo, &items, &taxes, PaymentMethod::Cash, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyPaid { .. }));
    }

    #[test]
    fn test_refund_workorder_pays_negative_total() {
        let (_, items) = workorder_with(&[Money::from_cents(2000)]);
        let refund_wo = Workorder::new(None, Utc::now());
        let refund_items: Vec<_> = items
            .iter()
            .map(|i| i.refund_of(&refund_wo.id, Utc::now()))
            .collect();

        let plan = prepare_payment(
            &refund_wo,
            &refund_items,
            &TaxConfig::default(),
            PaymentMethod::Cash,
            Utc::now(),
        )
        .unwrap();

        // -20.00 - 1.00 - 2.00 (1.995 rounds away from zero)
        assert_eq!(plan.snapshot.total.amount(), dec!(-23.00));
        assert!(plan.transaction.unwrap().amount.is_negative());
    }
}
