//! # Cash Register Reconciliation
//!
//! ```text
//!  closing N-1                                   closing N
//!      │◄────────── reconciliation window ─────────►│
//!      │  tx  tx  deposit  tx  withdrawal  tx        │
//!      │                                             │
//!      │  expected[m] = Σ amount where method = m    │
//!      │               and created > closing N-1     │
//!      │                                             ├──► CashRegisterState
//!      │  confirmed[m] = counted by staff            │     { expected, confirmed }
//!      │                                             └──► "Cash fund" cash tx
//! ```
//! Only cash, visa and interac are reconciled.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{new_id, CashRegisterState, PaymentMethod, RegisterAmounts, Transaction};
use crate::validation::{optional_comment, parse_adjustment_amount, validate_comment};
use crate::CASH_FUND_COMMENT;

/// Direction of a manual cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Deposit,
    Withdrawal,
}

/// Sums reconciled methods over transactions created strictly after `since`.
///
/// With no previous closing (`since = None`) every transaction counts.
pub fn expected_amounts<'a, I>(transactions: I, since: Option<DateTime<Utc>>) -> RegisterAmounts
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut expected = RegisterAmounts::default();
    for tx in transactions {
        if since.map_or(true, |boundary| tx.created_at > boundary) {
            expected.add(tx.payment_method, tx.amount);
        }
    }
    expected
}

/// A cash deposit or withdrawal.
///
/// The amount is rounded half up to cents and must be positive; a
/// withdrawal is stored negated. The comment is mandatory.
pub fn adjustment_transaction(
    kind: AdjustmentKind,
    amount: Decimal,
    comment: &str,
    now: DateTime<Utc>,
) -> CoreResult<Transaction> {
    let amount = parse_adjustment_amount(amount)?;
    let comment = validate_comment(comment)?;

    let signed = match kind {
        AdjustmentKind::Deposit => amount,
        AdjustmentKind::Withdrawal => -amount,
    };

    Ok(Transaction::adjustment(signed, PaymentMethod::Cash, comment, now))
}

/// The drawer float left in the register after closing.
pub fn cash_fund_transaction(cash_fund: Money, now: DateTime<Utc>) -> Transaction {
    Transaction::adjustment(
        cash_fund,
        PaymentMethod::Cash,
        CASH_FUND_COMMENT.to_string(),
        now,
    )
}

/// The two rows a register closing writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterClosing {
    pub state: CashRegisterState,
    pub cash_fund: Transaction,
}

/// Builds a closing. A blank comment is stored as none.
///
/// The cash fund is stamped one microsecond after the closing so that it
/// opens the next reconciliation window.
pub fn close_register(
    expected: RegisterAmounts,
    confirmed: RegisterAmounts,
    cash_fund: Money,
    comment: Option<&str>,
    now: DateTime<Utc>,
) -> RegisterClosing {
    RegisterClosing {
        state: CashRegisterState {
            id: new_id(),
            expected,
            confirmed,
            comment: optional_comment(comment),
            state_time: now,
        },
        cash_fund: cash_fund_transaction(cash_fund, now + Duration::microseconds(1)),
    }
}
