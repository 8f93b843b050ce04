//! # Register Repository
//!
//! ## Closing Flow
//! ```text
//!  last closing ──► transactions after it ──► expected per method
//!                                                   │
//!  staff counts ──► confirmed per method ───────────┤
//!                                                   ▼
//!                     BEGIN
//!                     INSERT cash_register_states
//!                     INSERT "Cash fund" transaction
//!                     COMMIT
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use wrench_core::register::{close_register, expected_amounts};
use wrench_core::{CashRegisterState, Money, RegisterAmounts};

use super::parse_money;
use super::transaction::{fetch_since, insert_transaction};
use crate::error::{DbError, DbResult};

const TABLE: &str = "cash_register_states";

#[derive(Debug, sqlx::FromRow)]
struct CashRegisterStateRow {
    id: String,
    expected_cash: String,
    expected_visa: String,
    expected_interac: String,
    confirmed_cash: String,
    confirmed_visa: String,
    confirmed_interac: String,
    comment: Option<String>,
    state_time: DateTime<Utc>,
}

impl TryFrom<CashRegisterStateRow> for CashRegisterState {
    type Error = DbError;

    fn try_from(row: CashRegisterStateRow) -> DbResult<Self> {
        Ok(CashRegisterState {
            expected: RegisterAmounts {
                cash: parse_money(TABLE, "expected_cash", &row.expected_cash)?,
                visa: parse_money(TABLE, "expected_visa", &row.expected_visa)?,
                interac: parse_money(TABLE, "expected_interac", &row.expected_interac)?,
            },
            confirmed: RegisterAmounts {
                cash: parse_money(TABLE, "confirmed_cash", &row.confirmed_cash)?,
                visa: parse_money(TABLE, "confirmed_visa", &row.confirmed_visa)?,
                interac: parse_money(TABLE, "confirmed_interac", &row.confirmed_interac)?,
            },
            id: row.id,
            comment: row.comment,
            state_time: row.state_time,
        })
    }
}

async fn fetch_last_state(conn: &mut SqliteConnection) -> DbResult<Option<CashRegisterState>> {
    let row: Option<CashRegisterStateRow> = sqlx::query_as(
        r#"
        SELECT id, expected_cash, expected_visa, expected_interac,
               confirmed_cash, confirmed_visa, confirmed_interac,
               comment, state_time
        FROM cash_register_states
        ORDER BY state_time DESC, rowid DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(&mut *conn)
    .await?;

    row.map(CashRegisterState::try_from).transpose()
}

/// Expected amounts since the last closing, or over the whole ledger.
async fn compute_expected(conn: &mut SqliteConnection) -> DbResult<RegisterAmounts> {
    let since = fetch_last_state(&mut *conn).await?.map(|s| s.state_time);
    let transactions = fetch_since(&mut *conn, since).await?;
    Ok(expected_amounts(&transactions, since))
}

/// Repository for register closings.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// The most recent closing, if any.
    pub async fn last_state(&self) -> DbResult<Option<CashRegisterState>> {
        let mut conn = self.pool.acquire().await?;
        fetch_last_state(&mut conn).await
    }

    /// What the register should hold right now, per reconciled method.
    pub async fn expected_since_last_close(&self) -> DbResult<RegisterAmounts> {
        let mut conn = self.pool.acquire().await?;
        compute_expected(&mut conn).await
    }

    /// Closes the register.
    ///
    /// Expected amounts are recomputed inside the same transaction that
    /// writes the closing and the cash fund, so a payment landing between
    /// the count and the close cannot slip out of both windows.
    pub async fn close_register(
        &self,
        confirmed: RegisterAmounts,
        cash_fund: Money,
        comment: Option<&str>,
    ) -> DbResult<CashRegisterState> {
        let mut tx = self.pool.begin().await?;
        let expected = compute_expected(&mut tx).await?;

        let closing = close_register(expected, confirmed, cash_fund, comment, Utc::now());
        let state = &closing.state;

        sqlx::query(
            r#"
            INSERT INTO cash_register_states (
                id, expected_cash, expected_visa, expected_interac,
                confirmed_cash, confirmed_visa, confirmed_interac,
                comment, state_time
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&state.id)
        .bind(state.expected.cash.to_fixed())
        .bind(state.expected.visa.to_fixed())
        .bind(state.expected.interac.to_fixed())
        .bind(state.confirmed.cash.to_fixed())
        .bind(state.confirmed.visa.to_fixed())
        .bind(state.confirmed.interac.to_fixed())
        .bind(&state.comment)
        .bind(state.state_time)
        .execute(&mut *tx)
        .await?;

        insert_transaction(&mut tx, &closing.cash_fund).await?;
        tx.commit().await?;

        let discrepancy = state.discrepancy();
        if discrepancy != RegisterAmounts::default() {
            warn!(
                cash = %discrepancy.cash,
                visa = %discrepancy.visa,
                interac = %discrepancy.interac,
                "Register closed with discrepancy"
            );
        }
        info!(
            id = %state.id,
            cash_fund = %closing.cash_fund.amount,
            "Register closed"
        );

        Ok(closing.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{catalog, taxes, test_db, workorder_with};
    use rust_decimal_macros::dec;
    use wrench_core::register::AdjustmentKind;
    use wrench_core::{ItemType, PaymentMethod, CASH_FUND_COMMENT};

    fn amounts(cash: i64, visa: i64, interac: i64) -> RegisterAmounts {
        RegisterAmounts {
            cash: Money::from_cents(cash),
            visa: Money::from_cents(visa),
            interac: Money::from_cents(interac),
        }
    }

    #[tokio::test]
    async fn test_first_close_counts_whole_ledger() {
        let db = test_db().await;
        let overhaul = catalog(&db, "Overhaul", 7500, ItemType::Labor).await;
        let a = workorder_with(&db, &[&overhaul]).await;
        let b = workorder_with(&db, &[&overhaul]).await;
        let c = workorder_with(&db, &[&overhaul]).await;
        db.workorders().pay(&a, PaymentMethod::Cash, &taxes()).await.unwrap();
        db.workorders().pay(&b, PaymentMethod::Visa, &taxes()).await.unwrap();
        db.workorders().pay(&c, PaymentMethod::Check, &taxes()).await.unwrap();
        db.transactions()
            .record_adjustment(AdjustmentKind::Withdrawal, dec!(20), "Bank run")
            .await
            .unwrap();

        assert!(db.register().last_state().await.unwrap().is_none());
        let expected = db.register().expected_since_last_close().await.unwrap();
        assert_eq!(expected, amounts(6623, 8623, 0));

        let state = db
            .register()
            .close_register(amounts(6600, 8623, 0), Money::from_cents(10000), Some("  "))
            .await
            .unwrap();
        assert_eq!(state.expected, expected);
        assert_eq!(state.discrepancy(), amounts(-23, 0, 0));
        assert!(state.comment.is_none());

        assert_eq!(db.register().last_state().await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn test_cash_fund_opens_next_window() {
        let db = test_db().await;
        db.register()
            .close_register(amounts(0, 0, 0), Money::from_cents(15000), Some("Opening float"))
            .await
            .unwrap();

        let ledger = db.transactions().list().await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].comment.as_deref(), Some(CASH_FUND_COMMENT));

        let expected = db.register().expected_since_last_close().await.unwrap();
        assert_eq!(expected, amounts(15000, 0, 0));

        let tube = catalog(&db, "Tube", 1000, ItemType::Article).await;
        let wo = workorder_with(&db, &[&tube]).await;
        db.workorders().pay(&wo, PaymentMethod::Interac, &taxes()).await.unwrap();

        let second = db
            .register()
            .close_register(amounts(15000, 0, 1150), Money::from_cents(15000), None)
            .await
            .unwrap();
        assert_eq!(second.expected, amounts(15000, 0, 1150));
        assert_eq!(second.discrepancy(), RegisterAmounts::default());
    }
}
