//! # Transaction Repository
//!
//! The ledger is append-only: rows are inserted by payment, register
//! closing and cash adjustments, and never updated or deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use wrench_core::register::{adjustment_transaction, AdjustmentKind};
use wrench_core::{PaymentMethod, Transaction};

use super::parse_money;
use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    amount: String,
    payment_method: PaymentMethod,
    workorder_id: Option<String>,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> DbResult<Self> {
        Ok(Transaction {
            amount: parse_money("transactions", "amount", &row.amount)?,
            id: row.id,
            payment_method: row.payment_method,
            workorder_id: row.workorder_id,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

pub(crate) async fn insert_transaction(conn: &mut SqliteConnection, tx: &Transaction) -> DbResult<()> {
    debug!(
        id = %tx.id,
        amount = %tx.amount,
        method = %tx.payment_method,
        "Appending transaction"
    );

    sqlx::query(
        r#"
        INSERT INTO transactions (id, amount, payment_method, workorder_id, comment, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&tx.id)
    .bind(tx.amount.to_fixed())
    .bind(tx.payment_method)
    .bind(&tx.workorder_id)
    .bind(&tx.comment)
    .bind(tx.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Transactions created at or after `since` (all when `None`), oldest first.
///
/// Callers needing a strict boundary filter again in memory.
pub(crate) async fn fetch_since(
    conn: &mut SqliteConnection,
    since: Option<DateTime<Utc>>,
) -> DbResult<Vec<Transaction>> {
    let rows: Vec<TransactionRow> = match since {
        Some(since) => {
            sqlx::query_as(
                r#"
                SELECT id, amount, payment_method, workorder_id, comment, created_at
                FROM transactions
                WHERE created_at >= ?1
                ORDER BY created_at, rowid
                "#,
            )
            .bind(since)
            .fetch_all(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT id, amount, payment_method, workorder_id, comment, created_at
                FROM transactions
                ORDER BY created_at, rowid
                "#,
            )
            .fetch_all(&mut *conn)
            .await?
        }
    };

    rows.into_iter().map(Transaction::try_from).collect()
}

/// Repository for ledger reads and manual cash movements.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Every ledger entry, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Transaction>> {
        let mut conn = self.pool.acquire().await?;
        fetch_since(&mut conn, None).await
    }

    pub async fn list_for_workorder(&self, workorder_id: &str) -> DbResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, amount, payment_method, workorder_id, comment, created_at
            FROM transactions
            WHERE workorder_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(workorder_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Records a cash deposit or withdrawal.
    ///
    /// ## Rules
    /// - `amount` is rounded half up to cents and must end up positive
    /// - withdrawals are stored negated
    /// - `comment` must be non-blank
    pub async fn record_adjustment(
        &self,
        kind: AdjustmentKind,
        amount: Decimal,
        comment: &str,
    ) -> DbResult<Transaction> {
        let tx = adjustment_transaction(kind, amount, comment, Utc::now())?;

        let mut conn = self.pool.acquire().await?;
        insert_transaction(&mut conn, &tx).await?;

        info!(id = %tx.id, amount = %tx.amount, ?kind, "Cash adjustment recorded");
        Ok(tx)
    }
}
