//! # Workorder Repository
//!
//! ## Workorder Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CREATE            create(client?) → unpaid, status "open"           │
//! │                                                                         │
//! │  2. FILL              db.items().add_item / edit_column / remove_item   │
//! │                                                                         │
//! │  3. PAY               pay(id, method, &taxes)                           │
//! │     └── BEGIN                                                           │
//! │         UPDATE workorders SET paid_* … WHERE paid_date IS NULL          │
//! │         INSERT INTO transactions (unless total = 0)                     │
//! │         COMMIT                                                          │
//! │                                                                         │
//! │  4. (OPTIONAL) REFUND refund(id, [line ids]) → new unpaid workorder     │
//! │     └── BEGIN                                                           │
//! │         INSERT workorder, INSERT mirror lines (refund_item_id set)      │
//! │         COMMIT                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use wrench_core::edit::WorkorderEdit;
use wrench_core::payment::prepare_payment;
use wrench_core::refund::{is_fully_refunded, plan_refund, select_refund_lines, RefundIndex};
use wrench_core::views::{LineItemView, WorkorderTotalsView};
use wrench_core::{
    CoreError, ItemType, PaidSnapshot, PaymentMethod, Pricing, TaxConfig, Workorder, WorkorderItem,
    WORKORDERS_PER_PAGE,
};

use super::client::ensure_client_exists;
use super::item::{fetch_items, insert_item};
use super::transaction::insert_transaction;
use super::{bind_value, parse_money, parse_rate};
use crate::error::{DbError, DbResult};

const TABLE: &str = "workorders";

const SELECT_WORKORDER: &str = r#"
    SELECT id, client_id, bike_description, bike_serial_number, calendar_date,
           status, invoice_notes, internal_notes, created_at, updated_at, archived,
           paid, paid_subtotal, paid_tax1_rate, paid_tax2_rate, paid_taxes1,
           paid_taxes2, paid_total, paid_date
    FROM workorders
"#;

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct WorkorderRow {
    pub id: String,
    client_id: Option<String>,
    bike_description: String,
    bike_serial_number: String,
    calendar_date: DateTime<Utc>,
    status: String,
    invoice_notes: String,
    internal_notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived: bool,
    pub paid: bool,
    pub paid_subtotal: Option<String>,
    pub paid_tax1_rate: Option<String>,
    pub paid_tax2_rate: Option<String>,
    pub paid_taxes1: Option<String>,
    pub paid_taxes2: Option<String>,
    pub paid_total: Option<String>,
    pub paid_date: Option<DateTime<Utc>>,
}

impl WorkorderRow {
    /// `(column, is_not_null)` for the seven paid columns.
    pub(crate) fn paid_presence(&self) -> [(&'static str, bool); 7] {
        [
            ("paid_subtotal", self.paid_subtotal.is_some()),
            ("paid_tax1_rate", self.paid_tax1_rate.is_some()),
            ("paid_tax2_rate", self.paid_tax2_rate.is_some()),
            ("paid_taxes1", self.paid_taxes1.is_some()),
            ("paid_taxes2", self.paid_taxes2.is_some()),
            ("paid_total", self.paid_total.is_some()),
            ("paid_date", self.paid_date.is_some()),
        ]
    }

    /// The frozen snapshot: `None` when unpaid, an error when partial.
    pub(crate) fn snapshot(&self) -> DbResult<Option<PaidSnapshot>> {
        match (
            &self.paid_subtotal,
            &self.paid_tax1_rate,
            &self.paid_tax2_rate,
            &self.paid_taxes1,
            &self.paid_taxes2,
            &self.paid_total,
            self.paid_date,
        ) {
            (None, None, None, None, None, None, None) => Ok(None),
            (Some(subtotal), Some(rate1), Some(rate2), Some(taxes1), Some(taxes2), Some(total), Some(paid_at)) => {
                Ok(Some(PaidSnapshot {
                    subtotal: parse_money(TABLE, "paid_subtotal", subtotal)?,
                    tax1_rate: parse_rate(TABLE, "paid_tax1_rate", rate1)?,
                    tax2_rate: parse_rate(TABLE, "paid_tax2_rate", rate2)?,
                    taxes1: parse_money(TABLE, "paid_taxes1", taxes1)?,
                    taxes2: parse_money(TABLE, "paid_taxes2", taxes2)?,
                    total: parse_money(TABLE, "paid_total", total)?,
                    paid_at,
                }))
            }
            _ => Err(DbError::invalid_data(
                TABLE,
                "paid_*",
                format!("workorder {} has a partially NULL paid group", self.id),
            )),
        }
    }
}

impl TryFrom<WorkorderRow> for Workorder {
    type Error = DbError;

    fn try_from(row: WorkorderRow) -> DbResult<Self> {
        let paid = row.snapshot()?;
        Ok(Workorder {
            id: row.id,
            client_id: row.client_id,
            bike_description: row.bike_description,
            bike_serial_number: row.bike_serial_number,
            calendar_date: row.calendar_date,
            status: row.status,
            invoice_notes: row.invoice_notes,
            internal_notes: row.internal_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            archived: row.archived,
            paid,
        })
    }
}

// =============================================================================
// Connection-Level Helpers
// =============================================================================

pub(crate) async fn fetch_workorder(conn: &mut SqliteConnection, id: &str) -> DbResult<Workorder> {
    let sql = format!("{SELECT_WORKORDER} WHERE id = ?1");
    let row: Option<WorkorderRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => row.try_into(),
        None => Err(CoreError::not_found("workorder", id).into()),
    }
}

pub(crate) async fn fetch_rows(conn: &mut SqliteConnection) -> DbResult<Vec<WorkorderRow>> {
    let sql = format!("{SELECT_WORKORDER} ORDER BY created_at, rowid");
    Ok(sqlx::query_as(&sql).fetch_all(&mut *conn).await?)
}

/// Whether the workorder is paid, derived from `paid_date`.
pub(crate) async fn fetch_paid_flag(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    let paid: Option<bool> = sqlx::query_scalar("SELECT paid_date IS NOT NULL FROM workorders WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    paid.ok_or_else(|| CoreError::not_found("workorder", id).into())
}

pub(crate) async fn touch_workorder(conn: &mut SqliteConnection, id: &str, now: DateTime<Utc>) -> DbResult<()> {
    sqlx::query("UPDATE workorders SET updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_workorder(conn: &mut SqliteConnection, wo: &Workorder) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO workorders (
            id, client_id, bike_description, bike_serial_number, calendar_date,
            status, invoice_notes, internal_notes, created_at, updated_at, archived, paid
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0)
        "#,
    )
    .bind(&wo.id)
    .bind(&wo.client_id)
    .bind(&wo.bike_description)
    .bind(&wo.bike_serial_number)
    .bind(wo.calendar_date)
    .bind(&wo.status)
    .bind(&wo.invoice_notes)
    .bind(&wo.internal_notes)
    .bind(wo.created_at)
    .bind(wo.updated_at)
    .bind(wo.archived)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct RefundLinkRow {
    refund_line_id: String,
    refund_workorder_id: String,
    source_item_id: String,
    source_workorder_id: String,
}

/// Refund links touching a workorder, in both directions.
pub(crate) async fn load_refund_index(conn: &mut SqliteConnection, workorder_id: &str) -> DbResult<RefundIndex> {
    let rows: Vec<RefundLinkRow> = sqlx::query_as(
        r#"
        SELECT r.id           AS refund_line_id,
               r.workorder_id AS refund_workorder_id,
               s.id           AS source_item_id,
               s.workorder_id AS source_workorder_id
        FROM workorder_items r
        JOIN workorder_items s ON s.id = r.refund_item_id
        WHERE s.workorder_id = ?1 OR r.workorder_id = ?1
        "#,
    )
    .bind(workorder_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut index = RefundIndex::new();
    for row in &rows {
        index.record_link(
            &row.refund_line_id,
            &row.refund_workorder_id,
            &row.source_item_id,
            &row.source_workorder_id,
        );
    }
    Ok(index)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for workorder operations.
#[derive(Debug, Clone)]
pub struct WorkorderRepository {
    pool: SqlitePool,
}

impl WorkorderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WorkorderRepository { pool }
    }

    /// Creates an empty, unpaid workorder. The client must exist.
    pub async fn create(&self, client_id: Option<&str>) -> DbResult<Workorder> {
        let mut tx = self.pool.begin().await?;
        if let Some(client_id) = client_id {
            ensure_client_exists(&mut tx, client_id).await?;
        }

        let wo = Workorder::new(client_id.map(str::to_string), Utc::now());
        debug!(id = %wo.id, client_id = ?wo.client_id, "Creating workorder");

        insert_workorder(&mut tx, &wo).await?;
        tx.commit().await?;
        Ok(wo)
    }

    pub async fn get(&self, id: &str) -> DbResult<Workorder> {
        let mut conn = self.pool.acquire().await?;
        fetch_workorder(&mut conn, id).await
    }

    /// The workorder and its lines, read together.
    pub async fn get_with_items(&self, id: &str) -> DbResult<(Workorder, Vec<WorkorderItem>)> {
        let mut tx = self.pool.begin().await?;
        let wo = fetch_workorder(&mut tx, id).await?;
        let items = fetch_items(&mut tx, id).await?;
        tx.commit().await?;
        Ok((wo, items))
    }

    /// Newest first, [`WORKORDERS_PER_PAGE`] per page. Pages start at 1.
    pub async fn list_page(&self, page: u32) -> DbResult<Vec<Workorder>> {
        let offset = i64::from(page.max(1) - 1) * i64::from(WORKORDERS_PER_PAGE);
        let sql = format!("{SELECT_WORKORDER} ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2");

        let rows: Vec<WorkorderRow> = sqlx::query_as(&sql)
            .bind(i64::from(WORKORDERS_PER_PAGE))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Workorder::try_from).collect()
    }

    /// Attaches or detaches the client.
    pub async fn set_client(&self, id: &str, client_id: Option<&str>) -> DbResult<Workorder> {
        let mut tx = self.pool.begin().await?;
        if let Some(client_id) = client_id {
            ensure_client_exists(&mut tx, client_id).await?;
        }

        let result = sqlx::query("UPDATE workorders SET client_id = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(client_id)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("workorder", id).into());
        }

        let wo = fetch_workorder(&mut tx, id).await?;
        tx.commit().await?;
        Ok(wo)
    }

    /// Inline edit of one whitelisted descriptive column.
    pub async fn edit_column(&self, id: &str, column: &str, value: &str) -> DbResult<Workorder> {
        let edit = WorkorderEdit::parse(column, value)?;

        debug!(id = %id, column = edit.column(), "Editing workorder column");

        let sql = format!(
            "UPDATE workorders SET {} = ?1, updated_at = ?2 WHERE id = ?3",
            edit.column()
        );
        let result = bind_value(sqlx::query(&sql), edit.value())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("workorder", id).into());
        }
        self.get(id).await
    }

    /// Deletes an unpaid workorder without lines.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        let wo = fetch_workorder(&mut tx, id).await?;

        if wo.is_paid() {
            return Err(CoreError::WorkorderNotDeletable {
                workorder_id: id.to_string(),
                reason: "workorder is paid".to_string(),
            }
            .into());
        }

        let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workorder_items WHERE workorder_id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if lines > 0 {
            return Err(CoreError::WorkorderNotDeletable {
                workorder_id: id.to_string(),
                reason: format!("workorder has {} line items", lines),
            }
            .into());
        }

        sqlx::query("DELETE FROM workorders WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(id = %id, "Workorder deleted");
        Ok(())
    }

    /// Pays a workorder: freezes its totals and appends the ledger entry.
    ///
    /// ## What This Does
    /// 1. Computes the snapshot from live lines with the given rates
    /// 2. Writes all seven paid fields and the `paid` flag in one UPDATE
    ///    guarded by `paid_date IS NULL`
    /// 3. Appends a transaction for the total, unless it is zero
    ///
    /// All three happen in one database transaction.
    ///
    /// ## Errors
    /// - `AlreadyPaid` (also when a concurrent payment won the guard)
    /// - `EmptyWorkorder` when there are no lines
    pub async fn pay(&self, id: &str, method: PaymentMethod, taxes: &TaxConfig) -> DbResult<Workorder> {
        let mut tx = self.pool.begin().await?;
        let mut wo = fetch_workorder(&mut tx, id).await?;
        let items = fetch_items(&mut tx, id).await?;

        let plan = prepare_payment(&wo, &items, taxes, method, Utc::now())?;
        let snapshot = &plan.snapshot;

        let result = sqlx::query(
            r#"
            UPDATE workorders SET
                paid = 1,
                paid_subtotal = ?1,
                paid_tax1_rate = ?2,
                paid_tax2_rate = ?3,
                paid_taxes1 = ?4,
                paid_taxes2 = ?5,
                paid_total = ?6,
                paid_date = ?7,
                updated_at = ?7
            WHERE id = ?8 AND paid_date IS NULL
            "#,
        )
        .bind(snapshot.subtotal.to_fixed())
        .bind(snapshot.tax1_rate.to_storage())
        .bind(snapshot.tax2_rate.to_storage())
        .bind(snapshot.taxes1.to_fixed())
        .bind(snapshot.taxes2.to_fixed())
        .bind(snapshot.total.to_fixed())
        .bind(snapshot.paid_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::AlreadyPaid {
                workorder_id: id.to_string(),
            }
            .into());
        }

        if let Some(ledger) = &plan.transaction {
            insert_transaction(&mut tx, ledger).await?;
        }

        tx.commit().await?;

        info!(
            workorder_id = %id,
            total = %snapshot.total,
            method = %method,
            "Workorder paid"
        );

        wo.updated_at = snapshot.paid_at;
        wo.paid = Some(plan.snapshot);
        Ok(wo)
    }

    /// Refunds selected lines of a paid workorder into a new workorder.
    ///
    /// Returns the refund workorder id, or the original id when nothing was
    /// refunded (original unpaid, or no selected line is refundable).
    /// Lines that are refund lines, already refunded, or not on the
    /// original are skipped and logged at debug.
    pub async fn refund(&self, id: &str, selected_item_ids: &[String]) -> DbResult<String> {
        let mut tx = self.pool.begin().await?;
        let original = fetch_workorder(&mut tx, id).await?;
        let items = fetch_items(&mut tx, id).await?;
        let index = load_refund_index(&mut tx, id).await?;

        let selection = select_refund_lines(&original, &items, selected_item_ids, &index);
        for reason in &selection.excluded {
            debug!(workorder_id = %id, reason = %reason, "Line excluded from refund");
        }

        let Some(plan) = plan_refund(&original, &selection, Utc::now()) else {
            debug!(workorder_id = %id, paid = original.is_paid(), "Nothing to refund");
            return Ok(original.id);
        };

        insert_workorder(&mut tx, &plan.workorder).await?;
        for line in &plan.items {
            insert_item(&mut tx, line).await?;
        }
        tx.commit().await?;

        info!(
            workorder_id = %id,
            refund_workorder_id = %plan.workorder.id,
            lines = plan.items.len(),
            "Refund workorder created"
        );

        Ok(plan.workorder.id)
    }

    /// Refund links touching this workorder's lines.
    pub async fn refund_index(&self, id: &str) -> DbResult<RefundIndex> {
        let mut conn = self.pool.acquire().await?;
        load_refund_index(&mut conn, id).await
    }

    /// Every line is a refund line or has been refunded.
    pub async fn is_fully_refunded(&self, id: &str) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;
        fetch_workorder(&mut tx, id).await?;
        let items = fetch_items(&mut tx, id).await?;
        let index = load_refund_index(&mut tx, id).await?;
        tx.commit().await?;

        Ok(is_fully_refunded(&items, &index))
    }

    /// Totals box: frozen values once paid, live with `taxes` otherwise.
    pub async fn totals(&self, id: &str, taxes: &TaxConfig) -> DbResult<WorkorderTotalsView> {
        let (wo, items) = self.get_with_items(id).await?;
        let pricing = Pricing::new(&wo, &items, taxes);
        Ok(WorkorderTotalsView::new(&pricing, wo.is_paid())?)
    }

    /// Lines as the workorder screen shows them.
    pub async fn line_items_view(&self, id: &str) -> DbResult<Vec<LineItemView>> {
        let mut tx = self.pool.begin().await?;
        fetch_workorder(&mut tx, id).await?;
        let items = fetch_items(&mut tx, id).await?;
        let index = load_refund_index(&mut tx, id).await?;

        let types: Vec<(String, Option<ItemType>)> = sqlx::query_as(
            r#"
            SELECT wi.id, ii.item_type
            FROM workorder_items wi
            LEFT JOIN inventory_items ii ON ii.id = wi.inventory_item_id
            WHERE wi.workorder_id = ?1
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let types: HashMap<String, Option<ItemType>> = types.into_iter().collect();
        Ok(items
            .iter()
            .map(|item| {
                let item_type = types.get(&item.id).copied().flatten();
                LineItemView::new(item, item_type, &index)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{catalog, taxes, test_db, workorder_with};
    use rust_decimal_macros::dec;
    use wrench_core::{Client, Money, TaxDefinition, TaxRate};

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let db = test_db().await;
        let mut ids = Vec::new();
        for _ in 0..27 {
            ids.push(db.workorders().create(None).await.unwrap().id);
        }

        let first = db.workorders().list_page(1).await.unwrap();
        assert_eq!(first.len(), 25);
        assert_eq!(first[0].id, ids[26]);
        assert_eq!(first[0].status, "open");

        let second = db.workorders().list_page(2).await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].id, ids[0]);
    }

    #[tokio::test]
    async fn test_client_must_exist() {
        let db = test_db().await;
        let err = db.workorders().create(Some("ghost")).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::NotFound { entity: "client", .. })));

        let client = Client::new("Marie", "Tremblay", Utc::now());
        db.clients().create(&client).await.unwrap();
        let wo = db.workorders().create(None).await.unwrap();

        let wo = db.workorders().set_client(&wo.id, Some(&client.id)).await.unwrap();
        assert_eq!(wo.client_id.as_deref(), Some(client.id.as_str()));
        let wo = db.workorders().set_client(&wo.id, None).await.unwrap();
        assert!(wo.client_id.is_none());
        assert!(db.workorders().set_client(&wo.id, Some("ghost")).await.is_err());
    }

    #[tokio::test]
    async fn test_edit_columns() {
        let db = test_db().await;
        let wo = db.workorders().create(None).await.unwrap();

        let wo = db
            .workorders()
            .edit_column(&wo.id, "bike_description", "Blue Marin hybrid")
            .await
            .unwrap();
        assert_eq!(wo.bike_description, "Blue Marin hybrid");

        let wo = db
            .workorders()
            .edit_column(&wo.id, "calendar_date", "2024-06-01T09:30:00Z")
            .await
            .unwrap();
        assert_eq!(wo.calendar_date.to_rfc3339(), "2024-06-01T09:30:00+00:00");

        assert!(db.workorders().edit_column(&wo.id, "calendar_date", "soon").await.is_err());
        let err = db.workorders().edit_column(&wo.id, "paid_total", "0").await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::InvalidColumnEdit { .. })));
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let db = test_db().await;
        let tube = catalog(&db, "Tube", 850, ItemType::Article).await;

        let empty = db.workorders().create(None).await.unwrap();
        db.workorders().delete(&empty.id).await.unwrap();
        assert!(db.workorders().get(&empty.id).await.is_err());

        let filled = workorder_with(&db, &[&tube]).await;
        let err = db.workorders().delete(&filled).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::WorkorderNotDeletable { .. })));

        db.workorders().pay(&filled, PaymentMethod::Visa, &taxes()).await.unwrap();
        assert!(db.workorders().delete(&filled).await.is_err());
    }

    #[tokio::test]
    async fn test_pay_freezes_totals() {
        let db = test_db().await;
        let overhaul = catalog(&db, "Overhaul", 7500, ItemType::Labor).await;
        let wo_id = workorder_with(&db, &[&overhaul]).await;

        let paid = db.workorders().pay(&wo_id, PaymentMethod::Cash, &taxes()).await.unwrap();
        let snapshot = paid.paid.as_ref().unwrap();
        assert_eq!(snapshot.subtotal, Money::from_cents(7500));
        assert_eq!(snapshot.taxes1, Money::from_cents(375));
        assert_eq!(snapshot.taxes2, Money::from_cents(748));
        assert_eq!(snapshot.total, Money::from_cents(8623));

        let stored = db.workorders().get(&wo_id).await.unwrap();
        assert_eq!(stored.paid.as_ref(), Some(snapshot));

        let ledger = db.transactions().list_for_workorder(&wo_id).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].amount, Money::from_cents(8623));
        assert_eq!(ledger[0].payment_method, PaymentMethod::Cash);
        assert!(ledger[0].comment.is_none());
    }

    #[tokio::test]
    async fn test_second_pay_fails_without_ledger_entry() {
        let db = test_db().await;
        let tube = catalog(&db, "Tube", 850, ItemType::Article).await;
        let wo_id = workorder_with(&db, &[&tube]).await;

        db.workorders().pay(&wo_id, PaymentMethod::Cash, &taxes()).await.unwrap();
        let err = db
            .workorders()
            .pay(&wo_id, PaymentMethod::Visa, &taxes())
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::AlreadyPaid { .. })));
        assert_eq!(db.transactions().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pay_empty_and_zero_total() {
        let db = test_db().await;
        let wo = db.workorders().create(None).await.unwrap();
        let err = db
            .workorders()
            .pay(&wo.id, PaymentMethod::Cash, &taxes())
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::EmptyWorkorder { .. })));

        let label = catalog(&db, "Note: customer brings own tire", 0, ItemType::Other).await;
        let wo_id = workorder_with(&db, &[&label]).await;
        let paid = db.workorders().pay(&wo_id, PaymentMethod::Cash, &taxes()).await.unwrap();
        assert!(paid.is_paid());
        assert!(db.transactions().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_frozen_values_ignore_new_rates() {
        let db = test_db().await;
        let overhaul = catalog(&db, "Overhaul", 7500, ItemType::Labor).await;
        let wo_id = workorder_with(&db, &[&overhaul]).await;
        db.workorders().pay(&wo_id, PaymentMethod::Interac, &taxes()).await.unwrap();

        let raised = TaxConfig::new(
            TaxDefinition::new("TPS", TaxRate::new(dec!(0.06)).unwrap()),
            TaxDefinition::new("TVQ", TaxRate::new(dec!(0.1)).unwrap()),
        );
        let totals = db.workorders().totals(&wo_id, &raised).await.unwrap();
        assert_eq!(totals.total, "86.23");
        assert!(totals.paid);
    }

    #[tokio::test]
    async fn test_refund_selected_lines() {
        let db = test_db().await;
        let chain = catalog(&db, "Chain", 3499, ItemType::Article).await;
        let tube = catalog(&db, "Tube", 850, ItemType::Article).await;
        let labor = catalog(&db, "Install", 1500, ItemType::Labor).await;
        let wo_id = workorder_with(&db, &[&chain, &tube, &labor]).await;
        db.workorders()
            .edit_column(&wo_id, "bike_serial_number", "WTU123")
            .await
            .unwrap();
        db.workorders().pay(&wo_id, PaymentMethod::Cash, &taxes()).await.unwrap();

        let lines = db.items().list(&wo_id).await.unwrap();
        let refund_id = db
            .workorders()
            .refund(&wo_id, &[lines[1].id.clone(), lines[0].id.clone()])
            .await
            .unwrap();
        assert_ne!(refund_id, wo_id);

        let (refund_wo, refund_lines) = db.workorders().get_with_items(&refund_id).await.unwrap();
        assert!(!refund_wo.is_paid());
        assert_eq!(refund_wo.bike_serial_number, "WTU123");
        assert_eq!(refund_lines.len(), 2);
        // original line order, not selection order
        assert_eq!(refund_lines[0].refund_item_id.as_deref(), Some(lines[0].id.as_str()));
        assert_eq!(refund_lines[1].refund_item_id.as_deref(), Some(lines[1].id.as_str()));
        assert_eq!(refund_lines[0].quantity, dec!(-1));
        assert_eq!(refund_lines[0].unit_price, lines[0].unit_price);

        assert!(!db.workorders().is_fully_refunded(&wo_id).await.unwrap());
        assert!(db.workorders().is_fully_refunded(&refund_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_refund_never_twice() {
        let db = test_db().await;
        let chain = catalog(&db, "Chain", 3499, ItemType::Article).await;
        let wo_id = workorder_with(&db, &[&chain]).await;
        db.workorders().pay(&wo_id, PaymentMethod::Cash, &taxes()).await.unwrap();
        let line_id = db.items().list(&wo_id).await.unwrap()[0].id.clone();

        let first = db.workorders().refund(&wo_id, &[line_id.clone()]).await.unwrap();
        let second = db.workorders().refund(&wo_id, &[line_id.clone()]).await.unwrap();
        assert_ne!(first, wo_id);
        assert_eq!(second, wo_id);
        assert!(db.workorders().is_fully_refunded(&wo_id).await.unwrap());

        // refunding the refund: pay it first so it is eligible at all
        db.workorders().pay(&first, PaymentMethod::Cash, &taxes()).await.unwrap();
        let refund_line = db.items().list(&first).await.unwrap()[0].id.clone();
        let third = db.workorders().refund(&first, &[refund_line]).await.unwrap();
        assert_eq!(third, first);
    }

    #[tokio::test]
    async fn test_refund_of_unpaid_is_noop() {
        let db = test_db().await;
        let chain = catalog(&db, "Chain", 3499, ItemType::Article).await;
        let wo_id = workorder_with(&db, &[&chain]).await;
        let line_id = db.items().list(&wo_id).await.unwrap()[0].id.clone();

        assert_eq!(db.workorders().refund(&wo_id, &[line_id]).await.unwrap(), wo_id);
        assert_eq!(db.workorders().list_page(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_paid_refund_nets_negative() {
        let db = test_db().await;
        let overhaul = catalog(&db, "Overhaul", 7500, ItemType::Labor).await;
        let wo_id = workorder_with(&db, &[&overhaul]).await;
        db.workorders().pay(&wo_id, PaymentMethod::Visa, &taxes()).await.unwrap();
        let line_id = db.items().list(&wo_id).await.unwrap()[0].id.clone();

        let refund_id = db.workorders().refund(&wo_id, &[line_id]).await.unwrap();
        let paid = db.workorders().pay(&refund_id, PaymentMethod::Visa, &taxes()).await.unwrap();
        assert_eq!(paid.paid.unwrap().total, Money::from_cents(-8623));

        let net: Money = db.transactions().list().await.unwrap().iter().map(|t| t.amount).sum();
        assert!(net.is_zero());
    }

    #[tokio::test]
    async fn test_line_items_view_links() {
        let db = test_db().await;
        let chain = catalog(&db, "Chain", 3499, ItemType::Article).await;
        let wo_id = workorder_with(&db, &[&chain]).await;
        db.workorders().pay(&wo_id, PaymentMethod::Cash, &taxes()).await.unwrap();
        let line_id = db.items().list(&wo_id).await.unwrap()[0].id.clone();
        let refund_id = db.workorders().refund(&wo_id, &[line_id.clone()]).await.unwrap();

        let original = db.workorders().line_items_view(&wo_id).await.unwrap();
        assert_eq!(original[0].refunded_into_workorder_id.as_deref(), Some(refund_id.as_str()));
        assert_eq!(original[0].item_type, Some(ItemType::Article));

        let index = db.workorders().refund_index(&wo_id).await.unwrap();
        assert_eq!(index.refunded_into(&line_id), Some(refund_id.as_str()));

        let refund = db.workorders().line_items_view(&refund_id).await.unwrap();
        assert_eq!(refund[0].refund_source_workorder_id.as_deref(), Some(wo_id.as_str()));
        assert_eq!(refund[0].quantity, "-1.00");
        assert!(refund[0].refunded_into_workorder_id.is_none());
    }

    #[tokio::test]
    async fn test_live_totals() {
        let db = test_db().await;
        let a = catalog(&db, "Brake cable", 999, ItemType::Article).await;
        let wo_id = workorder_with(&db, &[&a]).await;
        let line = db.items().list(&wo_id).await.unwrap().remove(0);
        db.items().edit_column(&line.id, "price", "8.99").await.unwrap();
        db.items().edit_column(&line.id, "nb", "2").await.unwrap();

        let totals = db.workorders().totals(&wo_id, &taxes()).await.unwrap();
        assert_eq!(totals.subtotal, "17.98");
        assert_eq!(totals.discount, "2.00");
        assert_eq!(totals.taxes1, "0.90");
        assert_eq!(totals.taxes2, "1.79");
        assert_eq!(totals.total, "20.67");
        assert!(!totals.paid);
    }
}
