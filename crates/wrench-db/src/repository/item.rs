//! # Line Item Repository
//!
//! ## Paid Lock
//! ```text
//!  workorder unpaid ──► add_item / edit_column / remove_item allowed
//!  workorder paid   ──► add/remove: AlreadyPaid
//!                       edit:       InvalidColumnEdit
//! ```
//! The paid check and the write share one database transaction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use wrench_core::edit::ItemEdit;
use wrench_core::money::{fixed_form, MONEY_DP, UNIT_PRICE_DP};
use wrench_core::validation::QUANTITY_DP;
use wrench_core::{CoreError, WorkorderItem};

use super::inventory::fetch_inventory_item;
use super::workorder::{fetch_paid_flag, touch_workorder};
use super::{bind_value, parse_decimal, parse_money};
use crate::error::{DbError, DbResult};

const TABLE: &str = "workorder_items";

#[derive(Debug, sqlx::FromRow)]
struct WorkorderItemRow {
    id: String,
    workorder_id: String,
    inventory_item_id: Option<String>,
    name: String,
    quantity: String,
    unit_price: String,
    original_price: String,
    taxable: bool,
    refund_item_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<WorkorderItemRow> for WorkorderItem {
    type Error = DbError;

    fn try_from(row: WorkorderItemRow) -> DbResult<Self> {
        Ok(WorkorderItem {
            quantity: parse_decimal(TABLE, "quantity", &row.quantity)?,
            unit_price: parse_decimal(TABLE, "unit_price", &row.unit_price)?,
            original_price: parse_money(TABLE, "original_price", &row.original_price)?,
            id: row.id,
            workorder_id: row.workorder_id,
            inventory_item_id: row.inventory_item_id,
            name: row.name,
            taxable: row.taxable,
            refund_item_id: row.refund_item_id,
            created_at: row.created_at,
        })
    }
}

/// Lines of a workorder in creation order.
pub(crate) async fn fetch_items(conn: &mut SqliteConnection, workorder_id: &str) -> DbResult<Vec<WorkorderItem>> {
    let rows: Vec<WorkorderItemRow> = sqlx::query_as(
        r#"
        SELECT id, workorder_id, inventory_item_id, name, quantity, unit_price,
               original_price, taxable, refund_item_id, created_at
        FROM workorder_items
        WHERE workorder_id = ?1
        ORDER BY created_at, rowid
        "#,
    )
    .bind(workorder_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(WorkorderItem::try_from).collect()
}

pub(crate) async fn fetch_item(conn: &mut SqliteConnection, id: &str) -> DbResult<WorkorderItem> {
    let row: Option<WorkorderItemRow> = sqlx::query_as(
        r#"
        SELECT id, workorder_id, inventory_item_id, name, quantity, unit_price,
               original_price, taxable, refund_item_id, created_at
        FROM workorder_items
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => row.try_into(),
        None => Err(CoreError::not_found("workorder_item", id).into()),
    }
}

pub(crate) async fn insert_item(conn: &mut SqliteConnection, item: &WorkorderItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO workorder_items (
            id, workorder_id, inventory_item_id, name, quantity, unit_price,
            original_price, taxable, refund_item_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&item.id)
    .bind(&item.workorder_id)
    .bind(&item.inventory_item_id)
    .bind(&item.name)
    .bind(fixed_form(item.quantity, QUANTITY_DP))
    .bind(fixed_form(item.unit_price, UNIT_PRICE_DP))
    .bind(fixed_form(item.original_price.amount(), MONEY_DP))
    .bind(item.taxable)
    .bind(&item.refund_item_id)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Repository for line item operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<WorkorderItem> {
        let mut conn = self.pool.acquire().await?;
        fetch_item(&mut conn, id).await
    }

    /// Lines of a workorder in creation order.
    pub async fn list(&self, workorder_id: &str) -> DbResult<Vec<WorkorderItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_items(&mut conn, workorder_id).await
    }

    /// Adds a quantity-1 line copying the catalog entry.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown workorder or catalog id
    /// - `AlreadyPaid` if the workorder is paid
    pub async fn add_item(&self, workorder_id: &str, inventory_item_id: &str) -> DbResult<WorkorderItem> {
        let mut tx = self.pool.begin().await?;

        if fetch_paid_flag(&mut tx, workorder_id).await? {
            return Err(CoreError::AlreadyPaid {
                workorder_id: workorder_id.to_string(),
            }
            .into());
        }

        let catalog = fetch_inventory_item(&mut tx, inventory_item_id).await?;
        let now = Utc::now();
        let item = WorkorderItem::from_catalog(workorder_id, &catalog, now);

        debug!(
            workorder_id = %workorder_id,
            item_id = %item.id,
            name = %item.name,
            "Adding line item"
        );

        insert_item(&mut tx, &item).await?;
        touch_workorder(&mut tx, workorder_id, now).await?;
        tx.commit().await?;

        Ok(item)
    }

    /// Inline edit of one whitelisted column (`name`, `quantity`/`nb`,
    /// `price`, `taxable`). The value is parsed before anything is written.
    pub async fn edit_column(&self, id: &str, column: &str, value: &str) -> DbResult<WorkorderItem> {
        let edit = ItemEdit::parse(column, value)?;

        let mut tx = self.pool.begin().await?;
        let mut item = fetch_item(&mut tx, id).await?;

        if fetch_paid_flag(&mut tx, &item.workorder_id).await? {
            return Err(CoreError::InvalidColumnEdit {
                entity: ItemEdit::ENTITY,
                column: column.to_string(),
                reason: format!("workorder {} is paid", item.workorder_id),
            }
            .into());
        }

        debug!(item_id = %id, column = edit.column(), "Editing line item");

        let sql = format!("UPDATE workorder_items SET {} = ?1 WHERE id = ?2", edit.column());
        bind_value(sqlx::query(&sql), edit.value())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        touch_workorder(&mut tx, &item.workorder_id, Utc::now()).await?;
        tx.commit().await?;

        edit.apply(&mut item);
        Ok(item)
    }

    /// Removes a line from an unpaid workorder.
    pub async fn remove_item(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        let item = fetch_item(&mut tx, id).await?;

        if fetch_paid_flag(&mut tx, &item.workorder_id).await? {
            return Err(CoreError::AlreadyPaid {
                workorder_id: item.workorder_id,
            }
            .into());
        }

        debug!(item_id = %id, workorder_id = %item.workorder_id, "Removing line item");

        sqlx::query("DELETE FROM workorder_items WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        touch_workorder(&mut tx, &item.workorder_id, Utc::now()).await?;
        tx.commit().await?;

        Ok(())
    }
}
