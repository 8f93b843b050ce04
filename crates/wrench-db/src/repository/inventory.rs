//! # Inventory Repository
//!
//! Catalog entries. Lines copy name, price and taxable flag at creation, so
//! nothing here ever touches an existing workorder.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use wrench_core::validation::{validate_catalog_price, validate_name};
use wrench_core::{CoreError, InventoryItem, ItemType, SpecialMeaning};

use super::parse_money;
use crate::error::{DbError, DbResult};

const TABLE: &str = "inventory_items";

#[derive(Debug, sqlx::FromRow)]
struct InventoryItemRow {
    id: String,
    name: String,
    keywords: String,
    category: String,
    price: String,
    cost: String,
    taxable: bool,
    item_type: ItemType,
    quick_add: bool,
    special_meaning: SpecialMeaning,
    archived: bool,
}

impl TryFrom<InventoryItemRow> for InventoryItem {
    type Error = DbError;

    fn try_from(row: InventoryItemRow) -> DbResult<Self> {
        Ok(InventoryItem {
            price: parse_money(TABLE, "price", &row.price)?,
            cost: parse_money(TABLE, "cost", &row.cost)?,
            id: row.id,
            name: row.name,
            keywords: row.keywords,
            category: row.category,
            taxable: row.taxable,
            item_type: row.item_type,
            quick_add: row.quick_add,
            special_meaning: row.special_meaning,
            archived: row.archived,
        })
    }
}

/// Loads one catalog entry or fails with `NotFound`.
pub(crate) async fn fetch_inventory_item(conn: &mut SqliteConnection, id: &str) -> DbResult<InventoryItem> {
    let row: Option<InventoryItemRow> = sqlx::query_as(
        r#"
        SELECT id, name, keywords, category, price, cost, taxable,
               item_type, quick_add, special_meaning, archived
        FROM inventory_items
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => row.try_into(),
        None => Err(CoreError::not_found("inventory_item", id).into()),
    }
}

/// Repository for catalog operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Inserts a catalog entry after validating its name and prices.
    pub async fn create(&self, item: &InventoryItem) -> DbResult<()> {
        validate_name("name", &item.name)?;
        validate_catalog_price(item.price)?;
        validate_catalog_price(item.cost)?;

        debug!(id = %item.id, name = %item.name, "Inserting inventory item");

        sqlx::query(
            r#"
            INSERT INTO inventory_items (
                id, name, keywords, category, price, cost, taxable,
                item_type, quick_add, special_meaning, archived
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.keywords)
        .bind(&item.category)
        .bind(item.price.to_fixed())
        .bind(item.cost.to_fixed())
        .bind(item.taxable)
        .bind(item.item_type)
        .bind(item.quick_add)
        .bind(item.special_meaning)
        .bind(item.archived)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Catalog lookup used when adding a line.
    pub async fn get_by_id(&self, id: &str) -> DbResult<InventoryItem> {
        let mut conn = self.pool.acquire().await?;
        fetch_inventory_item(&mut conn, id).await
    }

    /// Non-archived entries flagged for one-click adding, by name.
    pub async fn list_quick_add(&self) -> DbResult<Vec<InventoryItem>> {
        let rows: Vec<InventoryItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, keywords, category, price, cost, taxable,
                   item_type, quick_add, special_meaning, archived
            FROM inventory_items
            WHERE quick_add = 1 AND archived = 0
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InventoryItem::try_from).collect()
    }

    /// Deletes a catalog entry. Fails with a foreign key violation while a
    /// line still references it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("inventory_item", id).into());
        }
        Ok(())
    }
}
