//! # Report Repository
//!
//! Reads paid workorders and hands them to the core aggregation. Only
//! frozen values are summed; a workorder paid under old tax rates keeps
//! reporting the taxes it was charged. The client postal code distribution
//! covers every client, regardless of the date window.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use wrench_core::report::{ItemsSoldTally, PostalCodeTally, SalesReport, POSTAL_PREFIX_LEN};
use wrench_core::{Pricing, TaxConfig, Workorder};

use super::item::fetch_items;
use super::parse_decimal;
use super::workorder::WorkorderRow;
use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct ArticleSoldRow {
    inventory_item_id: String,
    name: String,
    quantity: String,
    paid_date: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct PostalPrefixRow {
    prefix: String,
    clients: i64,
}

/// Repository for reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales over `[start, end]`, both days inclusive (UTC calendar days).
    pub async fn sales_report(&self, start: NaiveDate, end: NaiveDate, taxes: &TaxConfig) -> DbResult<SalesReport> {
        let mut report = SalesReport::new(start, end)?;
        let mut tx = self.pool.begin().await?;

        let rows: Vec<WorkorderRow> = sqlx::query_as(
            r#"
            SELECT id, client_id, bike_description, bike_serial_number, calendar_date,
                   status, invoice_notes, internal_notes, created_at, updated_at, archived,
                   paid, paid_subtotal, paid_tax1_rate, paid_tax2_rate, paid_taxes1,
                   paid_taxes2, paid_total, paid_date
            FROM workorders
            WHERE paid_date IS NOT NULL
            ORDER BY paid_date
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        for row in rows {
            let wo = Workorder::try_from(row)?;
            if !wo.paid_at().is_some_and(|at| report.includes(at)) {
                continue;
            }
            let items = fetch_items(&mut tx, &wo.id).await?;
            report.add_workorder(&Pricing::new(&wo, &items, taxes))?;
        }

        let sold: Vec<ArticleSoldRow> = sqlx::query_as(
            r#"
            SELECT wi.inventory_item_id AS inventory_item_id,
                   ii.name              AS name,
                   wi.quantity          AS quantity,
                   w.paid_date          AS paid_date
            FROM workorder_items wi
            JOIN inventory_items ii ON ii.id = wi.inventory_item_id
            JOIN workorders w ON w.id = wi.workorder_id
            WHERE w.paid_date IS NOT NULL AND ii.item_type = 'article'
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let prefixes: Vec<PostalPrefixRow> = sqlx::query_as(
            r#"
            SELECT UPPER(SUBSTR(TRIM(postal_code), 1, ?1)) AS prefix,
                   COUNT(*)                                AS clients
            FROM clients
            GROUP BY prefix
            "#,
        )
        .bind(POSTAL_PREFIX_LEN as i64)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let mut tally = ItemsSoldTally::new();
        for row in sold.iter().filter(|r| report.includes(r.paid_date)) {
            let quantity = parse_decimal("workorder_items", "quantity", &row.quantity)?;
            tally.record(&row.inventory_item_id, &row.name, quantity);
        }
        report.set_items_sold(tally);

        let mut postal_codes = PostalCodeTally::new();
        for row in &prefixes {
            let clients =
                usize::try_from(row.clients).map_err(|e| DbError::invalid_data("clients", "postal_code", e))?;
            postal_codes.record(&row.prefix, clients);
        }
        report.set_postal_codes(postal_codes);

        debug!(
            start = %start,
            end = %end,
            workorders = report.workorder_count,
            total = %report.total,
            clients = report.postal_codes.client_count(),
            "Sales report computed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{catalog, taxes, test_db, workorder_with};
    use rust_decimal_macros::dec;
    use wrench_core::{Client, ItemType, Money, PaymentMethod, TaxDefinition, TaxRate};

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[tokio::test]
    async fn test_report_sums_frozen_totals() {
        let db = test_db().await;
        let overhaul = catalog(&db, "Overhaul", 7500, ItemType::Labor).await;
        let tube = catalog(&db, "Tube", 2000, ItemType::Article).await;

        let a = workorder_with(&db, &[&overhaul]).await;
        let b = workorder_with(&db, &[&tube, &tube]).await;
        workorder_with(&db, &[&tube]).await;
        db.workorders().pay(&a, PaymentMethod::Cash, &taxes()).await.unwrap();
        db.workorders().pay(&b, PaymentMethod::Visa, &taxes()).await.unwrap();

        // rates changing afterwards must not move the report
        let raised = TaxConfig::new(
            TaxDefinition::new("TPS", TaxRate::new(dec!(0.07)).unwrap()),
            TaxDefinition::new("TVQ", TaxRate::new(dec!(0.11)).unwrap()),
        );
        let report = db.reports().sales_report(today(), today(), &raised).await.unwrap();

        assert_eq!(report.workorder_count, 2);
        assert_eq!(report.subtotal, Money::from_cents(11500));
        // 86.23 + 40.00 + 2.00 + 3.99
        assert_eq!(report.total, Money::from_cents(13222));
        assert_eq!(report.subtotal + report.taxes, report.total);

        assert_eq!(report.items_sold.len(), 1);
        assert_eq!(report.items_sold[0].inventory_item_id, tube.id);
        assert_eq!(report.items_sold[0].quantity, dec!(2));
    }

    #[tokio::test]
    async fn test_report_nets_refunds() {
        let db = test_db().await;
        let tube = catalog(&db, "Tube", 2000, ItemType::Article).await;
        let wo = workorder_with(&db, &[&tube, &tube]).await;
        db.workorders().pay(&wo, PaymentMethod::Cash, &taxes()).await.unwrap();

        let line = db.items().list(&wo).await.unwrap().remove(0);
        let refund = db.workorders().refund(&wo, &[line.id]).await.unwrap();
        db.workorders().pay(&refund, PaymentMethod::Cash, &taxes()).await.unwrap();

        let report = db.reports().sales_report(today(), today(), &taxes()).await.unwrap();
        assert_eq!(report.workorder_count, 2);
        assert_eq!(report.subtotal, Money::from_cents(2000));
        assert_eq!(report.items_sold[0].quantity, dec!(1));
    }

    #[tokio::test]
    async fn test_report_window_excludes_other_days() {
        let db = test_db().await;
        let tube = catalog(&db, "Tube", 2000, ItemType::Article).await;
        let wo = workorder_with(&db, &[&tube]).await;
        db.workorders().pay(&wo, PaymentMethod::Cash, &taxes()).await.unwrap();

        let yesterday = today().pred_opt().unwrap();
        let report = db.reports().sales_report(yesterday, yesterday, &taxes()).await.unwrap();
        assert_eq!(report.workorder_count, 0);
        assert!(report.total.is_zero());
        assert!(report.items_sold.is_empty());

        assert!(db.reports().sales_report(today(), yesterday, &taxes()).await.is_err());
    }

    #[tokio::test]
    async fn test_report_postal_code_distribution() {
        let db = test_db().await;
        let codes = [
            "H2X 1Y4", "h2x 3b2", "H2X1Z9", "H2T 1A1", "H2T 2B2", "H2J 3C3", "H1A 1A1", "H3C 4D4",
            "J4K 5E5", "G1R 6F6", "", "   ",
        ];
        for (n, code) in codes.iter().enumerate() {
            let mut client = Client::new("Client", &n.to_string(), Utc::now());
            client.postal_code = code.to_string();
            db.clients().create(&client).await.unwrap();
        }

        // no sales in the window, the distribution is still computed
        let yesterday = today().pred_opt().unwrap();
        let report = db.reports().sales_report(yesterday, yesterday, &taxes()).await.unwrap();
        let dist = &report.postal_codes;

        assert_eq!(dist.top.len(), 5);
        assert_eq!(dist.top[0].prefix, "H2X");
        assert_eq!(dist.top[0].clients, 3);
        assert_eq!(dist.top[1].prefix, "H2T");
        assert_eq!(dist.top[1].clients, 2);
        // G1R, H1A, H2J, H3C, J4K tie at one client each, alphabetical
        let tied: Vec<&str> = dist.top[2..].iter().map(|c| c.prefix.as_str()).collect();
        assert_eq!(tied, vec!["G1R", "H1A", "H2J"]);
        assert_eq!(dist.others, 2);
        assert_eq!(dist.unknown, 2);
        assert_eq!(dist.client_count(), codes.len());
    }
}
