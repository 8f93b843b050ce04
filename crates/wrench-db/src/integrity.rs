//! # Stored Data Integrity Pass
//!
//! Reads raw rows, without the row mapping's own rejection of bad paid
//! groups, and runs the core checks over them. Findings are logged at
//! warn and returned; nothing is repaired.

use tracing::{info, warn};

use wrench_core::integrity::{IntegrityReport, PaidFieldPresence, RefundLink};

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::transaction::fetch_since;
use crate::repository::workorder::fetch_rows;

#[derive(Debug, sqlx::FromRow)]
struct RefundLinkRow {
    refund_item_id: String,
    item_id: String,
    target_is_refund: bool,
}

impl Database {
    /// Runs every stored-data check and returns the findings.
    pub async fn check_integrity(&self) -> DbResult<IntegrityReport> {
        let mut report = IntegrityReport::new();
        let mut tx = self.pool().begin().await?;

        for row in fetch_rows(&mut tx).await? {
            report.check_paid_fields(&PaidFieldPresence {
                workorder_id: row.id.clone(),
                stored_paid: row.paid,
                fields: row.paid_presence(),
            });
            // partial groups are already reported above
            if let Ok(Some(snapshot)) = row.snapshot() {
                report.check_snapshot(&row.id, &snapshot);
            }
        }

        let links: Vec<RefundLinkRow> = sqlx::query_as(
            r#"
            SELECT r.id AS refund_item_id,
                   s.id AS item_id,
                   s.refund_item_id IS NOT NULL AS target_is_refund
            FROM workorder_items r
            JOIN workorder_items s ON s.id = r.refund_item_id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;
        let links: Vec<RefundLink> = links
            .into_iter()
            .map(|l| RefundLink {
                refund_item_id: l.refund_item_id,
                item_id: l.item_id,
                target_is_refund: l.target_is_refund,
            })
            .collect();
        report.check_refund_links(&links);

        for ledger in fetch_since(&mut tx, None).await? {
            report.check_transaction(&ledger);
        }
        tx.commit().await?;

        for issue in &report.issues {
            warn!(issue = %issue, "Integrity check finding");
        }
        info!(issues = report.issues.len(), "Integrity check complete");

        Ok(report)
    }
}
