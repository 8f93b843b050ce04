//! # Integrity Findings
//!
//! The operations never produce these states. A validation pass over stored
//! data reports them as diagnostics; nothing here repairs anything.
//!
//! ```text
//!  stored rows ──► checks below ──► IntegrityReport { issues }
//!                                         │
//!                                         └──► logged at warn by wrench-db
//! ```

use std::collections::BTreeMap;
use thiserror::Error;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaidSnapshot, Transaction};

/// One invariant violation found in storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityIssue {
    #[error("workorder {workorder_id}: paid fields partially NULL ({null_fields:?})")]
    PartialPaidGroup {
        workorder_id: String,
        null_fields: Vec<&'static str>,
    },

    #[error("workorder {workorder_id}: stored paid={stored_paid} but paid_date present={has_paid_date}")]
    PaidFlagMismatch {
        workorder_id: String,
        stored_paid: bool,
        has_paid_date: bool,
    },

    #[error("workorder {workorder_id}: frozen total {total} != subtotal {subtotal} + taxes {taxes}")]
    PaidTotalMismatch {
        workorder_id: String,
        subtotal: Money,
        taxes: Money,
        total: Money,
    },

    #[error("line {item_id} refunded by {} lines: {refund_item_ids:?}", .refund_item_ids.len())]
    MultipleRefunds {
        item_id: String,
        refund_item_ids: Vec<String>,
    },

    #[error("refund line {refund_item_id} reverses {item_id}, which is itself a refund")]
    RefundOfRefund {
        refund_item_id: String,
        item_id: String,
    },

    #[error("transaction {transaction_id}: comment must be present exactly when no workorder is linked")]
    TransactionCommentMismatch { transaction_id: String },
}

/// Presence of each stored paid field for one workorder row.
#[derive(Debug, Clone)]
pub struct PaidFieldPresence {
    pub workorder_id: String,
    pub stored_paid: bool,
    /// `(column, is_not_null)` for the seven paid columns.
    pub fields: [(&'static str, bool); 7],
}

/// A stored refund link: `refund_item_id` reverses `item_id`.
#[derive(Debug, Clone)]
pub struct RefundLink {
    pub refund_item_id: String,
    pub item_id: String,
    /// Whether `item_id` itself carries a refund link.
    pub target_is_refund: bool,
}

/// Findings of one validation pass.
#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Checks the all-or-nothing paid group and the stored `paid` flag.
    pub fn check_paid_fields(&mut self, row: &PaidFieldPresence) {
        let null_fields: Vec<&'static str> = row
            .fields
            .iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect();

        if !null_fields.is_empty() && null_fields.len() != row.fields.len() {
            self.issues.push(IntegrityIssue::PartialPaidGroup {
                workorder_id: row.workorder_id.clone(),
                null_fields,
            });
        }

        let has_paid_date = row
            .fields
            .iter()
            .any(|(name, present)| *name == "paid_date" && *present);
        if row.stored_paid != has_paid_date {
            self.issues.push(IntegrityIssue::PaidFlagMismatch {
                workorder_id: row.workorder_id.clone(),
                stored_paid: row.stored_paid,
                has_paid_date,
            });
        }
    }

    /// Checks `total == subtotal + taxes1 + taxes2` on a frozen snapshot.
    pub fn check_snapshot(&mut self, workorder_id: &str, paid: &PaidSnapshot) {
        if paid.subtotal + paid.taxes() != paid.total {
            self.issues.push(IntegrityIssue::PaidTotalMismatch {
                workorder_id: workorder_id.to_string(),
                subtotal: paid.subtotal,
                taxes: paid.taxes(),
                total: paid.total,
            });
        }
    }

    /// Checks at-most-one inverse and refund depth.
    pub fn check_refund_links(&mut self, links: &[RefundLink]) {
        let mut by_target: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for link in links {
            by_target
                .entry(link.item_id.as_str())
                .or_default()
                .push(link.refund_item_id.clone());

            if link.target_is_refund {
                self.issues.push(IntegrityIssue::RefundOfRefund {
                    refund_item_id: link.refund_item_id.clone(),
                    item_id: link.item_id.clone(),
                });
            }
        }

        for (item_id, refund_item_ids) in by_target {
            if refund_item_ids.len() > 1 {
                self.issues.push(IntegrityIssue::MultipleRefunds {
                    item_id: item_id.to_string(),
                    refund_item_ids,
                });
            }
        }
    }

    pub fn check_transaction(&mut self, tx: &Transaction) {
        if !tx.is_well_formed() {
            self.issues.push(IntegrityIssue::TransactionCommentMismatch {
                transaction_id: tx.id.clone(),
            });
        }
    }

    /// Fails with [`CoreError::Integrity`] listing every finding.
    pub fn into_result(self) -> CoreResult<()> {
        if self.is_clean() {
            return Ok(());
        }
        let message = self
            .issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(CoreError::Integrity(message))
    }
}
