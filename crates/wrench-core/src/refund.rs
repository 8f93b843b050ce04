//! # Refund Planning
//!
//! Turns selected lines of a paid workorder into a new, unpaid refund
//! workorder whose lines mirror them with negated quantities.
//!
//! ## Refund Linkage
//! ```text
//!  Workorder W (paid)                   Workorder R (unpaid, new)
//!  ┌──────────────────────────┐         ┌──────────────────────────────┐
//!  │ L1  Chain   ×1   34.99   │◄────────│ R1  Chain  ×-1  34.99        │
//!  │ L2  Tube    ×2    8.50   │◄────────│ R2  Tube   ×-2   8.50        │
//!  │ L3  Labor   ×1   40.00   │         │     refund_item_id ─► L1/L2  │
//!  └──────────────────────────┘         └──────────────────────────────┘
//!
//!  A line is refundable iff:
//!    • it belongs to W
//!    • it is not itself a refund line       (else IsARefund)
//!    • no other line points at it           (else AlreadyRefunded)
//! ```
//!
//! Invalid selections are excluded, not raised. An empty valid set makes the
//! whole operation a no-op.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::types::{Workorder, WorkorderItem};

// =============================================================================
// Refund Index
// =============================================================================

/// Who refunded whom, across workorders.
///
/// Built by storage from the refund lines that touch a set of workorders.
#[derive(Debug, Clone, Default)]
pub struct RefundIndex {
    /// source line id → workorder holding its refund line
    refunded_into: HashMap<String, String>,
    /// refund line id → workorder holding the source line
    refund_source: HashMap<String, String>,
}

impl RefundIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `refund_line` (on its own workorder) reverses a line of
    /// `source_workorder_id`.
    pub fn record(&mut self, refund_line: &WorkorderItem, source_workorder_id: &str) {
        if let Some(source_item_id) = &refund_line.refund_item_id {
            self.refunded_into
                .insert(source_item_id.clone(), refund_line.workorder_id.clone());
            self.refund_source
                .insert(refund_line.id.clone(), source_workorder_id.to_string());
        }
    }

    /// Records a raw link: `source_item_id` was refunded into `refund_workorder_id`.
    pub fn record_link(
        &mut self,
        refund_line_id: &str,
        refund_workorder_id: &str,
        source_item_id: &str,
        source_workorder_id: &str,
    ) {
        self.refunded_into
            .insert(source_item_id.to_string(), refund_workorder_id.to_string());
        self.refund_source
            .insert(refund_line_id.to_string(), source_workorder_id.to_string());
    }

    /// The workorder a line was refunded into, if any.
    pub fn refunded_into(&self, item_id: &str) -> Option<&str> {
        self.refunded_into.get(item_id).map(String::as_str)
    }

    /// The workorder holding the line a refund line reverses.
    pub fn refund_source(&self, item_id: &str) -> Option<&str> {
        self.refund_source.get(item_id).map(String::as_str)
    }
}

// =============================================================================
// Selection
// =============================================================================

/// The valid subset of a refund request, plus why the rest was dropped.
#[derive(Debug)]
pub struct RefundSelection<'a> {
    /// In the original workorder's line order.
    pub valid: Vec<&'a WorkorderItem>,
    pub excluded: Vec<CoreError>,
}

/// Filters `selected_ids` against the original workorder's lines.
///
/// Duplicate ids count once.
pub fn select_refund_lines<'a>(
    original: &Workorder,
    original_items: &'a [WorkorderItem],
    selected_ids: &[String],
    index: &RefundIndex,
) -> RefundSelection<'a> {
    let selected: HashSet<&str> = selected_ids.iter().map(String::as_str).collect();
    let mut excluded = Vec::new();

    let owned: HashSet<&str> = original_items.iter().map(|i| i.id.as_str()).collect();
    let mut reported = HashSet::new();
    for id in selected_ids {
        if !owned.contains(id.as_str()) && reported.insert(id.as_str()) {
            excluded.push(CoreError::ForeignLineItem {
                item_id: id.clone(),
                workorder_id: original.id.clone(),
            });
        }
    }

    let mut valid = Vec::new();
    for item in original_items.iter().filter(|i| selected.contains(i.id.as_str())) {
        if item.is_refund() {
            excluded.push(CoreError::IsARefund {
                item_id: item.id.clone(),
            });
        } else if let Some(refund_workorder_id) = index.refunded_into(&item.id) {
            excluded.push(CoreError::AlreadyRefunded {
                item_id: item.id.clone(),
                refund_workorder_id: refund_workorder_id.to_string(),
            });
        } else {
            valid.push(item);
        }
    }

    RefundSelection { valid, excluded }
}

// =============================================================================
// Plan
// =============================================================================

/// The refund workorder and its lines, ready to insert.
#[derive(Debug, Clone)]
pub struct RefundPlan {
    pub workorder: Workorder,
    pub items: Vec<WorkorderItem>,
}

/// Builds the refund workorder.
///
/// Returns `None` (no-op) when the original is unpaid or nothing valid
/// was selected.
pub fn plan_refund(
    original: &Workorder,
    selection: &RefundSelection<'_>,
    now: DateTime<Utc>,
) -> Option<RefundPlan> {
    if !original.is_paid() || selection.valid.is_empty() {
        return None;
    }

    let mut workorder = Workorder::new(original.client_id.clone(), now);
    workorder.bike_description = original.bike_description.clone();
    workorder.bike_serial_number = original.bike_serial_number.clone();
    workorder.invoice_notes = original.invoice_notes.clone();
    workorder.internal_notes = original.internal_notes.clone();

    let items = selection
        .valid
        .iter()
        .map(|item| item.refund_of(&workorder.id, now))
        .collect();

    Some(RefundPlan { workorder, items })
}

/// Every line is a refund line or has been refunded.
///
/// Vacuously true for a workorder without lines.
pub fn is_fully_refunded(items: &[WorkorderItem], index: &RefundIndex) -> bool {
    items
        .iter()
        .all(|item| item.is_refund() || index.refunded_into(&item.id).is_some())
}
