//! # Error Types
//!
//! Domain-specific error types for wrench-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  wrench-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  wrench-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ConfigError      - Shop configuration failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (workorder ID, column, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every rejected operation leaves state untouched

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// None of them is retryable: the caller gets the error and nothing was written.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The workorder already carries a frozen payment snapshot.
    ///
    /// ## When This Occurs
    /// - Paying a workorder a second time
    /// - Adding or removing a line item on a paid workorder
    /// - Losing a payment race (the guarded UPDATE matched zero rows)
    #[error("Workorder {workorder_id} has already been paid")]
    AlreadyPaid { workorder_id: String },

    /// Paying a workorder that has no line items.
    ///
    /// ## User Workflow
    /// ```text
    /// New workorder (no lines)
    ///      │
    ///      ▼
    /// pay(Cash)
    ///      │
    ///      ▼
    /// EmptyWorkorder { workorder_id }   ← no snapshot, no Transaction
    /// ```
    #[error("Workorder {workorder_id} is empty and cannot be paid")]
    EmptyWorkorder { workorder_id: String },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A refund selection names a line that was already refunded.
    #[error("Line item {item_id} was already refunded in workorder {refund_workorder_id}")]
    AlreadyRefunded {
        item_id: String,
        refund_workorder_id: String,
    },

    /// A refund selection names a line that is itself a refund line.
    #[error("Line item {item_id} is a refund and cannot be refunded")]
    IsARefund { item_id: String },

    /// A line in a refund selection belongs to another workorder.
    #[error("Line item {item_id} does not belong to workorder {workorder_id}")]
    ForeignLineItem {
        item_id: String,
        workorder_id: String,
    },

    /// Editing a column outside the whitelist, or a line of a paid workorder.
    #[error("Cannot edit {entity}.{column}: {reason}")]
    InvalidColumnEdit {
        entity: &'static str,
        column: String,
        reason: String,
    },

    /// Deleting a workorder that is paid or still has line items.
    #[error("Workorder {workorder_id} cannot be deleted: {reason}")]
    WorkorderNotDeletable {
        workorder_id: String,
        reason: String,
    },

    /// The requested computation is not supported.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// Stored data violates an invariant the operations never produce.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Too many decimal places for the field's precision.
    #[error("{field} allows at most {max} decimal places")]
    TooPrecise { field: String, max: u32 },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::AlreadyPaid {
            workorder_id: "wo-1".to_string(),
        };
        assert_eq!(err.to_string(), "Workorder wo-1 has already been paid");

        let err = CoreError::not_found("Workorder", "wo-404");
        assert_eq!(err.to_string(), "Workorder not found: wo-404");

        let err = CoreError::InvalidColumnEdit {
            entity: "workorder_item",
            column: "refund_item_id".to_string(),
            reason: "column is not editable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot edit workorder_item.refund_item_id: column is not editable"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "comment".to_string(),
        };
        assert_eq!(err.to_string(), "comment is required");

        let err = ValidationError::TooPrecise {
            field: "price".to_string(),
            max: 3,
        };
        assert_eq!(err.to_string(), "price allows at most 3 decimal places");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
