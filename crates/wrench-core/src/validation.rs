//! # Validation Module
//!
//! Input validation for values that arrive as text from the register screen.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller                                                        │
//! │  └── Sends (column, value) pairs as strings                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Parse decimals, booleans, dates                                   │
//! │  └── Enforce precision and ranges BEFORE any write                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE refund link                                                │
//! │  └── Foreign keys (restrict)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use wrench_core::validation::{parse_quantity, parse_unit_price};
//!
//! let qty = parse_quantity("2").unwrap();
//! let price = parse_unit_price("12.345").unwrap();
//! assert_eq!((qty * price).to_string(), "24.690");
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::{Money, UNIT_PRICE_DP};
use crate::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Decimal places a line quantity may carry.
pub const QUANTITY_DP: u32 = 2;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (line item, catalog item).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Validates a mandatory free-text comment (cash adjustments).
pub fn validate_comment(comment: &str) -> ValidationResult<String> {
    let comment = comment.trim();

    if comment.is_empty() {
        return Err(ValidationError::Required {
            field: "comment".to_string(),
        });
    }

    Ok(comment.to_string())
}

/// Normalizes an optional comment: blank becomes `None`.
pub fn optional_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Numeric Parsers
// =============================================================================

fn parse_decimal(field: &str, value: &str) -> ValidationResult<Decimal> {
    Decimal::from_str(value.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{}' is not a decimal number", value.trim()),
    })
}

fn check_scale(field: &str, value: Decimal, max: u32) -> ValidationResult<Decimal> {
    let normalized = value.normalize();
    if normalized.scale() > max {
        return Err(ValidationError::TooPrecise {
            field: field.to_string(),
            max,
        });
    }
    Ok(normalized)
}

/// Parses a line quantity.
///
/// ## Rules
/// - Signed decimal (refund lines are negative), at most 2 decimals
/// - `|qty|` must not exceed [`MAX_ITEM_QUANTITY`]
///
/// ## Example
/// ```rust
/// use wrench_core::validation::parse_quantity;
///
/// assert!(parse_quantity("1.5").is_ok());
/// assert!(parse_quantity("-2").is_ok());
/// assert!(parse_quantity("1.555").is_err());
/// assert!(parse_quantity("1000").is_err());
/// ```
pub fn parse_quantity(value: &str) -> ValidationResult<Decimal> {
    let qty = check_scale("quantity", parse_decimal("quantity", value)?, QUANTITY_DP)?;
    validate_quantity(qty)?;
    Ok(qty)
}

/// Checks the quantity bound.
pub fn validate_quantity(qty: Decimal) -> ValidationResult<()> {
    let max = Decimal::from(MAX_ITEM_QUANTITY);
    if qty.abs() > max {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: (-max).to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

fn check_price(price: Decimal) -> ValidationResult<()> {
    let max = Decimal::from(MAX_UNIT_PRICE);
    if price < Decimal::ZERO || price > max {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: "0".to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// Parses a line unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero is allowed (label lines, freebies)
/// - At most [`MAX_UNIT_PRICE`]
/// - At most 3 decimals
///
/// ## Example
/// ```rust
/// use wrench_core::validation::parse_unit_price;
///
/// assert!(parse_unit_price("1000000").is_ok());
/// assert!(parse_unit_price("1000000.001").is_err());
/// ```
pub fn parse_unit_price(value: &str) -> ValidationResult<Decimal> {
    let price = check_scale("price", parse_decimal("price", value)?, UNIT_PRICE_DP)?;
    check_price(price)?;
    Ok(price)
}

/// Validates a catalog price (2dp, between zero and [`MAX_UNIT_PRICE`]).
pub fn validate_catalog_price(price: Money) -> ValidationResult<()> {
    check_price(price.amount())
}

/// Parses a cash adjustment amount: strictly positive, rounded half up to cents.
pub fn parse_adjustment_amount(value: Decimal) -> ValidationResult<Money> {
    let amount = Money::from_decimal(value);
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(amount)
}

/// Parses an optional year of birth. Blank clears the value.
pub fn parse_year_of_birth(value: &str) -> ValidationResult<Option<i32>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let year: i32 = value.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "year_of_birth".to_string(),
        reason: format!("'{}' is not a year", value),
    })?;
    if !(1900..=2100).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "year_of_birth".to_string(),
            min: "1900".to_string(),
            max: "2100".to_string(),
        });
    }
    Ok(Some(year))
}

// =============================================================================
// Other Parsers
// =============================================================================

/// Parses a boolean flag as sent by checkbox widgets.
///
/// ## Example
/// ```rust
/// use wrench_core::validation::parse_bool;
///
/// assert_eq!(parse_bool("taxable", "true").unwrap(), true);
/// assert_eq!(parse_bool("taxable", "0").unwrap(), false);
/// assert!(parse_bool("taxable", "maybe").is_err());
/// ```
pub fn parse_bool(field: &str, value: &str) -> ValidationResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ValidationError::NotAllowed {
            field: field.to_string(),
            allowed: vec!["true".to_string(), "false".to_string()],
        }),
    }
}

/// Parses an ISO-8601 date or date-time.
///
/// Accepts RFC 3339 (`2024-05-01T10:30:00Z`), a naive date-time
/// (`2024-05-01T10:30:00`, read as UTC) or a plain date (midnight UTC).
pub fn parse_iso_datetime(field: &str, value: &str) -> ValidationResult<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{}' is not an ISO date", value),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
