//! # Money Module
//!
//! Provides the `Money` type and the rounding rule shared by the whole engine.
//!
//! ## Precision Boundaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE ROUNDING HAPPENS                                                 │
//! │                                                                         │
//! │  Unit price        up to 3 decimals   (volume-averaged piece pricing)   │
//! │  Tax rate          up to 8 decimals   (0.09975 and friends)             │
//! │  Line total        FULL precision     qty × unit price, never rounded   │
//! │                                                                         │
//! │  Σ line totals ──► round(·, 2) ──► Money   ← only here                  │
//! │  Σ taxable × rate ──► round(·, 2) ──► Money                             │
//! │                                                                         │
//! │  Rule: round half up (midpoint away from zero), exactly like a          │
//! │  cashier would: 0.165 → 0.17, -0.165 → -0.17                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use wrench_core::money::Money;
//!
//! let price = Money::from_decimal(Decimal::new(10995, 3)); // 10.995
//! assert_eq!(price.to_fixed(), "11.00");
//!
//! // NEVER do this:
//! // let bad = Money::from_f64(10.99); // NO SUCH METHOD EXISTS!
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

/// Decimal places of every stored or displayed monetary amount.
pub const MONEY_DP: u32 = 2;

/// Decimal places a line item's unit price may carry.
pub const UNIT_PRICE_DP: u32 = 3;

/// Decimal places a tax rate may carry.
pub const TAX_RATE_DP: u32 = 8;

/// Rounds half up (midpoint away from zero) to `dp` decimal places.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use wrench_core::money::round_half_up;
///
/// assert_eq!(round_half_up(Decimal::new(165, 3), 2), Decimal::new(17, 2));
/// assert_eq!(round_half_up(Decimal::new(-165, 3), 2), Decimal::new(-17, 2));
/// ```
#[inline]
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed-point text at exactly `dp` decimals: `2` → `"2.00"` at `dp = 2`.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use wrench_core::money::fixed_form;
///
/// assert_eq!(fixed_form(Decimal::new(2, 0), 2), "2.00");
/// assert_eq!(fixed_form(Decimal::new(17995, 3), 3), "17.995");
/// ```
pub fn fixed_form(mut value: Decimal, dp: u32) -> String {
    value.rescale(dp);
    value.to_string()
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount, always held at 2 decimal places.
///
/// ## Design Decisions
/// - **Decimal (signed)**: Allows negative values for refunds and withdrawals
/// - **Rounded on construction**: A `Money` can only exist at the storage
///   boundary, so intermediate sums stay in `Decimal` until they are done
/// - **Serialized as a string**: `"86.23"`, never a JSON float
///
/// ## Where Money is Used
/// ```text
/// Σ qty × price (Decimal) ──► subtotal (Money) ──┐
///                                                ├──► total (Money) ──► Transaction
/// Σ taxable × rate (Decimal) ──► taxes (Money) ──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Rounds `value` half up to cents.
    pub fn from_decimal(value: Decimal) -> Self {
        let mut rounded = round_half_up(value, MONEY_DP);
        rounded.rescale(MONEY_DP);
        Money(rounded)
    }

    /// Creates a Money value from a whole number of cents.
    ///
    /// ## Example
    /// ```rust
    /// use wrench_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(8623).to_fixed(), "86.23");
    /// assert_eq!(Money::from_cents(-550).to_fixed(), "-5.50");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, MONEY_DP))
    }

    /// Returns the underlying decimal value.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub fn zero() -> Self {
        Money::from_cents(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Formats with exactly two decimals and no currency sign, the form
    /// used for storage and for presentation payloads.
    pub fn to_fixed(&self) -> String {
        fixed_form(self.0, MONEY_DP)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$86.23` / `-$5.50`.
///
/// ## Note
/// This is for logs and debugging. Receipts format amounts themselves.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-${}", self.abs().to_fixed())
        } else {
            write!(f, "${}", self.to_fixed())
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    /// Parses a decimal string, rounding half up to cents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a decimal number", s),
        })?;
        Ok(Money::from_decimal(value))
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_decimal_rounds_half_up() {
        assert_eq!(Money::from_decimal(dec!(2.585)).amount(), dec!(2.59));
        assert_eq!(Money::from_decimal(dec!(0.165)).amount(), dec!(0.17));
        assert_eq!(Money::from_decimal(dec!(7.48125)).amount(), dec!(7.48));
        assert_eq!(Money::from_decimal(dec!(-0.165)).amount(), dec!(-0.17));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_to_fixed_pads_scale() {
        assert_eq!(Money::from_decimal(dec!(75)).to_fixed(), "75.00");
        assert_eq!(Money::from_decimal(dec!(1.5)).to_fixed(), "1.50");
        assert_eq!(Money::from_decimal(dec!(-3)).to_fixed(), "-3.00");

        assert_eq!(fixed_form(dec!(2), 2), "2.00");
        assert_eq!(fixed_form(dec!(17.995), 3), "17.995");
        assert_eq!(fixed_form(dec!(-1), 2), "-1.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).amount(), dec!(15.00));
        assert_eq!((a - b).amount(), dec!(5.00));
        assert_eq!((-a).amount(), dec!(-10.00));

        let total: Money = vec![a, b, -b].into_iter().sum();
        assert_eq!(total, a);
    }

    #[test]
    fn test_parse() {
        assert_eq!("12.345".parse::<Money>().unwrap().amount(), dec!(12.35));
        assert_eq!(" 20 ".parse::<Money>().unwrap().to_fixed(), "20.00");
        assert!("twelve".parse::<Money>().is_err());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs(), Money::from_cents(100));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Money::from_cents(8623)).unwrap();
        assert_eq!(json, "\"86.23\"");
    }
}
