//! # Tax Configuration
//!
//! The two ordered tax definitions the engine prices with. This is a plain
//! value: loading it from files or the environment is wrench-db's job, and
//! every pricing entry point receives it explicitly.
//!
//! ```text
//! ShopConfig (wrench-db) ──► TaxConfig ──► Pricing::new(&wo, &items, &taxes)
//!                                     └──► prepare_payment(.., &taxes, ..)
//!                                                └──► PaidSnapshot.tax{1,2}_rate
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;

/// A named tax ("TPS", "TVQ").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxDefinition {
    pub name: String,
    #[ts(as = "String")]
    pub rate: TaxRate,
}

impl TaxDefinition {
    pub fn new(name: impl Into<String>, rate: TaxRate) -> Self {
        TaxDefinition {
            name: name.into(),
            rate,
        }
    }
}

/// Exactly two ordered tax definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxConfig {
    pub tax1: TaxDefinition,
    pub tax2: TaxDefinition,
}

impl TaxConfig {
    pub fn new(tax1: TaxDefinition, tax2: TaxDefinition) -> Self {
        TaxConfig { tax1, tax2 }
    }

    /// Builds from `(display_name, rate_as_decimal_string)` pairs.
    ///
    /// ## Example
    /// ```rust
    /// use wrench_core::TaxConfig;
    ///
    /// let taxes = TaxConfig::from_pairs(&[("TPS", "0.05"), ("TVQ", "0.09975")]).unwrap();
    /// assert_eq!(taxes.tax2.name, "TVQ");
    /// assert!(TaxConfig::from_pairs(&[("TPS", "0.05")]).is_err());
    /// ```
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self, ValidationError> {
        match pairs {
            [(name1, rate1), (name2, rate2)] => Ok(TaxConfig {
                tax1: TaxDefinition::new(*name1, rate1.parse()?),
                tax2: TaxDefinition::new(*name2, rate2.parse()?),
            }),
            _ => Err(ValidationError::OutOfRange {
                field: "taxes".to_string(),
                min: "2".to_string(),
                max: "2".to_string(),
            }),
        }
    }

    #[inline]
    pub fn rates(&self) -> (TaxRate, TaxRate) {
        (self.tax1.rate, self.tax2.rate)
    }
}

impl Default for TaxConfig {
    /// Québec: TPS 5%, TVQ 9.975%.
    fn default() -> Self {
        TaxConfig {
            tax1: TaxDefinition::new("TPS", TaxRate::new(Decimal::new(5, 2)).unwrap_or_default()),
            tax2: TaxDefinition::new("TVQ", TaxRate::new(Decimal::new(9975, 5)).unwrap_or_default()),
        }
    }
}
