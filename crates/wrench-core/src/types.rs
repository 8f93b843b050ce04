//! # Domain Types
//!
//! Core domain types used throughout Wrench POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │   │   Workorder     │   │  Transaction    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name           │──►│  client_id?     │◄──│  workorder_id?  │       │
//! │  │  price (2dp)    │   │  status         │   │  amount (2dp)   │       │
//! │  │  taxable        │   │  paid: Option<  │   │  method         │       │
//! │  │  item_type      │   │   PaidSnapshot> │   │  comment?       │       │
//! │  └────────┬────────┘   └────────▲────────┘   └─────────────────┘       │
//! │           │ copied at creation  │ owns                                  │
//! │           ▼                     │                                       │
//! │  ┌─────────────────────────────────────────┐  ┌─────────────────────┐  │
//! │  │ WorkorderItem                           │  │ CashRegisterState   │  │
//! │  │  quantity (signed, 2dp)                 │  │  expected / confirm │  │
//! │  │  unit_price (3dp) / original_price (2dp)│  │  cash visa interac  │  │
//! │  │  refund_item_id ──► the line it reverses│  │  state_time         │  │
//! │  └─────────────────────────────────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Paid State
//! A workorder is paid iff its `paid` snapshot is `Some`. The seven frozen
//! fields live together in [`PaidSnapshot`], so a half-paid workorder cannot
//! be represented in memory.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::{round_half_up, Money, TAX_RATE_DP};
use crate::DEFAULT_WORKORDER_STATUS;

/// Generates a new entity identifier (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Tax Rate
// =============================================================================

/// A tax rate as a decimal fraction (`0.09975` = 9.975%).
///
/// ## Rules
/// - `0 <= rate < 1`
/// - At most 8 decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Creates a tax rate, enforcing range and precision.
    pub fn new(rate: Decimal) -> Result<Self, ValidationError> {
        if rate < Decimal::ZERO || rate >= Decimal::ONE {
            return Err(ValidationError::OutOfRange {
                field: "tax_rate".to_string(),
                min: "0".to_string(),
                max: "1 (exclusive)".to_string(),
            });
        }
        let rate = rate.normalize();
        if rate.scale() > TAX_RATE_DP {
            return Err(ValidationError::TooPrecise {
                field: "tax_rate".to_string(),
                max: TAX_RATE_DP,
            });
        }
        Ok(TaxRate(rate))
    }

    /// Zero tax rate.
    #[inline]
    pub fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    /// Returns the rate as a decimal fraction.
    #[inline]
    pub const fn rate(&self) -> Decimal {
        self.0
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `round(base × rate, 2)`, where `base` is an unrounded taxable sum.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use wrench_core::TaxRate;
    ///
    /// let tps: TaxRate = "0.05".parse().unwrap();
    /// assert_eq!(tps.apply(Decimal::new(7500, 2)).to_fixed(), "3.75");
    /// ```
    pub fn apply(&self, base: Decimal) -> Money {
        Money::from_decimal(base * self.0)
    }

    /// Storage form: the rate at its full 8-decimal precision.
    pub fn to_storage(&self) -> String {
        let mut value = round_half_up(self.0, TAX_RATE_DP);
        value.rescale(TAX_RATE_DP);
        value.to_string()
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaxRate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate = Decimal::from_str(s.trim()).map_err(|_| ValidationError::InvalidFormat {
            field: "tax_rate".to_string(),
            reason: format!("'{}' is not a decimal number", s),
        })?;
        TaxRate::new(rate)
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        TaxRate::new(value)
    }
}

impl From<TaxRate> for Decimal {
    fn from(rate: TaxRate) -> Self {
        rate.0
    }
}

// =============================================================================
// Enums
// =============================================================================

/// What a catalog entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Shop work (tune-up, wheel truing).
    Labor,
    /// Physical goods. Only these appear in the items-sold report.
    Article,
    /// Anything else (fees, memberships).
    Other,
}

impl Default for ItemType {
    fn default() -> Self {
        ItemType::Article
    }
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Labor => "labor",
            ItemType::Article => "article",
            ItemType::Other => "other",
        }
    }
}

/// Marks non-standard catalog rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMeaning {
    None,
    Membership,
    Donation,
    /// Free-text line whose name and price are typed at the counter.
    Custom,
    /// Zero-amount informational line.
    Label,
}

impl Default for SpecialMeaning {
    fn default() -> Self {
        SpecialMeaning::None
    }
}

/// How money moved.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Interac,
    Visa,
    Check,
    /// Charged to the client's store account.
    CreditAccount,
}

impl PaymentMethod {
    /// Methods reconciled at register closing.
    pub const RECONCILED: [PaymentMethod; 3] =
        [PaymentMethod::Cash, PaymentMethod::Visa, PaymentMethod::Interac];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Interac => "interac",
            PaymentMethod::Visa => "visa",
            PaymentMethod::Check => "check",
            PaymentMethod::CreditAccount => "credit_account",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cash" => Ok(PaymentMethod::Cash),
            "interac" => Ok(PaymentMethod::Interac),
            "visa" => Ok(PaymentMethod::Visa),
            "check" => Ok(PaymentMethod::Check),
            "credit_account" | "credit account" => Ok(PaymentMethod::CreditAccount),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: ["cash", "interac", "visa", "check", "credit_account"]
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// A shop customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Client {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
    /// Agreed to receive receipts and reminders by email.
    pub email_consent: bool,
    pub year_of_birth: Option<i32>,
    pub internal_notes: String,
    #[ts(as = "Option<String>")]
    pub membership_paid_until: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub archived: bool,
}

impl Client {
    /// Creates a client with only a name.
    pub fn new(first_name: &str, last_name: &str, now: DateTime<Utc>) -> Self {
        Client {
            id: new_id(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            address: String::new(),
            postal_code: String::new(),
            phone: String::new(),
            email: String::new(),
            email_consent: false,
            year_of_birth: None,
            internal_notes: String::new(),
            membership_paid_until: None,
            created_at: now,
            updated_at: now,
            archived: false,
        }
    }

    /// "First Last".
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A catalog entry. Values are copied into line items at creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    /// Extra search terms that are not part of the name.
    pub keywords: String,
    pub category: String,
    #[ts(as = "String")]
    pub price: Money,
    #[ts(as = "String")]
    pub cost: Money,
    pub taxable: bool,
    pub item_type: ItemType,
    /// Shown as a one-click button on the workorder screen.
    pub quick_add: bool,
    pub special_meaning: SpecialMeaning,
    pub archived: bool,
}

impl InventoryItem {
    /// Creates a taxable, non-special catalog item.
    pub fn new(name: &str, price: Money, item_type: ItemType) -> Self {
        InventoryItem {
            id: new_id(),
            name: name.trim().to_string(),
            keywords: String::new(),
            category: String::new(),
            price,
            cost: Money::zero(),
            taxable: true,
            item_type,
            quick_add: false,
            special_meaning: SpecialMeaning::None,
            archived: false,
        }
    }
}

// =============================================================================
// Workorder
// =============================================================================

/// The frozen financial snapshot written at payment.
///
/// Once stored these values are canonical: later catalog or tax changes
/// never alter them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaidSnapshot {
    #[ts(as = "String")]
    pub subtotal: Money,
    #[ts(as = "String")]
    pub tax1_rate: TaxRate,
    #[ts(as = "String")]
    pub tax2_rate: TaxRate,
    #[ts(as = "String")]
    pub taxes1: Money,
    #[ts(as = "String")]
    pub taxes2: Money,
    #[ts(as = "String")]
    pub total: Money,
    #[ts(as = "String")]
    pub paid_at: DateTime<Utc>,
}

impl PaidSnapshot {
    #[inline]
    pub fn taxes(&self) -> Money {
        self.taxes1 + self.taxes2
    }
}

/// A repair ticket that doubles as a sales invoice.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Workorder {
    pub id: String,
    pub client_id: Option<String>,
    pub bike_description: String,
    pub bike_serial_number: String,
    /// Scheduling/display date, editable by staff.
    #[ts(as = "String")]
    pub calendar_date: DateTime<Utc>,
    /// Free-text lifecycle label ("open", "waiting for parts", ...).
    pub status: String,
    pub invoice_notes: String,
    pub internal_notes: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub archived: bool,
    /// `Some` iff the workorder is paid.
    pub paid: Option<PaidSnapshot>,
}

impl Workorder {
    /// Creates an empty, unpaid workorder.
    pub fn new(client_id: Option<String>, now: DateTime<Utc>) -> Self {
        Workorder {
            id: new_id(),
            client_id,
            bike_description: String::new(),
            bike_serial_number: String::new(),
            calendar_date: now,
            status: DEFAULT_WORKORDER_STATUS.to_string(),
            invoice_notes: String::new(),
            internal_notes: String::new(),
            created_at: now,
            updated_at: now,
            archived: false,
            paid: None,
        }
    }

    #[inline]
    pub fn is_paid(&self) -> bool {
        self.paid.is_some()
    }

    #[inline]
    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid.as_ref().map(|p| p.paid_at)
    }
}

// =============================================================================
// Workorder Item
// =============================================================================

/// A line on a workorder.
///
/// Name, price and taxable flag are copies: editing the catalog afterwards
/// does not touch existing lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WorkorderItem {
    pub id: String,
    pub workorder_id: String,
    pub inventory_item_id: Option<String>,
    pub name: String,
    /// Signed, 2dp. Negative on refund lines.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Up to 3dp.
    #[ts(as = "String")]
    pub unit_price: Decimal,
    /// Catalog price at creation, kept for discount display.
    #[ts(as = "String")]
    pub original_price: Money,
    pub taxable: bool,
    /// The line this one reverses.
    pub refund_item_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl WorkorderItem {
    /// A quantity-1 line copying the catalog entry's name, price and taxable flag.
    pub fn from_catalog(workorder_id: &str, item: &InventoryItem, now: DateTime<Utc>) -> Self {
        WorkorderItem {
            id: new_id(),
            workorder_id: workorder_id.to_string(),
            inventory_item_id: Some(item.id.clone()),
            name: item.name.clone(),
            quantity: Decimal::ONE,
            unit_price: item.price.amount(),
            original_price: item.price,
            taxable: item.taxable,
            refund_item_id: None,
            created_at: now,
        }
    }

    /// The mirror line reversing `self` on the refund workorder.
    pub fn refund_of(&self, refund_workorder_id: &str, now: DateTime<Utc>) -> Self {
        WorkorderItem {
            id: new_id(),
            workorder_id: refund_workorder_id.to_string(),
            inventory_item_id: self.inventory_item_id.clone(),
            name: self.name.clone(),
            quantity: -self.quantity,
            unit_price: self.unit_price,
            original_price: self.original_price,
            taxable: self.taxable,
            refund_item_id: Some(self.id.clone()),
            created_at: now,
        }
    }

    /// `quantity × unit_price`, unrounded.
    #[inline]
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    /// `(original_price − unit_price) × quantity` when discounted, else zero.
    pub fn discount(&self) -> Decimal {
        let original = self.original_price.amount();
        if self.unit_price < original {
            (original - self.unit_price) * self.quantity
        } else {
            Decimal::ZERO
        }
    }

    #[inline]
    pub fn is_refund(&self) -> bool {
        self.refund_item_id.is_some()
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// An append-only money movement.
///
/// `comment` is present exactly when `workorder_id` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    #[ts(as = "String")]
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub workorder_id: Option<String>,
    pub comment: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// A sale-linked entry. Carries no comment.
    pub fn for_workorder(
        workorder_id: &str,
        amount: Money,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Self {
        Transaction {
            id: new_id(),
            amount,
            payment_method,
            workorder_id: Some(workorder_id.to_string()),
            comment: None,
            created_at: now,
        }
    }

    /// A workorder-less entry (deposit, withdrawal, cash fund).
    pub fn adjustment(
        amount: Money,
        payment_method: PaymentMethod,
        comment: String,
        now: DateTime<Utc>,
    ) -> Self {
        Transaction {
            id: new_id(),
            amount,
            payment_method,
            workorder_id: None,
            comment: Some(comment),
            created_at: now,
        }
    }

    /// Whether comment/workorder presence follows the ledger rule.
    pub fn is_well_formed(&self) -> bool {
        self.comment.is_some() != self.workorder_id.is_some()
    }
}

// =============================================================================
// Cash Register
// =============================================================================

/// Amounts for the three reconciled payment methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterAmounts {
    #[ts(as = "String")]
    pub cash: Money,
    #[ts(as = "String")]
    pub visa: Money,
    #[ts(as = "String")]
    pub interac: Money,
}

impl RegisterAmounts {
    /// The amount for a method; `None` for methods that are not reconciled.
    pub fn get(&self, method: PaymentMethod) -> Option<Money> {
        match method {
            PaymentMethod::Cash => Some(self.cash),
            PaymentMethod::Visa => Some(self.visa),
            PaymentMethod::Interac => Some(self.interac),
            PaymentMethod::Check | PaymentMethod::CreditAccount => None,
        }
    }

    /// Adds `amount` to the method's bucket. Other methods are ignored.
    pub fn add(&mut self, method: PaymentMethod, amount: Money) {
        match method {
            PaymentMethod::Cash => self.cash += amount,
            PaymentMethod::Visa => self.visa += amount,
            PaymentMethod::Interac => self.interac += amount,
            PaymentMethod::Check | PaymentMethod::CreditAccount => {}
        }
    }
}

impl std::ops::Sub for RegisterAmounts {
    type Output = RegisterAmounts;

    fn sub(self, other: Self) -> Self {
        RegisterAmounts {
            cash: self.cash - other.cash,
            visa: self.visa - other.visa,
            interac: self.interac - other.interac,
        }
    }
}

/// One register closing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashRegisterState {
    pub id: String,
    pub expected: RegisterAmounts,
    pub confirmed: RegisterAmounts,
    pub comment: Option<String>,
    /// Boundary of the next reconciliation window.
    #[ts(as = "String")]
    pub state_time: DateTime<Utc>,
}

impl CashRegisterState {
    /// `confirmed − expected` per method. Negative means money is missing.
    pub fn discrepancy(&self) -> RegisterAmounts {
        self.confirmed - self.expected
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn catalog_item(price: Decimal) -> InventoryItem {
        InventoryItem::new("Chain KMC X10", Money::from_decimal(price), ItemType::Article)
    }

    #[test]
    fn test_tax_rate_bounds() {
        assert!("0.09975".parse::<TaxRate>().is_ok());
        assert!("0".parse::<TaxRate>().is_ok());
        assert!("0.123456789".parse::<TaxRate>().is_err());
        assert!("1".parse::<TaxRate>().is_err());
        assert!("-0.05".parse::<TaxRate>().is_err());
        assert!("abc".parse::<TaxRate>().is_err());
    }

    #[test]
    fn test_tax_rate_apply_rounds_half_up() {
        let tvq: TaxRate = "0.09975".parse().unwrap();
        assert_eq!(tvq.apply(dec!(75.00)).amount(), dec!(7.48));
        assert_eq!(tvq.to_storage(), "0.09975000");
    }

    #[test]
    fn test_tax_rate_serde_round_trip() {
        let rate: TaxRate = serde_json::from_str("\"0.05\"").unwrap();
        assert_eq!(rate.rate(), dec!(0.05));
        assert!(serde_json::from_str::<TaxRate>("\"1.5\"").is_err());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("visa".parse::<PaymentMethod>().unwrap(), PaymentMethod::Visa);
        assert_eq!(
            "credit account".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditAccount
        );
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
        assert_eq!(PaymentMethod::CreditAccount.to_string(), "credit_account");
    }

    #[test]
    fn test_line_from_catalog_copies_values() {
        let item = catalog_item(dec!(34.99));
        let line = WorkorderItem::from_catalog("wo-1", &item, Utc::now());

        assert_eq!(line.name, item.name);
        assert_eq!(line.quantity, dec!(1));
        assert_eq!(line.unit_price, dec!(34.99));
        assert_eq!(line.original_price, item.price);
        assert_eq!(line.inventory_item_id.as_deref(), Some(item.id.as_str()));
        assert!(!line.is_refund());
    }

    #[test]
    fn test_refund_line_mirrors_source() {
        let item = catalog_item(dec!(20));
        let mut line = WorkorderItem::from_catalog("wo-1", &item, Utc::now());
        line.quantity = dec!(2);
        line.unit_price = dec!(15.5);

        let refund = line.refund_of("wo-2", Utc::now());
        assert_eq!(refund.workorder_id, "wo-2");
        assert_eq!(refund.quantity, dec!(-2));
        assert_eq!(refund.unit_price, dec!(15.5));
        assert_eq!(refund.original_price, line.original_price);
        assert_eq!(refund.refund_item_id.as_deref(), Some(line.id.as_str()));
        assert_eq!(refund.line_total(), -line.line_total());
    }

    #[test]
    fn test_line_discount() {
        let item = catalog_item(dec!(20));
        let mut line = WorkorderItem::from_catalog("wo-1", &item, Utc::now());
        assert_eq!(line.discount(), dec!(0));

        line.unit_price = dec!(15);
        line.quantity = dec!(3);
        assert_eq!(line.discount(), dec!(15));

        line.unit_price = dec!(25);
        assert_eq!(line.discount(), dec!(0));
    }

    #[test]
    fn test_transaction_comment_rule() {
        let sale = Transaction::for_workorder("wo-1", Money::from_cents(100), PaymentMethod::Cash, Utc::now());
        assert!(sale.is_well_formed());

        let fund = Transaction::adjustment(
            Money::from_cents(20000),
            PaymentMethod::Cash,
            "Cash fund".to_string(),
            Utc::now(),
        );
        assert!(fund.is_well_formed());
    }

    #[test]
    fn test_register_discrepancy() {
        let state = CashRegisterState {
            id: new_id(),
            expected: RegisterAmounts {
                cash: Money::from_cents(10000),
                visa: Money::from_cents(5000),
                interac: Money::zero(),
            },
            confirmed: RegisterAmounts {
                cash: Money::from_cents(9800),
                visa: Money::from_cents(5000),
                interac: Money::from_cents(100),
            },
            comment: None,
            state_time: Utc::now(),
        };

        let diff = state.discrepancy();
        assert_eq!(diff.cash, Money::from_cents(-200));
        assert!(diff.visa.is_zero());
        assert_eq!(diff.interac, Money::from_cents(100));
    }

    #[test]
    fn test_new_workorder_defaults() {
        let wo = Workorder::new(None, Utc::now());
        assert_eq!(wo.status, "open");
        assert!(!wo.is_paid());
        assert!(wo.paid_at().is_none());
    }
}
