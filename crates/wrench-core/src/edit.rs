//! # Whitelisted Column Edits
//!
//! Inline edits arrive as `(column, value)` string pairs. Each entity has a
//! fixed set of editable columns; everything else is rejected with
//! [`CoreError::InvalidColumnEdit`] before anything touches storage.
//!
//! | Entity          | Editable columns                                                  |
//! |-----------------|-------------------------------------------------------------------|
//! | workorder_item  | name, quantity (`nb`), price, taxable                             |
//! | workorder       | bike_description, bike_serial_number, calendar_date, status,     |
//! |                 | invoice_notes, internal_notes                                     |
//! | client          | first_name, last_name, address, postal_code, phone, email,       |
//! |                 | email_consent, year_of_birth, internal_notes                      |

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::money::{fixed_form, UNIT_PRICE_DP};
use crate::types::WorkorderItem;
use crate::validation::{
    parse_bool, parse_iso_datetime, parse_quantity, parse_unit_price, parse_year_of_birth,
    validate_name, QUANTITY_DP,
};

/// A parsed value ready to bind.
///
/// Decimals are carried in their fixed storage text form.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    Bool(bool),
    OptionalInt(Option<i32>),
    Timestamp(DateTime<Utc>),
}

fn not_editable(entity: &'static str, column: &str) -> CoreError {
    CoreError::InvalidColumnEdit {
        entity,
        column: column.to_string(),
        reason: "column is not editable".to_string(),
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// An edit to a line of an unpaid workorder.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEdit {
    Name(String),
    Quantity(Decimal),
    Price(Decimal),
    Taxable(bool),
}

impl ItemEdit {
    pub const ENTITY: &'static str = "workorder_item";

    /// Parses and validates. `nb` is accepted as an alias of `quantity`.
    pub fn parse(column: &str, value: &str) -> CoreResult<Self> {
        let edit = match column {
            "name" => ItemEdit::Name(validate_name("name", value)?),
            "quantity" | "nb" => ItemEdit::Quantity(parse_quantity(value)?),
            "price" => ItemEdit::Price(parse_unit_price(value)?),
            "taxable" => ItemEdit::Taxable(parse_bool("taxable", value)?),
            other => return Err(not_editable(Self::ENTITY, other)),
        };
        Ok(edit)
    }

    pub fn column(&self) -> &'static str {
        match self {
            ItemEdit::Name(_) => "name",
            ItemEdit::Quantity(_) => "quantity",
            ItemEdit::Price(_) => "unit_price",
            ItemEdit::Taxable(_) => "taxable",
        }
    }

    pub fn value(&self) -> ColumnValue {
        match self {
            ItemEdit::Name(name) => ColumnValue::Text(name.clone()),
            ItemEdit::Quantity(qty) => ColumnValue::Text(fixed_form(*qty, QUANTITY_DP)),
            ItemEdit::Price(price) => ColumnValue::Text(fixed_form(*price, UNIT_PRICE_DP)),
            ItemEdit::Taxable(taxable) => ColumnValue::Bool(*taxable),
        }
    }

    /// Applies the edit to an in-memory line.
    pub fn apply(&self, item: &mut WorkorderItem) {
        match self {
            ItemEdit::Name(name) => item.name = name.clone(),
            ItemEdit::Quantity(qty) => item.quantity = *qty,
            ItemEdit::Price(price) => item.unit_price = *price,
            ItemEdit::Taxable(taxable) => item.taxable = *taxable,
        }
    }
}

// =============================================================================
// Workorders
// =============================================================================

/// An edit to a workorder's descriptive fields.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkorderEdit {
    BikeDescription(String),
    BikeSerialNumber(String),
    CalendarDate(DateTime<Utc>),
    Status(String),
    InvoiceNotes(String),
    InternalNotes(String),
}

impl WorkorderEdit {
    pub const ENTITY: &'static str = "workorder";

    pub fn parse(column: &str, value: &str) -> CoreResult<Self> {
        let edit = match column {
            "bike_description" => WorkorderEdit::BikeDescription(value.trim().to_string()),
            "bike_serial_number" => WorkorderEdit::BikeSerialNumber(value.trim().to_string()),
            "calendar_date" => {
                WorkorderEdit::CalendarDate(parse_iso_datetime("calendar_date", value)?)
            }
            "status" => WorkorderEdit::Status(validate_name("status", value)?),
            "invoice_notes" => WorkorderEdit::InvoiceNotes(value.to_string()),
            "internal_notes" => WorkorderEdit::InternalNotes(value.to_string()),
            other => return Err(not_editable(Self::ENTITY, other)),
        };
        Ok(edit)
    }

    pub fn column(&self) -> &'static str {
        match self {
            WorkorderEdit::BikeDescription(_) => "bike_description",
            WorkorderEdit::BikeSerialNumber(_) => "bike_serial_number",
            WorkorderEdit::CalendarDate(_) => "calendar_date",
            WorkorderEdit::Status(_) => "status",
            WorkorderEdit::InvoiceNotes(_) => "invoice_notes",
            WorkorderEdit::InternalNotes(_) => "internal_notes",
        }
    }

    pub fn value(&self) -> ColumnValue {
        match self {
            WorkorderEdit::CalendarDate(date) => ColumnValue::Timestamp(*date),
            WorkorderEdit::BikeDescription(text)
            | WorkorderEdit::BikeSerialNumber(text)
            | WorkorderEdit::Status(text)
            | WorkorderEdit::InvoiceNotes(text)
            | WorkorderEdit::InternalNotes(text) => ColumnValue::Text(text.clone()),
        }
    }
}

// =============================================================================
// Clients
// =============================================================================

/// An edit to a client's contact details.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEdit {
    FirstName(String),
    LastName(String),
    Address(String),
    PostalCode(String),
    Phone(String),
    Email(String),
    EmailConsent(bool),
    YearOfBirth(Option<i32>),
    InternalNotes(String),
}

impl ClientEdit {
    pub const ENTITY: &'static str = "client";

    pub fn parse(column: &str, value: &str) -> CoreResult<Self> {
        let text = || value.trim().to_string();
        let edit = match column {
            "first_name" => ClientEdit::FirstName(text()),
            "last_name" => ClientEdit::LastName(text()),
            "address" => ClientEdit::Address(text()),
            "postal_code" => ClientEdit::PostalCode(text().to_uppercase()),
            "phone" => ClientEdit::Phone(text()),
            "email" => ClientEdit::Email(text()),
            "email_consent" => ClientEdit::EmailConsent(parse_bool("email_consent", value)?),
            "year_of_birth" => ClientEdit::YearOfBirth(parse_year_of_birth(value)?),
            "internal_notes" => ClientEdit::InternalNotes(value.to_string()),
            other => return Err(not_editable(Self::ENTITY, other)),
        };
        Ok(edit)
    }

    pub fn column(&self) -> &'static str {
        match self {
            ClientEdit::FirstName(_) => "first_name",
            ClientEdit::LastName(_) => "last_name",
            ClientEdit::Address(_) => "address",
            ClientEdit::PostalCode(_) => "postal_code",
            ClientEdit::Phone(_) => "phone",
            ClientEdit::Email(_) => "email",
            ClientEdit::EmailConsent(_) => "email_consent",
            ClientEdit::YearOfBirth(_) => "year_of_birth",
            ClientEdit::InternalNotes(_) => "internal_notes",
        }
    }

    pub fn value(&self) -> ColumnValue {
        match self {
            ClientEdit::EmailConsent(consent) => ColumnValue::Bool(*consent),
            ClientEdit::YearOfBirth(year) => ColumnValue::OptionalInt(*year),
            ClientEdit::FirstName(text)
            | ClientEdit::LastName(text)
            | ClientEdit::Address(text)
            | ClientEdit::PostalCode(text)
            | ClientEdit::Phone(text)
            | ClientEdit::Email(text)
            | ClientEdit::InternalNotes(text) => ColumnValue::Text(text.clone()),
        }
    }
}
