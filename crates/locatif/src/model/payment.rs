//! Money received from tenants.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::{Amount, Month};

/// What a payment covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCategory {
    /// Monthly rent.
    Rent,
    /// Water and sewage.
    Water,
    /// Household waste collection.
    Waste,
    /// Property tax recharged to the tenant.
    PropertyTax,
}

impl PaymentCategory {
    /// All categories, in receipt order.
    pub const ALL: [Self; 4] = [Self::Rent, Self::Water, Self::Waste, Self::PropertyTax];

    /// Stored identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Water => "water",
            Self::Waste => "waste",
            Self::PropertyTax => "property_tax",
        }
    }

    /// Label printed on pages and receipts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Rent => "Loyer",
            Self::Water => "Eau et assainissement",
            Self::Waste => "Ordures ménagères",
            Self::PropertyTax => "Taxe foncière",
        }
    }
}

impl fmt::Display for PaymentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("unknown payment category: {s}"))
    }
}

impl ToSql for PaymentCategory {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PaymentCategory {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Payment fields as entered, before the database assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    /// Paying tenant.
    pub tenant_id: i64,
    /// What the payment covers.
    pub category: PaymentCategory,
    /// Amount received.
    pub amount: Amount,
    /// Date the money was received.
    pub paid_on: NaiveDate,
    /// Month the payment is for.
    pub period: Month,
    /// How it was paid (transfer, cheque, cash...).
    pub method: Option<String>,
    /// Free-form comment.
    pub note: Option<String>,
}

impl NewPayment {
    /// Attach the database id.
    #[must_use]
    pub fn with_id(self, id: i64) -> Payment {
        Payment {
            id,
            tenant_id: self.tenant_id,
            category: self.category,
            amount: self.amount,
            paid_on: self.paid_on,
            period: self.period,
            method: self.method,
            note: self.note,
        }
    }
}

/// A stored payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Database id.
    pub id: i64,
    /// Paying tenant.
    pub tenant_id: i64,
    /// What the payment covers.
    pub category: PaymentCategory,
    /// Amount received.
    pub amount: Amount,
    /// Date the money was received.
    pub paid_on: NaiveDate,
    /// Month the payment is for.
    pub period: Month,
    /// How it was paid.
    pub method: Option<String>,
    /// Free-form comment.
    pub note: Option<String>,
}
