//! Managed real-estate units.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::Amount;

/// What kind of unit a property is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// A residential apartment, let to private individuals.
    Apartment,
    /// A commercial unit, let to a business.
    CommercialUnit,
}

impl PropertyKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 2] = [Self::Apartment, Self::CommercialUnit];

    /// Stored identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::CommercialUnit => "commercial_unit",
        }
    }

    /// Label shown to the user.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Apartment => "Appartement",
            Self::CommercialUnit => "Local commercial",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown property kind: {s}"))
    }
}

impl ToSql for PropertyKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PropertyKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Property fields as entered, before the database assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    /// Short name, e.g. "Appartement Centre-Ville".
    pub name: String,
    /// Kind of unit.
    pub kind: PropertyKind,
    /// Postal address.
    pub address: String,
    /// Surface area in square metres.
    pub area_m2: Option<f64>,
    /// Free-form description.
    pub description: Option<String>,
    /// Monthly service charges billed on top of the rent.
    pub monthly_charges: Amount,
    /// Date the landlord acquired the property.
    pub acquired_on: Option<NaiveDate>,
}

impl NewProperty {
    /// Attach the database id.
    #[must_use]
    pub fn with_id(self, id: i64) -> Property {
        Property {
            id,
            name: self.name,
            kind: self.kind,
            address: self.address,
            area_m2: self.area_m2,
            description: self.description,
            monthly_charges: self.monthly_charges,
            acquired_on: self.acquired_on,
        }
    }
}

/// A stored property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Database id.
    pub id: i64,
    /// Short name.
    pub name: String,
    /// Kind of unit.
    pub kind: PropertyKind,
    /// Postal address.
    pub address: String,
    /// Surface area in square metres.
    pub area_m2: Option<f64>,
    /// Free-form description.
    pub description: Option<String>,
    /// Monthly service charges billed on top of the rent.
    pub monthly_charges: Amount,
    /// Date the landlord acquired the property.
    pub acquired_on: Option<NaiveDate>,
}

impl Property {
    /// Whether tenants of this property are businesses.
    #[must_use]
    pub fn is_commercial(&self) -> bool {
        self.kind == PropertyKind::CommercialUnit
    }
}
