//! Landlord identity printed on receipts.

use serde::{Deserialize, Serialize};

/// The landlord settings. There is at most one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landlord {
    /// Person or company name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Postal code.
    pub postal_code: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// SIRET number, for landlords operating as a business.
    pub siret: Option<String>,
}

impl Landlord {
    /// Street address followed by ", postal city" when both are known.
    #[must_use]
    pub fn full_address(&self) -> String {
        match (&self.postal_code, &self.city) {
            (Some(postal_code), Some(city)) => {
                format!("{}, {postal_code} {city}", self.address)
            }
            _ => self.address.clone(),
        }
    }
}
