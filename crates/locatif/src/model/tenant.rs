//! People and businesses leasing a property.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Amount, Property};

/// Tenant fields as entered, before the database assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTenant {
    /// Family name. Empty for business tenants that only give a company name.
    pub last_name: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Registered company name, set for business tenants.
    pub company_name: Option<String>,
    /// 14-digit SIRET establishment number.
    pub siret: Option<String>,
    /// Name of the company director.
    pub company_director: Option<String>,
    /// Leased property.
    pub property_id: i64,
    /// First day of the lease.
    pub lease_start: NaiveDate,
    /// Last day of the lease, open-ended when `None`.
    pub lease_end: Option<NaiveDate>,
    /// Monthly rent, charges excluded.
    pub monthly_rent: Amount,
    /// Security deposit.
    pub deposit: Amount,
    /// Day of the month the rent is due, 1 to 28.
    pub payment_day: u8,
    /// Whether the lease is currently running.
    pub active: bool,
}

impl NewTenant {
    /// Attach the database id.
    #[must_use]
    pub fn with_id(self, id: i64) -> Tenant {
        Tenant {
            id,
            last_name: self.last_name,
            first_name: self.first_name,
            email: self.email,
            phone: self.phone,
            birth_date: self.birth_date,
            company_name: self.company_name,
            siret: self.siret,
            company_director: self.company_director,
            property_id: self.property_id,
            lease_start: self.lease_start,
            lease_end: self.lease_end,
            monthly_rent: self.monthly_rent,
            deposit: self.deposit,
            payment_day: self.payment_day,
            active: self.active,
        }
    }
}

/// A stored tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Database id.
    pub id: i64,
    /// Family name.
    pub last_name: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Registered company name.
    pub company_name: Option<String>,
    /// SIRET establishment number.
    pub siret: Option<String>,
    /// Name of the company director.
    pub company_director: Option<String>,
    /// Leased property.
    pub property_id: i64,
    /// First day of the lease.
    pub lease_start: NaiveDate,
    /// Last day of the lease.
    pub lease_end: Option<NaiveDate>,
    /// Monthly rent, charges excluded.
    pub monthly_rent: Amount,
    /// Security deposit.
    pub deposit: Amount,
    /// Day of the month the rent is due.
    pub payment_day: u8,
    /// Whether the lease is currently running.
    pub active: bool,
}

impl Tenant {
    /// Business tenants are identified by their company name.
    #[must_use]
    pub fn is_business(&self) -> bool {
        self.company_name.is_some()
    }

    /// Company name for businesses, "first last" otherwise.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.company_name, &self.first_name) {
            (Some(company), _) => company.clone(),
            (None, Some(first)) => format!("{first} {}", self.last_name),
            (None, None) => self.last_name.clone(),
        }
    }

    /// Rent plus the property's monthly charges.
    #[must_use]
    pub fn monthly_due(&self, property: &Property) -> Amount {
        self.monthly_rent.saturating_add(property.monthly_charges)
    }
}
