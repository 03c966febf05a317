//! Domain records for locatif.
//!
//! Each record maps one-to-one to a table in [`crate::storage`]. `New*` types
//! carry validated fields before insertion; the stored types add the id.

mod landlord;
mod money;
mod month;
mod payment;
mod property;
mod tenant;

pub use landlord::Landlord;
pub use money::{Amount, AmountError};
pub use month::{Month, MonthParseError};
pub use payment::{NewPayment, Payment, PaymentCategory};
pub use property::{NewProperty, Property, PropertyKind};
pub use tenant::{NewTenant, Tenant};
