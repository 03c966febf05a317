//! Form submissions and their validation.
//!
//! Each form keeps the raw strings the browser posted so that a rejected
//! submission can be rendered again exactly as typed. `validate` turns a form
//! into a record draft, or into [`FieldErrors`] keyed by input name.

mod landlord;
mod patterns;
mod payment;
mod property;
mod tenant;

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Amount, AmountError};

pub use landlord::LandlordForm;
pub use patterns::{is_valid_email, is_valid_siret};
pub use payment::PaymentForm;
pub use property::PropertyForm;
pub use tenant::TenantForm;

/// Validation messages keyed by form field name.
///
/// Only the first message for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// Record a message for `field` unless it already has one.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Whether no field was rejected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(value)` when empty, the errors otherwise.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field was rejected.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Trimmed text, `None` when blank.
fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trimmed text that must not be blank.
fn required_text(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    message: &str,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, message);
    }
    trimmed.to_string()
}

/// An ISO `YYYY-MM-DD` date, `None` when blank.
fn optional_date(errors: &mut FieldErrors, field: &'static str, value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Date invalide, format attendu AAAA-MM-JJ.");
            None
        }
    }
}

/// A required ISO date.
fn required_date(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    message: &str,
) -> Option<NaiveDate> {
    if value.trim().is_empty() {
        errors.add(field, message);
        return None;
    }
    optional_date(errors, field, value)
}

/// A non-negative amount, `default` when blank.
fn amount_or(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    default: Amount,
    negative_message: &str,
) -> Amount {
    match Amount::parse(value) {
        Ok(amount) => amount,
        Err(AmountError::Empty) => default,
        Err(err) => {
            errors.add(field, amount_message(err, negative_message));
            default
        }
    }
}

/// A required non-negative amount.
fn required_amount(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    message: &str,
) -> Option<Amount> {
    match Amount::parse(value) {
        Ok(amount) => Some(amount),
        Err(AmountError::Empty | AmountError::Negative | AmountError::Malformed) => {
            errors.add(field, message);
            None
        }
        Err(err) => {
            errors.add(field, amount_message(err, message));
            None
        }
    }
}

fn amount_message(err: AmountError, negative_message: &str) -> String {
    match err {
        AmountError::Negative => negative_message.to_string(),
        AmountError::TooPrecise => "Deux décimales au maximum.".to_string(),
        AmountError::Overflow => "Montant trop élevé.".to_string(),
        AmountError::Empty | AmountError::Malformed => "Montant invalide.".to_string(),
    }
}

/// A record id chosen in a `<select>`.
fn selected_id(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}
