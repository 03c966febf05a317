//! Monetary amounts stored as whole cents.

use std::fmt;
use std::iter::Sum;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a user-entered amount was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Nothing was entered.
    #[error("amount is empty")]
    Empty,
    /// The text is not a decimal number.
    #[error("amount is not a number")]
    Malformed,
    /// The number is below zero.
    #[error("amount is negative")]
    Negative,
    /// More than two decimal places.
    #[error("amount has more than two decimals")]
    TooPrecise,
    /// The number is above [`Amount::MAX_INPUT`].
    #[error("amount is too large")]
    Overflow,
}

/// A non-negative sum of money in euro cents.
///
/// Amounts never go below zero: construction from raw cents is checked and
/// parsing rejects a leading minus sign with [`AmountError::Negative`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    /// Zero euros.
    pub const ZERO: Self = Self(0);

    /// Largest amount [`Amount::parse`] accepts: one billion euros.
    ///
    /// Keeps `SUM()` over stored amounts far from the `i64` limit.
    pub const MAX_INPUT: Self = Self(100_000_000_000);

    /// Build an amount from cents, `None` when negative.
    #[must_use]
    pub fn from_cents(cents: i64) -> Option<Self> {
        (cents >= 0).then_some(Self(cents))
    }

    /// Build an amount from whole euros, `None` when negative or too large.
    #[must_use]
    pub fn from_euros(euros: i64) -> Option<Self> {
        euros.checked_mul(100).and_then(Self::from_cents)
    }

    /// The amount in cents.
    #[must_use]
    pub fn cents(self) -> i64 {
        self.0
    }

    /// Whether this is zero euros.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, saturating at the largest representable value.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Parse a user-entered amount such as `650`, `650.5`, `1 234,56`.
    ///
    /// Both `.` and `,` are accepted as the decimal separator and spaces are
    /// ignored. At most two decimals are allowed.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`] describing the first problem found.
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
            .map(|c| if c == ',' { '.' } else { c })
            .collect();
        if compact.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, digits) = match compact.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, compact.strip_prefix('+').unwrap_or(&compact)),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
            return Err(AmountError::Malformed);
        }
        if negative {
            return Err(AmountError::Negative);
        }
        if fraction.len() > 2 {
            return Err(AmountError::TooPrecise);
        }

        let euros: i64 = whole.parse().map_err(|_| AmountError::Overflow)?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| AmountError::Malformed)? * 10,
            _ => fraction.parse().map_err(|_| AmountError::Malformed)?,
        };
        euros
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .map(Self)
            .filter(|amount| *amount <= Self::MAX_INPUT)
            .ok_or(AmountError::Overflow)
    }

    /// Plain decimal form suitable for pre-filling an input field (`650.00`).
    #[must_use]
    pub fn to_input_string(self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl fmt::Display for Amount {
    /// French formatting: `1 234,56 €`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let euros = (self.0 / 100).to_string();
        let mut grouped = String::with_capacity(euros.len() + euros.len() / 3);
        for (i, c) in euros.chars().enumerate() {
            if i > 0 && (euros.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(c);
        }
        write!(f, "{grouped},{:02} €", self.0 % 100)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Self::from_cents(cents).ok_or(AmountError::Negative)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let cents = i64::column_result(value)?;
        Self::from_cents(cents).ok_or(FromSqlError::OutOfRange(cents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_euros() {
        assert_eq!(Amount::parse("650"), Ok(Amount::from_cents(65_000).unwrap()));
    }

    #[test]
    fn test_parse_decimal_separators() {
        let expected = Amount::from_cents(123_456).unwrap();
        assert_eq!(Amount::parse("1234.56"), Ok(expected));
        assert_eq!(Amount::parse("1234,56"), Ok(expected));
        assert_eq!(Amount::parse("1 234,56"), Ok(expected));
        assert_eq!(Amount::parse(" +1234.56 "), Ok(expected));
    }

    #[test]
    fn test_parse_single_decimal() {
        assert_eq!(Amount::parse("12.5"), Ok(Amount::from_cents(1250).unwrap()));
    }

    #[test]
    fn test_parse_rejections() {
        assert_eq!(Amount::parse(""), Err(AmountError::Empty));
        assert_eq!(Amount::parse("   "), Err(AmountError::Empty));
        assert_eq!(Amount::parse("abc"), Err(AmountError::Malformed));
        assert_eq!(Amount::parse("1.2.3"), Err(AmountError::Malformed));
        assert_eq!(Amount::parse(".5"), Err(AmountError::Malformed));
        assert_eq!(Amount::parse("-5"), Err(AmountError::Negative));
        assert_eq!(Amount::parse("-0,01"), Err(AmountError::Negative));
        assert_eq!(Amount::parse("1.234"), Err(AmountError::TooPrecise));
        assert_eq!(
            Amount::parse("99999999999999999999"),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn test_parse_upper_bound() {
        assert_eq!(Amount::parse("1000000000"), Ok(Amount::MAX_INPUT));
        assert_eq!(Amount::parse("1000000000,01"), Err(AmountError::Overflow));
        assert_eq!(
            Amount::parse("92233720368547758"),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn test_from_cents_rejects_negative() {
        assert!(Amount::from_cents(-1).is_none());
        assert_eq!(Amount::from_cents(0), Some(Amount::ZERO));
    }

    #[test]
    fn test_display_french() {
        assert_eq!(Amount::from_euros(650).unwrap().to_string(), "650,00 €");
        assert_eq!(
            Amount::from_cents(123_456_789).unwrap().to_string(),
            "1 234 567,89 €"
        );
        assert_eq!(Amount::ZERO.to_string(), "0,00 €");
    }

    #[test]
    fn test_input_string() {
        assert_eq!(Amount::from_cents(65_005).unwrap().to_input_string(), "650.05");
    }

    #[test]
    fn test_sum() {
        let total: Amount = [100, 250, 5]
            .iter()
            .filter_map(|c| Amount::from_cents(*c))
            .sum();
        assert_eq!(total.cents(), 355);
    }

    #[test]
    fn test_serde_rejects_negative() {
        assert!(serde_json::from_str::<Amount>("-3").is_err());
        assert_eq!(serde_json::from_str::<Amount>("300").unwrap().cents(), 300);
    }
}
