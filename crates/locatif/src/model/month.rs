//! Calendar months used as payment periods.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

static MONTH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("Invalid regex pattern"));

const MONTH_NAMES: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

const SHORT_MONTH_NAMES: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jun", "Jul", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// A malformed `YYYY-MM` period.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month '{0}', expected YYYY-MM")]
pub struct MonthParseError(pub String);

/// A calendar month, written `YYYY-MM`.
///
/// Ordering is chronological, which matches the lexicographic order of the
/// stored text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Build a month, `None` unless `month` is in 1..=12 and the year has four digits.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((1..=12).contains(&month) && (0..=9999).contains(&year)).then_some(Self { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    /// Month number, 1 for January.
    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }

    /// The month `n` months before this one.
    #[must_use]
    pub fn minus_months(self, n: u32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) - i64::from(n);
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) + 1;
        Self {
            year: i32::try_from(year).unwrap_or(0),
            month: u32::try_from(month).unwrap_or(1),
        }
    }

    /// French label, e.g. `Mars 2024`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{} {}", MONTH_NAMES[self.index()], self.year)
    }

    /// Abbreviated French label, e.g. `Mar 2024`.
    #[must_use]
    pub fn short_label(self) -> String {
        format!("{} {}", SHORT_MONTH_NAMES[self.index()], self.year)
    }

    fn index(self) -> usize {
        usize::try_from(self.month - 1).unwrap_or(0)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthParseError(s.to_string());
        let caps = MONTH_PATTERN.captures(s.trim()).ok_or_else(err)?;
        let year = caps[1].parse().map_err(|_| err())?;
        let month = caps[2].parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl TryFrom<String> for Month {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

impl ToSql for Month {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Month {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let month: Month = "2024-03".parse().unwrap();
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2024-03");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for input in ["2024-13", "2024-00", "2024-3", "24-03", "2024/03", "", "march"] {
            assert!(input.parse::<Month>().is_err(), "accepted {input}");
        }
    }

    #[test]
    fn test_labels() {
        let month = Month::new(2024, 8).unwrap();
        assert_eq!(month.label(), "Août 2024");
        assert_eq!(month.short_label(), "Aoû 2024");
    }

    #[test]
    fn test_minus_months_across_years() {
        let march = Month::new(2024, 3).unwrap();
        assert_eq!(march.minus_months(0), march);
        assert_eq!(march.minus_months(2), Month::new(2024, 1).unwrap());
        assert_eq!(march.minus_months(3), Month::new(2023, 12).unwrap());
        assert_eq!(march.minus_months(27), Month::new(2021, 12).unwrap());
    }

    #[test]
    fn test_ordering_matches_text() {
        let a = Month::new(2023, 12).unwrap();
        let b = Month::new(2024, 1).unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
        assert_eq!(Month::from_date(date).to_string(), "2024-11");
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let month = Month::new(2024, 3).unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2024-03\"");
        assert!(serde_json::from_str::<Month>("\"2024-99\"").is_err());
    }
}
