//! Calendar-month aggregation window and strict date text helpers.
//!
//! # Invariants
//! - A `Period` is always anchored on the first day of a real month.
//! - Text forms are zero-padded: `YYYY-MM` for periods, `YYYY-MM-DD` for days.

use crate::model::validation::ValidationError;
use chrono::{Datelike, Days, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("valid period regex"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A calendar month, keyed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    first_day: NaiveDate,
}

impl Period {
    /// Builds a period from a year and a 1-based month.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| ValidationError::InvalidPeriod(format!("{year:04}-{month:02}")))
    }

    /// The period a calendar day falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Last calendar day of the month (28..=31 depending on month/year).
    pub fn last_day(&self) -> NaiveDate {
        self.days().last().unwrap_or(self.first_day)
    }

    /// Every calendar day of the month in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.first_day.month();
        self.first_day
            .iter_days()
            .take_while(move |day| day.month() == month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    /// Following month, `None` past the supported calendar range.
    pub fn next(&self) -> Option<Self> {
        self.first_day
            .checked_add_months(Months::new(1))
            .map(|first_day| Self { first_day })
    }

    /// Preceding month, `None` before the supported calendar range.
    pub fn previous(&self) -> Option<Self> {
        self.first_day
            .checked_sub_months(Months::new(1))
            .map(|first_day| Self { first_day })
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let captures = PERIOD_RE
            .captures(trimmed)
            .ok_or_else(|| ValidationError::InvalidPeriod(value.to_string()))?;
        let year = captures[1]
            .parse::<i32>()
            .map_err(|_| ValidationError::InvalidPeriod(value.to_string()))?;
        let month = captures[2]
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidPeriod(value.to_string()))?;
        Self::new(year, month).map_err(|_| ValidationError::InvalidPeriod(value.to_string()))
    }
}

impl TryFrom<String> for Period {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

/// Parses a strict zero-padded `YYYY-MM-DD` calendar day.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if !DATE_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

/// Formats a calendar day as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_date, parse_date, Period};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    #[test]
    fn period_parses_strict_year_month() {
        let period: Period = "2026-02".parse().unwrap();
        assert_eq!(period.year(), 2026);
        assert_eq!(period.month(), 2);
        assert_eq!(period.to_string(), "2026-02");

        for bad in ["2026-2", "2026-13", "2026-00", "26-02", "2026-02-01", ""] {
            assert!(
                matches!(bad.parse::<Period>(), Err(ValidationError::InvalidPeriod(_))),
                "`{bad}` should be rejected"
            );
        }
    }

    #[test]
    fn period_days_follow_real_month_lengths() {
        let leap: Period = "2024-02".parse().unwrap();
        assert_eq!(leap.days().count(), 29);
        assert_eq!(leap.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let plain: Period = "2026-02".parse().unwrap();
        assert_eq!(plain.days().count(), 28);

        let long: Period = "2026-12".parse().unwrap();
        assert_eq!(long.days().count(), 31);
    }

    #[test]
    fn period_navigation_crosses_year_boundary() {
        let december: Period = "2025-12".parse().unwrap();
        assert_eq!(december.next().unwrap().to_string(), "2026-01");
        assert_eq!(
            december.next().unwrap().previous().unwrap(),
            december
        );
    }

    #[test]
    fn period_of_and_contains_agree() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let period = Period::of(day);
        assert_eq!(period.to_string(), "2026-03");
        assert!(period.contains(day));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
    }

    #[test]
    fn parse_date_rejects_loose_or_impossible_days() {
        assert_eq!(
            format_date(parse_date("2026-03-01").unwrap()),
            "2026-03-01"
        );
        assert!(parse_date("2026-3-1").is_err());
        assert!(parse_date("2026-02-30").is_err());
        assert!(parse_date("yesterday").is_err());
    }
}
