//! Organizational units, their weekly service schedule and nuclei.
//!
//! # Invariants
//! - Weekday indices are `0..=6` with 0 = Sunday.
//! - Units are configured outside the analytics core and read as snapshots.

use crate::model::validation::ValidationError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type UnitId = Uuid;
pub type NucleusId = Uuid;

/// Recurring weekly schedule: the set of weekdays on which services occur.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct ServiceSchedule {
    mask: u8,
}

impl ServiceSchedule {
    /// Schedule without any service day.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a schedule from Sunday-based weekday indices.
    ///
    /// Duplicates are collapsed; indices above 6 are rejected.
    pub fn from_indices(indices: &[u8]) -> Result<Self, ValidationError> {
        let mut mask = 0u8;
        for &index in indices {
            if index > 6 {
                return Err(ValidationError::WeekdayOutOfRange(index));
            }
            mask |= 1 << index;
        }
        Ok(Self { mask })
    }

    pub fn from_weekdays(weekdays: &[Weekday]) -> Self {
        let mask = weekdays
            .iter()
            .fold(0u8, |mask, day| mask | (1 << day.num_days_from_sunday()));
        Self { mask }
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn includes(&self, weekday: Weekday) -> bool {
        self.mask & (1 << weekday.num_days_from_sunday()) != 0
    }

    /// Whether `date` falls on a scheduled weekday.
    pub fn is_service_day(&self, date: NaiveDate) -> bool {
        self.includes(date.weekday())
    }

    /// Scheduled weekday indices in ascending order.
    pub fn indices(&self) -> Vec<u8> {
        (0u8..7).filter(|index| self.mask & (1 << index) != 0).collect()
    }
}

impl Display for ServiceSchedule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = self
            .indices()
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&text)
    }
}

impl FromStr for ServiceSchedule {
    type Err = ValidationError;

    /// Parses the canonical comma-separated form, e.g. `"0,3"`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut indices = Vec::new();
        for part in value.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let index = part
                .parse::<u8>()
                .map_err(|_| ValidationError::InvalidSchedule(value.to_string()))?;
            indices.push(index);
        }
        Self::from_indices(&indices)
    }
}

impl TryFrom<Vec<u8>> for ServiceSchedule {
    type Error = ValidationError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(&value)
    }
}

impl From<ServiceSchedule> for Vec<u8> {
    fn from(value: ServiceSchedule) -> Self {
        value.indices()
    }
}

/// An organizational branch with its own recurring event schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub schedule: ServiceSchedule,
    /// Escalation contact for follow-up messages.
    pub pastor_phone: String,
}

impl Unit {
    pub fn new(
        name: impl Into<String>,
        schedule: ServiceSchedule,
        pastor_phone: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            schedule,
            pastor_phone: pastor_phone.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId("unit.id"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName("unit.name"));
        }
        Ok(())
    }

    /// Phone with every non-digit stripped, as used in messaging links.
    pub fn pastor_phone_digits(&self) -> String {
        self.pastor_phone
            .chars()
            .filter(char::is_ascii_digit)
            .collect()
    }
}

/// Optional sub-grouping of members inside a unit. Display/filter only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nucleus {
    pub id: NucleusId,
    pub unit_id: UnitId,
    pub name: String,
    /// Free-form display color key.
    pub color: Option<String>,
}

impl Nucleus {
    pub fn new(unit_id: UnitId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            unit_id,
            name: name.into(),
            color: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId("nucleus.id"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName("nucleus.name"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ServiceSchedule, Unit};
    use crate::model::validation::ValidationError;
    use chrono::{NaiveDate, Weekday};

    #[test]
    fn schedule_roundtrips_canonical_text() {
        let schedule: ServiceSchedule = " 3, 0,3 ".parse().unwrap();
        assert_eq!(schedule.indices(), vec![0, 3]);
        assert_eq!(schedule.to_string(), "0,3");
        assert_eq!(schedule, ServiceSchedule::from_weekdays(&[Weekday::Sun, Weekday::Wed]));
    }

    #[test]
    fn schedule_rejects_out_of_range_weekday() {
        assert_eq!(
            ServiceSchedule::from_indices(&[0, 7]).unwrap_err(),
            ValidationError::WeekdayOutOfRange(7)
        );
    }

    #[test]
    fn empty_text_is_empty_schedule() {
        let schedule: ServiceSchedule = "".parse().unwrap();
        assert!(schedule.is_empty());
    }

    #[test]
    fn is_service_day_uses_sunday_based_indices() {
        let schedule = ServiceSchedule::from_indices(&[0]).unwrap();
        // 2026-03-01 is a Sunday.
        assert!(schedule.is_service_day(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
        assert!(!schedule.is_service_day(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()));
    }

    #[test]
    fn pastor_phone_digits_strips_formatting() {
        let unit = Unit::new("Central", ServiceSchedule::empty(), "+55 (11) 98765-4321");
        assert_eq!(unit.pastor_phone_digits(), "5511987654321");
    }
}
