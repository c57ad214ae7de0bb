//! Attendance facts: "member X had status S on service date D in unit U".
//!
//! # Invariants
//! - At most one live record per `(member_id, date)`; writes replace.
//! - There is no stored "not registered" status. A missing record is the
//!   not-registered state, modelled as `Option<AttendanceStatus>::None`.
//! - `justification` is `Some` only when `status == Justified`.

use crate::model::member::MemberId;
use crate::model::now_epoch_ms;
use crate::model::period::format_date;
use crate::model::unit::UnitId;
use crate::model::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type RecordId = Uuid;

/// Storable attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Justified,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Justified => "justified",
        }
    }
}

impl Display for AttendanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "justified" => Ok(Self::Justified),
            _ => Err(ValidationError::UnknownStatus(value.to_string())),
        }
    }
}

/// Parses user-facing mark text where `not_registered` means "no record".
pub fn parse_mark(value: &str) -> Result<Option<AttendanceStatus>, ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "not_registered" | "none" => Ok(None),
        other => other.parse().map(Some),
    }
}

/// Effective mark after applying "tap again to unset".
///
/// Requesting the status a member already has clears it; anything else is
/// written as requested. `None` means "no record".
pub fn resolve_mark(
    current: Option<AttendanceStatus>,
    requested: Option<AttendanceStatus>,
) -> Option<AttendanceStatus> {
    if requested == current {
        None
    } else {
        requested
    }
}

/// Identity of a live attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttendanceKey {
    pub member_id: MemberId,
    pub date: NaiveDate,
}

/// One stored attendance fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub member_id: MemberId,
    pub unit_id: UnitId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub justification: Option<String>,
    /// Unix epoch milliseconds of the last write.
    pub registered_at: i64,
}

impl AttendanceRecord {
    /// Creates a fresh record stamped with the current time.
    ///
    /// Justification text is kept only for `Justified`; blank text is
    /// treated as no text.
    pub fn new(
        member_id: MemberId,
        unit_id: UnitId,
        date: NaiveDate,
        status: AttendanceStatus,
        justification: Option<String>,
    ) -> Self {
        let justification = match status {
            AttendanceStatus::Justified => justification
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
            AttendanceStatus::Present | AttendanceStatus::Absent => None,
        };
        Self {
            id: Uuid::new_v4(),
            member_id,
            unit_id,
            date,
            status,
            justification,
            registered_at: now_epoch_ms(),
        }
    }

    pub fn key(&self) -> AttendanceKey {
        AttendanceKey {
            member_id: self.member_id,
            date: self.date,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId("attendance.id"));
        }
        if self.member_id.is_nil() {
            return Err(ValidationError::NilId("attendance.member_id"));
        }
        if self.unit_id.is_nil() {
            return Err(ValidationError::NilId("attendance.unit_id"));
        }
        if self.status != AttendanceStatus::Justified && self.justification.is_some() {
            return Err(ValidationError::StrayJustification {
                date: format_date(self.date),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_mark, resolve_mark, AttendanceRecord, AttendanceStatus};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn justification_is_dropped_for_non_justified_status() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let record = AttendanceRecord::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            date,
            AttendanceStatus::Absent,
            Some("sick".to_string()),
        );
        assert_eq!(record.justification, None);

        let justified = AttendanceRecord::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            date,
            AttendanceStatus::Justified,
            Some("  travelling ".to_string()),
        );
        assert_eq!(justified.justification.as_deref(), Some("travelling"));
        assert!(justified.validate().is_ok());
    }

    #[test]
    fn resolve_mark_toggles_same_status_off() {
        use AttendanceStatus::{Absent, Justified, Present};
        assert_eq!(resolve_mark(Some(Present), Some(Present)), None);
        assert_eq!(resolve_mark(Some(Justified), Some(Justified)), None);
        assert_eq!(resolve_mark(Some(Present), Some(Absent)), Some(Absent));
        assert_eq!(resolve_mark(None, Some(Present)), Some(Present));
        assert_eq!(resolve_mark(Some(Absent), None), None);
        assert_eq!(resolve_mark(None, None), None);
    }

    #[test]
    fn parse_mark_maps_not_registered_to_none() {
        assert_eq!(parse_mark("NOT_REGISTERED").unwrap(), None);
        assert_eq!(
            parse_mark("present").unwrap(),
            Some(AttendanceStatus::Present)
        );
        assert!(parse_mark("late").is_err());
    }
}
