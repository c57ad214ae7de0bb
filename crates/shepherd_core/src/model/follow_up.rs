//! Pastoral follow-up state per `(member, period)`.
//!
//! # Invariants
//! - At most one live record per `(member_id, period)`; writes replace.
//! - Any status may move to any other status; `Done` is not terminal.
//! - A missing record reads as `Pending`.

use crate::model::member::MemberId;
use crate::model::now_epoch_ms;
use crate::model::period::Period;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Follow-up workflow state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpStatus {
    /// Eligible, nothing arranged yet. Implicit default.
    #[default]
    Pending,
    /// A pastoral meeting is arranged.
    Scheduled,
    /// Handled; listed as resolved until reopened.
    Done,
}

impl FollowUpStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Done => "done",
        }
    }

    pub fn is_resolved(self) -> bool {
        self == Self::Done
    }
}

impl Display for FollowUpStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FollowUpStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "scheduled" => Ok(Self::Scheduled),
            "done" => Ok(Self::Done),
            _ => Err(ValidationError::UnknownStatus(value.to_string())),
        }
    }
}

/// Live follow-up record for one member in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    pub member_id: MemberId,
    pub period: Period,
    pub status: FollowUpStatus,
    /// Unix epoch milliseconds of the last status change.
    pub last_update: i64,
}

impl FollowUp {
    /// Record for an explicit status change, stamped now.
    pub fn new(member_id: MemberId, period: Period, status: FollowUpStatus) -> Self {
        Self {
            member_id,
            period,
            status,
            last_update: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.member_id.is_nil() {
            return Err(ValidationError::NilId("follow_up.member_id"));
        }
        Ok(())
    }
}
