//! Validation failures for malformed domain input.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Typed rejection for malformed input. Nothing is silently coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier is the nil UUID.
    NilId(&'static str),
    /// Name field is blank after trim.
    BlankName(&'static str),
    /// Calendar date text is not a valid `YYYY-MM-DD` day.
    InvalidDate(String),
    /// Period text is not a valid `YYYY-MM` month.
    InvalidPeriod(String),
    /// Status text does not name a known status.
    UnknownStatus(String),
    /// Weekday index outside `0..=6`.
    WeekdayOutOfRange(u8),
    /// Schedule text is not a comma-separated list of weekday indices.
    InvalidSchedule(String),
    /// Category thresholds must start at 0 and be strictly ascending.
    ThresholdsNotAscending {
        regular: u32,
        attention: u32,
        low: u32,
        critical: u32,
    },
    /// Justification text attached to a non-justified record.
    StrayJustification { date: String },
    /// Access password is blank.
    BlankPassword,
    /// The same `(member, date)` key appears twice in one batch.
    DuplicateBatchKey { member_id: String, date: String },
    /// Record unit does not match the member's unit.
    UnitMismatch { member_id: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId(field) => write!(f, "{field} must not be the nil uuid"),
            Self::BlankName(field) => write!(f, "{field} must not be blank"),
            Self::InvalidDate(value) => write!(f, "invalid date `{value}`, expected YYYY-MM-DD"),
            Self::InvalidPeriod(value) => write!(f, "invalid period `{value}`, expected YYYY-MM"),
            Self::UnknownStatus(value) => write!(f, "unknown status `{value}`"),
            Self::WeekdayOutOfRange(value) => {
                write!(f, "weekday index {value} is out of range 0..=6")
            }
            Self::InvalidSchedule(value) => write!(f, "invalid service schedule `{value}`"),
            Self::ThresholdsNotAscending {
                regular,
                attention,
                low,
                critical,
            } => write!(
                f,
                "category thresholds must start at 0 and be strictly ascending, got regular={regular} attention={attention} low={low} critical={critical}"
            ),
            Self::StrayJustification { date } => {
                write!(f, "justification text on {date} requires status justified")
            }
            Self::BlankPassword => write!(f, "access password must not be blank"),
            Self::DuplicateBatchKey { member_id, date } => {
                write!(f, "batch contains member {member_id} on {date} more than once")
            }
            Self::UnitMismatch { member_id } => {
                write!(f, "member {member_id} does not belong to the record unit")
            }
        }
    }
}

impl Error for ValidationError {}
