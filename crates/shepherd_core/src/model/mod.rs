//! Domain model for units, members, attendance and pastoral follow-up.
//!
//! # Responsibility
//! - Define the typed records the analytics core and the store exchange.
//! - Reject malformed input at construction instead of coercing it.
//!
//! # Invariants
//! - "Not registered" is never a stored status; it is the absence of an
//!   attendance record (`Option<AttendanceStatus>::None`).
//! - Justification text only exists on `AttendanceStatus::Justified` records.

pub mod attendance;
pub mod follow_up;
pub mod member;
pub mod period;
pub mod settings;
pub mod unit;
pub mod validation;

use chrono::Utc;

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
