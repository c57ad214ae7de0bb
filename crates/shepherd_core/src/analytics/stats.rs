//! Aggregation of raw attendance records into per-member and per-day counts.
//!
//! # Invariants
//! - A scheduled service with no record counts as an absence; unregistered
//!   never means excused.
//! - Rates are 0 when the denominator is 0.

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use serde::Serialize;

/// Per-member statistics over one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub presences: u32,
    /// Explicit absences plus unregistered services.
    pub absences: u32,
    pub justifications: u32,
    /// Records with status `Absent`.
    pub explicit_absences: u32,
    /// Scheduled services without any record.
    pub unregistered: u32,
    pub total_services: u32,
    /// Presence rate in percent, `presences / total_services * 100`.
    pub percent: f64,
}

/// Summarizes one member's records for a period.
///
/// `records` must already be restricted to the member and the period; the
/// period itself is not re-derived here.
pub fn summarize<'a>(
    records: impl IntoIterator<Item = &'a AttendanceRecord>,
    total_services: u32,
) -> AttendanceStats {
    let tally = Tally::of(records);
    let unregistered = total_services.saturating_sub(tally.registered());

    AttendanceStats {
        presences: tally.present,
        absences: tally.absent.saturating_add(unregistered),
        justifications: tally.justified,
        explicit_absences: tally.absent,
        unregistered,
        total_services,
        percent: rate(tally.present, total_services),
    }
}

/// Counts for one service date across a unit's active members.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaySummary {
    pub present: u32,
    pub absent: u32,
    pub justified: u32,
    pub not_registered: u32,
    pub active_members: u32,
    /// `present / active_members * 100`.
    pub presence_rate: f64,
}

impl DaySummary {
    /// Every active member has a record for the date.
    pub fn is_complete(&self) -> bool {
        self.active_members > 0 && self.not_registered == 0
    }
}

/// Summarizes the records of a single service date.
pub fn summarize_day<'a>(
    records: impl IntoIterator<Item = &'a AttendanceRecord>,
    active_members: u32,
) -> DaySummary {
    let tally = Tally::of(records);
    DaySummary {
        present: tally.present,
        absent: tally.absent,
        justified: tally.justified,
        not_registered: active_members.saturating_sub(tally.registered()),
        active_members,
        presence_rate: rate(tally.present, active_members),
    }
}

#[derive(Default)]
struct Tally {
    present: u32,
    absent: u32,
    justified: u32,
}

impl Tally {
    fn of<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut tally, record| {
            let slot = match record.status {
                AttendanceStatus::Present => &mut tally.present,
                AttendanceStatus::Absent => &mut tally.absent,
                AttendanceStatus::Justified => &mut tally.justified,
            };
            *slot = slot.saturating_add(1);
            tally
        })
    }

    fn registered(&self) -> u32 {
        self.present
            .saturating_add(self.absent)
            .saturating_add(self.justified)
    }
}

fn rate(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    f64::from(part) / f64::from(whole) * 100.0
}
