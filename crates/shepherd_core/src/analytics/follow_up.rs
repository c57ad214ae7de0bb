//! Follow-up eligibility and the active/resolved board.
//!
//! # Invariants
//! - Eligibility is derived from current statistics; it is never stored.
//! - Members without a follow-up record for the period read as `Pending`.
//! - Records of members that are no longer eligible stay dormant and do
//!   not appear on the board.

use crate::analytics::standing::MemberStanding;
use crate::analytics::stats::AttendanceStats;
use crate::model::follow_up::{FollowUp, FollowUpStatus};
use crate::model::member::MemberId;
use crate::model::period::Period;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Absence count from which a member needs pastoral follow-up.
pub const FOLLOW_UP_ABSENCE_FLOOR: u32 = 3;

pub fn is_follow_up_eligible(stats: &AttendanceStats) -> bool {
    stats.absences >= FOLLOW_UP_ABSENCE_FLOOR
}

/// One eligible member with their current follow-up state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUpEntry {
    pub standing: MemberStanding,
    pub status: FollowUpStatus,
    /// `None` while the status is the implicit default.
    pub last_update: Option<i64>,
}

/// Eligible members of one period split by resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUpBoard {
    pub period: Period,
    /// Pending or scheduled, most absences first.
    pub active: Vec<FollowUpEntry>,
    /// Done, most absences first.
    pub resolved: Vec<FollowUpEntry>,
}

/// Builds the board from fresh standings and the period's follow-up records.
pub fn build_board(
    period: Period,
    standings: Vec<MemberStanding>,
    follow_ups: &[FollowUp],
) -> FollowUpBoard {
    let by_member: HashMap<MemberId, &FollowUp> = follow_ups
        .iter()
        .filter(|follow_up| follow_up.period == period)
        .map(|follow_up| (follow_up.member_id, follow_up))
        .collect();

    let (mut resolved, mut active): (Vec<_>, Vec<_>) = standings
        .into_iter()
        .filter(|standing| is_follow_up_eligible(&standing.stats))
        .map(|standing| {
            let record = by_member.get(&standing.member.id);
            FollowUpEntry {
                status: record.map(|r| r.status).unwrap_or_default(),
                last_update: record.map(|r| r.last_update),
                standing,
            }
        })
        .partition(|entry| entry.status.is_resolved());

    active.sort_by(by_severity);
    resolved.sort_by(by_severity);
    FollowUpBoard {
        period,
        active,
        resolved,
    }
}

fn by_severity(left: &FollowUpEntry, right: &FollowUpEntry) -> Ordering {
    right
        .standing
        .stats
        .absences
        .cmp(&left.standing.stats.absences)
        .then_with(|| {
            left.standing
                .member
                .name
                .to_lowercase()
                .cmp(&right.standing.member.name.to_lowercase())
        })
}

#[cfg(test)]
mod tests {
    use super::{build_board, is_follow_up_eligible};
    use crate::analytics::standing::member_standings;
    use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
    use crate::model::follow_up::{FollowUp, FollowUpStatus};
    use crate::model::member::Member;
    use crate::model::period::Period;
    use crate::model::settings::Settings;
    use crate::model::unit::ServiceSchedule;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn board_partitions_by_status_and_sorts_by_absences() {
        let unit_id = Uuid::new_v4();
        let period: Period = "2026-02".parse().unwrap();
        // Sundays and Wednesdays: 8 services in February 2026.
        let schedule = ServiceSchedule::from_indices(&[0, 3]).unwrap();
        let regular = Member::new(unit_id, "Regular");
        let five_missed = Member::new(unit_id, "Five");
        let eight_missed = Member::new(unit_id, "Eight");
        let done = Member::new(unit_id, "Done");

        let mut records = Vec::new();
        for d in [1, 4, 8, 11, 15, 18, 22, 25] {
            let date = NaiveDate::from_ymd_opt(2026, 2, d).unwrap();
            records.push(AttendanceRecord::new(
                regular.id,
                unit_id,
                date,
                AttendanceStatus::Present,
                None,
            ));
        }
        for d in [1, 4, 8] {
            let date = NaiveDate::from_ymd_opt(2026, 2, d).unwrap();
            records.push(AttendanceRecord::new(
                five_missed.id,
                unit_id,
                date,
                AttendanceStatus::Present,
                None,
            ));
        }

        let standings = member_standings(
            &[regular, five_missed.clone(), eight_missed.clone(), done.clone()],
            &records,
            period,
            &schedule,
            &Settings::default(),
        );
        let follow_ups = vec![
            FollowUp::new(done.id, period, FollowUpStatus::Done),
            FollowUp::new(five_missed.id, period, FollowUpStatus::Scheduled),
            FollowUp::new(eight_missed.id, period.next().unwrap(), FollowUpStatus::Done),
        ];

        let board = build_board(period, standings, &follow_ups);
        let active_ids = board
            .active
            .iter()
            .map(|entry| entry.standing.member.id)
            .collect::<Vec<_>>();
        assert_eq!(active_ids, vec![eight_missed.id, five_missed.id]);
        assert_eq!(board.active[0].status, FollowUpStatus::Pending);
        assert_eq!(board.active[0].last_update, None);
        assert_eq!(board.active[1].status, FollowUpStatus::Scheduled);

        assert_eq!(board.resolved.len(), 1);
        assert_eq!(board.resolved[0].standing.member.id, done.id);
    }

    #[test]
    fn eligibility_starts_at_three_absences() {
        let unit_id = Uuid::new_v4();
        let member = Member::new(unit_id, "Ana");
        let period: Period = "2026-02".parse().unwrap();
        let two_sundays = ServiceSchedule::from_indices(&[0]).unwrap();
        let mut records = Vec::new();
        for d in [1, 8] {
            records.push(AttendanceRecord::new(
                member.id,
                unit_id,
                NaiveDate::from_ymd_opt(2026, 2, d).unwrap(),
                AttendanceStatus::Present,
                None,
            ));
        }
        let standings = member_standings(
            &[member],
            &records,
            period,
            &two_sundays,
            &Settings::default(),
        );
        assert_eq!(standings[0].stats.absences, 2);
        assert!(!is_follow_up_eligible(&standings[0].stats));
    }
}
