//! One-direction pipeline: calendar -> aggregation -> categorization.

use crate::analytics::calendar::total_services;
use crate::analytics::category::{categorize, Category};
use crate::analytics::stats::{summarize, AttendanceStats};
use crate::model::attendance::AttendanceRecord;
use crate::model::member::{Member, MemberId};
use crate::model::period::Period;
use crate::model::settings::Settings;
use crate::model::unit::ServiceSchedule;
use serde::Serialize;
use std::collections::HashMap;

/// Statistics and category of one member for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberStanding {
    pub member: Member,
    pub stats: AttendanceStats,
    pub category: Category,
}

/// Aggregates and categorizes one member's period records.
pub fn evaluate<'a>(
    records: impl IntoIterator<Item = &'a AttendanceRecord>,
    total_services: u32,
    settings: &Settings,
) -> (AttendanceStats, Category) {
    let stats = summarize(records, total_services);
    let category = categorize(stats.absences, &settings.thresholds);
    (stats, category)
}

/// Standings of every active member in `members` for `period`.
///
/// `schedule` is the schedule the period is measured against; pass a
/// historical snapshot to avoid recomputing past months against a schedule
/// that changed since. Records outside `period` are ignored. Output keeps
/// the input member order.
pub fn member_standings(
    members: &[Member],
    records: &[AttendanceRecord],
    period: Period,
    schedule: &ServiceSchedule,
    settings: &Settings,
) -> Vec<MemberStanding> {
    let total = total_services(period, schedule);
    let mut by_member: HashMap<MemberId, Vec<&AttendanceRecord>> = HashMap::new();
    for record in records.iter().filter(|record| period.contains(record.date)) {
        by_member.entry(record.member_id).or_default().push(record);
    }

    members
        .iter()
        .filter(|member| member.active)
        .map(|member| {
            let member_records = by_member.get(&member.id).map(Vec::as_slice).unwrap_or(&[]);
            let (stats, category) = evaluate(member_records.iter().copied(), total, settings);
            MemberStanding {
                member: member.clone(),
                stats,
                category,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::member_standings;
    use crate::analytics::category::FrequencyTier;
    use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
    use crate::model::member::Member;
    use crate::model::period::Period;
    use crate::model::settings::Settings;
    use crate::model::unit::ServiceSchedule;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    #[test]
    fn scenario_two_present_one_justified_is_critical() {
        let unit_id = Uuid::new_v4();
        let member = Member::new(unit_id, "Ana");
        let records = vec![
            AttendanceRecord::new(member.id, unit_id, day(1), AttendanceStatus::Present, None),
            AttendanceRecord::new(member.id, unit_id, day(4), AttendanceStatus::Present, None),
            AttendanceRecord::new(
                member.id,
                unit_id,
                day(8),
                AttendanceStatus::Justified,
                Some("travel".to_string()),
            ),
            // Next month, must not count.
            AttendanceRecord::new(
                member.id,
                unit_id,
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                AttendanceStatus::Present,
                None,
            ),
        ];
        let period: Period = "2026-02".parse().unwrap();
        let schedule = ServiceSchedule::from_indices(&[0, 3]).unwrap();

        let standings = member_standings(
            &[member],
            &records,
            period,
            &schedule,
            &Settings::default(),
        );
        assert_eq!(standings.len(), 1);
        let standing = &standings[0];
        assert_eq!(standing.stats.total_services, 8);
        assert_eq!(standing.stats.presences, 2);
        assert_eq!(standing.stats.absences, 5);
        assert_eq!(standing.stats.percent, 25.0);
        assert_eq!(standing.category.tier, FrequencyTier::Critical);
    }

    #[test]
    fn inactive_members_are_skipped_and_unrecorded_members_accrue_absences() {
        let unit_id = Uuid::new_v4();
        let mut inactive = Member::new(unit_id, "Bruno");
        inactive.active = false;
        let silent = Member::new(unit_id, "Carla");
        let period: Period = "2026-02".parse().unwrap();
        let schedule = ServiceSchedule::from_indices(&[0]).unwrap();

        let standings = member_standings(
            &[inactive, silent.clone()],
            &[],
            period,
            &schedule,
            &Settings::default(),
        );
        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].member.id, silent.id);
        assert_eq!(standings[0].stats.absences, 4);
        assert_eq!(standings[0].category.tier, FrequencyTier::Low);
    }
}
