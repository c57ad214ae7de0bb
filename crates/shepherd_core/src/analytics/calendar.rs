//! Service calendar generation from a recurring weekly schedule.

use crate::model::period::Period;
use crate::model::unit::ServiceSchedule;
use chrono::NaiveDate;

/// Every day of `period` whose weekday is scheduled, in ascending order.
///
/// An empty schedule yields an empty calendar, not an error.
pub fn valid_service_dates(period: Period, schedule: &ServiceSchedule) -> Vec<NaiveDate> {
    if schedule.is_empty() {
        return Vec::new();
    }
    period
        .days()
        .filter(|day| schedule.is_service_day(*day))
        .collect()
}

/// Number of scheduled services in `period`.
pub fn total_services(period: Period, schedule: &ServiceSchedule) -> u32 {
    u32::try_from(valid_service_dates(period, schedule).len()).unwrap_or(u32::MAX)
}

/// Landing date when navigating into `period`: its first service date, or
/// the first day of the month when nothing is scheduled.
pub fn first_service_date(period: Period, schedule: &ServiceSchedule) -> NaiveDate {
    valid_service_dates(period, schedule)
        .first()
        .copied()
        .unwrap_or_else(|| period.first_day())
}

/// Keeps `selected` when it is a service date, otherwise snaps to the first
/// service date of the same month. Months without services keep `selected`.
pub fn resolve_selected_date(selected: NaiveDate, schedule: &ServiceSchedule) -> NaiveDate {
    if schedule.is_service_day(selected) {
        return selected;
    }
    valid_service_dates(Period::of(selected), schedule)
        .first()
        .copied()
        .unwrap_or(selected)
}

#[cfg(test)]
mod tests {
    use super::{first_service_date, resolve_selected_date, total_services, valid_service_dates};
    use crate::model::period::Period;
    use crate::model::unit::ServiceSchedule;
    use chrono::{Datelike, NaiveDate};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sunday_and_wednesday_in_february_2026_yield_eight_dates() {
        let period: Period = "2026-02".parse().unwrap();
        let schedule = ServiceSchedule::from_indices(&[0, 3]).unwrap();

        let dates = valid_service_dates(period, &schedule);
        assert_eq!(dates.len(), 8);
        assert_eq!(dates.first().copied(), Some(day(2026, 2, 1)));
        assert_eq!(dates.last().copied(), Some(day(2026, 2, 25)));
        assert_eq!(total_services(period, &schedule), 8);
    }

    #[test]
    fn dates_stay_in_month_ascend_and_match_schedule() {
        let schedule = ServiceSchedule::from_indices(&[1, 5, 6]).unwrap();
        for text in ["2024-02", "2025-04", "2025-12", "2026-01", "2026-07"] {
            let period: Period = text.parse().unwrap();
            let dates = valid_service_dates(period, &schedule);
            assert!(!dates.is_empty());
            assert!(dates.iter().all(|date| period.contains(*date)));
            assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
            assert!(dates.iter().all(|date| schedule.is_service_day(*date)));
        }
    }

    #[test]
    fn every_weekday_covers_whole_month() {
        let schedule = ServiceSchedule::from_indices(&[0, 1, 2, 3, 4, 5, 6]).unwrap();
        let period: Period = "2024-02".parse().unwrap();
        let dates = valid_service_dates(period, &schedule);
        assert_eq!(dates.len(), 29);
        assert_eq!(dates.last().unwrap().day(), 29);
    }

    #[test]
    fn empty_schedule_yields_no_dates() {
        let period: Period = "2026-03".parse().unwrap();
        assert!(valid_service_dates(period, &ServiceSchedule::empty()).is_empty());
        assert_eq!(
            first_service_date(period, &ServiceSchedule::empty()),
            day(2026, 3, 1)
        );
    }

    #[test]
    fn resolve_selected_date_snaps_to_first_service_of_month() {
        let sundays = ServiceSchedule::from_indices(&[0]).unwrap();
        // 2026-03-04 is a Wednesday; first Sunday of March 2026 is the 1st.
        assert_eq!(resolve_selected_date(day(2026, 3, 4), &sundays), day(2026, 3, 1));
        assert_eq!(resolve_selected_date(day(2026, 3, 8), &sundays), day(2026, 3, 8));
        assert_eq!(
            resolve_selected_date(day(2026, 3, 4), &ServiceSchedule::empty()),
            day(2026, 3, 4)
        );
    }
}
