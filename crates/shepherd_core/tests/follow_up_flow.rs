use chrono::NaiveDate;
use shepherd_core::db::open_db_in_memory;
use shepherd_core::repo::follow_up_repo::{FollowUpFilter, FollowUpRepository};
use shepherd_core::repo::member_repo::MemberRepository;
use shepherd_core::repo::unit_repo::UnitRepository;
use shepherd_core::{
    AttendanceRecord, AttendanceService, AttendanceStatus, CategoryThresholds, FollowUpService,
    FollowUpServiceError, FollowUpStatus, FrequencyTier, Member, Period, ServiceSchedule,
    SettingsService, SqliteStore, Unit,
};
use uuid::Uuid;

fn feb(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
}

fn february() -> Period {
    Period::new(2026, 2).unwrap()
}

/// The eight Sunday/Wednesday services of February 2026.
const SERVICE_DAYS: [u32; 8] = [1, 4, 8, 11, 15, 18, 22, 25];

fn seed_unit(store: &SqliteStore<'_>) -> Unit {
    let unit = Unit::new(
        "Central",
        ServiceSchedule::from_indices(&[0, 3]).unwrap(),
        "+55 (11) 98765-4321",
    );
    store.upsert_unit(&unit).unwrap();
    unit
}

fn add_member(store: &SqliteStore<'_>, unit: &Unit, name: &str) -> Member {
    let member = Member::new(unit.id, name);
    store.upsert_member(&member).unwrap();
    member
}

/// Marks `member` present on the first `present` services, absent on none.
fn attend(store: SqliteStore<'_>, unit: &Unit, member: &Member, present: usize) {
    let records = SERVICE_DAYS[..present]
        .iter()
        .map(|day| {
            AttendanceRecord::new(member.id, unit.id, feb(*day), AttendanceStatus::Present, None)
        })
        .collect::<Vec<_>>();
    AttendanceService::new(store)
        .batch_set_attendance(&records)
        .unwrap();
}

#[test]
fn period_stats_count_unregistered_services_as_absences() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let unit = seed_unit(&store);
    let faithful = add_member(&store, &unit, "Ana");
    let missing = add_member(&store, &unit, "Bruno");
    attend(store, &unit, &faithful, 8);

    let report = FollowUpService::new(store)
        .period_stats(unit.id, february())
        .unwrap();
    assert_eq!(report.total_services, 8);
    assert_eq!(report.standings.len(), 2);

    let ana = &report.standings[0];
    assert_eq!(ana.member.id, faithful.id);
    assert_eq!(ana.stats.presences, 8);
    assert_eq!(ana.stats.absences, 0);
    assert!((ana.stats.percent - 100.0).abs() < 1e-9);
    assert_eq!(ana.category.tier, FrequencyTier::Regular);

    let bruno = &report.standings[1];
    assert_eq!(bruno.member.id, missing.id);
    assert_eq!(bruno.stats.absences, 8);
    assert_eq!(bruno.stats.unregistered, 8);
    assert_eq!(bruno.stats.percent, 0.0);
    assert_eq!(bruno.category.tier, FrequencyTier::Critical);
}

#[test]
fn unit_without_schedule_reports_zero_rate() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let unit = Unit::new("Quiet", ServiceSchedule::empty(), "");
    store.upsert_unit(&unit).unwrap();
    add_member(&store, &unit, "Ana");

    let report = FollowUpService::new(store)
        .period_stats(unit.id, february())
        .unwrap();
    assert_eq!(report.total_services, 0);
    let stats = report.standings[0].stats;
    assert_eq!(stats.absences, 0);
    assert_eq!(stats.percent, 0.0);
    assert_eq!(report.standings[0].category.tier, FrequencyTier::Regular);
}

#[test]
fn board_defaults_to_pending_and_moves_done_to_resolved() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let unit = seed_unit(&store);
    let ana = add_member(&store, &unit, "Ana");
    let bruno = add_member(&store, &unit, "Bruno");
    let carla = add_member(&store, &unit, "Carla");
    attend(store, &unit, &ana, 8);
    attend(store, &unit, &bruno, 4);
    attend(store, &unit, &carla, 1);
    let service = FollowUpService::new(store);

    let board = service.follow_up_board(unit.id, february()).unwrap();
    let active = board
        .active
        .iter()
        .map(|entry| (entry.standing.member.id, entry.status))
        .collect::<Vec<_>>();
    assert_eq!(
        active,
        vec![
            (carla.id, FollowUpStatus::Pending),
            (bruno.id, FollowUpStatus::Pending)
        ]
    );
    assert!(board.resolved.is_empty());
    assert!(board.active.iter().all(|entry| entry.last_update.is_none()));

    service
        .set_follow_up_status(carla.id, february(), FollowUpStatus::Done)
        .unwrap();
    let board = service.follow_up_board(unit.id, february()).unwrap();
    assert_eq!(board.active.len(), 1);
    assert_eq!(board.resolved.len(), 1);
    assert_eq!(board.resolved[0].standing.member.id, carla.id);
    assert!(board.resolved[0].last_update.is_some());

    service
        .set_follow_up_status(carla.id, february(), FollowUpStatus::Scheduled)
        .unwrap();
    let board = service.follow_up_board(unit.id, february()).unwrap();
    assert!(board.resolved.is_empty());
    assert_eq!(board.active[0].status, FollowUpStatus::Scheduled);
}

#[test]
fn status_of_ineligible_member_is_stored_but_dormant() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let unit = seed_unit(&store);
    let ana = add_member(&store, &unit, "Ana");
    attend(store, &unit, &ana, 8);
    let service = FollowUpService::new(store);

    service
        .set_follow_up_status(ana.id, february(), FollowUpStatus::Scheduled)
        .unwrap();
    let stored = store
        .list_follow_ups(&FollowUpFilter {
            member_id: Some(ana.id),
            period: Some(february()),
        })
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, FollowUpStatus::Scheduled);

    let board = service.follow_up_board(unit.id, february()).unwrap();
    assert!(board.active.is_empty());
    assert!(board.resolved.is_empty());
}

#[test]
fn rewriting_status_keeps_one_record_per_member_and_period() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let unit = seed_unit(&store);
    let bruno = add_member(&store, &unit, "Bruno");
    let service = FollowUpService::new(store);
    let march = february().next().unwrap();

    for status in [
        FollowUpStatus::Scheduled,
        FollowUpStatus::Done,
        FollowUpStatus::Pending,
    ] {
        service
            .set_follow_up_status(bruno.id, february(), status)
            .unwrap();
    }
    service
        .set_follow_up_status(bruno.id, march, FollowUpStatus::Done)
        .unwrap();

    let february_records = store
        .list_follow_ups(&FollowUpFilter {
            member_id: Some(bruno.id),
            period: Some(february()),
        })
        .unwrap();
    assert_eq!(february_records.len(), 1);
    assert_eq!(february_records[0].status, FollowUpStatus::Pending);

    let all = store
        .list_follow_ups(&FollowUpFilter {
            member_id: Some(bruno.id),
            period: None,
        })
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn set_status_for_unknown_member_fails() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let err = FollowUpService::new(store)
        .set_follow_up_status(Uuid::new_v4(), february(), FollowUpStatus::Done)
        .unwrap_err();
    assert!(matches!(err, FollowUpServiceError::MemberNotFound(_)));
}

#[test]
fn escalation_summary_carries_contact_stats_and_status() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let unit = seed_unit(&store);
    let bruno = add_member(&store, &unit, "Bruno");
    attend(store, &unit, &bruno, 5);
    let service = FollowUpService::new(store);
    service
        .set_follow_up_status(bruno.id, february(), FollowUpStatus::Scheduled)
        .unwrap();

    let summary = service.escalation_summary(bruno.id, february()).unwrap();
    assert_eq!(summary.pastor_phone, "5511987654321");
    assert_eq!(summary.unit_name, "Central");
    assert_eq!(summary.member_name, "Bruno");
    assert_eq!(summary.stats.presences, 5);
    assert_eq!(summary.stats.absences, 3);
    assert_eq!(summary.category.tier, FrequencyTier::Low);
    assert_eq!(summary.status, FollowUpStatus::Scheduled);
}

#[test]
fn custom_thresholds_change_categories() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let unit = seed_unit(&store);
    let bruno = add_member(&store, &unit, "Bruno");
    attend(store, &unit, &bruno, 5);

    SettingsService::new(store)
        .update_thresholds(CategoryThresholds {
            regular: 0,
            attention: 2,
            low: 4,
            critical: 6,
        })
        .unwrap();
    let report = FollowUpService::new(store)
        .period_stats(unit.id, february())
        .unwrap();
    assert_eq!(report.standings[0].stats.absences, 3);
    assert_eq!(report.standings[0].category.tier, FrequencyTier::Attention);
}

#[test]
fn inactive_members_are_left_out_of_standings() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let unit = seed_unit(&store);
    let ana = add_member(&store, &unit, "Ana");
    add_member(&store, &unit, "Bruno");
    store.set_member_active(ana.id, false).unwrap();

    let report = FollowUpService::new(store)
        .period_stats(unit.id, february())
        .unwrap();
    assert_eq!(report.standings.len(), 1);
    assert_eq!(report.standings[0].member.name, "Bruno");
}

#[test]
fn escalation_matches_board_after_member_moves_unit() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let origin = seed_unit(&store);
    let target = Unit::new(
        "North",
        ServiceSchedule::from_indices(&[0, 3]).unwrap(),
        "11 2222-3333",
    );
    store.upsert_unit(&target).unwrap();
    let bruno = add_member(&store, &origin, "Bruno");
    attend(store, &origin, &bruno, 8);

    let moved = Member {
        unit_id: target.id,
        ..bruno.clone()
    };
    store.upsert_member(&moved).unwrap();
    let service = FollowUpService::new(store);

    let report = service.period_stats(target.id, february()).unwrap();
    let summary = service.escalation_summary(bruno.id, february()).unwrap();
    assert_eq!(summary.unit_name, "North");
    assert_eq!(summary.stats, report.standings[0].stats);
    assert_eq!(summary.stats.presences, 0);
    assert_eq!(summary.stats.absences, 8);
    assert_eq!(summary.category, report.standings[0].category);
}
