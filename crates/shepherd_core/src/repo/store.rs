//! One handle over every SQLite repository sharing a connection.

use super::attendance_repo::{AttendanceFilter, AttendanceRepository, SqliteAttendanceRepository};
use super::follow_up_repo::{FollowUpFilter, FollowUpRepository, SqliteFollowUpRepository};
use super::member_repo::{MemberListQuery, MemberRepository, SqliteMemberRepository};
use super::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use super::unit_repo::{SqliteUnitRepository, UnitRepository};
use super::RepoResult;
use crate::model::attendance::{AttendanceKey, AttendanceRecord};
use crate::model::follow_up::FollowUp;
use crate::model::member::{Member, MemberId};
use crate::model::settings::Settings;
use crate::model::unit::{Nucleus, Unit, UnitId};
use rusqlite::Connection;

/// Persistence store handle. Cheap to copy; every copy shares `conn`.
#[derive(Clone, Copy)]
pub struct SqliteStore<'conn> {
    units: SqliteUnitRepository<'conn>,
    members: SqliteMemberRepository<'conn>,
    attendance: SqliteAttendanceRepository<'conn>,
    follow_ups: SqliteFollowUpRepository<'conn>,
    settings: SqliteSettingsRepository<'conn>,
}

impl<'conn> SqliteStore<'conn> {
    /// Builds every repository, failing if any table is missing.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            units: SqliteUnitRepository::try_new(conn)?,
            members: SqliteMemberRepository::try_new(conn)?,
            attendance: SqliteAttendanceRepository::try_new(conn)?,
            follow_ups: SqliteFollowUpRepository::try_new(conn)?,
            settings: SqliteSettingsRepository::try_new(conn)?,
        })
    }
}

impl UnitRepository for SqliteStore<'_> {
    fn upsert_unit(&self, unit: &Unit) -> RepoResult<()> {
        self.units.upsert_unit(unit)
    }

    fn get_unit(&self, id: UnitId) -> RepoResult<Option<Unit>> {
        self.units.get_unit(id)
    }

    fn list_units(&self) -> RepoResult<Vec<Unit>> {
        self.units.list_units()
    }

    fn upsert_nucleus(&self, nucleus: &Nucleus) -> RepoResult<()> {
        self.units.upsert_nucleus(nucleus)
    }

    fn list_nuclei(&self, unit_id: Option<UnitId>) -> RepoResult<Vec<Nucleus>> {
        self.units.list_nuclei(unit_id)
    }
}

impl MemberRepository for SqliteStore<'_> {
    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>> {
        self.members.list_members(query)
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        self.members.get_member(id)
    }

    fn upsert_member(&self, member: &Member) -> RepoResult<()> {
        self.members.upsert_member(member)
    }

    fn insert_members(&self, members: &[Member]) -> RepoResult<()> {
        self.members.insert_members(members)
    }

    fn set_member_active(&self, id: MemberId, active: bool) -> RepoResult<()> {
        self.members.set_member_active(id, active)
    }
}

impl AttendanceRepository for SqliteStore<'_> {
    fn list_attendance(&self, filter: &AttendanceFilter) -> RepoResult<Vec<AttendanceRecord>> {
        self.attendance.list_attendance(filter)
    }

    fn replace_attendance(
        &self,
        keys: &[AttendanceKey],
        records: &[AttendanceRecord],
    ) -> RepoResult<()> {
        self.attendance.replace_attendance(keys, records)
    }
}

impl FollowUpRepository for SqliteStore<'_> {
    fn list_follow_ups(&self, filter: &FollowUpFilter) -> RepoResult<Vec<FollowUp>> {
        self.follow_ups.list_follow_ups(filter)
    }

    fn replace_follow_up(&self, follow_up: &FollowUp) -> RepoResult<()> {
        self.follow_ups.replace_follow_up(follow_up)
    }
}

impl SettingsRepository for SqliteStore<'_> {
    fn get_settings(&self) -> RepoResult<Settings> {
        self.settings.get_settings()
    }

    fn set_settings(&self, settings: &Settings) -> RepoResult<()> {
        self.settings.set_settings(settings)
    }
}
