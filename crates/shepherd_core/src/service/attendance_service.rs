//! Attendance marking use-cases for a unit's service dates.
//!
//! # Responsibility
//! - Apply the toggle rule and justification handling on single marks.
//! - Run bulk finalization of a service date through the batch path.
//! - Build the per-date roster, summary and completion markers.
//!
//! # Invariants
//! - Writes only target valid service dates of the member's unit.
//! - Every write goes through `replace_attendance`, so a `(member, date)`
//!   pair never ends up with two live records.

use crate::analytics::calendar::valid_service_dates;
use crate::analytics::stats::{summarize_day, DaySummary};
use crate::model::attendance::{
    resolve_mark, AttendanceKey, AttendanceRecord, AttendanceStatus,
};
use crate::model::member::{Member, MemberId};
use crate::model::period::{format_date, Period};
use crate::model::unit::{NucleusId, Unit, UnitId};
use crate::model::validation::ValidationError;
use crate::repo::attendance_repo::{AttendanceFilter, AttendanceRepository};
use crate::repo::member_repo::{MemberListQuery, MemberRepository};
use crate::repo::unit_repo::UnitRepository;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from attendance use-cases.
#[derive(Debug)]
pub enum AttendanceServiceError {
    Validation(ValidationError),
    UnitNotFound(UnitId),
    MemberNotFound(MemberId),
    /// Date is not on the unit's weekly schedule.
    NotAServiceDate { unit_id: UnitId, date: NaiveDate },
    Repo(RepoError),
    /// Internal mismatch between a write and its outcome.
    InconsistentState(&'static str),
}

impl Display for AttendanceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnitNotFound(id) => write!(f, "unit not found: {id}"),
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::NotAServiceDate { unit_id, date } => write!(
                f,
                "{} is not a service date of unit {unit_id}",
                format_date(*date)
            ),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent attendance state: {details}")
            }
        }
    }
}

impl Error for AttendanceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AttendanceServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for AttendanceServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type AttendanceResult<T> = Result<T, AttendanceServiceError>;

/// A single user mark on one member for one service date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRequest {
    pub member_id: MemberId,
    pub unit_id: UnitId,
    pub date: NaiveDate,
    /// `None` resets the member to "not registered".
    pub status: Option<AttendanceStatus>,
    /// Kept only when the effective status is `Justified`.
    pub justification: Option<String>,
}

/// Narrows a day roster for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterFilter {
    /// Case-insensitive substring of the member name.
    pub name_contains: Option<String>,
    pub nucleus_id: Option<NucleusId>,
}

/// One active member with their mark on a service date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub member: Member,
    /// `None` while not registered.
    pub status: Option<AttendanceStatus>,
    pub justification: Option<String>,
}

/// Attendance use-case service over a persistence store.
pub struct AttendanceService<S> {
    store: S,
}

impl<S> AttendanceService<S>
where
    S: UnitRepository + MemberRepository + AttendanceRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Sets or toggles one member's mark on a service date.
    ///
    /// Requesting the member's current status clears the record. Returns the
    /// live record after the write, `None` when the member ends up not
    /// registered.
    pub fn set_attendance(
        &self,
        request: &MarkRequest,
    ) -> AttendanceResult<Option<AttendanceRecord>> {
        self.ensure_writable(request.member_id, request.unit_id, request.date)?;
        let current = self.current_status(request.member_id, request.date)?;
        let effective = resolve_mark(current, request.status);
        self.write_mark(request, effective)
    }

    /// Records a justified absence with its text.
    ///
    /// Unlike `set_attendance` this never toggles: editing the text of an
    /// existing justification keeps the member justified.
    pub fn justify_attendance(
        &self,
        member_id: MemberId,
        unit_id: UnitId,
        date: NaiveDate,
        justification: impl Into<String>,
    ) -> AttendanceResult<AttendanceRecord> {
        self.ensure_writable(member_id, unit_id, date)?;
        let request = MarkRequest {
            member_id,
            unit_id,
            date,
            status: Some(AttendanceStatus::Justified),
            justification: Some(justification.into()),
        };
        self.write_mark(&request, request.status)?
            .ok_or(AttendanceServiceError::InconsistentState(
                "justified write produced no record",
            ))
    }

    /// Replaces the live records of every `(member, date)` in `records`, then
    /// inserts them, atomically.
    ///
    /// Every record must target a service date of its member's unit, and no
    /// key may appear twice. A batch failing either check writes nothing.
    pub fn batch_set_attendance(&self, records: &[AttendanceRecord]) -> AttendanceResult<usize> {
        let mut seen = HashSet::new();
        for record in records {
            if !seen.insert(record.key()) {
                return Err(ValidationError::DuplicateBatchKey {
                    member_id: record.member_id.to_string(),
                    date: format_date(record.date),
                }
                .into());
            }
        }
        let mut units: HashMap<UnitId, Unit> = HashMap::new();
        for record in records {
            let unit = match units.entry(record.unit_id) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => slot.insert(self.require_unit(record.unit_id)?),
            };
            self.ensure_target(unit, record.member_id, record.date)?;
        }
        let keys = records.iter().map(AttendanceRecord::key).collect::<Vec<_>>();
        self.store.replace_attendance(&keys, records)?;
        info!(
            "event=attendance_batch module=service status=ok records={}",
            records.len()
        );
        Ok(records.len())
    }

    /// Marks every active member of the unit without a record on `date` as
    /// absent. Returns the records created.
    pub fn finalize_service_date(
        &self,
        unit_id: UnitId,
        date: NaiveDate,
    ) -> AttendanceResult<Vec<AttendanceRecord>> {
        let unit = self.require_unit(unit_id)?;
        ensure_service_date(&unit, date)?;

        let members = self
            .store
            .list_members(&MemberListQuery::active_in(unit_id))?;
        let registered = self
            .day_records(unit_id, date)?
            .into_iter()
            .map(|record| record.member_id)
            .collect::<HashSet<_>>();

        let pending = members
            .iter()
            .filter(|member| !registered.contains(&member.id))
            .map(|member| {
                AttendanceRecord::new(member.id, unit_id, date, AttendanceStatus::Absent, None)
            })
            .collect::<Vec<_>>();
        if pending.is_empty() {
            return Ok(pending);
        }

        self.batch_set_attendance(&pending)?;
        info!(
            "event=service_finalize module=service status=ok unit={} date={} marked_absent={}",
            unit_id,
            format_date(date),
            pending.len()
        );
        Ok(pending)
    }

    /// Active members with their mark on `date`: not registered first, then
    /// absent, justified, present; ties by name.
    pub fn day_roster(
        &self,
        unit_id: UnitId,
        date: NaiveDate,
        filter: &RosterFilter,
    ) -> AttendanceResult<Vec<RosterEntry>> {
        self.require_unit(unit_id)?;
        let members = self
            .store
            .list_members(&MemberListQuery::active_in(unit_id))?;
        let mut by_member = self
            .day_records(unit_id, date)?
            .into_iter()
            .map(|record| (record.member_id, record))
            .collect::<HashMap<_, _>>();
        let needle = filter
            .name_contains
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase);

        let mut roster = members
            .into_iter()
            .filter(|member| {
                needle
                    .as_deref()
                    .map_or(true, |needle| member.name.to_lowercase().contains(needle))
            })
            .filter(|member| {
                filter
                    .nucleus_id
                    .map_or(true, |nucleus_id| member.nucleus_id == Some(nucleus_id))
            })
            .map(|member| {
                let record = by_member.remove(&member.id);
                RosterEntry {
                    status: record.as_ref().map(|record| record.status),
                    justification: record.and_then(|record| record.justification),
                    member,
                }
            })
            .collect::<Vec<_>>();
        roster.sort_by(roster_order);
        Ok(roster)
    }

    /// Counts for one service date across the unit's active members.
    pub fn day_summary(&self, unit_id: UnitId, date: NaiveDate) -> AttendanceResult<DaySummary> {
        self.require_unit(unit_id)?;
        let active = self
            .store
            .list_members(&MemberListQuery::active_in(unit_id))?
            .into_iter()
            .map(|member| member.id)
            .collect::<HashSet<_>>();
        let records = self.day_records(unit_id, date)?;
        let active_records = records
            .iter()
            .filter(|record| active.contains(&record.member_id));
        Ok(summarize_day(active_records, count(active.len())))
    }

    /// Service dates of `period` on which every active member has a mark.
    pub fn completed_dates(
        &self,
        unit_id: UnitId,
        period: Period,
    ) -> AttendanceResult<Vec<NaiveDate>> {
        let unit = self.require_unit(unit_id)?;
        let active = self
            .store
            .list_members(&MemberListQuery::active_in(unit_id))?
            .into_iter()
            .map(|member| member.id)
            .collect::<HashSet<_>>();
        if active.is_empty() {
            return Ok(Vec::new());
        }

        let mut per_date: BTreeMap<NaiveDate, Vec<AttendanceRecord>> = BTreeMap::new();
        let filter = AttendanceFilter {
            unit_id: Some(unit_id),
            period: Some(period),
            ..AttendanceFilter::default()
        };
        for record in self.store.list_attendance(&filter)? {
            if active.contains(&record.member_id) {
                per_date.entry(record.date).or_default().push(record);
            }
        }

        Ok(valid_service_dates(period, &unit.schedule)
            .into_iter()
            .filter(|date| {
                let records = per_date.get(date).map(Vec::as_slice).unwrap_or(&[]);
                summarize_day(records, count(active.len())).is_complete()
            })
            .collect())
    }

    fn write_mark(
        &self,
        request: &MarkRequest,
        effective: Option<AttendanceStatus>,
    ) -> AttendanceResult<Option<AttendanceRecord>> {
        let key = AttendanceKey {
            member_id: request.member_id,
            date: request.date,
        };
        match effective {
            None => {
                self.store.replace_attendance(&[key], &[])?;
                info!(
                    "event=attendance_set module=service status=ok outcome=cleared date={}",
                    format_date(request.date)
                );
                Ok(None)
            }
            Some(status) => {
                let record = AttendanceRecord::new(
                    request.member_id,
                    request.unit_id,
                    request.date,
                    status,
                    request.justification.clone(),
                );
                self.store
                    .replace_attendance(&[key], std::slice::from_ref(&record))?;
                info!(
                    "event=attendance_set module=service status=ok outcome=recorded mark={} date={}",
                    status,
                    format_date(request.date)
                );
                Ok(Some(record))
            }
        }
    }

    fn ensure_writable(
        &self,
        member_id: MemberId,
        unit_id: UnitId,
        date: NaiveDate,
    ) -> AttendanceResult<()> {
        let unit = self.require_unit(unit_id)?;
        self.ensure_target(&unit, member_id, date)
    }

    /// Member exists, belongs to `unit`, and `date` is on its schedule.
    fn ensure_target(
        &self,
        unit: &Unit,
        member_id: MemberId,
        date: NaiveDate,
    ) -> AttendanceResult<()> {
        let member = self
            .store
            .get_member(member_id)?
            .ok_or(AttendanceServiceError::MemberNotFound(member_id))?;
        if member.unit_id != unit.id {
            return Err(ValidationError::UnitMismatch {
                member_id: member_id.to_string(),
            }
            .into());
        }
        ensure_service_date(unit, date)
    }

    fn current_status(
        &self,
        member_id: MemberId,
        date: NaiveDate,
    ) -> AttendanceResult<Option<AttendanceStatus>> {
        let filter = AttendanceFilter {
            member_id: Some(member_id),
            date: Some(date),
            ..AttendanceFilter::default()
        };
        Ok(self
            .store
            .list_attendance(&filter)?
            .first()
            .map(|record| record.status))
    }

    fn day_records(
        &self,
        unit_id: UnitId,
        date: NaiveDate,
    ) -> AttendanceResult<Vec<AttendanceRecord>> {
        let filter = AttendanceFilter {
            unit_id: Some(unit_id),
            date: Some(date),
            ..AttendanceFilter::default()
        };
        Ok(self.store.list_attendance(&filter)?)
    }

    fn require_unit(&self, unit_id: UnitId) -> AttendanceResult<Unit> {
        self.store
            .get_unit(unit_id)?
            .ok_or(AttendanceServiceError::UnitNotFound(unit_id))
    }
}

fn ensure_service_date(unit: &Unit, date: NaiveDate) -> AttendanceResult<()> {
    if unit.schedule.is_service_day(date) {
        Ok(())
    } else {
        Err(AttendanceServiceError::NotAServiceDate {
            unit_id: unit.id,
            date,
        })
    }
}

fn roster_order(left: &RosterEntry, right: &RosterEntry) -> Ordering {
    mark_rank(left.status)
        .cmp(&mark_rank(right.status))
        .then_with(|| {
            left.member
                .name
                .to_lowercase()
                .cmp(&right.member.name.to_lowercase())
        })
}

fn mark_rank(status: Option<AttendanceStatus>) -> u8 {
    match status {
        None => 0,
        Some(AttendanceStatus::Absent) => 1,
        Some(AttendanceStatus::Justified) => 2,
        Some(AttendanceStatus::Present) => 3,
    }
}

fn count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
