//! Period statistics and pastoral follow-up use-cases.
//!
//! # Responsibility
//! - Recompute member standings for a unit and period on every call.
//! - Expose the follow-up board and the status write path.
//! - Produce the data behind an escalation message to the unit's pastor.
//!
//! # Invariants
//! - Standings are measured against the unit's current schedule.
//! - Status writes are not checked against eligibility.

use crate::analytics::calendar::total_services;
use crate::analytics::category::Category;
use crate::analytics::follow_up::{build_board, FollowUpBoard};
use crate::analytics::standing::{evaluate, member_standings, MemberStanding};
use crate::analytics::stats::AttendanceStats;
use crate::model::follow_up::{FollowUp, FollowUpStatus};
use crate::model::member::MemberId;
use crate::model::period::Period;
use crate::model::unit::{Unit, UnitId};
use crate::model::validation::ValidationError;
use crate::repo::attendance_repo::{AttendanceFilter, AttendanceRepository};
use crate::repo::follow_up_repo::{FollowUpFilter, FollowUpRepository};
use crate::repo::member_repo::{MemberListQuery, MemberRepository};
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::unit_repo::UnitRepository;
use crate::repo::RepoError;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from follow-up use-cases.
#[derive(Debug)]
pub enum FollowUpServiceError {
    Validation(ValidationError),
    UnitNotFound(UnitId),
    MemberNotFound(MemberId),
    Repo(RepoError),
}

impl Display for FollowUpServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnitNotFound(id) => write!(f, "unit not found: {id}"),
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FollowUpServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for FollowUpServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub type FollowUpResult<T> = Result<T, FollowUpServiceError>;

/// Standings of a unit's active members for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub unit_id: UnitId,
    pub period: Period,
    pub total_services: u32,
    /// In member name order.
    pub standings: Vec<MemberStanding>,
}

/// Data needed to compose an escalation message for one member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EscalationSummary {
    pub unit_name: String,
    /// Digits only, ready for a messaging deep link.
    pub pastor_phone: String,
    pub member_name: String,
    pub period: Period,
    pub stats: AttendanceStats,
    pub category: Category,
    pub status: FollowUpStatus,
}

/// Follow-up service facade over a persistence store.
pub struct FollowUpService<S> {
    store: S,
}

impl<S> FollowUpService<S>
where
    S: UnitRepository
        + MemberRepository
        + AttendanceRepository
        + FollowUpRepository
        + SettingsRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn period_stats(&self, unit_id: UnitId, period: Period) -> FollowUpResult<PeriodReport> {
        let unit = self.require_unit(unit_id)?;
        let settings = self.store.get_settings()?;
        let members = self
            .store
            .list_members(&MemberListQuery::active_in(unit_id))?;
        let records = self.store.list_attendance(&AttendanceFilter {
            unit_id: Some(unit_id),
            period: Some(period),
            ..AttendanceFilter::default()
        })?;

        let standings = member_standings(&members, &records, period, &unit.schedule, &settings);
        info!(
            "event=period_stats module=service status=ok unit={} period={} members={}",
            unit_id,
            period,
            standings.len()
        );
        Ok(PeriodReport {
            unit_id,
            period,
            total_services: total_services(period, &unit.schedule),
            standings,
        })
    }

    /// Eligible members split into active and resolved lists.
    pub fn follow_up_board(&self, unit_id: UnitId, period: Period) -> FollowUpResult<FollowUpBoard> {
        let report = self.period_stats(unit_id, period)?;
        let follow_ups = self.store.list_follow_ups(&FollowUpFilter {
            member_id: None,
            period: Some(period),
        })?;
        Ok(build_board(period, report.standings, &follow_ups))
    }

    /// Replaces the member's follow-up record for `period` with a fresh one.
    pub fn set_follow_up_status(
        &self,
        member_id: MemberId,
        period: Period,
        status: FollowUpStatus,
    ) -> FollowUpResult<FollowUp> {
        self.store
            .get_member(member_id)?
            .ok_or(FollowUpServiceError::MemberNotFound(member_id))?;
        let follow_up = FollowUp::new(member_id, period, status);
        self.store.replace_follow_up(&follow_up)?;
        info!(
            "event=follow_up_set module=service status=ok period={} follow_up={}",
            period, status
        );
        Ok(follow_up)
    }

    pub fn escalation_summary(
        &self,
        member_id: MemberId,
        period: Period,
    ) -> FollowUpResult<EscalationSummary> {
        let member = self
            .store
            .get_member(member_id)?
            .ok_or(FollowUpServiceError::MemberNotFound(member_id))?;
        let unit = self.require_unit(member.unit_id)?;
        let settings = self.store.get_settings()?;
        let records = self.store.list_attendance(&AttendanceFilter {
            unit_id: Some(member.unit_id),
            member_id: Some(member_id),
            period: Some(period),
            ..AttendanceFilter::default()
        })?;
        let (stats, category) = evaluate(
            &records,
            total_services(period, &unit.schedule),
            &settings,
        );
        let status = self
            .store
            .list_follow_ups(&FollowUpFilter {
                member_id: Some(member_id),
                period: Some(period),
            })?
            .first()
            .map(|follow_up| follow_up.status)
            .unwrap_or_default();

        Ok(EscalationSummary {
            pastor_phone: unit.pastor_phone_digits(),
            unit_name: unit.name,
            member_name: member.name,
            period,
            stats,
            category,
            status,
        })
    }

    fn require_unit(&self, unit_id: UnitId) -> FollowUpResult<Unit> {
        self.store
            .get_unit(unit_id)?
            .ok_or(FollowUpServiceError::UnitNotFound(unit_id))
    }
}
