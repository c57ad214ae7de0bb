//! Subcommand handlers. Each runs one use-case against the store and prints
//! the result.

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use shepherd_core::repo::member_repo::{MemberListQuery, MemberRepository};
use shepherd_core::repo::unit_repo::UnitRepository;
use shepherd_core::{
    first_service_date, parse_mark, resolve_selected_date, valid_service_dates, AttendanceService,
    CategoryThresholds, Connection, FollowUpService, FollowUpStatus, MarkRequest, Member, Nucleus,
    Period, RosterFilter, ServiceSchedule, SettingsService, SqliteStore, Unit,
};
use uuid::Uuid;

use crate::output::{self, emit};

pub struct Context<'conn> {
    store: SqliteStore<'conn>,
    json: bool,
}

#[derive(Serialize)]
struct CalendarView {
    period: Period,
    dates: Vec<NaiveDate>,
    default_date: NaiveDate,
    selected: Option<NaiveDate>,
}

#[derive(Serialize)]
struct RosterView {
    date: NaiveDate,
    summary: shepherd_core::DaySummary,
    entries: Vec<shepherd_core::RosterEntry>,
}

impl<'conn> Context<'conn> {
    pub fn new(conn: &'conn Connection, json: bool) -> Result<Self> {
        let store = SqliteStore::try_new(conn).context("database schema is incomplete")?;
        Ok(Self { store, json })
    }

    pub fn add_unit(&self, name: &str, schedule: ServiceSchedule, pastor_phone: &str) -> Result<()> {
        let unit = Unit::new(name, schedule, pastor_phone);
        self.store.upsert_unit(&unit)?;
        info!("event=unit_add module=cli status=ok unit={}", unit.id);
        emit(self.json, &unit, |unit| {
            format!("{}  {}  schedule={}", unit.id, unit.name, unit.schedule)
        })
    }

    pub fn list_units(&self) -> Result<()> {
        let units = self.store.list_units()?;
        emit(self.json, &units, |units| {
            units
                .iter()
                .map(|unit| format!("{}  {}  schedule={}", unit.id, unit.name, unit.schedule))
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn add_nucleus(&self, unit_id: Uuid, name: &str, color: Option<String>) -> Result<()> {
        self.require_unit(unit_id)?;
        let mut nucleus = Nucleus::new(unit_id, name);
        nucleus.color = color;
        self.store.upsert_nucleus(&nucleus)?;
        emit(self.json, &nucleus, |nucleus| {
            format!("{}  {}", nucleus.id, nucleus.name)
        })
    }

    pub fn add_member(&self, unit_id: Uuid, name: &str, nucleus_id: Option<Uuid>) -> Result<()> {
        self.require_unit(unit_id)?;
        let mut member = Member::new(unit_id, name);
        if let Some(nucleus_id) = nucleus_id {
            let known = self
                .store
                .list_nuclei(Some(unit_id))?
                .iter()
                .any(|nucleus| nucleus.id == nucleus_id);
            if !known {
                anyhow::bail!("nucleus {nucleus_id} does not belong to unit {unit_id}");
            }
            member = member.with_nucleus(nucleus_id);
        }
        self.store.upsert_member(&member)?;
        info!("event=member_add module=cli status=ok member={}", member.id);
        emit(self.json, &member, |member| {
            format!("{}  {}", member.id, member.name)
        })
    }

    pub fn list_members(&self, unit_id: Option<Uuid>, active_only: bool) -> Result<()> {
        let members = self.store.list_members(&MemberListQuery {
            unit_id,
            active_only,
        })?;
        emit(self.json, &members, |members| {
            members
                .iter()
                .map(|member| {
                    let flag = if member.active { "" } else { "  (inactive)" };
                    format!("{}  {}{flag}", member.id, member.name)
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn set_member_active(&self, member_id: Uuid, active: bool) -> Result<()> {
        self.store.set_member_active(member_id, active)?;
        info!(
            "event=member_active module=cli status=ok member={} active={}",
            member_id, active
        );
        Ok(())
    }

    pub fn calendar(&self, unit_id: Uuid, period: Period, selected: Option<NaiveDate>) -> Result<()> {
        let unit = self.require_unit(unit_id)?;
        let view = CalendarView {
            period,
            dates: valid_service_dates(period, &unit.schedule),
            default_date: first_service_date(period, &unit.schedule),
            selected: selected.map(|date| resolve_selected_date(date, &unit.schedule)),
        };
        emit(self.json, &view, |view| {
            let mut text = format!(
                "{} services={} default={}\n{}",
                view.period,
                view.dates.len(),
                shepherd_core::format_date(view.default_date),
                output::dates_line(&view.dates)
            );
            if let Some(selected) = view.selected {
                text.push_str(&format!("\nselected={}", shepherd_core::format_date(selected)));
            }
            text
        })
    }

    pub fn report(&self, unit_id: Uuid, period: Period) -> Result<()> {
        let report = FollowUpService::new(self.store).period_stats(unit_id, period)?;
        emit(self.json, &report, |report| {
            let mut lines = vec![format!(
                "{} total_services={}",
                report.period, report.total_services
            )];
            lines.extend(report.standings.iter().map(output::standing_line));
            lines.join("\n")
        })
    }

    pub fn roster(
        &self,
        unit_id: Uuid,
        date: NaiveDate,
        search: Option<String>,
        nucleus_id: Option<Uuid>,
    ) -> Result<()> {
        let service = AttendanceService::new(self.store);
        let filter = RosterFilter {
            name_contains: search,
            nucleus_id,
        };
        let view = RosterView {
            date,
            summary: service.day_summary(unit_id, date)?,
            entries: service.day_roster(unit_id, date, &filter)?,
        };
        emit(self.json, &view, |view| {
            let mut lines = vec![output::day_summary_line(&view.summary)];
            lines.extend(view.entries.iter().map(output::roster_line));
            lines.join("\n")
        })
    }

    pub fn mark(
        &self,
        unit_id: Uuid,
        member_id: Uuid,
        date: NaiveDate,
        status: &str,
        justification: Option<String>,
    ) -> Result<()> {
        let request = MarkRequest {
            member_id,
            unit_id,
            date,
            status: parse_mark(status)?,
            justification,
        };
        let record = AttendanceService::new(self.store).set_attendance(&request)?;
        emit(self.json, &record, |record| match record {
            Some(record) => format!("{} {}", record.member_id, record.status),
            None => format!("{member_id} not_registered"),
        })
    }

    pub fn justify(&self, unit_id: Uuid, member_id: Uuid, date: NaiveDate, reason: String) -> Result<()> {
        let record = AttendanceService::new(self.store)
            .justify_attendance(member_id, unit_id, date, reason)?;
        emit(self.json, &record, |record| {
            format!("{} {}", record.member_id, record.status)
        })
    }

    pub fn finalize(&self, unit_id: Uuid, date: NaiveDate) -> Result<()> {
        let created = AttendanceService::new(self.store).finalize_service_date(unit_id, date)?;
        emit(self.json, &created, |created| {
            format!("marked_absent={}", created.len())
        })
    }

    pub fn follow_up_board(&self, unit_id: Uuid, period: Period) -> Result<()> {
        let board = FollowUpService::new(self.store).follow_up_board(unit_id, period)?;
        emit(self.json, &board, |board| {
            let mut lines = vec![format!("active ({})", board.active.len())];
            lines.extend(board.active.iter().map(output::follow_up_line));
            lines.push(format!("resolved ({})", board.resolved.len()));
            lines.extend(board.resolved.iter().map(output::follow_up_line));
            lines.join("\n")
        })
    }

    pub fn set_follow_up(&self, member_id: Uuid, period: Period, status: FollowUpStatus) -> Result<()> {
        let follow_up =
            FollowUpService::new(self.store).set_follow_up_status(member_id, period, status)?;
        emit(self.json, &follow_up, |follow_up| {
            format!("{} {} {}", follow_up.member_id, follow_up.period, follow_up.status)
        })
    }

    pub fn escalate(&self, member_id: Uuid, period: Period) -> Result<()> {
        let summary = FollowUpService::new(self.store).escalation_summary(member_id, period)?;
        emit(self.json, &summary, output::escalation_text)
    }

    pub fn show_settings(&self) -> Result<()> {
        let settings = SettingsService::new(self.store).settings()?;
        emit(self.json, &settings.thresholds, |thresholds| {
            format!(
                "regular>={} attention>={} low>={} critical>={}",
                thresholds.regular, thresholds.attention, thresholds.low, thresholds.critical
            )
        })
    }

    pub fn update_thresholds(&self, attention: u32, low: u32, critical: u32) -> Result<()> {
        let thresholds = CategoryThresholds {
            regular: 0,
            attention,
            low,
            critical,
        };
        SettingsService::new(self.store).update_thresholds(thresholds)?;
        self.show_settings()
    }

    pub fn update_password(&self, password: String) -> Result<()> {
        SettingsService::new(self.store).update_access_password(password)?;
        Ok(())
    }

    fn require_unit(&self, unit_id: Uuid) -> Result<Unit> {
        self.store
            .get_unit(unit_id)?
            .with_context(|| format!("unit not found: {unit_id}"))
    }
}
