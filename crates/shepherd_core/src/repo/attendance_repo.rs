//! Attendance record storage with atomic replace-by-key semantics.
//!
//! # Invariants
//! - `UNIQUE(member_id, date)` backs the one-live-record rule.
//! - `replace_attendance` deletes every requested key and every key of the
//!   incoming records, then inserts, inside one IMMEDIATE transaction.

use super::{ensure_tables, parse_stored_date, parse_uuid, RepoError, RepoResult};
use crate::model::attendance::{AttendanceKey, AttendanceRecord, AttendanceStatus};
use crate::model::member::MemberId;
use crate::model::period::{format_date, Period};
use crate::model::unit::UnitId;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

const ATTENDANCE_SELECT_SQL: &str = "SELECT
    id,
    member_id,
    unit_id,
    date,
    status,
    justification,
    registered_at
FROM attendance";

/// Filter for attendance listing. All set fields must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub unit_id: Option<UnitId>,
    pub date: Option<NaiveDate>,
    pub member_id: Option<MemberId>,
    /// Restricts to dates inside this month.
    pub period: Option<Period>,
}

pub trait AttendanceRepository {
    /// Records ordered by date, then member id.
    fn list_attendance(&self, filter: &AttendanceFilter) -> RepoResult<Vec<AttendanceRecord>>;
    /// Atomically deletes the live records of `keys` (and of the incoming
    /// records' own keys) and inserts `records`.
    fn replace_attendance(
        &self,
        keys: &[AttendanceKey],
        records: &[AttendanceRecord],
    ) -> RepoResult<()>;
}

#[derive(Clone, Copy)]
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["attendance"])?;
        Ok(Self { conn })
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn list_attendance(&self, filter: &AttendanceFilter) -> RepoResult<Vec<AttendanceRecord>> {
        let mut sql = format!("{ATTENDANCE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(unit_id) = filter.unit_id {
            sql.push_str(" AND unit_id = ?");
            bind_values.push(Value::Text(unit_id.to_string()));
        }
        if let Some(member_id) = filter.member_id {
            sql.push_str(" AND member_id = ?");
            bind_values.push(Value::Text(member_id.to_string()));
        }
        if let Some(date) = filter.date {
            sql.push_str(" AND date = ?");
            bind_values.push(Value::Text(format_date(date)));
        }
        if let Some(period) = filter.period {
            sql.push_str(" AND date BETWEEN ? AND ?");
            bind_values.push(Value::Text(format_date(period.first_day())));
            bind_values.push(Value::Text(format_date(period.last_day())));
        }
        sql.push_str(" ORDER BY date ASC, member_id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_attendance_row(row)?);
        }
        Ok(records)
    }

    fn replace_attendance(
        &self,
        keys: &[AttendanceKey],
        records: &[AttendanceRecord],
    ) -> RepoResult<()> {
        for record in records {
            record.validate()?;
        }
        let doomed = keys
            .iter()
            .copied()
            .chain(records.iter().map(AttendanceRecord::key))
            .collect::<BTreeSet<_>>();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for key in &doomed {
            tx.execute(
                "DELETE FROM attendance WHERE member_id = ?1 AND date = ?2;",
                params![key.member_id.to_string(), format_date(key.date)],
            )?;
        }
        for record in records {
            tx.execute(
                "INSERT INTO attendance (
                    id,
                    member_id,
                    unit_id,
                    date,
                    status,
                    justification,
                    registered_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    record.id.to_string(),
                    record.member_id.to_string(),
                    record.unit_id.to_string(),
                    format_date(record.date),
                    record.status.as_str(),
                    record.justification.as_deref(),
                    record.registered_at,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn parse_attendance_row(row: &Row<'_>) -> RepoResult<AttendanceRecord> {
    let id_text: String = row.get("id")?;
    let member_text: String = row.get("member_id")?;
    let unit_text: String = row.get("unit_id")?;
    let date_text: String = row.get("date")?;
    let status_text: String = row.get("status")?;
    let status = status_text.parse::<AttendanceStatus>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in attendance.status"
        ))
    })?;

    let record = AttendanceRecord {
        id: parse_uuid(&id_text, "attendance.id")?,
        member_id: parse_uuid(&member_text, "attendance.member_id")?,
        unit_id: parse_uuid(&unit_text, "attendance.unit_id")?,
        date: parse_stored_date(&date_text, "attendance.date")?,
        status,
        justification: row.get("justification")?,
        registered_at: row.get("registered_at")?,
    };
    record.validate()?;
    Ok(record)
}
