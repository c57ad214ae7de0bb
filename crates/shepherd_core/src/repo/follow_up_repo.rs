//! Follow-up storage keyed by `(member_id, period)`.

use super::{ensure_tables, parse_uuid, RepoError, RepoResult};
use crate::model::follow_up::{FollowUp, FollowUpStatus};
use crate::model::member::MemberId;
use crate::model::period::Period;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Filter for follow-up listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FollowUpFilter {
    pub member_id: Option<MemberId>,
    pub period: Option<Period>,
}

pub trait FollowUpRepository {
    /// Records ordered by period, then member id.
    fn list_follow_ups(&self, filter: &FollowUpFilter) -> RepoResult<Vec<FollowUp>>;
    /// Replaces the live record of `(member_id, period)` in one statement.
    fn replace_follow_up(&self, follow_up: &FollowUp) -> RepoResult<()>;
}

#[derive(Clone, Copy)]
pub struct SqliteFollowUpRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFollowUpRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["follow_ups"])?;
        Ok(Self { conn })
    }
}

impl FollowUpRepository for SqliteFollowUpRepository<'_> {
    fn list_follow_ups(&self, filter: &FollowUpFilter) -> RepoResult<Vec<FollowUp>> {
        let mut sql =
            String::from("SELECT member_id, period, status, last_update FROM follow_ups WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(member_id) = filter.member_id {
            sql.push_str(" AND member_id = ?");
            bind_values.push(Value::Text(member_id.to_string()));
        }
        if let Some(period) = filter.period {
            sql.push_str(" AND period = ?");
            bind_values.push(Value::Text(period.to_string()));
        }
        sql.push_str(" ORDER BY period ASC, member_id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut follow_ups = Vec::new();
        while let Some(row) = rows.next()? {
            follow_ups.push(parse_follow_up_row(row)?);
        }
        Ok(follow_ups)
    }

    fn replace_follow_up(&self, follow_up: &FollowUp) -> RepoResult<()> {
        follow_up.validate()?;
        self.conn.execute(
            "INSERT INTO follow_ups (member_id, period, status, last_update)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(member_id, period) DO UPDATE SET
                status = excluded.status,
                last_update = excluded.last_update;",
            params![
                follow_up.member_id.to_string(),
                follow_up.period.to_string(),
                follow_up.status.as_str(),
                follow_up.last_update,
            ],
        )?;
        Ok(())
    }
}

fn parse_follow_up_row(row: &Row<'_>) -> RepoResult<FollowUp> {
    let member_text: String = row.get("member_id")?;
    let period_text: String = row.get("period")?;
    let status_text: String = row.get("status")?;
    Ok(FollowUp {
        member_id: parse_uuid(&member_text, "follow_ups.member_id")?,
        period: period_text.parse::<Period>().map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid period `{period_text}` in follow_ups.period"
            ))
        })?,
        status: status_text.parse::<FollowUpStatus>().map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid status `{status_text}` in follow_ups.status"
            ))
        })?,
        last_update: row.get("last_update")?,
    })
}
