//! Member storage.

use super::{
    bool_to_int, ensure_tables, parse_flag, parse_optional_uuid, parse_uuid, RepoError,
    RepoResult,
};
use crate::model::member::{Member, MemberId};
use crate::model::unit::UnitId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const MEMBER_SELECT_SQL: &str = "SELECT id, name, unit_id, nucleus_id, active FROM members";

const MEMBER_UPSERT_SQL: &str = "INSERT INTO members (id, name, unit_id, nucleus_id, active)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        unit_id = excluded.unit_id,
        nucleus_id = excluded.nucleus_id,
        active = excluded.active,
        updated_at = (strftime('%s', 'now') * 1000);";

/// Query options for listing members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberListQuery {
    pub unit_id: Option<UnitId>,
    pub active_only: bool,
}

impl MemberListQuery {
    /// Active members of one unit, the roster every analytics call uses.
    pub fn active_in(unit_id: UnitId) -> Self {
        Self {
            unit_id: Some(unit_id),
            active_only: true,
        }
    }
}

pub trait MemberRepository {
    /// Members ordered by name.
    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn upsert_member(&self, member: &Member) -> RepoResult<()>;
    /// Imports many members in one transaction; all or nothing.
    fn insert_members(&self, members: &[Member]) -> RepoResult<()>;
    fn set_member_active(&self, id: MemberId, active: bool) -> RepoResult<()>;
}

#[derive(Clone, Copy)]
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["members"])?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>> {
        let mut sql = format!("{MEMBER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(unit_id) = query.unit_id {
            sql.push_str(" AND unit_id = ?");
            bind_values.push(Value::Text(unit_id.to_string()));
        }
        if query.active_only {
            sql.push_str(" AND active = 1");
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_member_row(row)?)),
            None => Ok(None),
        }
    }

    fn upsert_member(&self, member: &Member) -> RepoResult<()> {
        member.validate()?;
        write_member(self.conn, member)
    }

    fn insert_members(&self, members: &[Member]) -> RepoResult<()> {
        for member in members {
            member.validate()?;
        }
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for member in members {
            write_member(&tx, member)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn set_member_active(&self, id: MemberId, active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE members
             SET active = ?2, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), bool_to_int(active)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "member",
                id,
            });
        }
        Ok(())
    }
}

fn write_member(conn: &Connection, member: &Member) -> RepoResult<()> {
    conn.execute(
        MEMBER_UPSERT_SQL,
        params![
            member.id.to_string(),
            member.name.trim(),
            member.unit_id.to_string(),
            member.nucleus_id.map(|id| id.to_string()),
            bool_to_int(member.active),
        ],
    )?;
    Ok(())
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let id_text: String = row.get("id")?;
    let unit_text: String = row.get("unit_id")?;
    let member = Member {
        id: parse_uuid(&id_text, "members.id")?,
        name: row.get("name")?,
        unit_id: parse_uuid(&unit_text, "members.unit_id")?,
        nucleus_id: parse_optional_uuid(row.get("nucleus_id")?, "members.nucleus_id")?,
        active: parse_flag(row.get("active")?, "members.active")?,
    };
    member.validate()?;
    Ok(member)
}
