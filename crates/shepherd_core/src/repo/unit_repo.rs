//! Unit and nucleus storage.
//!
//! Units are configured outside the analytics core; this repository is the
//! place that configuration lands.

use super::{ensure_tables, parse_uuid, RepoError, RepoResult};
use crate::model::unit::{Nucleus, ServiceSchedule, Unit, UnitId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const UNIT_SELECT_SQL: &str = "SELECT id, name, schedule, pastor_phone FROM units";
const NUCLEUS_SELECT_SQL: &str = "SELECT id, unit_id, name, color FROM nuclei";

pub trait UnitRepository {
    fn upsert_unit(&self, unit: &Unit) -> RepoResult<()>;
    fn get_unit(&self, id: UnitId) -> RepoResult<Option<Unit>>;
    /// All units ordered by name.
    fn list_units(&self) -> RepoResult<Vec<Unit>>;
    fn upsert_nucleus(&self, nucleus: &Nucleus) -> RepoResult<()>;
    /// Nuclei ordered by name, optionally scoped to one unit.
    fn list_nuclei(&self, unit_id: Option<UnitId>) -> RepoResult<Vec<Nucleus>>;
}

#[derive(Clone, Copy)]
pub struct SqliteUnitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUnitRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["units", "nuclei"])?;
        Ok(Self { conn })
    }
}

impl UnitRepository for SqliteUnitRepository<'_> {
    fn upsert_unit(&self, unit: &Unit) -> RepoResult<()> {
        unit.validate()?;
        self.conn.execute(
            "INSERT INTO units (id, name, schedule, pastor_phone)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                schedule = excluded.schedule,
                pastor_phone = excluded.pastor_phone,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                unit.id.to_string(),
                unit.name.trim(),
                unit.schedule.to_string(),
                unit.pastor_phone.as_str(),
            ],
        )?;
        Ok(())
    }

    fn get_unit(&self, id: UnitId) -> RepoResult<Option<Unit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{UNIT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_unit_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_units(&self) -> RepoResult<Vec<Unit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{UNIT_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut units = Vec::new();
        while let Some(row) = rows.next()? {
            units.push(parse_unit_row(row)?);
        }
        Ok(units)
    }

    fn upsert_nucleus(&self, nucleus: &Nucleus) -> RepoResult<()> {
        nucleus.validate()?;
        self.conn.execute(
            "INSERT INTO nuclei (id, unit_id, name, color)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                unit_id = excluded.unit_id,
                name = excluded.name,
                color = excluded.color;",
            params![
                nucleus.id.to_string(),
                nucleus.unit_id.to_string(),
                nucleus.name.trim(),
                nucleus.color.as_deref(),
            ],
        )?;
        Ok(())
    }

    fn list_nuclei(&self, unit_id: Option<UnitId>) -> RepoResult<Vec<Nucleus>> {
        let mut sql = format!("{NUCLEUS_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(unit_id) = unit_id {
            sql.push_str(" AND unit_id = ?");
            bind_values.push(Value::Text(unit_id.to_string()));
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut nuclei = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            let unit_text: String = row.get("unit_id")?;
            nuclei.push(Nucleus {
                id: parse_uuid(&id_text, "nuclei.id")?,
                unit_id: parse_uuid(&unit_text, "nuclei.unit_id")?,
                name: row.get("name")?,
                color: row.get("color")?,
            });
        }
        Ok(nuclei)
    }
}

fn parse_unit_row(row: &Row<'_>) -> RepoResult<Unit> {
    let id_text: String = row.get("id")?;
    let schedule_text: String = row.get("schedule")?;
    let schedule = schedule_text.parse::<ServiceSchedule>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid schedule `{schedule_text}` in units.schedule"
        ))
    })?;
    let unit = Unit {
        id: parse_uuid(&id_text, "units.id")?,
        name: row.get("name")?,
        schedule,
        pastor_phone: row.get("pastor_phone")?,
    };
    unit.validate()?;
    Ok(unit)
}
