//! Singleton settings row.

use super::{ensure_tables, RepoError, RepoResult};
use crate::model::settings::{CategoryThresholds, Settings};
use rusqlite::{params, Connection, Row};

pub trait SettingsRepository {
    /// Stored settings, or the defaults when none were saved yet.
    fn get_settings(&self) -> RepoResult<Settings>;
    fn set_settings(&self, settings: &Settings) -> RepoResult<()>;
}

#[derive(Clone, Copy)]
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["settings"])?;
        Ok(Self { conn })
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn get_settings(&self) -> RepoResult<Settings> {
        let mut stmt = self.conn.prepare(
            "SELECT regular_floor, attention_floor, low_floor, critical_floor, access_password
             FROM settings
             WHERE id = 1;",
        )?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => parse_settings_row(row),
            None => Ok(Settings::default()),
        }
    }

    fn set_settings(&self, settings: &Settings) -> RepoResult<()> {
        settings.validate()?;
        let thresholds = &settings.thresholds;
        self.conn.execute(
            "INSERT INTO settings (
                id,
                regular_floor,
                attention_floor,
                low_floor,
                critical_floor,
                access_password
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                regular_floor = excluded.regular_floor,
                attention_floor = excluded.attention_floor,
                low_floor = excluded.low_floor,
                critical_floor = excluded.critical_floor,
                access_password = excluded.access_password,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                thresholds.regular,
                thresholds.attention,
                thresholds.low,
                thresholds.critical,
                settings.access_password.as_str(),
            ],
        )?;
        Ok(())
    }
}

fn parse_settings_row(row: &Row<'_>) -> RepoResult<Settings> {
    let settings = Settings {
        thresholds: CategoryThresholds {
            regular: parse_floor(row.get("regular_floor")?, "regular_floor")?,
            attention: parse_floor(row.get("attention_floor")?, "attention_floor")?,
            low: parse_floor(row.get("low_floor")?, "low_floor")?,
            critical: parse_floor(row.get("critical_floor")?, "critical_floor")?,
        },
        access_password: row.get("access_password")?,
    };
    settings.validate()?;
    Ok(settings)
}

fn parse_floor(value: i64, column: &str) -> RepoResult<u32> {
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid count `{value}` in settings.{column}"))
    })
}
