//! Attendance analytics and service calendar engine.
//!
//! Pure analytics live in [`analytics`]; the SQLite store in [`db`] and
//! [`repo`]; use-cases combining both in [`service`].

pub mod analytics;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use analytics::calendar::{
    first_service_date, resolve_selected_date, total_services, valid_service_dates,
};
pub use analytics::category::{categorize, Category, FrequencyTier};
pub use analytics::follow_up::{
    build_board, is_follow_up_eligible, FollowUpBoard, FollowUpEntry, FOLLOW_UP_ABSENCE_FLOOR,
};
pub use analytics::standing::{member_standings, MemberStanding};
pub use analytics::stats::{summarize, summarize_day, AttendanceStats, DaySummary};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, Connection, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attendance::{
    parse_mark, resolve_mark, AttendanceKey, AttendanceRecord, AttendanceStatus, RecordId,
};
pub use model::follow_up::{FollowUp, FollowUpStatus};
pub use model::member::{Member, MemberId};
pub use model::period::{format_date, parse_date, Period};
pub use model::settings::{CategoryThresholds, Settings};
pub use model::unit::{Nucleus, NucleusId, ServiceSchedule, Unit, UnitId};
pub use model::validation::ValidationError;
pub use repo::store::SqliteStore;
pub use repo::{RepoError, RepoResult};
pub use service::attendance_service::{
    AttendanceService, AttendanceServiceError, MarkRequest, RosterEntry, RosterFilter,
};
pub use service::follow_up_service::{
    EscalationSummary, FollowUpService, FollowUpServiceError, PeriodReport,
};
pub use service::settings_service::{SettingsService, SettingsServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
