//! `shepherd` command line front end over the attendance store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use shepherd_core::config::{DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
use shepherd_core::{init_logging, open_db, CoreConfig, FollowUpStatus, Period, ServiceSchedule};
use uuid::Uuid;

mod commands;
mod output;

#[derive(Parser, Debug)]
#[command(name = "shepherd")]
#[command(version, about = "Attendance tracking and pastoral follow-up", long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = DB_PATH_VAR)]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = LOG_LEVEL_VAR)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, env = LOG_DIR_VAR)]
    log_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Unit management
    #[command(subcommand)]
    Unit(UnitCommands),

    /// Member management
    #[command(subcommand)]
    Member(MemberCommands),

    /// Service dates of a unit for one month
    Calendar {
        #[arg(long)]
        unit: Uuid,
        /// Month as YYYY-MM
        #[arg(long)]
        period: Period,
        /// Date picked by the user; snapped to the first service day of its month
        #[arg(long, value_parser = shepherd_core::parse_date)]
        selected: Option<NaiveDate>,
    },

    /// Per-member statistics and categories for one month
    Report {
        #[arg(long)]
        unit: Uuid,
        #[arg(long)]
        period: Period,
    },

    /// Roster and counts of one service date
    Roster {
        #[arg(long)]
        unit: Uuid,
        #[arg(long, value_parser = shepherd_core::parse_date)]
        date: NaiveDate,
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        nucleus: Option<Uuid>,
    },

    /// Set a member's mark; repeating the current mark clears it
    Mark {
        #[arg(long)]
        unit: Uuid,
        #[arg(long)]
        member: Uuid,
        #[arg(long, value_parser = shepherd_core::parse_date)]
        date: NaiveDate,
        /// present, absent, justified or none
        #[arg(long)]
        status: String,
        /// Reason kept on justified marks
        #[arg(long)]
        justification: Option<String>,
    },

    /// Record or edit a justified absence without toggling
    Justify {
        #[arg(long)]
        unit: Uuid,
        #[arg(long)]
        member: Uuid,
        #[arg(long, value_parser = shepherd_core::parse_date)]
        date: NaiveDate,
        reason: String,
    },

    /// Mark every unregistered active member absent
    Finalize {
        #[arg(long)]
        unit: Uuid,
        #[arg(long, value_parser = shepherd_core::parse_date)]
        date: NaiveDate,
    },

    /// Pastoral follow-up
    #[command(subcommand)]
    FollowUp(FollowUpCommands),

    /// Category thresholds and access password
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Subcommand, Debug)]
enum UnitCommands {
    Add {
        #[arg(long)]
        name: String,
        /// Weekday indices, 0 = Sunday, e.g. "0,3"
        #[arg(long)]
        schedule: ServiceSchedule,
        #[arg(long, default_value = "")]
        pastor_phone: String,
    },
    #[command(alias = "ls")]
    List,
    /// Add a nucleus (sub-group) to a unit
    AddNucleus {
        #[arg(long)]
        unit: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        color: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum MemberCommands {
    Add {
        #[arg(long)]
        unit: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        nucleus: Option<Uuid>,
    },
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        unit: Option<Uuid>,
        /// Include inactive members
        #[arg(long)]
        all: bool,
    },
    Deactivate { id: Uuid },
    Activate { id: Uuid },
}

#[derive(Subcommand, Debug)]
enum FollowUpCommands {
    /// Eligible members split into active and resolved
    Board {
        #[arg(long)]
        unit: Uuid,
        #[arg(long)]
        period: Period,
    },
    /// Set pending, scheduled or done
    Set {
        #[arg(long)]
        member: Uuid,
        #[arg(long)]
        period: Period,
        #[arg(long)]
        status: FollowUpStatus,
    },
    /// Statistics and contact data for a pastor message
    Escalate {
        #[arg(long)]
        member: Uuid,
        #[arg(long)]
        period: Period,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommands {
    Show,
    Thresholds {
        #[arg(long)]
        attention: u32,
        #[arg(long)]
        low: u32,
        #[arg(long)]
        critical: u32,
    },
    Password { password: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CoreConfig::from_env().context("invalid environment configuration")?;
    let db_path = cli.db.clone().unwrap_or(config.db_path);
    let log_level = cli.log_level.clone().unwrap_or(config.log_level);
    let log_dir = cli.log_dir.clone().unwrap_or(config.log_dir);

    init_logging(&log_level, &log_dir).context("failed to start logging")?;
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let ctx = commands::Context::new(&conn, cli.json)?;

    match cli.command {
        Commands::Unit(cmd) => match cmd {
            UnitCommands::Add {
                name,
                schedule,
                pastor_phone,
            } => ctx.add_unit(&name, schedule, &pastor_phone),
            UnitCommands::List => ctx.list_units(),
            UnitCommands::AddNucleus { unit, name, color } => ctx.add_nucleus(unit, &name, color),
        },
        Commands::Member(cmd) => match cmd {
            MemberCommands::Add {
                unit,
                name,
                nucleus,
            } => ctx.add_member(unit, &name, nucleus),
            MemberCommands::List { unit, all } => ctx.list_members(unit, !all),
            MemberCommands::Deactivate { id } => ctx.set_member_active(id, false),
            MemberCommands::Activate { id } => ctx.set_member_active(id, true),
        },
        Commands::Calendar {
            unit,
            period,
            selected,
        } => ctx.calendar(unit, period, selected),
        Commands::Report { unit, period } => ctx.report(unit, period),
        Commands::Roster {
            unit,
            date,
            search,
            nucleus,
        } => ctx.roster(unit, date, search, nucleus),
        Commands::Mark {
            unit,
            member,
            date,
            status,
            justification,
        } => ctx.mark(unit, member, date, &status, justification),
        Commands::Justify {
            unit,
            member,
            date,
            reason,
        } => ctx.justify(unit, member, date, reason),
        Commands::Finalize { unit, date } => ctx.finalize(unit, date),
        Commands::FollowUp(cmd) => match cmd {
            FollowUpCommands::Board { unit, period } => ctx.follow_up_board(unit, period),
            FollowUpCommands::Set {
                member,
                period,
                status,
            } => ctx.set_follow_up(member, period, status),
            FollowUpCommands::Escalate { member, period } => ctx.escalate(member, period),
        },
        Commands::Settings(cmd) => match cmd {
            SettingsCommands::Show => ctx.show_settings(),
            SettingsCommands::Thresholds {
                attention,
                low,
                critical,
            } => ctx.update_thresholds(attention, low, critical),
            SettingsCommands::Password { password } => ctx.update_password(password),
        },
    }
}
