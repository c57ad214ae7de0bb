//! Text and JSON rendering for command results.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use shepherd_core::{
    format_date, AttendanceStats, Category, DaySummary, EscalationSummary, FollowUpEntry,
    MemberStanding, RosterEntry,
};

/// Prints `value` as pretty JSON, or its text form.
pub fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        let rendered = text(value);
        if !rendered.is_empty() {
            println!("{rendered}");
        }
    }
    Ok(())
}

pub fn stats_line(stats: &AttendanceStats, category: &Category) -> String {
    format!(
        "present={} absent={} justified={} unregistered={} rate={:.1}% category={}",
        stats.presences,
        stats.absences,
        stats.justifications,
        stats.unregistered,
        stats.percent,
        category.label
    )
}

pub fn standing_line(standing: &MemberStanding) -> String {
    format!(
        "{}  {}  {}",
        standing.member.id,
        standing.member.name,
        stats_line(&standing.stats, &standing.category)
    )
}

pub fn roster_line(entry: &RosterEntry) -> String {
    let mark = entry.status.map_or("not_registered", |status| status.as_str());
    match entry.justification.as_deref() {
        Some(reason) => format!("{}  {}  {mark} ({reason})", entry.member.id, entry.member.name),
        None => format!("{}  {}  {mark}", entry.member.id, entry.member.name),
    }
}

pub fn day_summary_line(summary: &DaySummary) -> String {
    format!(
        "present={} absent={} justified={} not_registered={} active={} rate={:.1}%{}",
        summary.present,
        summary.absent,
        summary.justified,
        summary.not_registered,
        summary.active_members,
        summary.presence_rate,
        if summary.is_complete() { " complete" } else { "" }
    )
}

pub fn follow_up_line(entry: &FollowUpEntry) -> String {
    format!("[{}] {}", entry.status, standing_line(&entry.standing))
}

pub fn escalation_text(summary: &EscalationSummary) -> String {
    format!(
        "to={} unit={}\nmember={} period={} follow_up={}\n{}",
        if summary.pastor_phone.is_empty() {
            "-"
        } else {
            summary.pastor_phone.as_str()
        },
        summary.unit_name,
        summary.member_name,
        summary.period,
        summary.status,
        stats_line(&summary.stats, &summary.category)
    )
}

pub fn dates_line(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .copied()
        .map(format_date)
        .collect::<Vec<_>>()
        .join(" ")
}
