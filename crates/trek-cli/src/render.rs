//! Plain-text renderers for the derived expedition state.

use chrono::TimeZone;
use std::fmt::Write as _;
use trek_core::{
    average_per_member, find_member, member_totals, reached_index, total_steps, ActivityLog,
    DailyTotal, Intensity, Progress, Route, TeamMember,
};
use trek_store::Phase;

/// `15600` -> `15,600`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Loading => "loading",
        Phase::RemoteSynced => "remote (live)",
        Phase::LocalOnly => "local only",
    }
}

pub fn render_status(progress: &Progress<'_>, route: &Route, phase: Phase) -> String {
    let mut out = String::new();
    let summit = route.summit();

    let _ = writeln!(
        out,
        "Elevation:  {}m / {}m ({:.1}%)",
        progress.elevation_m, summit.elevation, progress.percent
    );
    let _ = writeln!(out, "Steps:      {}", group_thousands(progress.total_steps));
    if progress.summit_reached() {
        let _ = writeln!(out, "Remaining:  SUMMIT REACHED");
    } else {
        let _ = writeln!(out, "Remaining:  +{}m", progress.remaining_m);
    }

    if let (Some(next), Some(to_go)) = (progress.next_waypoint, progress.to_next_m) {
        let _ = writeln!(
            out,
            "Next:       {} ({}m), {}m to go",
            next.name, next.elevation, to_go
        );
    }
    if let Some(idx) = progress.reached_index {
        let _ = writeln!(out, "Last camp:  {}", route.milestones()[idx].name);
    }
    let _ = writeln!(
        out,
        "Map:        ({:.1}, {:.1})",
        progress.position.x, progress.position.y
    );
    let _ = write!(out, "Storage:    {}", phase_label(phase));
    out
}

pub fn render_team(logs: &[ActivityLog], roster: &[TeamMember]) -> String {
    let mut out = String::new();
    let total = total_steps(logs);

    for (rank, entry) in member_totals(logs, roster).iter().enumerate() {
        let _ = writeln!(
            out,
            "{:02} [{:>2}] {:<10} {:>10} steps {:>5.1}%",
            rank + 1,
            entry.member.avatar,
            entry.member.name,
            group_thousands(entry.steps),
            entry.share
        );
    }
    let _ = write!(
        out,
        "Total steps: {}   Avg / member: {}",
        group_thousands(total),
        group_thousands(average_per_member(total, roster))
    );
    out
}

pub fn render_day<Tz: TimeZone>(logs: &[&ActivityLog], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if logs.is_empty() {
        return "No activity recorded for this date.".to_string();
    }

    let mut out = String::new();
    for (i, log) in logs.iter().enumerate() {
        let name = find_member(&log.member_id)
            .map(|m| m.name)
            .unwrap_or(log.member_id.as_str());
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(
            out,
            "{} hrs  {:<10} {:>8}  {}",
            log.date.with_timezone(tz).format("%H:%M"),
            name,
            group_thousands(log.steps),
            log.id
        );
    }
    out
}

fn intensity_cell(intensity: Intensity) -> char {
    match intensity {
        Intensity::None => '.',
        Intensity::Light => '░',
        Intensity::Moderate => '▒',
        Intensity::Strong => '▓',
        Intensity::Peak => '█',
    }
}

/// Consistency grid: one cell per day, day-of-month underneath.
pub fn render_grid(days: &[DailyTotal]) -> String {
    let cells: Vec<String> = days
        .iter()
        .map(|d| format!("{:>2}", intensity_cell(d.intensity)))
        .collect();
    let labels: Vec<String> = days.iter().map(|d| d.day.format("%e").to_string()).collect();
    format!(
        "{}\n{}\nLESS . ░ ▒ ▓ █ MORE",
        cells.join(" "),
        labels.join(" ")
    )
}

pub fn render_route(route: &Route, elevation: u64) -> String {
    let reached = reached_index(elevation, route);
    let mut out = String::new();

    for (i, m) in route.milestones().iter().enumerate() {
        let mark = match reached {
            Some(r) if i <= r => "x",
            _ => " ",
        };
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "[{}] {:>5}m  {:<20} {}", mark, m.elevation, m.name, m.description);
        if reached == Some(i) && elevation < route.summit_elevation() {
            let _ = write!(out, "\n    ^ team is here ({}m)", elevation);
        }
    }
    out
}
