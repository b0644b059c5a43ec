//! Team statistics derived from the log collection.

use crate::models::{ActivityLog, TeamMember};
use crate::progress::{sum_steps, total_steps};
use chrono::{Days, NaiveDate, TimeZone};
use serde::Serialize;

/// Steps contributed by one member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberTotal {
    pub member: TeamMember,
    pub steps: u64,
    /// Share of the team total, in percent
    pub share: f64,
}

/// Per-member totals, highest contributor first.
pub fn member_totals(logs: &[ActivityLog], roster: &[TeamMember]) -> Vec<MemberTotal> {
    let team_total = total_steps(logs);

    let mut totals: Vec<MemberTotal> = roster
        .iter()
        .map(|member| {
            let steps = sum_steps(
                logs.iter()
                    .filter(|l| l.member_id == member.id)
                    .map(|l| l.steps),
            );
            let share = if team_total > 0 {
                steps as f64 / team_total as f64 * 100.0
            } else {
                0.0
            };
            MemberTotal { member: *member, steps, share }
        })
        .collect();

    // Stable sort keeps roster order for ties
    totals.sort_by(|a, b| b.steps.cmp(&a.steps));
    totals
}

/// Team total divided across the roster, rounded to whole steps.
pub fn average_per_member(total_steps: u64, roster: &[TeamMember]) -> u64 {
    if roster.is_empty() {
        return 0;
    }
    (total_steps as f64 / roster.len() as f64).round() as u64
}

/// Logs whose date falls on `day` in the given timezone.
pub fn logs_for_day<'a, Tz: TimeZone>(
    logs: &'a [ActivityLog],
    day: NaiveDate,
    tz: &Tz,
) -> Vec<&'a ActivityLog> {
    logs.iter()
        .filter(|log| log.date.with_timezone(tz).date_naive() == day)
        .collect()
}

/// How busy a day was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    None,
    Light,
    Moderate,
    Strong,
    Peak,
}

impl Intensity {
    pub fn for_steps(steps: u64) -> Self {
        match steps {
            0 => Intensity::None,
            1..=4_999 => Intensity::Light,
            5_000..=9_999 => Intensity::Moderate,
            10_000..=14_999 => Intensity::Strong,
            _ => Intensity::Peak,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub day: NaiveDate,
    pub steps: u64,
    pub intensity: Intensity,
}

/// Step totals for the `days` days ending at `end_day`, oldest first.
pub fn daily_totals<Tz: TimeZone>(
    logs: &[ActivityLog],
    end_day: NaiveDate,
    days: u32,
    tz: &Tz,
) -> Vec<DailyTotal> {
    (0..days)
        .rev()
        .filter_map(|back| end_day.checked_sub_days(Days::new(back as u64)))
        .map(|day| {
            let steps = sum_steps(logs_for_day(logs, day, tz).iter().map(|l| l.steps));
            DailyTotal {
                day,
                steps,
                intensity: Intensity::for_steps(steps),
            }
        })
        .collect()
}
