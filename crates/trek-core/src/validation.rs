//! Validation of raw step entries before they reach the log store.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Why a step entry was rejected. Messages are shown to the user as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("Please enter a valid number of steps.")]
    InvalidSteps,
    #[error("Invalid date '{0}', expected YYYY-MM-DD.")]
    InvalidDate(String),
    #[error("Invalid time '{0}', expected HH:MM.")]
    InvalidTime(String),
    #[error("Invalid date/time configuration.")]
    AmbiguousTime,
}

/// A validated entry, ready to be handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEntry {
    pub steps: u64,
    pub date: DateTime<Utc>,
}

/// Upper bound for a single entry's step count.
pub const MAX_STEPS_PER_ENTRY: u64 = 1_000_000;

/// Whether `steps` is acceptable for one log entry.
pub fn steps_in_range(steps: u64) -> bool {
    (1..=MAX_STEPS_PER_ENTRY).contains(&steps)
}

/// Parse a positive step count.
pub fn parse_steps(raw: &str) -> Result<u64, EntryError> {
    match raw.trim().parse::<u64>() {
        Ok(steps) if steps_in_range(steps) => Ok(steps),
        _ => Err(EntryError::InvalidSteps),
    }
}

/// Combine a calendar date and wall-clock time in `tz` into a UTC instant.
pub fn parse_date_time<Tz: TimeZone>(
    date: &str,
    time: &str,
    tz: &Tz,
) -> Result<DateTime<Utc>, EntryError> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| EntryError::InvalidDate(date.to_string()))?;
    let clock = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| EntryError::InvalidTime(time.to_string()))?;

    match tz.from_local_datetime(&day.and_time(clock)) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // DST overlap: take the earlier instant
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(EntryError::AmbiguousTime),
    }
}

/// Validate a full form entry.
pub fn parse_entry<Tz: TimeZone>(
    steps: &str,
    date: &str,
    time: &str,
    tz: &Tz,
) -> Result<NewEntry, EntryError> {
    let steps = parse_steps(steps)?;
    let date = parse_date_time(date, time, tz)?;
    Ok(NewEntry { steps, date })
}
