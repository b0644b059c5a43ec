//! Core data models for the step challenge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single step entry logged by a team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub member_id: String,
    pub steps: u64,
    /// When the steps were walked (ISO-8601 on the wire)
    pub date: DateTime<Utc>,
    /// Epoch milliseconds of `date`, used for ordering
    pub timestamp: i64,
}

impl ActivityLog {
    /// Create a new log entry with a freshly generated id.
    pub fn new(member_id: impl Into<String>, steps: u64, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            member_id: member_id.into(),
            steps,
            date,
            timestamp: date.timestamp_millis(),
        }
    }

    /// Move the entry to a new date, keeping `timestamp` in sync.
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = date;
        self.timestamp = date.timestamp_millis();
    }

    /// Apply a field-level patch.
    pub fn apply(&mut self, patch: &LogPatch) {
        if let Some(steps) = patch.steps {
            self.steps = steps;
        }
        if let Some(date) = patch.date {
            self.set_date(date);
        }
    }
}

/// Field-level update of an existing log entry.
///
/// Only `steps` and `date` are mutable; identity and member never change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl LogPatch {
    pub fn from_log(log: &ActivityLog) -> Self {
        Self {
            steps: Some(log.steps),
            date: Some(log.date),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_none() && self.date.is_none()
    }
}

/// Notification pushed by the remote list store's change feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    Insert { record: ActivityLog },
    Update { record: ActivityLog },
    Delete { id: String },
}

impl ChangeEvent {
    /// Id of the record the event refers to.
    pub fn record_id(&self) -> &str {
        match self {
            ChangeEvent::Insert { record } | ChangeEvent::Update { record } => &record.id,
            ChangeEvent::Delete { id } => id,
        }
    }
}

/// A point on the route map, in percent of the map's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

impl PathPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other` by `t` in `[0, 1]`.
    pub fn lerp(self, other: PathPoint, t: f64) -> PathPoint {
        PathPoint {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Named waypoint on the expedition route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u32,
    pub name: String,
    /// Meters above sea level
    pub elevation: u64,
    pub description: String,
    pub coordinates: PathPoint,
}

impl Milestone {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        elevation: u64,
        description: impl Into<String>,
        coordinates: PathPoint,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            elevation,
            description: description.into(),
            coordinates,
        }
    }
}

/// Member of the expedition team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TeamMember {
    pub id: &'static str,
    pub name: &'static str,
    /// Display initials
    pub avatar: &'static str,
    /// Display colour token
    pub color: &'static str,
}

/// Fixed team roster.
pub const TEAM_MEMBERS: [TeamMember; 4] = [
    TeamMember { id: "member-1", name: "Jeeta", avatar: "J", color: "blue" },
    TeamMember { id: "member-2", name: "Jigyas", avatar: "Ji", color: "emerald" },
    TeamMember { id: "member-3", name: "Kamal", avatar: "K", color: "purple" },
    TeamMember { id: "member-4", name: "Pradhumna", avatar: "P", color: "orange" },
];

/// Look up a roster member by id.
pub fn find_member(member_id: &str) -> Option<&'static TeamMember> {
    TEAM_MEMBERS.iter().find(|m| m.id == member_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_serializes_in_record_shape() {
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 7, 30, 0).unwrap();
        let log = ActivityLog {
            id: "log-1".to_string(),
            member_id: "member-2".to_string(),
            steps: 4200,
            date,
            timestamp: date.timestamp_millis(),
        };

        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["memberId"], "member-2");
        assert_eq!(value["steps"], 4200);
        assert_eq!(value["timestamp"], 1_740_814_200_000i64);
        assert!(value["date"].as_str().unwrap().starts_with("2025-03-01T07:30:00"));
    }

    #[test]
    fn test_new_log_derives_timestamp() {
        let date = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let a = ActivityLog::new("member-1", 1000, date);
        let b = ActivityLog::new("member-1", 1000, date);

        assert_eq!(a.timestamp, date.timestamp_millis());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_patch_updates_only_given_fields() {
        let date = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 1, 3, 9, 0, 0).unwrap();
        let mut log = ActivityLog::new("member-3", 500, date);

        log.apply(&LogPatch { steps: Some(900), date: None });
        assert_eq!(log.steps, 900);
        assert_eq!(log.date, date);

        log.apply(&LogPatch { steps: None, date: Some(later) });
        assert_eq!(log.steps, 900);
        assert_eq!(log.timestamp, later.timestamp_millis());
    }

    #[test]
    fn test_change_event_wire_format() {
        let event: ChangeEvent =
            serde_json::from_str(r#"{"type":"delete","id":"abc"}"#).unwrap();
        assert_eq!(event, ChangeEvent::Delete { id: "abc".to_string() });
        assert_eq!(event.record_id(), "abc");
    }

    #[test]
    fn test_roster_lookup() {
        assert_eq!(find_member("member-4").map(|m| m.name), Some("Pradhumna"));
        assert!(find_member("member-9").is_none());
    }
}
