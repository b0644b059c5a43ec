//! Core logic for the Everest step challenge: record models, the route,
//! the progress model and team statistics.

pub mod models;
pub mod progress;
pub mod route;
pub mod stats;
pub mod validation;

pub use models::{
    find_member, ActivityLog, ChangeEvent, LogPatch, Milestone, PathPoint, TeamMember,
    TEAM_MEMBERS,
};
pub use progress::{
    elevation_for_steps, next_waypoint, path_position, percent_to_summit, reached_index,
    remaining_m, sum_steps, total_steps, Progress, STEPS_PER_METER,
};
pub use route::{Route, RouteError, SUMMIT_ELEVATION_M};
pub use stats::{
    average_per_member, daily_totals, logs_for_day, member_totals, DailyTotal, Intensity,
    MemberTotal,
};
pub use validation::{
    parse_date_time, parse_entry, parse_steps, steps_in_range, EntryError, NewEntry,
    MAX_STEPS_PER_ENTRY,
};
