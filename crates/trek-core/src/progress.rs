//! Progress model: steps to elevation, and elevation to position on the route.
//!
//! Everything here is a pure function of the logged steps and the route, and
//! is recomputed on every read.

use crate::models::{ActivityLog, Milestone, PathPoint};
use crate::route::Route;
use serde::Serialize;

/// Conversion constant between logged steps and climbed meters.
pub const STEPS_PER_METER: u64 = 100;

/// Sum of all logged steps, saturating at `u64::MAX`.
pub fn total_steps(logs: &[ActivityLog]) -> u64 {
    sum_steps(logs.iter().map(|log| log.steps))
}

/// Saturating sum of step counts.
pub fn sum_steps(steps: impl IntoIterator<Item = u64>) -> u64 {
    steps.into_iter().fold(0, u64::saturating_add)
}

/// Elevation in whole meters reached by `total` steps.
pub fn elevation_for_steps(total: u64) -> u64 {
    total / STEPS_PER_METER
}

/// Meters left to the summit, zero once it is reached.
pub fn remaining_m(elevation: u64, route: &Route) -> u64 {
    route.summit_elevation().saturating_sub(elevation)
}

/// Share of the summit elevation reached, clamped to `[0, 100]`.
pub fn percent_to_summit(elevation: u64, route: &Route) -> f64 {
    let summit = route.summit_elevation();
    if summit == 0 {
        return 100.0;
    }
    (elevation as f64 / summit as f64 * 100.0).clamp(0.0, 100.0)
}

/// First milestone strictly above `elevation`; `None` at or above the summit.
pub fn next_waypoint(elevation: u64, route: &Route) -> Option<&Milestone> {
    route.milestones().iter().find(|m| m.elevation > elevation)
}

/// Index of the last milestone reached, walking the route in order.
pub fn reached_index(elevation: u64, route: &Route) -> Option<usize> {
    route
        .milestones()
        .iter()
        .take_while(|m| elevation >= m.elevation)
        .count()
        .checked_sub(1)
}

/// Marker position on the route map for `elevation`.
///
/// Below the first milestone the marker sits on the first milestone; at or
/// above the summit it sits on the summit. Exactly at a milestone's elevation
/// it sits on that milestone (the first one when several share the
/// elevation). In between it is interpolated linearly on the segment that
/// contains `elevation`.
pub fn path_position(elevation: u64, route: &Route) -> PathPoint {
    let milestones = route.milestones();
    let first = route.first();
    let summit = route.summit();

    if elevation >= summit.elevation {
        return summit.coordinates;
    }
    if elevation < first.elevation {
        return first.coordinates;
    }

    if let Some(at) = milestones.iter().find(|m| m.elevation == elevation) {
        return at.coordinates;
    }

    let next_idx = match milestones.iter().position(|m| m.elevation > elevation) {
        Some(idx) if idx > 0 => idx,
        _ => return summit.coordinates,
    };
    let prev = &milestones[next_idx - 1];
    let next = &milestones[next_idx];

    // prev < elevation < next here, so the span is never zero
    let span = next.elevation - prev.elevation;
    let t = (elevation - prev.elevation) as f64 / span as f64;
    prev.coordinates.lerp(next.coordinates, t)
}

/// Snapshot of the expedition's progress for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress<'a> {
    pub total_steps: u64,
    pub elevation_m: u64,
    pub remaining_m: u64,
    pub percent: f64,
    pub next_waypoint: Option<&'a Milestone>,
    /// Meters to the next waypoint
    pub to_next_m: Option<u64>,
    pub reached_index: Option<usize>,
    pub position: PathPoint,
}

impl<'a> Progress<'a> {
    pub fn compute(total_steps: u64, route: &'a Route) -> Self {
        let elevation = elevation_for_steps(total_steps);
        let next = next_waypoint(elevation, route);

        Self {
            total_steps,
            elevation_m: elevation,
            remaining_m: remaining_m(elevation, route),
            percent: percent_to_summit(elevation, route),
            next_waypoint: next,
            to_next_m: next.map(|m| m.elevation - elevation),
            reached_index: reached_index(elevation, route),
            position: path_position(elevation, route),
        }
    }

    pub fn from_logs(logs: &[ActivityLog], route: &'a Route) -> Self {
        Self::compute(total_steps(logs), route)
    }

    pub fn summit_reached(&self) -> bool {
        self.remaining_m == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn two_point_route() -> Route {
        Route::new(vec![
            Milestone::new(1, "Start", 0, "", PathPoint::new(0.0, 0.0)),
            Milestone::new(2, "Top", 100, "", PathPoint::new(10.0, 10.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_elevation_from_three_days_of_steps() {
        let logs: Vec<ActivityLog> = [(1, 1200), (2, 3400), (3, 11000)]
            .iter()
            .map(|(day, steps)| {
                ActivityLog::new(
                    "member-1",
                    *steps,
                    Utc.with_ymd_and_hms(2025, 2, *day, 8, 0, 0).unwrap(),
                )
            })
            .collect();

        assert_eq!(total_steps(&logs), 15_600);
        assert_eq!(elevation_for_steps(total_steps(&logs)), 156);
    }

    #[test]
    fn test_elevation_floors_and_is_monotonic() {
        assert_eq!(elevation_for_steps(0), 0);
        assert_eq!(elevation_for_steps(99), 0);
        assert_eq!(elevation_for_steps(100), 1);
        assert_eq!(elevation_for_steps(199), 1);

        let mut last = 0;
        for total in (0..5_000).step_by(7) {
            let e = elevation_for_steps(total);
            assert!(e >= last);
            last = e;
        }
    }

    #[test]
    fn test_interpolates_midpoint() {
        let route = two_point_route();
        assert_eq!(path_position(50, &route), PathPoint::new(5.0, 5.0));
    }

    #[test]
    fn test_position_at_milestone_is_exact() {
        let route = Route::everest();
        for m in route.milestones() {
            assert_eq!(path_position(m.elevation, &route), m.coordinates, "at {}", m.name);
        }
    }

    #[test]
    fn test_position_clamps_to_ends() {
        let route = Route::everest();
        let first = route.first().coordinates;
        let summit = route.summit().coordinates;

        assert_eq!(path_position(0, &route), first);
        assert_eq!(path_position(2609, &route), first);
        assert_eq!(path_position(8848, &route), summit);
        assert_eq!(path_position(20_000, &route), summit);
    }

    #[test]
    fn test_position_is_continuous() {
        let route = Route::everest();

        // Largest coordinate change per meter on any segment
        let max_slope = route
            .milestones()
            .windows(2)
            .map(|w| {
                let span = (w[1].elevation - w[0].elevation) as f64;
                let dx = (w[1].coordinates.x - w[0].coordinates.x).abs();
                let dy = (w[1].coordinates.y - w[0].coordinates.y).abs();
                dx.max(dy) / span
            })
            .fold(0.0_f64, f64::max);

        for e in 0..9_000 {
            let a = path_position(e, &route);
            let b = path_position(e + 1, &route);
            assert!((b.x - a.x).abs() <= max_slope + 1e-9, "x jump at {}m", e);
            assert!((b.y - a.y).abs() <= max_slope + 1e-9, "y jump at {}m", e);
        }
    }

    #[test]
    fn test_equal_elevations_use_earlier_coordinate() {
        let route = Route::new(vec![
            Milestone::new(1, "A", 0, "", PathPoint::new(0.0, 0.0)),
            Milestone::new(2, "B", 100, "", PathPoint::new(10.0, 10.0)),
            Milestone::new(3, "C", 100, "", PathPoint::new(20.0, 20.0)),
            Milestone::new(4, "D", 200, "", PathPoint::new(30.0, 30.0)),
        ])
        .unwrap();

        assert_eq!(path_position(100, &route), PathPoint::new(10.0, 10.0));
        assert!((path_position(99, &route).x - 9.9).abs() < 1e-9);
        assert_eq!(path_position(150, &route), PathPoint::new(25.0, 25.0));
    }

    #[test]
    fn test_total_steps_saturates() {
        let date = Utc::now();
        let logs: Vec<ActivityLog> = (0..3)
            .map(|_| ActivityLog::new("member-1", i64::MAX as u64, date))
            .collect();

        assert_eq!(total_steps(&logs), u64::MAX);
        assert_eq!(sum_steps([u64::MAX, 1]), u64::MAX);
        assert_eq!(sum_steps([1200, 3400, 11_000]), 15_600);
    }

    #[test]
    fn test_remaining_and_percent() {
        let route = Route::everest();

        assert_eq!(remaining_m(0, &route), 8848);
        assert_eq!(remaining_m(8847, &route), 1);
        assert_eq!(remaining_m(8848, &route), 0);
        assert_eq!(remaining_m(10_000, &route), 0);

        assert_eq!(percent_to_summit(0, &route), 0.0);
        assert_eq!(percent_to_summit(4424, &route), 50.0);
        assert_eq!(percent_to_summit(8848, &route), 100.0);
        assert_eq!(percent_to_summit(50_000, &route), 100.0);
    }

    #[test]
    fn test_next_waypoint() {
        let route = Route::everest();

        assert_eq!(next_waypoint(0, &route).map(|m| m.name.as_str()), Some("Phakding"));
        assert_eq!(next_waypoint(2610, &route).map(|m| m.name.as_str()), Some("Lukla Airport"));
        assert_eq!(next_waypoint(8800, &route).map(|m| m.name.as_str()), Some("Summit"));
        assert!(next_waypoint(8848, &route).is_none());
    }

    #[test]
    fn test_reached_index() {
        let route = Route::everest();

        assert_eq!(reached_index(0, &route), None);
        assert_eq!(reached_index(2610, &route), Some(0));
        assert_eq!(reached_index(3000, &route), Some(1));
        assert_eq!(reached_index(9000, &route), Some(22));
    }

    #[test]
    fn test_progress_snapshot() {
        let route = Route::everest();
        let progress = Progress::compute(300_000, &route);

        assert_eq!(progress.elevation_m, 3000);
        assert_eq!(progress.remaining_m, 5848);
        assert_eq!(progress.next_waypoint.map(|m| m.name.as_str()), Some("Namche Bazaar"));
        assert_eq!(progress.to_next_m, Some(440));
        assert_eq!(progress.reached_index, Some(1));
        assert!(!progress.summit_reached());

        let done = Progress::compute(884_800, &route);
        assert!(done.summit_reached());
        assert_eq!(done.position, route.summit().coordinates);
        assert!(done.next_waypoint.is_none());
    }
}
