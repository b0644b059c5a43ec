//! The expedition route: an elevation-ordered list of milestones.

use crate::models::{Milestone, PathPoint};
use thiserror::Error;

/// Elevation of the summit on the built-in route, in meters.
pub const SUMMIT_ELEVATION_M: u64 = 8848;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route has no milestones")]
    Empty,
    #[error("milestone '{name}' at {elevation}m is lower than its predecessor at {previous}m")]
    Descending {
        name: String,
        elevation: u64,
        previous: u64,
    },
}

/// Milestones sorted ascending by elevation.
///
/// Adjacent milestones may share an elevation; interpolation treats such a
/// segment as having zero length.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    milestones: Vec<Milestone>,
}

impl Route {
    pub fn new(milestones: Vec<Milestone>) -> Result<Self, RouteError> {
        if milestones.is_empty() {
            return Err(RouteError::Empty);
        }
        for pair in milestones.windows(2) {
            if pair[1].elevation < pair[0].elevation {
                return Err(RouteError::Descending {
                    name: pair[1].name.clone(),
                    elevation: pair[1].elevation,
                    previous: pair[0].elevation,
                });
            }
        }
        Ok(Self { milestones })
    }

    /// The Lukla to Summit route shown on the dashboard map.
    pub fn everest() -> Self {
        let milestones = EVEREST_STAGES
            .iter()
            .zip(EVEREST_PATH.iter())
            .enumerate()
            .map(|(i, ((name, elevation, description), (x, y)))| {
                Milestone::new(
                    i as u32 + 1,
                    *name,
                    *elevation,
                    *description,
                    PathPoint::new(*x, *y),
                )
            })
            .collect();
        Self { milestones }
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn first(&self) -> &Milestone {
        &self.milestones[0]
    }

    pub fn summit(&self) -> &Milestone {
        &self.milestones[self.milestones.len() - 1]
    }

    pub fn summit_elevation(&self) -> u64 {
        self.summit().elevation
    }

    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == id)
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::everest()
    }
}

// Stages in elevation order. Map coordinates are assigned in path order, so the
// marker always moves up and to the right as the team climbs.
const EVEREST_STAGES: [(&str, u64, &str); 23] = [
    ("Phakding", 2610, "First stop on the trek."),
    ("Lukla Airport", 2860, "The gateway to Everest."),
    ("Namche Bazaar", 3440, "Sherpa capital."),
    ("Deboche", 3820, "Rhododendron forests."),
    ("Tengboche Monastery", 3867, "Spiritual center."),
    ("Everest View Hotel", 3880, "First glimpse of the peak."),
    ("Pangboche", 3930, "Oldest monastery in Khumbu."),
    ("Dingboche", 4410, "Summer valley."),
    ("Lobuche", 4910, "The final approach."),
    ("Nangkartshang Peak", 5083, "Acclimatization hike."),
    ("Gorakshep", 5164, "Frozen lakebed."),
    ("Everest Base Camp", 5364, "The expedition begins."),
    ("Khumbu Icefall", 5486, "Treacherous beauty."),
    ("Camp 1", 6065, "Valley of Silence."),
    ("Camp 2", 6400, "Advanced Base Camp."),
    ("Lhotse Face", 7100, "Steep wall of ice."),
    ("Camp 3", 7200, "Perched on the face."),
    ("Yellow Band", 7500, "Sedimentary rock layer."),
    ("Geneva Spur", 7900, "Route to South Col."),
    ("South Col", 7906, "The Death Zone entry."),
    ("Balcony", 8400, "Resting spot."),
    ("Hillary Step", 8790, "The final obstacle."),
    ("Summit", SUMMIT_ELEVATION_M, "Top of the world."),
];

const EVEREST_PATH: [(f64, f64); 23] = [
    (5.0, 90.0),
    (10.0, 85.0),
    (15.0, 80.0),
    (20.0, 75.0),
    (25.0, 70.0),
    (30.0, 65.0),
    (35.0, 60.0),
    (40.0, 55.0),
    (45.0, 50.0),
    (50.0, 45.0),
    (55.0, 40.0),
    (60.0, 35.0),
    (65.0, 30.0),
    (70.0, 25.0),
    (75.0, 20.0),
    (80.0, 15.0),
    (85.0, 12.0),
    (88.0, 9.0),
    (91.0, 6.0),
    (94.0, 4.0),
    (96.0, 2.0),
    (98.0, 1.0),
    (100.0, 0.0),
];
