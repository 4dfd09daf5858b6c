use crate::core::car::CarState;
use crate::core::decision::Decision;
use crate::core::driver::Driver;
use crate::core::track::Track;
use serde::{Deserialize, Serialize};

/// Highest frequency (Hz) at which race state snapshots are published to an observer.
pub const MAX_OBSERVER_UPDATE_FREQUENCY: f64 = 20.0;

/// Standing of one car, recomputed from the race states every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub position: u32,
    pub driver_id: String,
    /// (s)
    pub gap_to_leader: f64,
    /// (s)
    pub gap_to_ahead: f64,
    /// (s) Last completed lap, 0 before the first lap
    pub lap_time: f64,
    pub laps_led: u32,
}

/// RaceState is the read-only snapshot handed to renderers and decision managers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceState {
    pub current_lap: u32,
    pub total_laps: u32,
    pub positions: Vec<Position>,
    pub player_position: Option<u32>,
    pub player_driver: Option<Driver>,
    pub player_car: Option<CarState>,
    pub active_decision: Option<Decision>,
    pub track: Track,
    pub complete: bool,
}
