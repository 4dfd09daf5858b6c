use crate::core::driver::DriverSkills;
use crate::core::fuel;
use crate::core::mental_state::MentalState;
use crate::core::tireset;
use crate::core::track::TrackType;
use helpers::general::clamp_pct;
use log::warn;
use serde::{Deserialize, Serialize};

/// * `horsepower` - (hp) Engine power
/// * `drag_coefficient` - (-) Aerodynamic drag coefficient
/// * `weight_lb` - (lb) Car weight without fuel
/// * `fuel_capacity_gal` - (gal) Fuel cell capacity, 100% fuel level
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct CarSpec {
    #[serde(default = "default_horsepower")]
    pub horsepower: f64,
    #[serde(default = "default_drag_coefficient")]
    pub drag_coefficient: f64,
    #[serde(default = "default_weight_lb")]
    pub weight_lb: f64,
    #[serde(default = "default_fuel_capacity_gal")]
    pub fuel_capacity_gal: f64,
}

fn default_horsepower() -> f64 {
    670.0
}

fn default_drag_coefficient() -> f64 {
    0.32
}

fn default_weight_lb() -> f64 {
    3450.0
}

fn default_fuel_capacity_gal() -> f64 {
    18.0
}

impl Default for CarSpec {
    fn default() -> Self {
        CarSpec {
            horsepower: default_horsepower(),
            drag_coefficient: default_drag_coefficient(),
            weight_lb: default_weight_lb(),
            fuel_capacity_gal: default_fuel_capacity_gal(),
        }
    }
}

/// Consumable state of one car. Every percentage lives in [0, 100]; `tire_wear` is the remaining
/// tire life, 100 meaning fresh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarState {
    pub tire_wear: f64,
    pub fuel_level: f64,
    pub damage: f64,
    pub laps_since_pit: u32,
    pub in_pit: bool,
}

impl Default for CarState {
    fn default() -> Self {
        CarState {
            tire_wear: 100.0,
            fuel_level: 100.0,
            damage: 0.0,
            laps_since_pit: 0,
            in_pit: false,
        }
    }
}

/// Race situation of one car during a lap, needed to update its consumables.
#[derive(Debug, Clone, Copy)]
pub struct LapConditions {
    pub track_type: TrackType,
    pub drafting: bool,
    pub side_by_side: bool,
}

impl CarState {
    /// (gal) Fuel currently on board.
    pub fn fuel_gallons(&self, spec: &CarSpec) -> f64 {
        self.fuel_level / 100.0 * spec.fuel_capacity_gal
    }

    /// drive_lap burns the fuel and wears the tires of one completed lap.
    pub fn drive_lap(
        &mut self,
        spec: &CarSpec,
        skills: &DriverSkills,
        mental_state: &MentalState,
        cond: LapConditions,
    ) {
        let burnt_gal =
            fuel::consumption_per_lap(cond.track_type, skills, mental_state, cond.drafting);
        let fuel_level = self.fuel_level - burnt_gal / spec.fuel_capacity_gal * 100.0;

        if fuel_level < 0.0 {
            warn!("Fuel level ran negative ({:.2}%), clamping to empty", fuel_level);
        }
        self.fuel_level = clamp_pct(fuel_level);

        let wear = tireset::wear_rate_per_lap(
            cond.track_type,
            tireset::aggression_multiplier(skills.aggression),
            cond.side_by_side,
        );
        self.tire_wear = clamp_pct(self.tire_wear - wear);
        self.laps_since_pit += 1;
        self.in_pit = false;
    }

    /// perform_pitstop mounts fresh tires and fills the tank.
    pub fn perform_pitstop(&mut self) {
        self.tire_wear = 100.0;
        self.fuel_level = 100.0;
        self.laps_since_pit = 0;
        self.in_pit = true;
    }

    pub fn add_damage(&mut self, damage: f64) {
        self.damage = clamp_pct(self.damage + damage);
    }
}
