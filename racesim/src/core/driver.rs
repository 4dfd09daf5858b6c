use crate::core::mental_state::MentalState;
use serde::{Deserialize, Serialize};

/// Persistent driver skill ratings, every value in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSkills {
    pub racecraft: f64,
    pub consistency: f64,
    pub aggression: f64,
    pub focus: f64,
    pub stamina: f64,
    pub composure: f64,
    pub draft_sense: f64,
    pub tire_management: f64,
    pub fuel_management: f64,
    pub pit_strategy: f64,
}

impl Default for DriverSkills {
    fn default() -> Self {
        DriverSkills {
            racecraft: 50.0,
            consistency: 50.0,
            aggression: 50.0,
            focus: 50.0,
            stamina: 50.0,
            composure: 50.0,
            draft_sense: 50.0,
            tire_management: 50.0,
            fuel_management: 50.0,
            pit_strategy: 50.0,
        }
    }
}

impl DriverSkills {
    /// Returns a copy with every rating limited to [0, 100].
    pub fn clamped(self) -> DriverSkills {
        let c = helpers::general::clamp_pct;
        DriverSkills {
            racecraft: c(self.racecraft),
            consistency: c(self.consistency),
            aggression: c(self.aggression),
            focus: c(self.focus),
            stamina: c(self.stamina),
            composure: c(self.composure),
            draft_sense: c(self.draft_sense),
            tire_management: c(self.tire_management),
            fuel_management: c(self.fuel_management),
            pit_strategy: c(self.pit_strategy),
        }
    }
}

/// * `id` - Unique driver id, e.g. car number or initials
/// * `name` - Driver name
/// * `skills` - Persistent skill ratings
/// * `mental_state` - Mental state at the start of the race
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DriverPars {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub skills: DriverSkills,
    #[serde(default)]
    pub mental_state: MentalState,
}

/// Driver is a plain value. The engine replaces its mental state with the output of the reducers
/// in `mental_state` instead of mutating it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub skills: DriverSkills,
    pub mental_state: MentalState,
}

impl Driver {
    pub fn new(driver_pars: &DriverPars) -> Driver {
        Driver {
            id: driver_pars.id.to_owned(),
            name: driver_pars.name.to_owned(),
            skills: driver_pars.skills.clamped(),
            mental_state: driver_pars.mental_state.clamped(),
        }
    }
}
