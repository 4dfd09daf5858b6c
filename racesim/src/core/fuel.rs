use crate::core::driver::DriverSkills;
use crate::core::mental_state::MentalState;
use crate::core::track::TrackType;

/// Fuel saved while running in another car's draft.
pub const DRAFT_FUEL_SAVING: f64 = 0.10;

const MAX_CONSISTENCY_SAVING: f64 = 0.12;
const MAX_FRUSTRATION_PENALTY: f64 = 0.20;
const MAX_CONFIDENCE_SAVING: f64 = 0.08;

/// (gal/lap) Base consumption. Sustained throttle on superspeedways burns the most, the
/// brake/accelerate cycles of short tracks the least per lap.
pub fn base_consumption(track_type: TrackType) -> f64 {
    match track_type {
        TrackType::Short => 0.12,
        TrackType::Intermediate => 0.30,
        TrackType::Superspeedway => 0.45,
        TrackType::Road => 0.38,
    }
}

/// (s/gal) Lap time penalty per gallon carried. Braking and acceleration zones amplify the mass
/// effect on short tracks.
pub fn penalty_per_gallon(track_type: TrackType) -> f64 {
    match track_type {
        TrackType::Short => 0.045,
        TrackType::Intermediate => 0.030,
        TrackType::Superspeedway => 0.020,
        TrackType::Road => 0.035,
    }
}

/// consumption_per_lap returns the fuel burnt in one lap (gal). Modifiers are multiplicative and
/// applied in a fixed order: consistency, frustration, confidence, draft.
pub fn consumption_per_lap(
    track_type: TrackType,
    skills: &DriverSkills,
    mental_state: &MentalState,
    drafting: bool,
) -> f64 {
    let mut consumption = base_consumption(track_type);

    let consistency = skills.consistency.clamp(0.0, 100.0) / 100.0;
    let frustration = mental_state.frustration.clamp(0.0, 100.0) / 100.0;
    let confidence = mental_state.confidence.clamp(0.0, 100.0) / 100.0;

    consumption *= 1.0 - MAX_CONSISTENCY_SAVING * consistency;
    consumption *= 1.0 + MAX_FRUSTRATION_PENALTY * frustration;
    consumption *= 1.0 - MAX_CONFIDENCE_SAVING * confidence;

    if drafting {
        consumption *= 1.0 - DRAFT_FUEL_SAVING;
    }

    consumption
}

/// weight_penalty returns the lap time penalty (s) of carrying `gallons` of fuel.
pub fn weight_penalty(gallons: f64, track_type: TrackType) -> f64 {
    gallons.max(0.0) * penalty_per_gallon(track_type)
}
