use crate::core::track::TrackType;
use helpers::general::lin_interp;

/// Grip never drops below this fraction of the fresh-tire value.
pub const MIN_GRIP: f64 = 0.5;

/// Side-by-side racing scrubs the tires harder.
const SIDE_BY_SIDE_WEAR_FACTOR: f64 = 1.1;
const MAX_AGGRESSION_MULTIPLIER: f64 = 1.5;

// wear penalty curve: grip (%) -> relative lap time loss, linear part
const WEAR_GRIP_PTS: [f64; 3] = [50.0, 80.0, 100.0];
const WEAR_PENALTY_PTS: [f64; 3] = [0.04, 0.01, 0.0];
// penalty reached near zero grip, the curve between 50% and 0% is super-linear
const MAX_WEAR_PENALTY: f64 = 0.20;
const SEVERE_WEAR_EXPONENT: f64 = 1.5;

/// tire_life returns the number of laps after which a tire set reaches its minimum grip.
pub fn tire_life(track_type: TrackType) -> f64 {
    match track_type {
        TrackType::Short => 100.0,
        TrackType::Intermediate => 120.0,
        TrackType::Superspeedway => 140.0,
        TrackType::Road => 110.0,
    }
}

/// grip returns the remaining grip fraction in [0.5, 1.0] of a tire set that has been driven
/// `laps_since_pit` laps. Grip falls linearly from 1.0 to 0.5 over the tire life and stays there.
pub fn grip(laps_since_pit: u32, track_type: TrackType) -> f64 {
    let worn = (1.0 - MIN_GRIP) * laps_since_pit as f64 / tire_life(track_type);
    (1.0 - worn).clamp(MIN_GRIP, 1.0)
}

/// lap_time_from_wear returns the lap time for a given remaining grip in percent.
///
/// * 80..100% - minor tax, up to 1% at 80%
/// * 50..80% - linear, up to 4% at 50%
/// * below 50% - super-linear (exponent 1.5) up to 20% at zero grip
pub fn lap_time_from_wear(base_lap_time: f64, grip_pct: f64) -> f64 {
    let grip_pct = grip_pct.clamp(0.0, 100.0);

    let penalty = if grip_pct >= WEAR_GRIP_PTS[0] {
        lin_interp(grip_pct, &WEAR_GRIP_PTS, &WEAR_PENALTY_PTS)
    } else {
        let severity = (WEAR_GRIP_PTS[0] - grip_pct) / WEAR_GRIP_PTS[0];
        WEAR_PENALTY_PTS[0]
            + (MAX_WEAR_PENALTY - WEAR_PENALTY_PTS[0]) * severity.powf(SEVERE_WEAR_EXPONENT)
    };

    base_lap_time * (1.0 + penalty)
}

/// wear_rate_per_lap returns the tire wear in percent per lap. The base rate uses up a tire set
/// exactly over its life, aggression scales it by up to 1.5x and side-by-side racing adds 10%.
pub fn wear_rate_per_lap(
    track_type: TrackType,
    aggression_multiplier: f64,
    side_by_side: bool,
) -> f64 {
    let base_rate = 100.0 / tire_life(track_type);
    let mut rate = base_rate * aggression_multiplier.clamp(1.0, MAX_AGGRESSION_MULTIPLIER);

    if side_by_side {
        rate *= SIDE_BY_SIDE_WEAR_FACTOR;
    }

    rate
}

/// aggression_multiplier maps the aggression skill [0, 100] onto the wear multiplier [1.0, 1.5].
pub fn aggression_multiplier(aggression: f64) -> f64 {
    1.0 + (MAX_AGGRESSION_MULTIPLIER - 1.0) * aggression.clamp(0.0, 100.0) / 100.0
}
