//! Mental state values and the pure reducers that evolve them during a race.
//!
//! A driver's mental state is never mutated in place: every race event produces a new state via
//! `apply_mental_state_event`, and `apply_mental_state_decay` pulls it back toward the baseline
//! as laps go by.

use helpers::general::clamp_pct;
use serde::{Deserialize, Serialize};

/// Fraction of the distance to the baseline recovered per lap.
const DECAY_PER_LAP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentalState {
    pub confidence: f64,
    pub frustration: f64,
    pub focus: f64,
    pub distraction: f64,
}

impl MentalState {
    pub const BASELINE: MentalState = MentalState {
        confidence: 50.0,
        frustration: 0.0,
        focus: 70.0,
        distraction: 0.0,
    };

    pub fn clamped(self) -> MentalState {
        MentalState {
            confidence: clamp_pct(self.confidence),
            frustration: clamp_pct(self.frustration),
            focus: clamp_pct(self.focus),
            distraction: clamp_pct(self.distraction),
        }
    }
}

impl Default for MentalState {
    fn default() -> Self {
        MentalState::BASELINE
    }
}

/// Additive change of every mental state value, used by decision effects.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MentalStateDelta {
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub frustration: f64,
    #[serde(default)]
    pub focus: f64,
    #[serde(default)]
    pub distraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MentalStateEvent {
    PositionsGained(u32),
    PositionsLost(u32),
    LedLap,
    PersonalBestLap,
    PitStop,
    Incident,
    Adjust(MentalStateDelta),
}

/// apply_mental_state_event returns the mental state after a race event. All values stay in
/// [0, 100].
pub fn apply_mental_state_event(state: MentalState, event: MentalStateEvent) -> MentalState {
    let delta = match event {
        MentalStateEvent::PositionsGained(n) => MentalStateDelta {
            confidence: 2.0 * n as f64,
            frustration: -1.5 * n as f64,
            ..Default::default()
        },
        MentalStateEvent::PositionsLost(n) => MentalStateDelta {
            confidence: -1.5 * n as f64,
            frustration: 2.5 * n as f64,
            ..Default::default()
        },
        MentalStateEvent::LedLap => MentalStateDelta {
            confidence: 1.0,
            focus: 0.5,
            ..Default::default()
        },
        MentalStateEvent::PersonalBestLap => MentalStateDelta {
            confidence: 3.0,
            ..Default::default()
        },
        MentalStateEvent::PitStop => MentalStateDelta {
            distraction: 5.0,
            ..Default::default()
        },
        MentalStateEvent::Incident => MentalStateDelta {
            confidence: -8.0,
            frustration: 10.0,
            distraction: 10.0,
            ..Default::default()
        },
        MentalStateEvent::Adjust(delta) => delta,
    };

    MentalState {
        confidence: state.confidence + delta.confidence,
        frustration: state.frustration + delta.frustration,
        focus: state.focus + delta.focus,
        distraction: state.distraction + delta.distraction,
    }
    .clamped()
}

/// apply_mental_state_decay moves every value toward the baseline, recovering 10% of the remaining
/// distance per elapsed lap.
pub fn apply_mental_state_decay(state: MentalState, laps: u32) -> MentalState {
    let keep = (1.0 - DECAY_PER_LAP).powi(laps as i32);
    let base = MentalState::BASELINE;
    let towards = |cur: f64, target: f64| target + (cur - target) * keep;

    MentalState {
        confidence: towards(state.confidence, base.confidence),
        frustration: towards(state.frustration, base.frustration),
        focus: towards(state.focus, base.focus),
        distraction: towards(state.distraction, base.distraction),
    }
    .clamped()
}
