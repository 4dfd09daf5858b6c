use crate::core::driver::Driver;
use crate::core::mental_state::MentalStateDelta;
use crate::interfaces::race_state::RaceState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub id: String,
    pub label: String,
}

/// Race context captured when the decision was raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub lap: u32,
    pub position: u32,
    pub tire_wear: f64,
    pub fuel_level: f64,
}

/// * `id` - Identifier assigned by the decision manager
/// * `prompt` - Text shown to the player
/// * `options` - Possible answers
/// * `time_budget_ms` - Time the player has to answer
/// * `context` - Race situation at the moment the decision was raised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<DecisionOption>,
    pub time_budget_ms: u64,
    pub context: DecisionContext,
}

impl Decision {
    pub fn has_option(&self, choice_id: &str) -> bool {
        self.options.iter().any(|o| o.id == choice_id)
    }
}

/// Changes applied to the player's car and driver when a decision is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DecisionEffects {
    #[serde(default)]
    pub mental_state: MentalStateDelta,
    /// Change of the remaining tire life (%).
    #[serde(default)]
    pub tire_wear: f64,
    /// Change of the fuel level (%).
    #[serde(default)]
    pub fuel_level: f64,
    /// Change of the damage (%).
    #[serde(default)]
    pub damage: f64,
    /// Positions gained (positive) or lost (negative).
    #[serde(default)]
    pub position_delta: i32,
    #[serde(default)]
    pub pit_stop: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpGain {
    pub skill: String,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub effects: DecisionEffects,
    pub xp_gained: Vec<XpGain>,
}

/// DecisionManager provides the decision content. The engine only asks whether a decision should
/// fire after a completed lap and how a chosen option resolves.
pub trait DecisionManager {
    fn should_trigger_decision(&mut self, state: &RaceState) -> Option<Decision>;

    fn evaluate_decision(
        &mut self,
        decision: &Decision,
        choice_id: &str,
        driver: &Driver,
    ) -> DecisionOutcome;
}

/// NoDecisions never raises a decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecisions;

impl DecisionManager for NoDecisions {
    fn should_trigger_decision(&mut self, _state: &RaceState) -> Option<Decision> {
        None
    }

    fn evaluate_decision(
        &mut self,
        _decision: &Decision,
        _choice_id: &str,
        _driver: &Driver,
    ) -> DecisionOutcome {
        DecisionOutcome::default()
    }
}
