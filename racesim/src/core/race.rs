use crate::core::car::{CarSpec, CarState, LapConditions};
use crate::core::decision::{Decision, DecisionEffects, DecisionManager, DecisionOutcome, XpGain};
use crate::core::driver::Driver;
use crate::core::laptime::{effective_skill, LapBreakdown, LapInputs, LapTimeIntegrator};
use crate::core::mental_state::{
    apply_mental_state_decay, apply_mental_state_event, MentalStateEvent,
};
use crate::core::track::Track;
use crate::error::RaceError;
use crate::interfaces::race_state::{Position, RaceState};
use crate::post::race_result::{Classification, ClassificationEntry, RaceResults};
use helpers::general::{argsort, clamp_pct, SortOrder};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::collections::HashSet;

/// (s) Synthetic time offset per grid slot, keeps the initial ranking equal to the grid.
pub const GRID_OFFSET: f64 = 0.1;
pub const MAX_CARS: usize = 43;

/// (s) Lap time standard deviation of a driver with zero consistency when noise is enabled.
const LAP_NOISE_MAX_STD: f64 = 0.15;
/// (s) Gap to the car ahead below which two cars run side by side.
const SIDE_BY_SIDE_GAP: f64 = 0.15;
/// (s) Draft window, widened by up to `DRAFT_WINDOW_SKILL_GAIN` at draft sense 100.
const DRAFT_WINDOW_BASE: f64 = 0.3;
const DRAFT_WINDOW_SKILL_GAIN: f64 = 0.4;
/// (s) Distance kept to the neighbour when a decision moves the player to the end of the field.
const POSITION_SWAP_MARGIN: f64 = 0.05;

/// * `track` - Track of the race
/// * `drivers` - Roster in starting grid order
/// * `total_laps` - Race distance in laps
/// * `player_driver_id` - Driver controlled by the player, receives decisions
/// * `car` - Car specification shared by the field
/// * `random_seed` - Enables seeded lap time noise when set
#[derive(Debug, Clone)]
pub struct RaceConfig {
    pub track: Track,
    pub drivers: Vec<Driver>,
    pub total_laps: u32,
    pub player_driver_id: Option<String>,
    pub car: CarSpec,
    pub random_seed: Option<u64>,
}

/// Stable index of a car in the engine's race state arena. Slot ids follow the starting grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacePhase {
    Uninitialized,
    Ready,
    Running,
    Complete,
}

#[derive(Debug, Clone)]
pub struct DriverRaceState {
    pub driver: Driver,
    pub car: CarState,
    /// (s) Last completed lap, 0 before the first lap
    pub current_lap_time: f64,
    pub fastest_lap: Option<f64>,
    /// (s) Cumulative completed race time including grid offset and pit losses
    pub total_time: f64,
    pub laps_led: u32,
    pub lap_times: Vec<f64>,
    pub start_position: u32,
    pub clean_laps: u32,
    progress: f64,
    expected_lap_time: Option<f64>,
    laps_completed: u32,
    position: u32,
    position_at_lap_start: u32,
    damage_at_lap_start: f64,
    gap_to_ahead: Option<f64>,
    drafting: bool,
    side_by_side: bool,
}

impl DriverRaceState {
    fn new(driver: Driver, grid_position: u32) -> DriverRaceState {
        DriverRaceState {
            driver,
            car: CarState::default(),
            current_lap_time: 0.0,
            fastest_lap: None,
            total_time: GRID_OFFSET * (grid_position - 1) as f64,
            laps_led: 0,
            lap_times: Vec::new(),
            start_position: grid_position,
            clean_laps: 0,
            progress: 0.0,
            expected_lap_time: None,
            laps_completed: 0,
            position: grid_position,
            position_at_lap_start: grid_position,
            damage_at_lap_start: 0.0,
            gap_to_ahead: None,
            drafting: false,
            side_by_side: false,
        }
    }

    /// Fraction [0, 1] of the current lap already driven.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn laps_completed(&self) -> u32 {
        self.laps_completed
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    /// (s) Ranking key: completed race time plus the time equivalent of the current lap progress.
    pub fn effective_time(&self) -> f64 {
        self.total_time + self.progress * self.expected_lap_time.unwrap_or(0.0)
    }
}

/// RaceEngine owns the race state of every car and advances it either lap by lap or in ticks.
///
/// Advancement calls are silently ignored before `initialize()`/`start()`, while paused, while a
/// decision is pending and after the race is complete.
pub struct RaceEngine {
    phase: RacePhase,
    paused: bool,
    track: Option<Track>,
    total_laps: u32,
    current_lap: u32,
    cur_racetime: f64,
    states: Vec<DriverRaceState>,
    order: Vec<usize>,
    positions: Vec<Position>,
    player: Option<SlotId>,
    integrator: LapTimeIntegrator,
    decision_manager: Box<dyn DecisionManager>,
    active_decision: Option<Decision>,
    xp_gained: Vec<XpGain>,
    rng: Option<StdRng>,
}

impl RaceEngine {
    pub fn new(decision_manager: Box<dyn DecisionManager>) -> RaceEngine {
        RaceEngine {
            phase: RacePhase::Uninitialized,
            paused: false,
            track: None,
            total_laps: 0,
            current_lap: 0,
            cur_racetime: 0.0,
            states: Vec::new(),
            order: Vec::new(),
            positions: Vec::new(),
            player: None,
            integrator: LapTimeIntegrator::new(CarSpec::default()),
            decision_manager,
            active_decision: None,
            xp_gained: Vec::new(),
            rng: None,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // LIFECYCLE -----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Sets up a new race. Any previous race held by the engine is discarded.
    pub fn initialize(&mut self, config: RaceConfig) -> Result<(), RaceError> {
        if config.drivers.is_empty() {
            return Err(RaceError::InvalidConfig("the roster is empty".to_owned()));
        }
        if config.drivers.len() > MAX_CARS {
            return Err(RaceError::InvalidConfig(format!(
                "{} cars entered, at most {} allowed",
                config.drivers.len(),
                MAX_CARS
            )));
        }
        if config.total_laps == 0 {
            return Err(RaceError::InvalidConfig("a race needs at least one lap".to_owned()));
        }
        if !(config.car.horsepower > 0.0
            && config.car.drag_coefficient > 0.0
            && config.car.weight_lb > 0.0
            && config.car.fuel_capacity_gal > 0.0)
        {
            return Err(RaceError::InvalidConfig(
                "car specification values must be positive".to_owned(),
            ));
        }

        {
            let mut ids = HashSet::with_capacity(config.drivers.len());
            for driver in config.drivers.iter() {
                if !ids.insert(driver.id.as_str()) {
                    return Err(RaceError::InvalidConfig(format!(
                        "driver id {} is used twice",
                        driver.id
                    )));
                }
            }
        }

        // the car is slowest on a full tank
        let integrator = LapTimeIntegrator::new(config.car);
        let full_tank = LapInputs {
            fuel_gallons: config.car.fuel_capacity_gal,
            ..LapInputs::default()
        };
        let t_full_tank = integrator.lap_time(&config.track, &full_tank);
        if !(t_full_tank.is_finite() && t_full_tank > 0.0) {
            return Err(RaceError::InvalidConfig(format!(
                "car runs a full tank lap of {}s at {}",
                t_full_tank, config.track.name
            )));
        }

        let player = match &config.player_driver_id {
            Some(id) => match config.drivers.iter().position(|d| &d.id == id) {
                Some(idx) => Some(SlotId(idx)),
                None => {
                    return Err(RaceError::InvalidConfig(format!(
                        "player driver {} is not in the roster",
                        id
                    )))
                }
            },
            None => None,
        };

        self.states = config
            .drivers
            .into_iter()
            .enumerate()
            .map(|(i, driver)| DriverRaceState::new(driver, i as u32 + 1))
            .collect();

        info!(
            "Initialized race at {} over {} laps with {} cars",
            config.track.name,
            config.total_laps,
            self.states.len()
        );

        self.track = Some(config.track);
        self.total_laps = config.total_laps;
        self.current_lap = 1;
        self.cur_racetime = 0.0;
        self.player = player;
        self.integrator = integrator;
        self.active_decision = None;
        self.xp_gained.clear();
        self.rng = config.random_seed.map(StdRng::seed_from_u64);
        self.paused = false;
        self.phase = RacePhase::Ready;
        self.recompute_positions();

        Ok(())
    }

    pub fn start(&mut self) {
        if self.phase == RacePhase::Ready {
            self.phase = RacePhase::Running;
        }
    }

    pub fn pause(&mut self) {
        if self.phase != RacePhase::Uninitialized {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_complete(&self) -> bool {
        self.phase == RacePhase::Complete
    }

    /// True when a tick or lap call would change the race.
    pub fn can_advance(&self) -> bool {
        self.phase == RacePhase::Running && !self.paused && self.active_decision.is_none()
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHODS --------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Simulates the rest of the current race lap for every car in one step.
    pub fn simulate_lap(&mut self) {
        if !self.can_advance() {
            return;
        }

        for idx in 0..self.states.len() {
            if self.states[idx].laps_completed >= self.current_lap {
                continue;
            }
            let lap_time = match self.states[idx].expected_lap_time {
                Some(t) => t,
                None => self.calc_lap_time(idx),
            };
            self.cur_racetime = self.cur_racetime.max(self.states[idx].total_time + lap_time);
            self.finalize_lap(idx, lap_time);
        }

        self.recompute_positions();
        self.complete_race_lap();
    }

    /// Advances every car by `elapsed_ms` of race time.
    pub fn simulate_tick(&mut self, elapsed_ms: f64) {
        if !self.can_advance() || !(elapsed_ms > 0.0) {
            return;
        }

        let dt = elapsed_ms / 1000.0;
        self.cur_racetime += dt;

        for idx in 0..self.states.len() {
            // cars that finished the current race lap wait for the rest of the field
            if self.states[idx].laps_completed >= self.current_lap {
                continue;
            }

            let expected = match self.states[idx].expected_lap_time {
                Some(t) => t,
                None => {
                    let t = self.calc_lap_time(idx);
                    let state = &mut self.states[idx];
                    state.expected_lap_time = Some(t);
                    state.progress = 0.0;
                    t
                }
            };

            let state = &mut self.states[idx];
            state.progress = (state.progress + dt / expected).min(1.0);

            if state.progress >= 1.0 {
                self.finalize_lap(idx, expected);
            }
        }

        self.recompute_positions();

        if self
            .states
            .iter()
            .all(|s| s.laps_completed >= self.current_lap)
        {
            self.complete_race_lap();
        }
    }

    /// Resolves the pending decision with the chosen option and applies its effects to the player.
    pub fn apply_decision(
        &mut self,
        decision: &Decision,
        choice_id: &str,
    ) -> Result<DecisionOutcome, RaceError> {
        let active = match &self.active_decision {
            Some(active) => active.clone(),
            None => return Err(RaceError::NoActiveDecision),
        };
        if active.id != decision.id {
            return Err(RaceError::StaleDecision(decision.id));
        }
        if !active.has_option(choice_id) {
            return Err(RaceError::UnknownChoice {
                decision_id: active.id,
                choice_id: choice_id.to_owned(),
            });
        }
        let player = self.player.ok_or(RaceError::NoPlayerDriver)?;

        let outcome = self
            .decision_manager
            .evaluate_decision(&active, choice_id, &self.states[player.0].driver);

        info!(
            "Decision {} resolved with '{}' on lap {}",
            active.id, choice_id, self.current_lap
        );

        self.apply_effects(player.0, &outcome.effects);
        self.xp_gained.extend(outcome.xp_gained.iter().cloned());
        self.active_decision = None;
        self.recompute_positions();

        Ok(outcome)
    }

    // ---------------------------------------------------------------------------------------------
    // RACE SIMULATOR PARTS ------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Lap inputs of a car for its current state and draft status.
    fn lap_inputs(&self, idx: usize) -> LapInputs {
        let state = &self.states[idx];
        LapInputs {
            laps_on_tires: state.car.laps_since_pit,
            fuel_gallons: state.car.fuel_gallons(self.integrator.car()),
            skill: effective_skill(state.driver.skills.racecraft, &state.driver.mental_state),
            drafting: state.drafting,
            damage: state.car.damage,
        }
    }

    /// Calculates the lap time of a car for its current state. The draft status is taken from
    /// the gap to the car ahead in the last standings.
    fn calc_lap_time(&mut self, idx: usize) -> f64 {
        {
            let state = &mut self.states[idx];
            let window = DRAFT_WINDOW_BASE
                + DRAFT_WINDOW_SKILL_GAIN * state.driver.skills.draft_sense / 100.0;
            state.drafting = state.gap_to_ahead.map_or(false, |g| g < window);
            state.side_by_side = state.gap_to_ahead.map_or(false, |g| g < SIDE_BY_SIDE_GAP);
        }

        let inputs = self.lap_inputs(idx);
        let t_lap = match &self.track {
            Some(track) => self.integrator.lap_time(track, &inputs),
            None => return 0.0,
        };

        let consistency = self.states[idx].driver.skills.consistency;
        let noise = match &mut self.rng {
            Some(rng) => {
                let std_dev = (1.0 - consistency / 100.0) * LAP_NOISE_MAX_STD;
                match Normal::new(0.0, std_dev) {
                    Ok(normal) if std_dev > 0.0 => normal.sample(rng),
                    _ => 0.0,
                }
            }
            None => 0.0,
        };

        (t_lap + noise).max(0.9 * t_lap)
    }

    /// Books a completed lap: consumables, times and lap history.
    fn finalize_lap(&mut self, idx: usize, lap_time: f64) {
        let track_type = match &self.track {
            Some(track) => track.track_type,
            None => return,
        };
        let spec = *self.integrator.car();
        let state = &mut self.states[idx];

        let cond = LapConditions {
            track_type,
            drafting: state.drafting,
            side_by_side: state.side_by_side,
        };
        state
            .car
            .drive_lap(&spec, &state.driver.skills, &state.driver.mental_state, cond);

        state.total_time += lap_time;
        state.lap_times.push(lap_time);
        state.current_lap_time = lap_time;

        match state.fastest_lap {
            Some(best) if lap_time >= best => {}
            Some(_) => {
                state.fastest_lap = Some(lap_time);
                state.driver.mental_state = apply_mental_state_event(
                    state.driver.mental_state,
                    MentalStateEvent::PersonalBestLap,
                );
            }
            None => state.fastest_lap = Some(lap_time),
        }

        if state.car.damage <= state.damage_at_lap_start {
            state.clean_laps += 1;
        }
        state.damage_at_lap_start = state.car.damage;

        state.progress = 0.0;
        state.expected_lap_time = None;
        state.laps_completed += 1;

        debug!(
            "{} completed lap {} in {:.3}s (tires {:.1}%, fuel {:.1}%)",
            state.driver.id,
            state.laps_completed,
            lap_time,
            state.car.tire_wear,
            state.car.fuel_level
        );
    }

    /// Called once every car finished the current race lap.
    fn complete_race_lap(&mut self) {
        if let Some(&leader) = self.order.first() {
            let state = &mut self.states[leader];
            state.laps_led += 1;
            state.driver.mental_state =
                apply_mental_state_event(state.driver.mental_state, MentalStateEvent::LedLap);
        }

        for state in self.states.iter_mut() {
            let mut mental = state.driver.mental_state;
            if state.position < state.position_at_lap_start {
                mental = apply_mental_state_event(
                    mental,
                    MentalStateEvent::PositionsGained(state.position_at_lap_start - state.position),
                );
            } else if state.position > state.position_at_lap_start {
                mental = apply_mental_state_event(
                    mental,
                    MentalStateEvent::PositionsLost(state.position - state.position_at_lap_start),
                );
            }
            state.driver.mental_state = apply_mental_state_decay(mental, 1);
            state.position_at_lap_start = state.position;
        }

        if self.current_lap >= self.total_laps {
            self.phase = RacePhase::Complete;
            if let Some(&winner) = self.order.first() {
                info!(
                    "Race complete after {} laps, winner {}",
                    self.total_laps, self.states[winner].driver.id
                );
            }
            return;
        }

        self.current_lap += 1;
        debug!("Race lap {} started", self.current_lap);

        if self.player.is_some() && self.active_decision.is_none() {
            if let Some(state) = self.current_state() {
                if let Some(decision) = self.decision_manager.should_trigger_decision(&state) {
                    info!(
                        "Decision {} raised on lap {}: {}",
                        decision.id, self.current_lap, decision.prompt
                    );
                    self.active_decision = Some(decision);
                }
            }
        }
    }

    /// Sorts the field by effective time and rebuilds the standings.
    fn recompute_positions(&mut self) {
        let eff_times: Vec<f64> = self.states.iter().map(|s| s.effective_time()).collect();
        self.order = argsort(&eff_times, SortOrder::Ascending);

        let leader_time = self.order.first().map_or(0.0, |&i| eff_times[i]);
        let mut positions = Vec::with_capacity(self.order.len());

        for (rank, &idx) in self.order.iter().enumerate() {
            let gap_to_ahead = if rank == 0 {
                None
            } else {
                Some(eff_times[idx] - eff_times[self.order[rank - 1]])
            };

            let state = &mut self.states[idx];
            state.position = rank as u32 + 1;
            state.gap_to_ahead = gap_to_ahead;

            positions.push(Position {
                position: rank as u32 + 1,
                driver_id: state.driver.id.to_owned(),
                gap_to_leader: eff_times[idx] - leader_time,
                gap_to_ahead: gap_to_ahead.unwrap_or(0.0),
                lap_time: state.current_lap_time,
                laps_led: state.laps_led,
            });
        }

        self.positions = positions;
    }

    fn apply_effects(&mut self, idx: usize, effects: &DecisionEffects) {
        let pit_time_loss = self.track.as_ref().map_or(0.0, |t| t.pit_time_loss);
        let state = &mut self.states[idx];

        if effects.damage > 0.0 {
            state.driver.mental_state =
                apply_mental_state_event(state.driver.mental_state, MentalStateEvent::Incident);
        }
        state.driver.mental_state = apply_mental_state_event(
            state.driver.mental_state,
            MentalStateEvent::Adjust(effects.mental_state),
        );
        state.car.tire_wear = clamp_pct(state.car.tire_wear + effects.tire_wear);
        state.car.fuel_level = clamp_pct(state.car.fuel_level + effects.fuel_level);
        state.car.add_damage(effects.damage);

        if effects.pit_stop {
            state.car.perform_pitstop();
            state.total_time += pit_time_loss;
            state.driver.mental_state =
                apply_mental_state_event(state.driver.mental_state, MentalStateEvent::PitStop);
            info!("{} pitted, {:.1}s lost", state.driver.id, pit_time_loss);
        }

        if effects.position_delta != 0 {
            self.recompute_positions();
            self.shift_position(idx, effects.position_delta);
        }
    }

    /// Moves a car `delta` positions forward (positive) or backward (negative) by adjusting its
    /// total time so that it lands between its new neighbours.
    fn shift_position(&mut self, idx: usize, delta: i32) {
        let n = self.order.len() as i64;
        let rank = match self.order.iter().position(|&i| i == idx) {
            Some(rank) => rank as i64,
            None => return,
        };
        let target = (rank - delta as i64).clamp(0, n - 1);
        if target == rank {
            return;
        }

        let eff = |i: usize| self.states[i].effective_time();
        let target = target as usize;

        let new_eff = if target < rank as usize {
            let passed = eff(self.order[target]);
            if target == 0 {
                passed - POSITION_SWAP_MARGIN
            } else {
                0.5 * (eff(self.order[target - 1]) + passed)
            }
        } else {
            let passed_by = eff(self.order[target]);
            if target + 1 == self.order.len() {
                passed_by + POSITION_SWAP_MARGIN
            } else {
                0.5 * (passed_by + eff(self.order[target + 1]))
            }
        };

        let shift = new_eff - eff(idx);
        self.states[idx].total_time += shift;
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// (s) Race time simulated so far.
    pub fn cur_racetime(&self) -> f64 {
        self.cur_racetime
    }

    pub fn current_lap(&self) -> u32 {
        self.current_lap
    }

    pub fn total_laps(&self) -> u32 {
        self.total_laps
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn player_slot(&self) -> Option<SlotId> {
        self.player
    }

    pub fn active_decision(&self) -> Option<&Decision> {
        self.active_decision.as_ref()
    }

    pub fn driver_state(&self, slot: SlotId) -> Option<&DriverRaceState> {
        self.states.get(slot.0)
    }

    pub fn driver_states(&self) -> &[DriverRaceState] {
        &self.states
    }

    /// Section breakdown of the next lap of a car without lap time noise.
    pub fn lap_breakdown(&self, slot: SlotId) -> Option<LapBreakdown> {
        let track = self.track.as_ref()?;
        if slot.0 >= self.states.len() {
            return None;
        }
        Some(self.integrator.breakdown(track, &self.lap_inputs(slot.0)))
    }

    /// Snapshot of the race for renderers and decision managers, `None` before initialization.
    pub fn current_state(&self) -> Option<RaceState> {
        let track = self.track.as_ref()?;
        let player = self.player.map(|slot| &self.states[slot.0]);

        Some(RaceState {
            current_lap: self.current_lap,
            total_laps: self.total_laps,
            positions: self.positions.to_owned(),
            player_position: player.map(|s| s.position),
            player_driver: player.map(|s| s.driver.clone()),
            player_car: player.map(|s| s.car),
            active_decision: self.active_decision.clone(),
            track: track.clone(),
            complete: self.is_complete(),
        })
    }

    /// Results of the player's race.
    pub fn get_results(&self) -> Result<RaceResults, RaceError> {
        let player = self.player.ok_or(RaceError::NoPlayerDriver)?;
        let state = &self.states[player.0];

        let average_lap = if state.lap_times.is_empty() {
            None
        } else {
            Some(state.lap_times.iter().sum::<f64>() / state.lap_times.len() as f64)
        };

        Ok(RaceResults {
            driver_id: state.driver.id.to_owned(),
            finish_position: state.position,
            start_position: state.start_position,
            positions_gained: state.start_position as i32 - state.position as i32,
            laps_led: state.laps_led,
            laps_completed: state.laps_completed,
            fastest_lap: state.fastest_lap,
            average_lap,
            clean_laps: state.clean_laps,
            xp_gained: self.xp_gained.to_owned(),
        })
    }

    /// Classification of the whole field in current order, `None` before initialization.
    pub fn get_classification(&self) -> Option<Classification> {
        let track = self.track.as_ref()?;

        let entries = self
            .order
            .iter()
            .map(|&idx| {
                let state = &self.states[idx];
                ClassificationEntry {
                    position: state.position,
                    driver_id: state.driver.id.to_owned(),
                    driver_name: state.driver.name.to_owned(),
                    start_position: state.start_position,
                    laps_completed: state.laps_completed,
                    total_time: state.total_time,
                    fastest_lap: state.fastest_lap,
                    laps_led: state.laps_led,
                    lap_times: state.lap_times.to_owned(),
                }
            })
            .collect();

        Some(Classification {
            track_name: track.name.to_owned(),
            tot_no_laps: self.total_laps,
            entries,
        })
    }
}
