use approx::assert_relative_eq;
use racesim::core::car::CarSpec;
use racesim::core::decision::{
    Decision, DecisionContext, DecisionEffects, DecisionManager, DecisionOption, DecisionOutcome,
    XpGain,
};
use racesim::core::driver::{Driver, DriverPars, DriverSkills};
use racesim::core::mental_state::{MentalState, MentalStateDelta};
use racesim::core::race::{RaceConfig, RaceEngine, SlotId};
use racesim::core::track::Track;
use racesim::error::RaceError;
use racesim::interfaces::race_state::RaceState;
use racesim::pre::reference_tracks;
use std::cell::RefCell;
use std::rc::Rc;

/// Raises one decision at the start of `lap` and resolves every option with the same effects.
struct OneShot {
    lap: u32,
    raised: bool,
    effects: DecisionEffects,
}

impl OneShot {
    fn new(lap: u32, effects: DecisionEffects) -> OneShot {
        OneShot {
            lap,
            raised: false,
            effects,
        }
    }
}

impl DecisionManager for OneShot {
    fn should_trigger_decision(&mut self, state: &RaceState) -> Option<Decision> {
        if self.raised || state.current_lap != self.lap {
            return None;
        }
        self.raised = true;
        let car = state.player_car?;

        Some(Decision {
            id: 7,
            prompt: "Crew chief on the radio".to_owned(),
            options: vec![
                DecisionOption {
                    id: "go".to_owned(),
                    label: "Go".to_owned(),
                },
                DecisionOption {
                    id: "wait".to_owned(),
                    label: "Wait".to_owned(),
                },
            ],
            time_budget_ms: 3000,
            context: DecisionContext {
                lap: state.current_lap,
                position: state.player_position.unwrap_or(0),
                tire_wear: car.tire_wear,
                fuel_level: car.fuel_level,
            },
        })
    }

    fn evaluate_decision(
        &mut self,
        _decision: &Decision,
        choice_id: &str,
        _driver: &Driver,
    ) -> DecisionOutcome {
        DecisionOutcome {
            effects: self.effects,
            xp_gained: vec![XpGain {
                skill: choice_id.to_owned(),
                amount: 10,
            }],
        }
    }
}

/// Raises a decision at the start of every lap it is asked about and records the lap.
struct EveryLap {
    raised_on: Rc<RefCell<Vec<u32>>>,
}

impl DecisionManager for EveryLap {
    fn should_trigger_decision(&mut self, state: &RaceState) -> Option<Decision> {
        self.raised_on.borrow_mut().push(state.current_lap);

        Some(Decision {
            id: state.current_lap,
            prompt: "Adjust the car?".to_owned(),
            options: vec![DecisionOption {
                id: "adjust".to_owned(),
                label: "Adjust".to_owned(),
            }],
            time_budget_ms: 2000,
            context: DecisionContext {
                lap: state.current_lap,
                position: state.player_position.unwrap_or(0),
                tire_wear: 100.0,
                fuel_level: 100.0,
            },
        })
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

fn config(player: &str) -> RaceConfig {
    let drivers = ["1", "2", "3", "4", "5"]
        .iter()
        .map(|id| {
            Driver::new(&DriverPars {
                id: id.to_string(),
                name: format!("Driver {}", id),
                skills: DriverSkills::default(),
                mental_state: MentalState::default(),
            })
        })
        .collect();

    RaceConfig {
        track: Track::new(&reference_tracks::track_pars("bristol").unwrap()).unwrap(),
        drivers,
        total_laps: 6,
        player_driver_id: Some(player.to_owned()),
        car: CarSpec::default(),
        random_seed: None,
    }
}

/// Engine that has just completed lap 1 and waits for the decision raised for lap 2.
fn engine_with_pending_decision(player: &str, effects: DecisionEffects) -> RaceEngine {
    let mut engine = RaceEngine::new(Box::new(OneShot::new(2, effects)));
    engine.initialize(config(player)).unwrap();
    engine.start();
    engine.simulate_lap();
    assert!(engine.active_decision().is_some());
    engine
}

fn slot_of(engine: &RaceEngine, id: &str) -> SlotId {
    SlotId(
        engine
            .driver_states()
            .iter()
            .position(|s| s.driver.id == id)
            .unwrap(),
    )
}

#[test]
fn pending_decision_blocks_the_race() {
    let mut engine = engine_with_pending_decision("3", DecisionEffects::default());
    assert!(!engine.can_advance());

    let before = engine.current_state().unwrap();
    assert_eq!(before.active_decision.as_ref().map(|d| d.id), Some(7));
    engine.simulate_tick(1000.0);
    engine.simulate_lap();
    assert_eq!(engine.current_state().unwrap(), before);

    let decision = engine.active_decision().cloned().unwrap();
    engine.apply_decision(&decision, "go").unwrap();
    assert!(engine.active_decision().is_none());
    assert!(engine.can_advance());

    engine.simulate_lap();
    assert_eq!(engine.current_lap(), 3);
}

#[test]
fn invalid_answers_keep_the_decision_pending() {
    let mut engine = engine_with_pending_decision("3", DecisionEffects::default());
    let mut decision = engine.active_decision().cloned().unwrap();

    assert_eq!(
        engine.apply_decision(&decision, "maybe"),
        Err(RaceError::UnknownChoice {
            decision_id: 7,
            choice_id: "maybe".to_owned()
        })
    );

    decision.id = 8;
    assert_eq!(engine.apply_decision(&decision, "go"), Err(RaceError::StaleDecision(8)));
    assert!(engine.active_decision().is_some());
}

#[test]
fn answer_without_pending_decision_fails() {
    let mut engine = engine_with_pending_decision("3", DecisionEffects::default());
    let decision = engine.active_decision().cloned().unwrap();
    engine.apply_decision(&decision, "wait").unwrap();

    assert_eq!(
        engine.apply_decision(&decision, "wait"),
        Err(RaceError::NoActiveDecision)
    );
}

#[test]
fn pit_stop_resets_car_and_costs_time() {
    let effects = DecisionEffects {
        pit_stop: true,
        ..DecisionEffects::default()
    };
    let mut engine = engine_with_pending_decision("3", effects);
    let slot = slot_of(&engine, "3");
    let before = engine.driver_state(slot).unwrap().clone();
    assert!(before.car.tire_wear < 100.0);

    let decision = engine.active_decision().cloned().unwrap();
    engine.apply_decision(&decision, "go").unwrap();

    let after = engine.driver_state(slot).unwrap();
    assert_eq!(after.car.tire_wear, 100.0);
    assert_eq!(after.car.fuel_level, 100.0);
    assert_eq!(after.car.laps_since_pit, 0);
    assert!(after.car.in_pit);
    let pit_time_loss = engine.track().unwrap().pit_time_loss;
    assert_relative_eq!(after.total_time, before.total_time + pit_time_loss, epsilon = 1e-9);
    assert_eq!(after.position(), 5);
}

#[test]
fn consumable_effects_are_clamped() {
    let effects = DecisionEffects {
        mental_state: MentalStateDelta {
            confidence: 500.0,
            frustration: -500.0,
            ..MentalStateDelta::default()
        },
        tire_wear: 50.0,
        fuel_level: -300.0,
        damage: 250.0,
        ..DecisionEffects::default()
    };
    let mut engine = engine_with_pending_decision("2", effects);
    let slot = slot_of(&engine, "2");

    let decision = engine.active_decision().cloned().unwrap();
    let outcome = engine.apply_decision(&decision, "go").unwrap();
    assert_eq!(outcome.xp_gained.len(), 1);

    let state = engine.driver_state(slot).unwrap();
    assert_eq!(state.car.tire_wear, 100.0);
    assert_eq!(state.car.fuel_level, 0.0);
    assert_eq!(state.car.damage, 100.0);
    assert_eq!(state.driver.mental_state.confidence, 100.0);
    assert_eq!(state.driver.mental_state.frustration, 0.0);

    // the damaged lap is not clean
    engine.simulate_lap();
    while !engine.is_complete() {
        engine.simulate_lap();
    }
    let results = engine.get_results().unwrap();
    assert_eq!(results.clean_laps, 5);
    assert_eq!(results.xp_gained, vec![XpGain { skill: "go".to_owned(), amount: 10 }]);
}

#[test]
fn position_delta_moves_the_player() {
    let effects = DecisionEffects {
        position_delta: 2,
        ..DecisionEffects::default()
    };
    let mut engine = engine_with_pending_decision("5", effects);
    let slot = slot_of(&engine, "5");
    let before = engine.driver_state(slot).unwrap().position();

    let decision = engine.active_decision().cloned().unwrap();
    engine.apply_decision(&decision, "go").unwrap();

    let after = engine.driver_state(slot).unwrap().position();
    assert_eq!(after, before.saturating_sub(2).max(1));
    assert_eq!(engine.current_state().unwrap().player_position, Some(after));
}

#[test]
fn negative_position_delta_drops_the_player() {
    let effects = DecisionEffects {
        position_delta: -10,
        ..DecisionEffects::default()
    };
    let mut engine = engine_with_pending_decision("1", effects);
    let slot = slot_of(&engine, "1");

    let decision = engine.active_decision().cloned().unwrap();
    engine.apply_decision(&decision, "go").unwrap();

    assert_eq!(engine.driver_state(slot).unwrap().position(), 5);
    assert_eq!(engine.positions().last().unwrap().driver_id, "1");
}

#[test]
fn decisions_block_tick_mode_until_answered() {
    let raised_on = Rc::new(RefCell::new(Vec::new()));
    let mut cfg = config("3");
    cfg.total_laps = 3;

    let mut engine = RaceEngine::new(Box::new(EveryLap {
        raised_on: Rc::clone(&raised_on),
    }));
    engine.initialize(cfg).unwrap();
    engine.start();

    let mut answered = 0;
    for _ in 0..100_000 {
        if engine.is_complete() {
            break;
        }

        let decision = match engine.active_decision().cloned() {
            Some(decision) => decision,
            None => {
                engine.simulate_tick(100.0);
                continue;
            }
        };

        // nothing moves while the decision is pending
        let frozen: Vec<(u32, f64)> = engine
            .driver_states()
            .iter()
            .map(|s| (s.laps_completed(), s.progress()))
            .collect();
        let racetime = engine.cur_racetime();
        for _ in 0..10 {
            engine.simulate_tick(1000.0);
        }
        let now: Vec<(u32, f64)> = engine
            .driver_states()
            .iter()
            .map(|s| (s.laps_completed(), s.progress()))
            .collect();
        assert_eq!(now, frozen);
        assert_eq!(engine.cur_racetime(), racetime);

        engine.apply_decision(&decision, "adjust").unwrap();
        answered += 1;

        engine.simulate_tick(100.0);
        assert!(engine.driver_states().iter().all(|s| s.progress() > 0.0));
    }

    assert!(engine.is_complete());
    assert_eq!(answered, 2);
    // asked after laps 1 and 2 only, never after the final lap
    assert_eq!(*raised_on.borrow(), vec![2, 3]);
    assert!(engine.active_decision().is_none());
}
