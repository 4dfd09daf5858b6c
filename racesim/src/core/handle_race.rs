use crate::core::decision::{Decision, DecisionManager};
use crate::core::race::{RaceConfig, RaceEngine};
use crate::interfaces::race_state::{RaceState, MAX_OBSERVER_UPDATE_FREQUENCY};
use crate::post::race_result::{Classification, RaceResults};
use anyhow::{anyhow, bail, Context};
use flume::Sender;
use log::{debug, info, warn};
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Everything left of a race for post-processing.
#[derive(Debug, Clone)]
pub struct RaceOutcome {
    pub classification: Classification,
    /// `None` if the race had no player driver.
    pub player_results: Option<RaceResults>,
}

/// handle_race creates and simulates a race on the basis of the inserted configuration, and
/// returns the results for post-processing.
///
/// The race advances in ticks of `tick_ms`. Pending decisions are answered by `resolve_decision`,
/// which returns the id of the chosen option. If a sender is inserted, the race runs in real-time
/// (scaled by `realtime_factor`) and snapshots are published at most at
/// `MAX_OBSERVER_UPDATE_FREQUENCY`.
pub fn handle_race<F>(
    config: RaceConfig,
    decision_manager: Box<dyn DecisionManager>,
    mut resolve_decision: F,
    tick_ms: f64,
    tx: Option<&Sender<RaceState>>,
    realtime_factor: f64,
) -> anyhow::Result<RaceOutcome>
where
    F: FnMut(&Decision, &RaceState) -> String,
{
    if !(tick_ms > 0.0 && tick_ms <= 1000.0) {
        bail!("Tick size must be in the range (0, 1000] ms, got {}!", tick_ms);
    }
    if !(realtime_factor > 0.0) {
        bail!("Real-time factor must be positive, got {}!", realtime_factor);
    }

    let mut race = RaceEngine::new(decision_manager);
    race.initialize(config).context("Failed to initialize race!")?;
    race.start();

    if let Some(breakdown) = race.player_slot().and_then(|slot| race.lap_breakdown(slot)) {
        debug!(
            "Player opening lap estimate {:.3}s over {} sections, top speed {:.1}mph",
            breakdown.lap_time,
            breakdown.sections.len(),
            breakdown.top_speed
        );
    }

    let mut t_race_update_print = 0.0;
    let mut t_race_update_observer = f64::NEG_INFINITY;
    let mut last_logged_lap = 0;

    while !race.is_complete() {
        let t_start = Instant::now();

        if let Some(decision) = race.active_decision().cloned() {
            let state = race
                .current_state()
                .ok_or_else(|| anyhow!("Race state unavailable while a decision is pending!"))?;
            let choice = resolve_decision(&decision, &state);
            race.apply_decision(&decision, &choice).context(format!(
                "Failed to apply choice {} to decision {}!",
                choice, decision.id
            ))?;
            continue;
        }

        race.simulate_tick(tick_ms);

        if race.current_lap() > last_logged_lap {
            debug!("Race lap {} of {}", race.current_lap(), race.total_laps());
            last_logged_lap = race.current_lap();
        }
        if race.cur_racetime() > t_race_update_print + 9.9999 {
            debug!(
                "Simulating... Current race time is {:.3}s, current lap is {}",
                race.cur_racetime(),
                race.current_lap()
            );
            t_race_update_print = race.cur_racetime();
        }

        if let Some(tx) = tx {
            let t_observer_next =
                t_race_update_observer + 1.0 / MAX_OBSERVER_UPDATE_FREQUENCY - 0.001;
            if race.cur_racetime() > t_observer_next {
                if let Some(state) = race.current_state() {
                    tx.send(state).context("Failed to send race state to observer!")?;
                }
                t_race_update_observer = race.cur_racetime();
            }

            // sleep until the tick is finished in real-time as well
            let t_sleep = tick_ms / realtime_factor - t_start.elapsed().as_secs_f64() * 1000.0;

            if t_sleep > 0.0 {
                sleep(Duration::from_secs_f64(t_sleep / 1000.0));
            } else {
                warn!("Could not keep up with real-time!");
            }
        }
    }

    // send the final state once after the loop
    if let Some(tx) = tx {
        if let Some(state) = race.current_state() {
            tx.send(state).context("Failed to send final race state to observer!")?;
        }
    }

    info!("Race finished after {:.1}s of race time", race.cur_racetime());

    let classification = race
        .get_classification()
        .ok_or_else(|| anyhow!("Race classification unavailable!"))?;
    let player_results = match race.player_slot() {
        Some(_) => Some(race.get_results()?),
        None => None,
    };

    Ok(RaceOutcome {
        classification,
        player_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::car::CarSpec;
    use crate::core::decision::NoDecisions;
    use crate::core::driver::{Driver, DriverPars, DriverSkills};
    use crate::core::mental_state::MentalState;
    use crate::core::track::Track;
    use crate::pre::reference_tracks;

    fn config(total_laps: u32) -> RaceConfig {
        let drivers = ["a", "b", "c"]
            .iter()
            .map(|id| {
                Driver::new(&DriverPars {
                    id: id.to_string(),
                    name: id.to_uppercase(),
                    skills: DriverSkills::default(),
                    mental_state: MentalState::default(),
                })
            })
            .collect();

        RaceConfig {
            track: Track::new(&reference_tracks::track_pars("bristol").unwrap()).unwrap(),
            drivers,
            total_laps,
            player_driver_id: Some("b".to_owned()),
            car: CarSpec::default(),
            random_seed: None,
        }
    }

    fn run(
        config: RaceConfig,
        tick_ms: f64,
        tx: Option<&Sender<RaceState>>,
        realtime_factor: f64,
    ) -> anyhow::Result<RaceOutcome> {
        let no_answer = |_: &Decision, _: &RaceState| String::new();
        handle_race(config, Box::new(NoDecisions), no_answer, tick_ms, tx, realtime_factor)
    }

    #[test]
    fn race_runs_to_completion() {
        let outcome = run(config(5), 100.0, None, 1.0).unwrap();

        assert_eq!(outcome.classification.entries.len(), 3);
        assert!(outcome.classification.entries.iter().all(|e| e.laps_completed == 5));
        let results = outcome.player_results.unwrap();
        assert_eq!(results.laps_completed, 5);
    }

    #[test]
    fn observer_receives_final_state() {
        let (tx, rx) = flume::unbounded();
        run(config(1), 500.0, Some(&tx), 1000.0).unwrap();

        let states: Vec<RaceState> = rx.drain().collect();
        assert!(!states.is_empty());
        assert!(states.last().unwrap().complete);
    }

    #[test]
    fn invalid_tick_size_is_rejected() {
        assert!(run(config(1), 0.0, None, 1.0).is_err());
    }
}
