use anyhow::{anyhow, Context};
use clap::Parser;
use log::{info, warn};
use racesim::core::car::CarSpec;
use racesim::core::decision::{
    Decision, DecisionContext, DecisionEffects, DecisionManager, DecisionOption, DecisionOutcome,
    XpGain,
};
use racesim::core::driver::{Driver, DriverPars, DriverSkills};
use racesim::core::handle_race::{handle_race, RaceOutcome};
use racesim::core::mental_state::{MentalState, MentalStateDelta};
use racesim::core::race::RaceConfig;
use racesim::core::track::Track;
use racesim::interfaces::race_state::RaceState;
use racesim::pre::read_sim_pars::read_sim_pars;
use racesim::pre::reference_tracks;
use racesim::pre::sim_opts::SimOpts;
use std::thread;
use std::time::Instant;

const DEFAULT_LAPS: u32 = 50;
const PLAYER_ID: &str = "24";

/// Tire life (%) and fuel level (%) below which the crew calls the player in.
const PIT_CALL_TIRE_WEAR: f64 = 40.0;
const PIT_CALL_FUEL_LEVEL: f64 = 20.0;
/// Laps before the crew repeats an ignored pit call.
const PIT_CALL_REPEAT_LAPS: u32 = 5;

/// PitCallManager raises a pit call whenever the player's tires or fuel run low.
#[derive(Debug, Default)]
struct PitCallManager {
    next_id: u32,
    last_call_lap: Option<u32>,
}

impl DecisionManager for PitCallManager {
    fn should_trigger_decision(&mut self, state: &RaceState) -> Option<Decision> {
        let car = state.player_car?;
        if car.tire_wear >= PIT_CALL_TIRE_WEAR && car.fuel_level >= PIT_CALL_FUEL_LEVEL {
            return None;
        }
        if let Some(lap) = self.last_call_lap {
            if state.current_lap < lap + PIT_CALL_REPEAT_LAPS {
                return None;
            }
        }

        self.next_id += 1;
        self.last_call_lap = Some(state.current_lap);

        Some(Decision {
            id: self.next_id,
            prompt: format!(
                "Tires {:.0}%, fuel {:.0}%. Box this lap?",
                car.tire_wear, car.fuel_level
            ),
            options: vec![
                DecisionOption {
                    id: "pit".to_owned(),
                    label: "Box, four tires and fuel".to_owned(),
                },
                DecisionOption {
                    id: "stay_out".to_owned(),
                    label: "Stay out".to_owned(),
                },
            ],
            time_budget_ms: 5000,
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
        decision: &Decision,
        choice_id: &str,
        driver: &Driver,
    ) -> DecisionOutcome {
        match choice_id {
            "pit" => DecisionOutcome {
                effects: DecisionEffects {
                    pit_stop: true,
                    ..DecisionEffects::default()
                },
                xp_gained: vec![XpGain {
                    skill: "pit_strategy".to_owned(),
                    amount: 10,
                }],
            },
            _ => {
                // staying out on worn tires costs composure unless the driver is calm
                let focus_loss = if driver.skills.composure >= 70.0 { 0.0 } else { 5.0 };
                let tires_gone = decision.context.tire_wear < 20.0;
                DecisionOutcome {
                    effects: DecisionEffects {
                        mental_state: MentalStateDelta {
                            confidence: 3.0,
                            focus: -focus_loss,
                            ..MentalStateDelta::default()
                        },
                        damage: if tires_gone { 5.0 } else { 0.0 },
                        ..DecisionEffects::default()
                    },
                    xp_gained: vec![XpGain {
                        skill: "tire_management".to_owned(),
                        amount: 5,
                    }],
                }
            }
        }
    }
}

/// Automatic crew chief: pits on a real shortage, stays out otherwise.
fn auto_choice(decision: &Decision, _state: &RaceState) -> String {
    let ctx = &decision.context;
    let tires_low = ctx.tire_wear < PIT_CALL_TIRE_WEAR - 10.0;
    let wanted = if tires_low || ctx.fuel_level < PIT_CALL_FUEL_LEVEL {
        "pit"
    } else {
        "stay_out"
    };

    if decision.has_option(wanted) {
        wanted.to_owned()
    } else {
        decision.options.first().map(|o| o.id.to_owned()).unwrap_or_default()
    }
}

/// default_race_config creates a ten car field on a reference track with the player on P5.
fn default_race_config(sim_opts: &SimOpts) -> anyhow::Result<RaceConfig> {
    let track_pars = reference_tracks::track_pars(&sim_opts.track).ok_or_else(|| {
        anyhow!(
            "Unknown track {}, available: {}",
            sim_opts.track,
            reference_tracks::REFERENCE_TRACK_IDS.join(", ")
        )
    })?;
    let track = Track::new(&track_pars).context("Failed to build reference track!")?;

    let field = [
        ("11", "D. Hamlin", 82.0),
        ("5", "K. Larson", 85.0),
        ("9", "C. Elliott", 78.0),
        ("22", "J. Logano", 80.0),
        (PLAYER_ID, "Player", 70.0),
        ("12", "R. Blaney", 76.0),
        ("20", "C. Bell", 74.0),
        ("19", "M. Truex Jr.", 77.0),
        ("48", "A. Bowman", 68.0),
        ("1", "R. Chastain", 66.0),
    ];

    let drivers = field
        .iter()
        .map(|&(id, name, rating)| {
            Driver::new(&DriverPars {
                id: id.to_owned(),
                name: name.to_owned(),
                skills: DriverSkills {
                    racecraft: rating,
                    consistency: rating - 5.0,
                    draft_sense: rating - 10.0,
                    ..DriverSkills::default()
                },
                mental_state: MentalState::default(),
            })
        })
        .collect();

    Ok(RaceConfig {
        track,
        drivers,
        total_laps: sim_opts.laps.unwrap_or(DEFAULT_LAPS),
        player_driver_id: Some(PLAYER_ID.to_owned()),
        car: CarSpec::default(),
        random_seed: sim_opts.seed,
    })
}

fn print_leaderboard(state: &RaceState) {
    println!("Lap {}/{}", state.current_lap, state.total_laps);
    for p in state.positions.iter().take(10) {
        let marker = if Some(p.position) == state.player_position { "*" } else { " " };
        println!(
            "{}{:3} {:>4} {:+8.3}s  last {:7.3}s",
            marker, p.position, p.driver_id, p.gap_to_leader, p.lap_time
        );
    }
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    let level = if sim_opts.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // get race configuration
    let mut race_config = if let Some(parfile_path) = &sim_opts.parfile_path {
        info!("Reading simulation parameters from {}", parfile_path.display());
        let sim_pars = read_sim_pars(parfile_path)?;
        sim_pars.race_config(parfile_path.parent())?
    } else {
        info!("No parameter file given, using the default field on {}", sim_opts.track);
        default_race_config(&sim_opts)?
    };
    if let Some(laps) = sim_opts.laps {
        race_config.total_laps = laps;
    }
    if sim_opts.seed.is_some() {
        race_config.random_seed = sim_opts.seed;
    }

    info!(
        "Simulating {} laps at {} with a tick size of {:.0}ms",
        race_config.total_laps, race_config.track.name, sim_opts.tick_ms
    );

    // EXECUTION -----------------------------------------------------------------------------------
    let t_start = Instant::now();

    let outcome: RaceOutcome = if !sim_opts.live {
        handle_race(
            race_config,
            Box::new(PitCallManager::default()),
            auto_choice,
            sim_opts.tick_ms,
            None,
            1.0,
        )?
    } else {
        let (tx, rx) = flume::unbounded();
        let tick_ms = sim_opts.tick_ms;
        let realtime_factor = sim_opts.realtime_factor;

        let sim_thread = thread::spawn(move || {
            handle_race(
                race_config,
                Box::new(PitCallManager::default()),
                auto_choice,
                tick_ms,
                Some(&tx),
                realtime_factor,
            )
        });

        // print the leaderboard once per race lap, the channel closes when the race thread ends
        let mut last_printed_lap = 0;
        for state in rx.iter() {
            if state.current_lap != last_printed_lap || state.complete {
                print_leaderboard(&state);
                last_printed_lap = state.current_lap;
            }
        }

        sim_thread
            .join()
            .map_err(|_| anyhow!("Race simulation thread panicked!"))??
    };

    info!("Execution time: {}ms", t_start.elapsed().as_millis());

    // POST-PROCESSING -----------------------------------------------------------------------------
    let classification = &outcome.classification;
    classification.print_classification()?;
    if sim_opts.print_lap_times {
        classification.print_lap_times()?;
    }

    match &outcome.player_results {
        Some(results) => results.print(),
        None => warn!("No player driver in this race"),
    }

    println!("RESULT: Championship points");
    for (driver_id, points) in classification.points()? {
        println!("{:>4}: {}", driver_id, points);
    }

    if let Some(path) = &sim_opts.output {
        classification.write_to_file(path)?;
        info!("Classification written to {}", path.display());
    }

    Ok(())
}
