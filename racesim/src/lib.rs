//! Tick-driven stock-car race simulator.
//!
//! The `core` module holds the physics pipeline (tires, fuel, speed, lap time integration) and
//! the race engine. `pre` reads parameters and options, `post` turns a finished race into results
//! and `interfaces` contains the snapshot types handed to renderers.

pub mod error;

pub mod core {
    pub mod car;
    pub mod decision;
    pub mod driver;
    pub mod fuel;
    pub mod handle_race;
    pub mod laptime;
    pub mod mental_state;
    pub mod points;
    pub mod race;
    pub mod speed;
    pub mod tireset;
    pub mod track;
}

pub mod pre {
    pub mod read_sim_pars;
    pub mod reference_tracks;
    pub mod sim_opts;
}

pub mod post {
    pub mod race_result;
}

pub mod interfaces {
    pub mod race_state;
}
