use crate::core::car::CarSpec;
use crate::core::driver::{Driver, DriverPars};
use crate::core::race::RaceConfig;
use crate::core::track::{read_sections_csv, Track, TrackPars};
use crate::pre::reference_tracks;
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// * `total_laps` - Race distance in laps
/// * `track_id` - Built-in reference track, used when the file carries no `track_pars`
/// * `sections_csv` - Optional CSV file replacing the track sections, relative to the parameter
///   file
/// * `player_driver` - Id of the driver controlled by the player
/// * `random_seed` - Enables seeded lap time noise
/// * `car` - Car specification shared by the field
#[derive(Debug, Deserialize, Clone)]
pub struct RacePars {
    pub total_laps: u32,
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub sections_csv: Option<PathBuf>,
    #[serde(default)]
    pub player_driver: Option<String>,
    #[serde(default)]
    pub random_seed: Option<u64>,
    #[serde(default)]
    pub car: CarSpec,
}

/// SimPars is used to store all other parameter structs. Drivers are listed in grid order.
#[derive(Debug, Deserialize, Clone)]
pub struct SimPars {
    pub race_pars: RacePars,
    #[serde(default)]
    pub track_pars: Option<TrackPars>,
    pub driver_pars_all: Vec<DriverPars>,
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!("Failed to open parameter file {}!", filepath.display()))?;
    let pars = serde_json::from_reader(&fh)
        .context(format!("Failed to parse parameter file {}!", filepath.display()))?;
    Ok(pars)
}

pub fn read_track_pars(filepath: &Path) -> anyhow::Result<TrackPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!("Failed to open track file {}!", filepath.display()))?;
    let pars = serde_json::from_reader(&fh)
        .context(format!("Failed to parse track file {}!", filepath.display()))?;
    Ok(pars)
}

impl SimPars {
    /// Track parameters from the file itself or, failing that, from the reference track named by
    /// `race_pars.track_id`. A section CSV replaces the sections when given.
    pub fn resolve_track_pars(&self, base_dir: Option<&Path>) -> anyhow::Result<TrackPars> {
        let mut track_pars = match (&self.track_pars, &self.race_pars.track_id) {
            (Some(track_pars), _) => track_pars.to_owned(),
            (None, Some(id)) => reference_tracks::track_pars(id)
                .ok_or_else(|| anyhow!("Unknown reference track {}!", id))?,
            (None, None) => {
                return Err(anyhow!(
                    "Parameter file needs either track_pars or race_pars.track_id!"
                ))
            }
        };

        if let Some(csv_path) = &self.race_pars.sections_csv {
            let csv_path = match base_dir {
                Some(dir) if csv_path.is_relative() => dir.join(csv_path),
                _ => csv_path.to_owned(),
            };
            track_pars.sections = read_sections_csv(&csv_path)?;
        }

        Ok(track_pars)
    }

    /// race_config builds the validated engine configuration.
    pub fn race_config(&self, base_dir: Option<&Path>) -> anyhow::Result<RaceConfig> {
        let track_pars = self.resolve_track_pars(base_dir)?;
        let track = Track::new(&track_pars).context("Failed to build track!")?;

        Ok(RaceConfig {
            track,
            drivers: self.driver_pars_all.iter().map(Driver::new).collect(),
            total_laps: self.race_pars.total_laps,
            player_driver_id: self.race_pars.player_driver.to_owned(),
            car: self.race_pars.car,
            random_seed: self.race_pars.random_seed,
        })
    }
}
