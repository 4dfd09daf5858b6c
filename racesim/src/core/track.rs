use crate::error::RaceError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

pub const FEET_PER_MILE: f64 = 5280.0;

/// Allowed relative mismatch between the summed section lengths and the advertised track length.
const LENGTH_TOLERANCE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Short,
    Intermediate,
    Superspeedway,
    Road,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Straight,
    Turn,
}

/// * `kind` - Straight or turn
/// * `length_ft` - (ft) Length of the section along the racing line
/// * `banking_deg` - (deg) Banking angle, required for turns
/// * `radius_ft` - (ft) Turn radius, required for turns
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrackSectionPars {
    pub kind: SectionKind,
    pub length_ft: f64,
    #[serde(default)]
    pub banking_deg: Option<f64>,
    #[serde(default)]
    pub radius_ft: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSection {
    pub kind: SectionKind,
    pub length_ft: f64,
    pub banking_deg: f64,
    pub radius_ft: f64,
}

/// * `id` - Short identifier, e.g. bristol
/// * `name` - Track name
/// * `track_type` - Track category, selects every track-type dependent constant
/// * `length_miles` - (mi) Advertised lap length
/// * `banking_deg` - (deg) Headline banking of the turns (informational)
/// * `surface_grip` - Surface grip multiplier applied to the tire friction coefficient
/// * `pit_time_loss` - (s) Time lost by a pit stop, defaults per track type
/// * `sections` - Ordered sections forming one closed lap
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrackPars {
    pub id: String,
    pub name: String,
    pub track_type: TrackType,
    pub length_miles: f64,
    #[serde(default)]
    pub banking_deg: f64,
    #[serde(default = "default_surface_grip")]
    pub surface_grip: f64,
    #[serde(default)]
    pub pit_time_loss: Option<f64>,
    pub sections: Vec<TrackSectionPars>,
}

fn default_surface_grip() -> f64 {
    1.0
}

/// Validated track. Deserializing goes through `Track::new`, so snapshots can only carry tracks
/// that pass the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrackPars")]
pub struct Track {
    pub id: String,
    pub name: String,
    pub track_type: TrackType,
    pub length_miles: f64,
    pub banking_deg: f64,
    pub surface_grip: f64,
    pub pit_time_loss: f64,
    sections: Vec<TrackSection>,
}

impl TrackType {
    /// Default time lost by a green-flag pit stop on this kind of track.
    pub fn default_pit_time_loss(self) -> f64 {
        match self {
            TrackType::Short => 22.0,
            TrackType::Intermediate => 34.0,
            TrackType::Superspeedway => 42.0,
            TrackType::Road => 38.0,
        }
    }
}

impl Track {
    /// Builds an immutable track from its parameters. Every turn needs a banking angle and a
    /// positive radius, and the sections have to add up to the advertised lap length.
    pub fn new(track_pars: &TrackPars) -> Result<Track, RaceError> {
        if track_pars.sections.is_empty() {
            return Err(RaceError::InvalidTrack(format!(
                "track {} has no sections",
                track_pars.id
            )));
        }
        if !(track_pars.length_miles > 0.0) {
            return Err(RaceError::InvalidTrack(format!(
                "track {} must have a positive length",
                track_pars.id
            )));
        }
        if !(track_pars.surface_grip > 0.0) {
            return Err(RaceError::InvalidTrack(format!(
                "track {} must have a positive surface grip",
                track_pars.id
            )));
        }

        let mut sections = Vec::with_capacity(track_pars.sections.len());

        for (idx, pars) in track_pars.sections.iter().enumerate() {
            if !(pars.length_ft > 0.0) {
                return Err(RaceError::InvalidTrack(format!(
                    "section {} of {} must have a positive length",
                    idx, track_pars.id
                )));
            }

            let section = match pars.kind {
                SectionKind::Straight => TrackSection {
                    kind: SectionKind::Straight,
                    length_ft: pars.length_ft,
                    banking_deg: pars.banking_deg.unwrap_or(0.0),
                    radius_ft: 0.0,
                },
                SectionKind::Turn => {
                    let (banking_deg, radius_ft) = match (pars.banking_deg, pars.radius_ft) {
                        (Some(b), Some(r)) => (b, r),
                        _ => {
                            return Err(RaceError::InvalidTrack(format!(
                                "turn section {} of {} needs banking and radius",
                                idx, track_pars.id
                            )))
                        }
                    };
                    if !(0.0..45.0).contains(&banking_deg) || !(radius_ft > 0.0) {
                        return Err(RaceError::InvalidTrack(format!(
                            "turn section {} of {} has banking {:.1}deg and radius {:.1}ft",
                            idx, track_pars.id, banking_deg, radius_ft
                        )));
                    }
                    TrackSection {
                        kind: SectionKind::Turn,
                        length_ft: pars.length_ft,
                        banking_deg,
                        radius_ft,
                    }
                }
            };
            sections.push(section);
        }

        // the sections have to close the loop
        let length_ft = track_pars.length_miles * FEET_PER_MILE;
        let sum_ft: f64 = sections.iter().map(|s| s.length_ft).sum();

        if ((sum_ft - length_ft) / length_ft).abs() > LENGTH_TOLERANCE {
            return Err(RaceError::InvalidTrack(format!(
                "sections of {} add up to {:.0}ft, but the lap is {:.0}ft long",
                track_pars.id, sum_ft, length_ft
            )));
        }

        Ok(Track {
            id: track_pars.id.to_owned(),
            name: track_pars.name.to_owned(),
            track_type: track_pars.track_type,
            length_miles: track_pars.length_miles,
            banking_deg: track_pars.banking_deg,
            surface_grip: track_pars.surface_grip,
            pit_time_loss: track_pars
                .pit_time_loss
                .unwrap_or_else(|| track_pars.track_type.default_pit_time_loss()),
            sections,
        })
    }

    pub fn sections(&self) -> &[TrackSection] {
        &self.sections
    }

    /// (ft) Lap length as the sum of all sections.
    pub fn length_ft(&self) -> f64 {
        self.sections.iter().map(|s| s.length_ft).sum()
    }
}

impl TryFrom<TrackPars> for Track {
    type Error = RaceError;

    fn try_from(track_pars: TrackPars) -> Result<Track, RaceError> {
        Track::new(&track_pars)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CsvSectionEl {
    pub kind: SectionKind,
    pub length_ft: f64,
    pub banking_deg: Option<f64>,
    pub radius_ft: Option<f64>,
}

/// read_sections_csv reads track sections from a CSV file with the header
/// `kind,length_ft,banking_deg,radius_ft`. Banking and radius may be left empty for straights.
pub fn read_sections_csv(filepath: &Path) -> Result<Vec<TrackSectionPars>> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open track section file {}!",
            filepath.display()
        ))?;

    let mut csv_reader = csv::Reader::from_reader(&fh);
    let mut sections: Vec<TrackSectionPars> = vec![];

    for result in csv_reader.deserialize() {
        let el: CsvSectionEl = result.context(format!(
            "Failed to parse track section file {}!",
            filepath.display()
        ))?;
        sections.push(TrackSectionPars {
            kind: el.kind,
            length_ft: el.length_ft,
            banking_deg: el.banking_deg,
            radius_ft: el.radius_ft,
        });
    }

    Ok(sections)
}
