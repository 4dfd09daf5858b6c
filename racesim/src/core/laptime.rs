use crate::core::car::CarSpec;
use crate::core::mental_state::MentalState;
use crate::core::speed::{self, MPH_TO_FT_S};
use crate::core::tireset;
use crate::core::track::{SectionKind, Track, TrackSection, TrackType};
use serde::Serialize;

const MAX_MENTAL_SKILL_EFFECT: f64 = 0.05;
/// Relative lap time loss at 100% damage.
const MAX_DAMAGE_PENALTY: f64 = 0.10;

/// calibration_multiplier pulls the closed-form section speeds back to real lap times of the
/// reference tracks. Both the timing and the breakdown path read this one table.
pub fn calibration_multiplier(track_type: TrackType) -> f64 {
    match track_type {
        TrackType::Short => 0.845,
        TrackType::Intermediate => 1.018,
        TrackType::Superspeedway => 0.890,
        TrackType::Road => 1.042,
    }
}

/// effective_skill adjusts a skill rating for the driver's mental state. Confidence above 50
/// boosts it by up to 5%, frustration above 50 costs up to 5%.
pub fn effective_skill(skill: f64, mental_state: &MentalState) -> f64 {
    let mut factor = 1.0;

    if mental_state.confidence > 50.0 {
        factor += MAX_MENTAL_SKILL_EFFECT * (mental_state.confidence.min(100.0) - 50.0) / 50.0;
    }
    if mental_state.frustration > 50.0 {
        factor -= MAX_MENTAL_SKILL_EFFECT * (mental_state.frustration.min(100.0) - 50.0) / 50.0;
    }

    (skill * factor).clamp(0.0, 100.0)
}

/// Everything about one car that changes the length of its next lap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapInputs {
    pub laps_on_tires: u32,
    pub fuel_gallons: f64,
    /// Corner skill after the mental state adjustment.
    pub skill: f64,
    pub drafting: bool,
    pub damage: f64,
}

impl Default for LapInputs {
    fn default() -> Self {
        LapInputs {
            laps_on_tires: 0,
            fuel_gallons: 0.0,
            skill: 50.0,
            drafting: false,
            damage: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionTiming {
    pub kind: SectionKind,
    /// (mph)
    pub speed: f64,
    /// (s)
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapBreakdown {
    /// (s)
    pub lap_time: f64,
    /// (mph)
    pub top_speed: f64,
    pub sections: Vec<SectionTiming>,
}

/// LapTimeIntegrator is the single source of truth for the lap time of a car.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapTimeIntegrator {
    car: CarSpec,
}

impl LapTimeIntegrator {
    pub fn new(car: CarSpec) -> LapTimeIntegrator {
        LapTimeIntegrator { car }
    }

    pub fn car(&self) -> &CarSpec {
        &self.car
    }

    /// section_timing returns speed and time of one section.
    fn section_timing(
        &self,
        track: &Track,
        section: &TrackSection,
        inputs: &LapInputs,
    ) -> SectionTiming {
        let track_type = track.track_type;

        let base_speed = match section.kind {
            SectionKind::Turn => {
                let grip = tireset::grip(inputs.laps_on_tires, track_type);
                let mu = speed::friction_coefficient(grip) * track.surface_grip;
                speed::corner_speed(section.radius_ft, section.banking_deg, mu, inputs.skill)
            }
            SectionKind::Straight => speed::straight_speed(&self.car),
        } * calibration_multiplier(track_type);

        let v = speed::section_speed(
            base_speed,
            section.kind,
            inputs.laps_on_tires,
            inputs.fuel_gallons,
            track_type,
            inputs.drafting,
        );

        SectionTiming {
            kind: section.kind,
            speed: v,
            time: section.length_ft / (v * MPH_TO_FT_S),
        }
    }

    fn damage_factor(inputs: &LapInputs) -> f64 {
        1.0 + MAX_DAMAGE_PENALTY * inputs.damage.clamp(0.0, 100.0) / 100.0
    }

    /// lap_time returns the current lap time (s) of a car on the given track.
    pub fn lap_time(&self, track: &Track, inputs: &LapInputs) -> f64 {
        let mut t_lap = 0.0;

        for section in track.sections() {
            t_lap += self.section_timing(track, section, inputs).time;
        }

        t_lap * Self::damage_factor(inputs)
    }

    /// breakdown returns the lap time together with per-section timings and the top speed.
    pub fn breakdown(&self, track: &Track, inputs: &LapInputs) -> LapBreakdown {
        let sections: Vec<SectionTiming> = track
            .sections()
            .iter()
            .map(|section| self.section_timing(track, section, inputs))
            .collect();

        let top_speed = sections.iter().map(|s| s.speed).fold(0.0, f64::max);
        let lap_time = sections.iter().map(|s| s.time).sum::<f64>() * Self::damage_factor(inputs);

        LapBreakdown {
            lap_time,
            top_speed,
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pre::reference_tracks;
    use approx::assert_relative_eq;

    fn track(id: &str) -> Track {
        Track::new(&reference_tracks::track_pars(id).unwrap()).unwrap()
    }

    fn fresh(fuel_gallons: f64) -> LapInputs {
        LapInputs {
            fuel_gallons,
            ..LapInputs::default()
        }
    }

    fn integrator() -> LapTimeIntegrator {
        LapTimeIntegrator::new(CarSpec::default())
    }

    #[test]
    fn bristol_fresh_lap_time() {
        let t = integrator().lap_time(&track("bristol"), &fresh(18.0));
        assert!((14.0..=16.5).contains(&t), "lap time {}", t);
    }

    #[test]
    fn bristol_tire_wear_penalty() {
        let bristol = track("bristol");
        let t_fresh = integrator().lap_time(&bristol, &fresh(18.0));
        let worn = LapInputs {
            laps_on_tires: 50,
            ..fresh(18.0)
        };
        let penalty = integrator().lap_time(&bristol, &worn) - t_fresh;
        assert!((0.3..=4.5).contains(&penalty), "penalty {}", penalty);
    }

    #[test]
    fn daytona_draft_benefit() {
        let daytona = track("daytona");
        let alone = integrator().lap_time(&daytona, &fresh(18.0));
        let drafting = LapInputs {
            drafting: true,
            ..fresh(18.0)
        };
        let benefit = alone - integrator().lap_time(&daytona, &drafting);
        assert!((0.1..=1.0).contains(&benefit), "benefit {}", benefit);
    }

    #[test]
    fn bristol_fuel_weight_penalty() {
        let bristol = track("bristol");
        let full = integrator().lap_time(&bristol, &fresh(18.0));
        let empty = integrator().lap_time(&bristol, &fresh(0.0));
        let penalty = full - empty;
        assert!((0.3..=1.5).contains(&penalty), "penalty {}", penalty);
    }

    #[test]
    fn breakdown_agrees_with_lap_time() {
        for id in reference_tracks::REFERENCE_TRACK_IDS {
            let track = track(id);
            let inputs = LapInputs {
                laps_on_tires: 37,
                fuel_gallons: 9.5,
                skill: 72.0,
                drafting: true,
                damage: 12.0,
            };
            let breakdown = integrator().breakdown(&track, &inputs);
            let lap_time = integrator().lap_time(&track, &inputs);
            assert_relative_eq!(breakdown.lap_time, lap_time, epsilon = 1e-9);
            assert_eq!(breakdown.sections.len(), track.sections().len());
            assert!(breakdown.sections.iter().all(|s| s.speed <= breakdown.top_speed));
        }
    }

    #[test]
    fn damage_slows_the_lap() {
        let bristol = track("bristol");
        let clean = integrator().lap_time(&bristol, &fresh(10.0));
        let damaged = integrator().lap_time(
            &bristol,
            &LapInputs {
                damage: 100.0,
                ..fresh(10.0)
            },
        );
        assert_relative_eq!(damaged, clean * 1.1, epsilon = 1e-9);
    }

    #[test]
    fn mental_state_adjusts_skill() {
        let calm = MentalState::BASELINE;
        assert_eq!(effective_skill(60.0, &calm), 60.0);

        let confident = MentalState {
            confidence: 100.0,
            ..calm
        };
        assert_relative_eq!(effective_skill(60.0, &confident), 63.0, epsilon = 1e-12);

        let frustrated = MentalState {
            frustration: 100.0,
            ..calm
        };
        assert_relative_eq!(effective_skill(60.0, &frustrated), 57.0, epsilon = 1e-12);
        assert_eq!(effective_skill(99.0, &confident), 100.0);
    }

    #[test]
    fn better_driver_laps_faster() {
        let bristol = track("bristol");
        let slow = integrator().lap_time(&bristol, &LapInputs { skill: 20.0, ..fresh(18.0) });
        let fast = integrator().lap_time(&bristol, &LapInputs { skill: 90.0, ..fresh(18.0) });
        assert!(fast < slow);
    }
}
