use crate::core::car::CarSpec;
use crate::core::fuel;
use crate::core::tireset;
use crate::core::track::{SectionKind, TrackType};

/// (ft/s^2) Gravitational acceleration.
pub const G_FT_S2: f64 = 32.174;
/// Conversion factor between mph and ft/s.
pub const MPH_TO_FT_S: f64 = 5280.0 / 3600.0;

/// Scales (hp / cd)^(1/3) so that 670 hp / 0.32 / 3450 lb runs 185 mph.
const STRAIGHT_CALIBRATION: f64 = 14.4609;
const REFERENCE_WEIGHT_LB: f64 = 3450.0;

/// Friction coefficient of a tire at zero grip and its gain up to full grip.
const MU_BASE: f64 = 0.580;
const MU_GRIP_GAIN: f64 = 0.300;

const MAX_SKILL_EFFECT: f64 = 0.05;
/// Relative speed loss per unit of lost grip.
const TIRE_SPEED_SENSITIVITY: f64 = 0.10;
/// Straights are power-limited, tire wear only counts half there.
const STRAIGHT_TIRE_WEIGHT: f64 = 0.5;
/// (mph) Speed gained on straights in the draft.
pub const DRAFT_SPEED_BONUS: f64 = 3.0;
/// Upper bound of the relative speed loss caused by fuel weight.
const MAX_FUEL_SPEED_LOSS: f64 = 0.5;

/// Relative speed loss per second of fuel weight penalty, roughly one over the reference lap time.
fn fuel_seconds_to_fraction(track_type: TrackType) -> f64 {
    match track_type {
        TrackType::Short => 1.0 / 15.0,
        TrackType::Intermediate => 1.0 / 30.0,
        TrackType::Superspeedway => 1.0 / 48.0,
        TrackType::Road => 1.0 / 75.0,
    }
}

/// friction_coefficient maps tire grip [0.5, 1.0] onto the effective friction coefficient,
/// 0.88 for fresh and 0.73 for fully worn tires.
pub fn friction_coefficient(grip: f64) -> f64 {
    MU_BASE + grip * MU_GRIP_GAIN
}

/// straight_speed returns the top speed (mph) of a car on a straight.
pub fn straight_speed(car: &CarSpec) -> f64 {
    let power_to_drag = (car.horsepower / car.drag_coefficient).max(0.0);
    let weight_factor = (REFERENCE_WEIGHT_LB / car.weight_lb).cbrt();
    power_to_drag.cbrt() * weight_factor * STRAIGHT_CALIBRATION
}

/// corner_speed returns the maximum speed (mph) through a banked turn
///
/// `v = sqrt(r * g * (sin(theta) + mu * cos(theta)) / (cos(theta) - mu * sin(theta)))`
///
/// falling back to the flat-turn formula `v = sqrt(r * g * mu)` when the denominator is not
/// positive. Driver skill changes the result by up to +-5% around a skill of 50.
pub fn corner_speed(radius_ft: f64, banking_deg: f64, mu: f64, skill: f64) -> f64 {
    let theta = banking_deg.to_radians();
    let denom = theta.cos() - mu * theta.sin();

    let v_ft_s = if denom > f64::EPSILON {
        (radius_ft * G_FT_S2 * (theta.sin() + mu * theta.cos()) / denom).sqrt()
    } else {
        (radius_ft * G_FT_S2 * mu).sqrt()
    };

    v_ft_s / MPH_TO_FT_S * skill_factor(skill)
}

fn skill_factor(skill: f64) -> f64 {
    1.0 + (skill.clamp(0.0, 100.0) - 50.0) / 50.0 * MAX_SKILL_EFFECT
}

/// section_speed adjusts a base speed (mph) for tire wear, fuel weight and draft.
///
/// Turns carry the full tire effect, straights half of it. The fuel weight penalty (s) is turned
/// into a relative speed loss of at most 50%. The draft bonus only exists on straights.
pub fn section_speed(
    base_speed: f64,
    kind: SectionKind,
    laps_on_tires: u32,
    fuel_gallons: f64,
    track_type: TrackType,
    drafting: bool,
) -> f64 {
    let grip = tireset::grip(laps_on_tires, track_type);
    let tire_loss = (1.0 - grip) * TIRE_SPEED_SENSITIVITY;

    let mut speed = match kind {
        SectionKind::Turn => base_speed * (1.0 - tire_loss),
        SectionKind::Straight => base_speed * (1.0 - tire_loss * STRAIGHT_TIRE_WEIGHT),
    };

    let fuel_loss = (fuel::weight_penalty(fuel_gallons, track_type)
        * fuel_seconds_to_fraction(track_type))
    .min(MAX_FUEL_SPEED_LOSS);
    speed *= 1.0 - fuel_loss;

    if drafting && kind == SectionKind::Straight {
        speed += DRAFT_SPEED_BONUS;
    }

    speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reference_car_runs_185_mph() {
        assert_relative_eq!(straight_speed(&CarSpec::default()), 185.0, epsilon = 0.05);
    }

    #[test]
    fn heavier_car_is_slower() {
        let heavy = CarSpec {
            weight_lb: 3800.0,
            ..CarSpec::default()
        };
        assert!(straight_speed(&heavy) < straight_speed(&CarSpec::default()));
    }

    #[test]
    fn friction_coefficient_calibration() {
        assert_relative_eq!(friction_coefficient(1.0), 0.88, epsilon = 1e-12);
        assert_relative_eq!(friction_coefficient(0.5), 0.73, epsilon = 1e-12);
    }

    #[test]
    fn banking_raises_corner_speed() {
        let mu = friction_coefficient(1.0);
        assert!(corner_speed(550.0, 26.0, mu, 50.0) > corner_speed(550.0, 0.0, mu, 50.0));
        // flat turn reduces to sqrt(r g mu)
        let flat = corner_speed(550.0, 0.0, mu, 50.0);
        assert_relative_eq!(flat, (550.0 * G_FT_S2 * mu).sqrt() / MPH_TO_FT_S, epsilon = 1e-9);
    }

    #[test]
    fn extreme_banking_falls_back_to_flat_formula() {
        // cos(theta) - mu sin(theta) <= 0 for theta = 60deg and mu = 0.88
        let v = corner_speed(1000.0, 60.0, 0.88, 50.0);
        assert!(v.is_finite());
        assert_relative_eq!(v, (1000.0 * G_FT_S2 * 0.88).sqrt() / MPH_TO_FT_S, epsilon = 1e-9);
    }

    #[test]
    fn skill_changes_corner_speed_by_five_percent() {
        let mu = friction_coefficient(1.0);
        let mid = corner_speed(550.0, 26.0, mu, 50.0);
        assert_relative_eq!(corner_speed(550.0, 26.0, mu, 100.0), mid * 1.05, epsilon = 1e-9);
        assert_relative_eq!(corner_speed(550.0, 26.0, mu, 0.0), mid * 0.95, epsilon = 1e-9);
    }

    fn superspeedway(kind: SectionKind, laps: u32, fuel_gal: f64, drafting: bool) -> f64 {
        section_speed(180.0, kind, laps, fuel_gal, TrackType::Superspeedway, drafting)
    }

    #[test]
    fn draft_never_slows_on_straights() {
        for laps in [0, 30, 200] {
            for fuel_gal in [0.0, 9.0, 18.0] {
                let with = superspeedway(SectionKind::Straight, laps, fuel_gal, true);
                let without = superspeedway(SectionKind::Straight, laps, fuel_gal, false);
                assert!(with > without);
            }
        }
    }

    #[test]
    fn draft_has_no_effect_in_turns() {
        let with = superspeedway(SectionKind::Turn, 12, 10.0, true);
        let without = superspeedway(SectionKind::Turn, 12, 10.0, false);
        assert_eq!(with, without);
    }

    #[test]
    fn tire_wear_hurts_turns_more_than_straights() {
        let short = |kind| section_speed(150.0, kind, 80, 0.0, TrackType::Short, false);
        let turn_loss = 1.0 - short(SectionKind::Turn) / 150.0;
        let straight_loss = 1.0 - short(SectionKind::Straight) / 150.0;
        assert_relative_eq!(turn_loss, 2.0 * straight_loss, epsilon = 1e-12);
    }

    #[test]
    fn fuel_weight_slows_the_car() {
        let full = section_speed(150.0, SectionKind::Straight, 0, 18.0, TrackType::Short, false);
        let empty = section_speed(150.0, SectionKind::Straight, 0, 0.0, TrackType::Short, false);
        assert!(full < empty);
        assert_eq!(empty, 150.0);
    }

    #[test]
    fn fuel_weight_loss_is_bounded() {
        // far beyond any real tank, the car must still move forward
        for gallons in [400.0, 5_000.0, 1e9] {
            let v = section_speed(150.0, SectionKind::Turn, 0, gallons, TrackType::Short, false);
            assert!(v.is_finite());
            assert_relative_eq!(v, 150.0 * (1.0 - MAX_FUEL_SPEED_LOSS), epsilon = 1e-9);
        }
    }
}
