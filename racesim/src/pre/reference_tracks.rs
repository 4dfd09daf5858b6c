use crate::core::track::{SectionKind, TrackPars, TrackSectionPars, TrackType};

/// Identifiers of the built-in tracks the lap time model is calibrated against.
pub const REFERENCE_TRACK_IDS: [&str; 4] = ["bristol", "charlotte", "daytona", "watkins_glen"];

fn straight(length_ft: f64) -> TrackSectionPars {
    TrackSectionPars {
        kind: SectionKind::Straight,
        length_ft,
        banking_deg: None,
        radius_ft: None,
    }
}

fn turn(length_ft: f64, radius_ft: f64, banking_deg: f64) -> TrackSectionPars {
    TrackSectionPars {
        kind: SectionKind::Turn,
        length_ft,
        banking_deg: Some(banking_deg),
        radius_ft: Some(radius_ft),
    }
}

/// track_pars returns the parameters of a built-in reference track, `None` for unknown ids.
pub fn track_pars(id: &str) -> Option<TrackPars> {
    let pars = match id {
        // 0.533mi concrete bowl, two straights and two long 26deg turns
        "bristol" => TrackPars {
            id: "bristol".to_owned(),
            name: "Bristol Motor Speedway".to_owned(),
            track_type: TrackType::Short,
            length_miles: 0.533,
            banking_deg: 26.0,
            surface_grip: 1.0,
            pit_time_loss: None,
            sections: vec![
                straight(650.0),
                turn(757.12, 550.0, 26.0),
                straight(650.0),
                turn(757.12, 550.0, 26.0),
            ],
        },
        // 1.5mi quad-oval, frontstretch modelled as a single straight
        "charlotte" => TrackPars {
            id: "charlotte".to_owned(),
            name: "Charlotte Motor Speedway".to_owned(),
            track_type: TrackType::Intermediate,
            length_miles: 1.5,
            banking_deg: 24.0,
            surface_grip: 1.0,
            pit_time_loss: None,
            sections: vec![
                straight(1980.0),
                turn(2220.0, 1000.0, 24.0),
                straight(1500.0),
                turn(2220.0, 1000.0, 24.0),
            ],
        },
        "daytona" => TrackPars {
            id: "daytona".to_owned(),
            name: "Daytona International Speedway".to_owned(),
            track_type: TrackType::Superspeedway,
            length_miles: 2.5,
            banking_deg: 31.0,
            surface_grip: 1.0,
            pit_time_loss: None,
            sections: vec![
                straight(3800.0),
                turn(3000.0, 1500.0, 31.0),
                straight(3400.0),
                turn(3000.0, 1500.0, 31.0),
            ],
        },
        "watkins_glen" => TrackPars {
            id: "watkins_glen".to_owned(),
            name: "Watkins Glen International".to_owned(),
            track_type: TrackType::Road,
            length_miles: 2.45,
            banking_deg: 4.0,
            surface_grip: 1.0,
            pit_time_loss: None,
            sections: vec![
                straight(1800.0),
                turn(240.0, 150.0, 2.0),
                straight(1300.0),
                turn(470.0, 300.0, 4.0),
                straight(2600.0),
                turn(250.0, 80.0, 0.0),
                straight(900.0),
                turn(1100.0, 350.0, 3.0),
                straight(1400.0),
                turn(380.0, 120.0, 2.0),
                straight(1896.0),
                turn(600.0, 200.0, 3.0),
            ],
        },
        _ => return None,
    };

    Some(pars)
}
