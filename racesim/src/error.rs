use thiserror::Error;

/// RaceError covers every condition the library reports to its caller instead of silently
/// tolerating it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RaceError {
    #[error("Invalid track definition: {0}")]
    InvalidTrack(String),

    #[error("Invalid race configuration: {0}")]
    InvalidConfig(String),

    #[error("Race results requested but no player driver is registered")]
    NoPlayerDriver,

    #[error("No decision is pending")]
    NoActiveDecision,

    #[error("Decision {0} is not the pending decision")]
    StaleDecision(u32),

    #[error("Decision {decision_id} has no option {choice_id}")]
    UnknownChoice { decision_id: u32, choice_id: String },

    #[error("Finish position must be at least 1, got {0}")]
    InvalidFinishPosition(u32),
}

pub type Result<T> = std::result::Result<T, RaceError>;
