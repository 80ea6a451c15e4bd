//! Request validation errors. Returned synchronously and verbatim.

use super::error_code::{self, SlateErrorCode};
use crate::types::PlayerId;

/// Malformed request input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("player pool is empty")]
    EmptyPool,

    #[error("duplicate player id {0} in pool")]
    DuplicatePlayer(PlayerId),

    #[error("salary cap must be positive, got {0}")]
    NonPositiveCap(i64),

    #[error("no roster slots were specified")]
    NoRosterSlots,

    #[error("roster slot '{0}' has a zero count")]
    EmptySlot(String),

    #[error("roster slot '{0}' is listed more than once")]
    DuplicateSlot(String),

    #[error("roster too large: {slots} slots (max {max_slots}), largest count {largest} (max {max_count})")]
    RosterTooLarge {
        slots: usize,
        max_slots: usize,
        largest: u8,
        max_count: u8,
    },

    #[error("requested lineup count must be at least 1")]
    ZeroLineups,

    #[error("player {0} is both locked and excluded")]
    LockedAndExcluded(PlayerId),

    #[error("unknown player id {0}")]
    UnknownPlayer(PlayerId),

    #[error("invalid exposure bounds for player {player}: min {min}, max {max}")]
    InvalidExposure { player: PlayerId, min: f64, max: f64 },

    #[error("min unique players {min_unique} exceeds roster size {roster_size}")]
    MinUniqueTooLarge { min_unique: u8, roster_size: usize },

    #[error("stack rule has min {min} greater than max {max}")]
    InvalidStack { min: u8, max: u8 },

    #[error("iterations must be positive")]
    NonPositiveIterations,

    #[error("iterations {requested} exceed the configured maximum {max}")]
    TooManyIterations { requested: u32, max: u32 },

    #[error("lineup set is empty")]
    EmptyLineupSet,

    #[error("lineup {index} is invalid: {message}")]
    InvalidLineup { index: usize, message: String },

    #[error("entry fee must not be negative, got {0}")]
    NegativeEntryFee(i64),

    #[error("invalid value for {field}: {message}")]
    InvalidInput { field: String, message: String },
}

impl SlateErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        error_code::VALIDATION_ERROR
    }
}
