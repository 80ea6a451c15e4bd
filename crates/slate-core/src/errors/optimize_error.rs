//! Optimization errors.
//!
//! Infeasibility and timeouts are outcomes, not errors; see
//! [`crate::types::OptimizeOutcome`].

use super::error_code::SlateErrorCode;
use super::{ConfigError, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SlateErrorCode for OptimizeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
