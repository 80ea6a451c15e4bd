//! Simulation errors.

use super::error_code::{self, SlateErrorCode};
use super::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("simulation deadline elapsed before any iteration completed")]
    Timeout,

    #[error("simulation cancelled before any iteration completed")]
    Cancelled,

    #[error("worker pool could not be built: {0}")]
    WorkerPool(String),
}

impl SlateErrorCode for SimulationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::Timeout => error_code::SIMULATION_TIMEOUT,
            Self::Cancelled => error_code::CANCELLED,
            Self::WorkerPool(_) => error_code::WORKER_POOL_ERROR,
        }
    }
}
