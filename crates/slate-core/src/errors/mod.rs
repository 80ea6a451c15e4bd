//! Error handling for slate.
//! One error enum per subsystem, `thiserror` only.

pub mod cache_error;
pub mod config_error;
pub mod error_code;
pub mod optimize_error;
pub mod simulation_error;
pub mod validation_error;

pub use cache_error::CacheError;
pub use config_error::ConfigError;
pub use error_code::SlateErrorCode;
pub use optimize_error::OptimizeError;
pub use simulation_error::SimulationError;
pub use validation_error::ValidationError;
