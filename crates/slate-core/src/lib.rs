//! # slate-core
//!
//! Core types, errors, configuration, progress events, cancellation,
//! tracing, and constants for the slate lineup engine.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod traits;
pub mod tracing;
pub mod types;

pub use config::SlateConfig;
pub use errors::{
    CacheError, ConfigError, OptimizeError, SimulationError, SlateErrorCode, ValidationError,
};
pub use traits::{
    CacheKey, CacheLookup, CachedValue, Cancellable, CancellationToken, Computed, NoCache,
    ResultCache,
};
pub use types::*;
