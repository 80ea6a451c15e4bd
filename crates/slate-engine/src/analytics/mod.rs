//! Analytics engine: per-player volatility, value and ceiling/floor
//! probabilities under a normal outcome model.

pub mod engine;
pub mod types;

pub use engine::AnalyticsEngine;
pub use types::{AnalyticsBatch, DegradedPlayer, PlayerAnalytics};
