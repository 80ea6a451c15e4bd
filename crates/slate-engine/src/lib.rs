//! # slate-engine
//!
//! Lineup optimization and contest simulation.
//!
//! Leaves first: correlation matrix, player analytics, single-lineup
//! branch-and-bound search, exposure-balanced lineup sets, result cache,
//! correlated Monte Carlo simulation, and the [`SlateEngine`] facade.

pub mod analytics;
pub mod cache;
pub mod correlation;
pub mod exposure;
pub mod optimizer;
pub mod service;
pub mod simulation;

pub use analytics::{AnalyticsBatch, AnalyticsEngine, PlayerAnalytics};
pub use cache::MokaResultCache;
pub use correlation::{CorrelationMatrix, CorrelationRules};
pub use service::{OptimizeRequest, SimulationRequest, SlateEngine};
