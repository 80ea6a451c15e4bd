//! Lineup optimizer.
//!
//! Single-lineup search: candidate preparation, a memoized completion
//! bound over (player index, remaining-slot signature, salary bucket),
//! and depth-first branch-and-bound with exact feasibility checks.

pub mod bound;
pub mod candidates;
pub mod scoring;
pub mod search;
pub mod types;

pub use scoring::{PairBonus, Scorer};
pub use search::LineupOptimizer;
pub use types::{LineupSearch, SearchAdjustments, SearchReport, SearchStats, StopReason};
