//! Domain types shared by every slate component.

pub mod constraints;
pub mod identifiers;
pub mod lineup;
pub mod outcome;
pub mod player;
pub mod simulation;
pub mod strategy;

pub use constraints::{Constraints, ExposureBounds, RosterSlot, StackKey, StackRule};
pub use identifiers::PlayerId;
pub use lineup::{GeneratedLineup, LineupSlot};
pub use outcome::{
    DiversityRelaxation, ExposureReport, ExposureViolation, InfeasibleReport,
    OptimizationMetadata, OptimizationResult, OptimizeOutcome, PlayerExposure,
};
pub use player::{Platform, Player};
pub use simulation::{
    ContestConfig, ContestType, LineupSimulation, PayoutLine, PayoutTier, Percentiles,
    PortfolioStats, SimulationResult,
};
pub use strategy::{PerformanceMode, Strategy};

/// Monetary amounts are integer minor units.
pub type Cents = i64;
