//! Optimization outcomes and exposure reporting.

use serde::{Deserialize, Serialize};

use super::{GeneratedLineup, PerformanceMode, PlayerId, Strategy};

/// Realized exposure of one player across a lineup set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerExposure {
    pub player: PlayerId,
    pub count: usize,
    pub exposure: f64,
    pub min: f64,
    pub max: f64,
}

/// A player whose realized exposure fell outside its bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureViolation {
    pub player: PlayerId,
    pub realized: f64,
    pub min: f64,
    pub max: f64,
    /// How far below `min` the realized exposure is (0 when not under-used).
    pub shortfall: f64,
    /// How far above `max` the realized exposure is (0 when not over-used).
    pub excess: f64,
}

/// Record of the diversity requirement being loosened while building a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiversityRelaxation {
    /// Index of the lineup being generated when the relaxation happened.
    pub lineup_index: usize,
    pub from: u8,
    pub to: u8,
}

/// Exposure outcome of a lineup set. Violations are reported, not raised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureReport {
    pub requested: usize,
    pub generated: usize,
    pub exposures: Vec<PlayerExposure>,
    pub violations: Vec<ExposureViolation>,
    pub relaxations: Vec<DiversityRelaxation>,
    /// Lineup indices where temporary min-exposure locks made the search
    /// infeasible and were dropped.
    pub dropped_locks: Vec<usize>,
    /// Lineup indices where max-exposure exclusions were lifted to keep
    /// the set growing.
    pub exposure_overrides: Vec<usize>,
}

impl ExposureReport {
    /// True when every player is within bounds and nothing was relaxed.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
            && self.relaxations.is_empty()
            && self.dropped_locks.is_empty()
            && self.exposure_overrides.is_empty()
            && self.generated == self.requested
    }

    pub fn exposure_of(&self, id: PlayerId) -> f64 {
        self.exposures
            .iter()
            .find(|e| e.player == id)
            .map(|e| e.exposure)
            .unwrap_or(0.0)
    }

    pub fn violation_for(&self, id: PlayerId) -> Option<&ExposureViolation> {
        self.violations.iter().find(|v| v.player == id)
    }
}

/// Execution metadata attached to every optimization outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationMetadata {
    pub strategy: Strategy,
    pub mode: PerformanceMode,
    pub elapsed_ms: u64,
    pub states_explored: u64,
    pub memo_entries: u64,
    pub cache_hit: bool,
    /// Search stopped early (cancellation, deadline or node budget).
    pub partial: bool,
}

impl OptimizationMetadata {
    pub fn new(strategy: Strategy, mode: PerformanceMode) -> Self {
        Self {
            strategy,
            mode,
            elapsed_ms: 0,
            states_explored: 0,
            memo_entries: 0,
            cache_hit: false,
            partial: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub lineups: Vec<GeneratedLineup>,
    pub exposure: ExposureReport,
    pub metadata: OptimizationMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfeasibleReport {
    pub reason: String,
    pub metadata: OptimizationMetadata,
}

/// Result of `optimize`. Infeasibility and timeouts are outcomes, never
/// errors and never an empty success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OptimizeOutcome {
    Optimized(OptimizationResult),
    Infeasible(InfeasibleReport),
    /// Stopped before any lineup was found.
    Timeout(OptimizationMetadata),
}

impl OptimizeOutcome {
    pub fn metadata(&self) -> &OptimizationMetadata {
        match self {
            Self::Optimized(r) => &r.metadata,
            Self::Infeasible(r) => &r.metadata,
            Self::Timeout(m) => m,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut OptimizationMetadata {
        match self {
            Self::Optimized(r) => &mut r.metadata,
            Self::Infeasible(r) => &mut r.metadata,
            Self::Timeout(m) => m,
        }
    }

    pub fn lineups(&self) -> &[GeneratedLineup] {
        match self {
            Self::Optimized(r) => &r.lineups,
            _ => &[],
        }
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible(_))
    }

    /// Whether the outcome is deterministic for its inputs and may be cached.
    pub fn is_cacheable(&self) -> bool {
        match self {
            Self::Optimized(r) => !r.metadata.partial,
            Self::Infeasible(_) => true,
            Self::Timeout(_) => false,
        }
    }
}
