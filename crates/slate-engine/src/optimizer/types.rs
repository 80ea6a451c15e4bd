//! Search inputs and outputs.

use std::collections::BTreeSet;

use slate_core::{GeneratedLineup, PlayerId};

/// Per-call adjustments layered over the request constraints by the
/// exposure manager.
#[derive(Debug, Clone, Default)]
pub struct SearchAdjustments {
    pub extra_locked: BTreeSet<PlayerId>,
    pub extra_excluded: BTreeSet<PlayerId>,
    /// Lineups to stay away from, as player id sets.
    pub avoid: Vec<Vec<PlayerId>>,
    /// Largest number of players a result may share with any avoided lineup.
    pub max_shared: usize,
}

/// Why a search stopped before proving optimality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    NodeBudget,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub memo_entries: u64,
    pub stopped: Option<StopReason>,
}

/// Outcome of one single-lineup search.
#[derive(Debug, Clone, PartialEq)]
pub enum LineupSearch {
    /// Best lineup found. `partial` means the search stopped early and the
    /// lineup is the incumbent, not a proven optimum.
    Found { lineup: GeneratedLineup, partial: bool },
    /// No lineup satisfies the constraints.
    Infeasible { reason: String },
    /// Stopped before any lineup was found.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub outcome: LineupSearch,
    pub stats: SearchStats,
}
