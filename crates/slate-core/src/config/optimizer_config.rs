//! Lineup search configuration.

use serde::{Deserialize, Serialize};

use crate::types::PerformanceMode;

/// Per-mode search limits. Every field falls back to the mode default.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ModeLimitsConfig {
    /// Keep only the top-M candidates per roster slot. 0 disables the cap.
    pub candidates_per_slot: Option<usize>,
    /// Upper bound on salary buckets in the completion table.
    pub max_buckets: Option<u32>,
    /// Search nodes expanded before stopping with a partial result.
    pub node_budget: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Mode used when a request does not name one. Default: balanced.
    pub default_mode: Option<PerformanceMode>,
    /// Nodes between cancellation/deadline checks. Default: 1024.
    pub poll_interval: Option<u64>,
    pub speed: ModeLimitsConfig,
    pub balanced: ModeLimitsConfig,
    pub quality: ModeLimitsConfig,
}

/// Resolved limits for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub candidates_per_slot: Option<usize>,
    pub max_buckets: u32,
    pub node_budget: u64,
    pub poll_interval: u64,
}

impl OptimizerConfig {
    pub fn effective_default_mode(&self) -> PerformanceMode {
        self.default_mode.unwrap_or_default()
    }

    pub fn effective_poll_interval(&self) -> u64 {
        self.poll_interval.unwrap_or(1024).max(1)
    }

    /// Limits for a performance mode.
    pub fn limits_for(&self, mode: PerformanceMode) -> SearchLimits {
        let (section, cap, buckets, budget) = match mode {
            PerformanceMode::Speed => (&self.speed, 10, 100, 250_000),
            PerformanceMode::Balanced => (&self.balanced, 20, 250, 2_000_000),
            PerformanceMode::Quality => (&self.quality, 40, 1_000, 20_000_000),
        };
        let cap = section.candidates_per_slot.unwrap_or(cap);
        SearchLimits {
            candidates_per_slot: (cap > 0).then_some(cap),
            max_buckets: section.max_buckets.unwrap_or(buckets).max(1),
            node_budget: section.node_budget.unwrap_or(budget).max(1),
            poll_interval: self.effective_poll_interval(),
        }
    }
}
