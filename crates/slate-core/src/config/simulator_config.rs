//! Monte Carlo simulator configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Worker threads. 0 or unset uses one per core.
    pub workers: Option<usize>,
    /// Iterations per RNG stream. Changing it changes seeded output. Default: 1024.
    pub chunk_size: Option<u32>,
    /// Largest accepted iteration count. Default: 1_000_000.
    pub max_iterations: Option<u32>,
    /// Cash-game payout as a multiple of the entry fee. Default: 1.8.
    pub cash_multiplier: Option<f64>,
}

impl SimulatorConfig {
    pub fn effective_workers(&self) -> usize {
        match self.workers {
            Some(n) if n > 0 => n,
            _ => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }

    pub fn effective_chunk_size(&self) -> u32 {
        self.chunk_size.unwrap_or(1024).max(1)
    }

    pub fn effective_max_iterations(&self) -> u32 {
        self.max_iterations.unwrap_or(1_000_000)
    }

    pub fn effective_cash_multiplier(&self) -> f64 {
        self.cash_multiplier.unwrap_or(1.8)
    }
}
