//! Result cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Default: true.
    pub enabled: Option<bool>,
    /// Default: 1_000.
    pub max_entries: Option<u64>,
    /// Default: 300.
    pub optimization_ttl_secs: Option<u64>,
    /// Default: 900.
    pub simulation_ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_max_entries(&self) -> u64 {
        self.max_entries.unwrap_or(1_000)
    }

    pub fn optimization_ttl(&self) -> Duration {
        Duration::from_secs(self.optimization_ttl_secs.unwrap_or(300))
    }

    pub fn simulation_ttl(&self) -> Duration {
        Duration::from_secs(self.simulation_ttl_secs.unwrap_or(900))
    }
}
