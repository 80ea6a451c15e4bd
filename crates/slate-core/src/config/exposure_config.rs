//! Exposure manager configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ExposureConfig {
    /// Rejected candidates tolerated per lineup before the diversity
    /// requirement is relaxed by one player. Default: 5.
    pub max_retries: Option<u32>,
}

impl ExposureConfig {
    pub fn effective_max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(5).max(1)
    }
}
