//! Grouping-key correlation coefficients.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Coefficient for players on the same team. Default: 0.2.
    pub same_team: Option<f64>,
    /// Coefficient for players in the same game. Default: 0.1.
    pub same_game: Option<f64>,
    /// Coefficient for players in the same tee-time wave. Default: 0.3.
    pub same_wave: Option<f64>,
}

impl CorrelationConfig {
    pub fn effective_same_team(&self) -> f64 {
        self.same_team.unwrap_or(0.2)
    }

    pub fn effective_same_game(&self) -> f64 {
        self.same_game.unwrap_or(0.1)
    }

    pub fn effective_same_wave(&self) -> f64 {
        self.same_wave.unwrap_or(0.3)
    }
}
