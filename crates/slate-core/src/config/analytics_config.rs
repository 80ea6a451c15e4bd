//! Player analytics configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Ceiling target in points per $1k of salary. Default: 5.0.
    pub ceiling_multiplier: Option<f64>,
    /// Floor target in points per $1k of salary. Default: 2.0.
    pub floor_multiplier: Option<f64>,
    /// Relative spread used when a player's floor/ceiling are unusable. Default: 0.35.
    pub default_spread: Option<f64>,
    /// History samples required before history informs volatility. Default: 3.
    pub min_history: Option<usize>,
    /// Weight of the historical std-dev when blended with the range. Default: 0.5.
    pub history_weight: Option<f64>,
}

impl AnalyticsConfig {
    pub fn effective_ceiling_multiplier(&self) -> f64 {
        self.ceiling_multiplier.unwrap_or(5.0)
    }

    pub fn effective_floor_multiplier(&self) -> f64 {
        self.floor_multiplier.unwrap_or(2.0)
    }

    pub fn effective_default_spread(&self) -> f64 {
        self.default_spread.unwrap_or(0.35)
    }

    pub fn effective_min_history(&self) -> usize {
        self.min_history.unwrap_or(3)
    }

    pub fn effective_history_weight(&self) -> f64 {
        self.history_weight.unwrap_or(0.5)
    }
}
