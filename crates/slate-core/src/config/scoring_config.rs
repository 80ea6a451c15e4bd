//! Strategy scoring weights.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Points added per unit of ceiling probability. Default: 10.0.
    pub ceiling_prob_weight: Option<f64>,
    /// Points added per unit of floor probability. Default: 10.0.
    pub floor_prob_weight: Option<f64>,
    /// Balanced weights for projection/floor/ceiling. Default: 0.5/0.25/0.25.
    pub balanced_projection_weight: Option<f64>,
    pub balanced_floor_weight: Option<f64>,
    pub balanced_ceiling_weight: Option<f64>,
    /// Ownership penalty k in `projection - k * (ownership/100)^2`. Default: 20.0.
    pub contrarian_penalty: Option<f64>,
    /// Scale of the pairwise correlation bonus. Default: 0.5.
    pub correlation_weight: Option<f64>,
}

/// Resolved scoring weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub ceiling_prob: f64,
    pub floor_prob: f64,
    pub balanced_projection: f64,
    pub balanced_floor: f64,
    pub balanced_ceiling: f64,
    pub contrarian_penalty: f64,
    pub correlation: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringConfig::default().weights()
    }
}

impl ScoringConfig {
    pub fn weights(&self) -> ScoringWeights {
        ScoringWeights {
            ceiling_prob: self.ceiling_prob_weight.unwrap_or(10.0),
            floor_prob: self.floor_prob_weight.unwrap_or(10.0),
            balanced_projection: self.balanced_projection_weight.unwrap_or(0.5),
            balanced_floor: self.balanced_floor_weight.unwrap_or(0.25),
            balanced_ceiling: self.balanced_ceiling_weight.unwrap_or(0.25),
            contrarian_penalty: self.contrarian_penalty.unwrap_or(20.0),
            correlation: self.correlation_weight.unwrap_or(0.5),
        }
    }
}
