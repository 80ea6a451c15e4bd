//! Scoring strategies and performance modes.

use serde::{Deserialize, Serialize};

/// Lineup scoring strategy. Each variant resolves to one scoring function
/// at the start of an optimization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Upside: ceiling plus a bonus for the probability of a ceiling game.
    Ceiling,
    /// Safety: floor plus a bonus for the probability of clearing the floor target.
    Floor,
    /// Weighted average of projection, floor and ceiling.
    Balanced,
    /// Projection penalised by squared ownership.
    Contrarian,
    /// Projection plus pairwise correlation bonus within the lineup.
    Correlation,
    /// Points per thousand dollars of salary.
    Value,
}

impl Strategy {
    pub const ALL: &'static [Strategy] = &[
        Self::Ceiling,
        Self::Floor,
        Self::Balanced,
        Self::Contrarian,
        Self::Correlation,
        Self::Value,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ceiling => "ceiling",
            Self::Floor => "floor",
            Self::Balanced => "balanced",
            Self::Contrarian => "contrarian",
            Self::Correlation => "correlation",
            Self::Value => "value",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Search effort. Maps to candidate caps, salary-bucket resolution and a
/// node budget in `OptimizerConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMode {
    Speed,
    #[default]
    Balanced,
    Quality,
}

impl PerformanceMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Balanced => "balanced",
            Self::Quality => "quality",
        }
    }
}

impl std::str::FromStr for PerformanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "speed" => Ok(Self::Speed),
            "balanced" => Ok(Self::Balanced),
            "quality" => Ok(Self::Quality),
            other => Err(format!("unknown performance mode '{other}'")),
        }
    }
}

impl std::fmt::Display for PerformanceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
