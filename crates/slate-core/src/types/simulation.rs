//! Contest definitions and simulation results.

use serde::{Deserialize, Serialize};

use super::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestType {
    /// Flat payout, roughly half the field paid.
    Cash,
    /// Large field, top-heavy payout.
    Gpp,
}

impl ContestType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Gpp => "gpp",
        }
    }

    /// Default payout structure, expressed against the modeled field.
    ///
    /// The field is the simulated lineup set itself, so the lines are
    /// relative: a lone lineup always cashes at the median about half the
    /// time, however strong it is. Pass fixed score tiers on the contest
    /// to judge a lineup against an absolute bar.
    pub fn default_tiers(&self, cash_multiplier: f64) -> Vec<PayoutTier> {
        match self {
            Self::Cash => vec![PayoutTier::percentile(0.50, cash_multiplier)],
            Self::Gpp => vec![
                PayoutTier::percentile(0.999, 100.0),
                PayoutTier::percentile(0.99, 20.0),
                PayoutTier::percentile(0.95, 5.0),
                PayoutTier::percentile(0.80, 2.0),
            ],
        }
    }
}

impl std::fmt::Display for ContestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Score a lineup must reach to be paid at a tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutLine {
    /// Quantile of the modeled field (pooled simulated scores), 0..1.
    FieldPercentile(f64),
    /// Fixed score.
    Score(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutTier {
    pub line: PayoutLine,
    /// Payout as a multiple of the entry fee.
    pub multiplier: f64,
}

impl PayoutTier {
    pub fn percentile(quantile: f64, multiplier: f64) -> Self {
        Self {
            line: PayoutLine::FieldPercentile(quantile),
            multiplier,
        }
    }

    pub fn score(score: f64, multiplier: f64) -> Self {
        Self {
            line: PayoutLine::Score(score),
            multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestConfig {
    pub kind: ContestType,
    pub entry_fee: Cents,
    /// Overrides the contest type's default payout structure.
    #[serde(default)]
    pub tiers: Option<Vec<PayoutTier>>,
}

impl ContestConfig {
    pub fn cash(entry_fee: Cents) -> Self {
        Self {
            kind: ContestType::Cash,
            entry_fee,
            tiers: None,
        }
    }

    pub fn gpp(entry_fee: Cents) -> Self {
        Self {
            kind: ContestType::Gpp,
            entry_fee,
            tiers: None,
        }
    }

    pub fn with_tiers(mut self, tiers: Vec<PayoutTier>) -> Self {
        self.tiers = Some(tiers);
        self
    }
}

/// Order statistics of a lineup's simulated scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl Percentiles {
    /// Validate the ordering invariant: p10 <= p25 <= ... <= p99.
    pub fn is_ordered(&self) -> bool {
        let v = self.as_array();
        v.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn as_array(&self) -> [f64; 7] {
        [
            self.p10, self.p25, self.p50, self.p75, self.p90, self.p95, self.p99,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupSimulation {
    pub lineup_index: usize,
    pub expected_score: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub percentiles: Percentiles,
    /// Fraction of iterations at or above the lowest paying line.
    pub cash_rate: f64,
    /// Mean of (payout - fee) / fee.
    pub roi: f64,
    pub top_1_rate: f64,
    pub top_10_rate: f64,
    pub top_20_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub lineup_count: usize,
    pub mean_expected_score: f64,
    pub mean_cash_rate: f64,
    /// Fraction of iterations where at least one lineup cashed.
    pub any_cash_rate: f64,
    pub portfolio_roi: f64,
    /// Expected profit over the whole set, in cents.
    pub expected_profit: Cents,
    pub best_lineup_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub contest: ContestType,
    pub lineups: Vec<LineupSimulation>,
    pub portfolio: PortfolioStats,
    /// Resolved score lines, highest tier first.
    pub payout_lines: Vec<f64>,
    pub iterations_requested: u32,
    pub iterations_completed: u32,
    pub seed: u64,
    /// Deadline or cancellation stopped the run early.
    pub partial: bool,
    pub elapsed_ms: u64,
    pub cache_hit: bool,
}
