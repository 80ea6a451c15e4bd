//! Payout lines resolved against the simulated field.

use slate_core::{PayoutLine, PayoutTier};

use super::stats::percentile;

/// Score lines with their payout multipliers, highest line first.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutTable {
    lines: Vec<(f64, f64)>,
}

impl PayoutTable {
    /// Resolve tiers. `FieldPercentile` lines become quantiles of `field`,
    /// which must be sorted ascending.
    pub fn resolve(tiers: &[PayoutTier], field: &[f64]) -> Self {
        let mut lines: Vec<(f64, f64)> = tiers
            .iter()
            .map(|t| {
                let line = match t.line {
                    PayoutLine::FieldPercentile(q) => percentile(field, q),
                    PayoutLine::Score(s) => s,
                };
                (line, t.multiplier)
            })
            .collect();
        lines.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self { lines }
    }

    /// Best multiplier among the lines `score` reaches, 0 when it cashes none.
    pub fn multiplier_for(&self, score: f64) -> f64 {
        self.lines
            .iter()
            .filter(|(line, _)| score >= *line)
            .map(|(_, m)| *m)
            .fold(0.0, f64::max)
    }

    /// Lowest paying line.
    pub fn cash_line(&self) -> Option<f64> {
        self.lines.last().map(|(line, _)| *line)
    }

    pub fn lines(&self) -> Vec<f64> {
        self.lines.iter().map(|(line, _)| *line).collect()
    }
}
