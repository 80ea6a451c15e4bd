//! Order statistics and contest metrics.

use statrs::statistics::Statistics;

use slate_core::constants::TOP_FRACTIONS;
use slate_core::{Cents, LineupSimulation, PayoutTier, Percentiles, PortfolioStats};

use super::monte_carlo::SampleRun;
use super::payout::PayoutTable;

/// Nearest-rank quantile of ascending `sorted`, `q` in 0..=1. 0 when empty.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn percentiles(sorted: &[f64]) -> Percentiles {
    Percentiles {
        p10: percentile(sorted, 0.10),
        p25: percentile(sorted, 0.25),
        p50: percentile(sorted, 0.50),
        p75: percentile(sorted, 0.75),
        p90: percentile(sorted, 0.90),
        p95: percentile(sorted, 0.95),
        p99: percentile(sorted, 0.99),
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

/// Per-lineup and portfolio results of a run.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub lineups: Vec<LineupSimulation>,
    pub portfolio: PortfolioStats,
    pub payout_lines: Vec<f64>,
}

/// Score a run against a contest. `tiers` with field percentiles resolve
/// against all simulated lineup scores pooled together.
pub fn evaluate(run: &SampleRun, tiers: &[PayoutTier], entry_fee: Cents) -> Evaluation {
    let pooled = sorted_copy(&run.scores.concat());
    let table = PayoutTable::resolve(tiers, &pooled);
    let cash_line = table.cash_line();
    let n = run.completed as usize;
    let lineup_count = run.scores.len();
    let fee = entry_fee as f64;

    let mut top_hits = vec![[0usize; 3]; lineup_count];
    let mut any_cash = 0usize;
    let top_cutoffs: Vec<usize> = TOP_FRACTIONS
        .iter()
        .map(|f| ((f * lineup_count as f64).ceil() as usize).max(1))
        .collect();
    for i in 0..n {
        let mut cashed = false;
        for (l, scores) in run.scores.iter().enumerate() {
            let s = scores[i];
            if cash_line.is_some_and(|c| s >= c) {
                cashed = true;
            }
            let rank = run.scores.iter().filter(|other| other[i] > s).count();
            for (t, &cutoff) in top_cutoffs.iter().enumerate() {
                if rank < cutoff {
                    top_hits[l][t] += 1;
                }
            }
        }
        if cashed {
            any_cash += 1;
        }
    }

    let rate = |count: usize| if n == 0 { 0.0 } else { count as f64 / n as f64 };
    let mut lineups = Vec::with_capacity(lineup_count);
    let mut mean_multipliers = Vec::with_capacity(lineup_count);
    for (l, scores) in run.scores.iter().enumerate() {
        let sorted = sorted_copy(scores);
        let expected = if scores.is_empty() { 0.0 } else { scores.iter().mean() };
        let variance = if scores.len() < 2 { 0.0 } else { scores.iter().variance() };
        let cashes = match cash_line {
            Some(c) => scores.iter().filter(|&&s| s >= c).count(),
            None => 0,
        };
        let mean_multiplier = if n == 0 {
            0.0
        } else {
            scores.iter().map(|&s| table.multiplier_for(s)).sum::<f64>() / n as f64
        };
        mean_multipliers.push(mean_multiplier);
        lineups.push(LineupSimulation {
            lineup_index: l,
            expected_score: expected,
            variance,
            std_dev: variance.sqrt(),
            percentiles: percentiles(&sorted),
            cash_rate: rate(cashes),
            roi: if entry_fee > 0 { mean_multiplier - 1.0 } else { 0.0 },
            top_1_rate: rate(top_hits[l][0]),
            top_10_rate: rate(top_hits[l][1]),
            top_20_rate: rate(top_hits[l][2]),
        });
    }

    let profit: f64 = mean_multipliers.iter().map(|m| (m - 1.0) * fee).sum();
    let best_lineup_index = lineups
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, l)| {
            if l.expected_score > best.1 {
                (i, l.expected_score)
            } else {
                best
            }
        })
        .0;
    let mean_of = |f: fn(&LineupSimulation) -> f64| {
        if lineups.is_empty() {
            0.0
        } else {
            lineups.iter().map(f).sum::<f64>() / lineups.len() as f64
        }
    };
    let portfolio = PortfolioStats {
        lineup_count,
        mean_expected_score: mean_of(|l| l.expected_score),
        mean_cash_rate: mean_of(|l| l.cash_rate),
        any_cash_rate: rate(any_cash),
        portfolio_roi: if entry_fee > 0 && lineup_count > 0 {
            profit / (fee * lineup_count as f64)
        } else {
            0.0
        },
        expected_profit: profit.round() as Cents,
        best_lineup_index,
    };

    Evaluation {
        lineups,
        portfolio,
        payout_lines: table.lines(),
    }
}
