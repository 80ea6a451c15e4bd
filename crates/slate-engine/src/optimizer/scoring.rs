//! Strategy scoring.
//!
//! A strategy resolves once per call into a per-player score function.
//! The correlation strategy adds a pairwise bonus on top of the
//! per-player projection.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use slate_core::config::ScoringWeights;
use slate_core::constants::CENTS_PER_THOUSAND;
use slate_core::{Cents, Player, PlayerId, Strategy};

use crate::analytics::{AnalyticsBatch, PlayerAnalytics};
use crate::correlation::CorrelationMatrix;

type ScoreFn = fn(&Player, &PlayerAnalytics, Cents, &ScoringWeights) -> f64;

fn ceiling_score(p: &Player, a: &PlayerAnalytics, _: Cents, w: &ScoringWeights) -> f64 {
    p.ceiling + w.ceiling_prob * a.ceiling_prob
}

fn floor_score(p: &Player, a: &PlayerAnalytics, _: Cents, w: &ScoringWeights) -> f64 {
    p.floor + w.floor_prob * a.floor_prob
}

fn balanced_score(p: &Player, _: &PlayerAnalytics, _: Cents, w: &ScoringWeights) -> f64 {
    let total = w.balanced_projection + w.balanced_floor + w.balanced_ceiling;
    if total <= 0.0 {
        return p.projection;
    }
    (w.balanced_projection * p.projection + w.balanced_floor * p.floor + w.balanced_ceiling * p.ceiling)
        / total
}

fn contrarian_score(p: &Player, _: &PlayerAnalytics, _: Cents, w: &ScoringWeights) -> f64 {
    let own = p.ownership / 100.0;
    p.projection - w.contrarian_penalty * own * own
}

fn projection_score(p: &Player, _: &PlayerAnalytics, _: Cents, _: &ScoringWeights) -> f64 {
    p.projection
}

fn value_score(p: &Player, _: &PlayerAnalytics, salary: Cents, _: &ScoringWeights) -> f64 {
    if salary <= 0 {
        return 0.0;
    }
    p.projection / (salary as f64 / CENTS_PER_THOUSAND)
}

fn resolve(strategy: Strategy) -> ScoreFn {
    match strategy {
        Strategy::Ceiling => ceiling_score,
        Strategy::Floor => floor_score,
        Strategy::Balanced => balanced_score,
        Strategy::Contrarian => contrarian_score,
        Strategy::Correlation => projection_score,
        Strategy::Value => value_score,
    }
}

/// Pairwise bonus `weight * coefficient * (proj_a + proj_b) / 2`, stored
/// both ways in an adjacency map keyed by player id. Rows follow
/// [`CorrelationMatrix::neighbors`] order, sorted by id.
#[derive(Debug, Clone, Default)]
pub struct PairBonus {
    adjacency: FxHashMap<PlayerId, SmallVec<[(PlayerId, f64); 8]>>,
}

impl PairBonus {
    fn build(pool: &[Player], matrix: &CorrelationMatrix, weight: f64) -> Self {
        let projections: FxHashMap<PlayerId, f64> =
            pool.iter().map(|p| (p.id, finite_or_zero(p.projection))).collect();
        let mut adjacency: FxHashMap<PlayerId, SmallVec<[(PlayerId, f64); 8]>> = FxHashMap::default();
        for p in pool {
            let own = projections.get(&p.id).copied().unwrap_or(0.0);
            for &(other, coeff) in matrix.neighbors(p.id) {
                if other == p.id {
                    continue;
                }
                let Some(&q) = projections.get(&other) else {
                    continue;
                };
                let bonus = weight * coeff * (own + q) / 2.0;
                if bonus != 0.0 {
                    adjacency.entry(p.id).or_default().push((other, bonus));
                }
            }
        }
        Self { adjacency }
    }

    pub fn get(&self, a: PlayerId, b: PlayerId) -> f64 {
        let row = self.partners(a);
        row.binary_search_by_key(&b, |(id, _)| *id)
            .map_or(0.0, |i| row[i].1)
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Every nonzero bonus involving `id`, ordered by partner id.
    pub fn partners(&self, id: PlayerId) -> &[(PlayerId, f64)] {
        self.adjacency.get(&id).map_or(&[], |row| row.as_slice())
    }
}

/// Resolved scoring for one call.
pub struct Scorer {
    strategy: Strategy,
    score_fn: ScoreFn,
    weights: ScoringWeights,
    bonus: PairBonus,
}

impl Scorer {
    pub fn new(
        strategy: Strategy,
        weights: ScoringWeights,
        pool: &[Player],
        matrix: &CorrelationMatrix,
    ) -> Self {
        let bonus = match strategy {
            Strategy::Correlation => PairBonus::build(pool, matrix, weights.correlation),
            _ => PairBonus::default(),
        };
        Self {
            strategy,
            score_fn: resolve(strategy),
            weights,
            bonus,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Per-player score. Non-finite results count as 0.
    pub fn player_score(&self, player: &Player, analytics: &AnalyticsBatch, salary: Cents) -> f64 {
        let fallback;
        let a = match analytics.get(player.id) {
            Some(a) => a,
            None => {
                fallback = PlayerAnalytics::zeroed(player.id);
                &fallback
            }
        };
        finite_or_zero((self.score_fn)(player, a, salary, &self.weights))
    }

    pub fn pair_bonus(&self) -> &PairBonus {
        &self.bonus
    }

    /// Full score of a finished lineup.
    pub fn lineup_score(&self, players: &[&Player], analytics: &AnalyticsBatch, salaries: &[Cents]) -> f64 {
        let mut total: f64 = players
            .iter()
            .zip(salaries)
            .map(|(p, &s)| self.player_score(p, analytics, s))
            .sum();
        if !self.bonus.is_empty() {
            for (i, a) in players.iter().enumerate() {
                for b in &players[i + 1..] {
                    total += self.bonus.get(a.id, b.id);
                }
            }
        }
        total
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
