//! Correlated outcome sampling.

use rand::Rng;
use rand_distr::StandardNormal;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use slate_core::{Player, PlayerId};

use crate::analytics::AnalyticsBatch;
use crate::correlation::CorrelationMatrix;

#[derive(Debug, Clone)]
struct PlayerModel {
    mean: f64,
    sigma: f64,
    /// (shock index, sqrt(rho))
    loadings: SmallVec<[(u32, f64); 3]>,
    /// sqrt(1 - sum(rho))
    idiosyncratic: f64,
}

/// Draws one joint outcome for a fixed set of players.
///
/// `X = mean + sigma * (sum_g sqrt(rho_g) * S_g + sqrt(1 - sum_g rho_g) * e)`
/// with independent standard normals `S_g` (one per group, shared) and `e`
/// (one per player). Two members of a group with coefficient `rho` have
/// correlation `rho`; the marginal stays `Normal(mean, sigma)`.
/// Negative group coefficients cannot be expressed by a shared shock and are
/// treated as 0. A player whose coefficients sum above 1 has them scaled to
/// sum to 1.
#[derive(Debug, Clone)]
pub struct CorrelatedSampler {
    models: Vec<PlayerModel>,
    shocks: usize,
    index: FxHashMap<PlayerId, usize>,
}

impl CorrelatedSampler {
    /// `players` fixes the output order of [`draw`](Self::draw).
    pub fn new(players: &[&Player], analytics: &AnalyticsBatch, matrix: &CorrelationMatrix) -> Self {
        let index: FxHashMap<PlayerId, usize> =
            players.iter().enumerate().map(|(i, p)| (p.id, i)).collect();

        let mut shock_of: FxHashMap<usize, u32> = FxHashMap::default();
        for (gi, group) in matrix.groups().iter().enumerate() {
            if group.coefficient > 0.0 && group.members.iter().any(|id| index.contains_key(id)) {
                let next = shock_of.len() as u32;
                shock_of.insert(gi, next);
            }
        }

        let models = players
            .iter()
            .map(|p| {
                let mut rhos: SmallVec<[(u32, f64); 3]> = SmallVec::new();
                for (gi, group) in matrix.groups().iter().enumerate() {
                    if let Some(&shock) = shock_of.get(&gi) {
                        if group.members.binary_search(&p.id).is_ok() {
                            rhos.push((shock, group.coefficient));
                        }
                    }
                }
                let total: f64 = rhos.iter().map(|(_, r)| r).sum();
                let (scale, idiosyncratic) = if total >= 1.0 {
                    (1.0 / total, 0.0)
                } else {
                    (1.0, (1.0 - total).sqrt())
                };
                let loadings = rhos.into_iter().map(|(s, r)| (s, (r * scale).sqrt())).collect();
                let sigma = analytics
                    .get(p.id)
                    .map(|a| a.sigma)
                    .filter(|s| s.is_finite() && *s >= 0.0)
                    .unwrap_or(0.0);
                PlayerModel {
                    mean: if p.projection.is_finite() { p.projection } else { 0.0 },
                    sigma,
                    loadings,
                    idiosyncratic,
                }
            })
            .collect();

        Self {
            models,
            shocks: shock_of.len(),
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Number of shared group shocks per draw.
    pub fn shock_count(&self) -> usize {
        self.shocks
    }

    /// Fill `out` (one entry per player) with a joint draw. `shocks` is
    /// scratch space reused across calls.
    pub fn draw<R: Rng>(&self, rng: &mut R, shocks: &mut Vec<f64>, out: &mut [f64]) {
        shocks.clear();
        shocks.extend((0..self.shocks).map(|_| rng.sample::<f64, _>(StandardNormal)));
        for (model, slot) in self.models.iter().zip(out.iter_mut()) {
            let common: f64 = model
                .loadings
                .iter()
                .map(|&(s, l)| l * shocks[s as usize])
                .sum();
            let eps: f64 = rng.sample(StandardNormal);
            *slot = model.mean + model.sigma * (common + model.idiosyncratic * eps);
        }
    }
}
