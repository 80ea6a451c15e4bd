//! Builds a [`CorrelationMatrix`] from a player pool.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use slate_core::config::CorrelationConfig;
use slate_core::{Player, PlayerId};

use super::matrix::{CorrelationGroup, CorrelationMatrix, GroupKind, Neighbors};

/// Coefficient per grouping key. A zero coefficient disables the key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationRules {
    pub same_team: f64,
    pub same_game: f64,
    pub same_wave: f64,
}

impl CorrelationRules {
    pub fn from_config(config: &CorrelationConfig) -> Self {
        Self {
            same_team: config.effective_same_team(),
            same_game: config.effective_same_game(),
            same_wave: config.effective_same_wave(),
        }
    }

    fn coefficient(&self, kind: GroupKind) -> f64 {
        match kind {
            GroupKind::Team => self.same_team,
            GroupKind::Game => self.same_game,
            GroupKind::Wave => self.same_wave,
        }
    }
}

impl Default for CorrelationRules {
    fn default() -> Self {
        Self::from_config(&CorrelationConfig::default())
    }
}

/// Build the matrix. Deterministic for a given pool and rules.
pub fn build(pool: &[Player], rules: &CorrelationRules) -> CorrelationMatrix {
    let mut groups = Vec::new();
    for kind in [GroupKind::Team, GroupKind::Game, GroupKind::Wave] {
        let coefficient = rules.coefficient(kind);
        if coefficient == 0.0 || !coefficient.is_finite() {
            continue;
        }
        let mut by_key: BTreeMap<&str, Vec<PlayerId>> = BTreeMap::new();
        for player in pool {
            let key = match kind {
                GroupKind::Team => player.team.as_str(),
                GroupKind::Game => player.game.as_str(),
                GroupKind::Wave => player.wave.as_deref().unwrap_or(""),
            };
            if !key.is_empty() {
                by_key.entry(key).or_default().push(player.id);
            }
        }
        for (key, mut members) in by_key {
            if members.len() < 2 {
                continue;
            }
            members.sort_unstable();
            groups.push(CorrelationGroup {
                kind,
                key: key.to_string(),
                coefficient: coefficient.clamp(-1.0, 1.0),
                members,
            });
        }
    }

    let mut pairs: FxHashMap<(PlayerId, PlayerId), f64> = FxHashMap::default();
    let mut membership: FxHashMap<PlayerId, SmallVec<[usize; 3]>> = FxHashMap::default();
    for (gi, group) in groups.iter().enumerate() {
        for (i, &a) in group.members.iter().enumerate() {
            membership.entry(a).or_default().push(gi);
            for &b in &group.members[i + 1..] {
                *pairs.entry((a, b)).or_insert(0.0) += group.coefficient;
            }
        }
    }

    let mut adjacency: FxHashMap<PlayerId, Neighbors> = FxHashMap::default();
    for ((a, b), sum) in pairs {
        let c = sum.clamp(-1.0, 1.0);
        if c == 0.0 {
            continue;
        }
        adjacency.entry(a).or_default().push((b, c));
        adjacency.entry(b).or_default().push((a, c));
    }
    for neighbors in adjacency.values_mut() {
        neighbors.sort_unstable_by_key(|(id, _)| *id);
    }

    tracing::debug!(
        groups = groups.len(),
        players = adjacency.len(),
        "built correlation matrix"
    );

    CorrelationMatrix {
        adjacency,
        groups,
        membership,
    }
}
