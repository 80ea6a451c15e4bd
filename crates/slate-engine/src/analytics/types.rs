//! Analytics output types.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use slate_core::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerAnalytics {
    pub player: PlayerId,
    /// Half the floor-to-ceiling spread, or the player's own override.
    pub volatility: f64,
    /// Standard deviation of the outcome distribution.
    pub sigma: f64,
    /// Projected points per $1k of salary.
    pub value: f64,
    pub ceiling_target: f64,
    pub floor_target: f64,
    /// P(score >= ceiling_target).
    pub ceiling_prob: f64,
    /// P(score >= floor_target).
    pub floor_prob: f64,
}

impl PlayerAnalytics {
    pub(crate) fn zeroed(player: PlayerId) -> Self {
        Self {
            player,
            volatility: 0.0,
            sigma: 0.0,
            value: 0.0,
            ceiling_target: 0.0,
            floor_target: 0.0,
            ceiling_prob: 0.0,
            floor_prob: 0.0,
        }
    }
}

/// A player whose inputs were unusable and fell back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedPlayer {
    pub player: PlayerId,
    pub reason: String,
}

/// Analytics for a whole pool, in pool order.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsBatch {
    players: Vec<PlayerAnalytics>,
    index: FxHashMap<PlayerId, usize>,
    pub degraded: Vec<DegradedPlayer>,
}

impl AnalyticsBatch {
    pub(crate) fn new(players: Vec<PlayerAnalytics>, degraded: Vec<DegradedPlayer>) -> Self {
        let index = players
            .iter()
            .enumerate()
            .map(|(i, a)| (a.player, i))
            .collect();
        Self {
            players,
            index,
            degraded,
        }
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerAnalytics> {
        self.index.get(&id).map(|&i| &self.players[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerAnalytics> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_degraded(&self, id: PlayerId) -> bool {
        self.degraded.iter().any(|d| d.player == id)
    }
}
