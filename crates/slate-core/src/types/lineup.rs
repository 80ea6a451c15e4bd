//! Generated lineups.

use serde::{Deserialize, Serialize};

use super::{Cents, PlayerId};

/// One filled roster slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineupSlot {
    pub slot: String,
    pub player: PlayerId,
}

/// A feasible lineup: exactly R distinct players meeting slot and salary
/// constraints. Slots are ordered as in the request's roster definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLineup {
    pub slots: Vec<LineupSlot>,
    pub total_salary: Cents,
    pub total_projection: f64,
    /// Objective value under the strategy that produced the lineup.
    pub score: f64,
}

impl GeneratedLineup {
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.slots.iter().map(|s| s.player)
    }

    /// Player ids in ascending order.
    pub fn sorted_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.player_ids().collect();
        ids.sort_unstable();
        ids
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.slots.iter().any(|s| s.player == id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of players shared with another lineup.
    pub fn shared_with(&self, other: &GeneratedLineup) -> usize {
        self.slots.iter().filter(|s| other.contains(s.player)).count()
    }
}
