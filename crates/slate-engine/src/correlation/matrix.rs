//! Sparse correlation matrix.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use slate_core::PlayerId;

/// Grouping key a correlation group was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Team,
    Game,
    Wave,
}

impl GroupKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Game => "game",
            Self::Wave => "wave",
        }
    }
}

/// Players sharing one grouping key value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationGroup {
    pub kind: GroupKind,
    pub key: String,
    pub coefficient: f64,
    /// Sorted ascending.
    pub members: Vec<PlayerId>,
}

pub(crate) type Neighbors = SmallVec<[(PlayerId, f64); 8]>;

/// Symmetric adjacency of pairwise coefficients in [-1, 1].
///
/// Pairs without a shared key are absent and read as 0. A player is never
/// its own neighbor.
#[derive(Debug, Clone, Default)]
pub struct CorrelationMatrix {
    pub(crate) adjacency: FxHashMap<PlayerId, Neighbors>,
    pub(crate) groups: Vec<CorrelationGroup>,
    pub(crate) membership: FxHashMap<PlayerId, SmallVec<[usize; 3]>>,
}

impl CorrelationMatrix {
    /// Coefficient between two players; 1.0 on the diagonal.
    pub fn coefficient(&self, a: PlayerId, b: PlayerId) -> f64 {
        if a == b {
            return 1.0;
        }
        self.adjacency
            .get(&a)
            .and_then(|n| {
                n.binary_search_by_key(&b, |(id, _)| *id)
                    .ok()
                    .map(|i| n[i].1)
            })
            .unwrap_or(0.0)
    }

    /// Correlated players of `id`, sorted by id.
    pub fn neighbors(&self, id: PlayerId) -> &[(PlayerId, f64)] {
        self.adjacency.get(&id).map(|n| n.as_slice()).unwrap_or(&[])
    }

    /// Groups sorted by (kind, key).
    pub fn groups(&self) -> &[CorrelationGroup] {
        &self.groups
    }

    /// Groups the player belongs to.
    pub fn groups_for(&self, id: PlayerId) -> impl Iterator<Item = &CorrelationGroup> + '_ {
        self.membership
            .get(&id)
            .into_iter()
            .flat_map(|idx| idx.iter().map(|&i| &self.groups[i]))
    }

    /// Number of unordered correlated pairs.
    pub fn pair_count(&self) -> usize {
        self.adjacency.values().map(|n| n.len()).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}
