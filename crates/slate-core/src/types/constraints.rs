//! Roster, salary, exposure, and stacking constraints.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::{Cents, Platform, Player, PlayerId};
use crate::constants::{MAX_ROSTER_SLOTS, MAX_SLOT_COUNT};
use crate::errors::ValidationError;

/// A roster slot label and the exact number of players it takes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterSlot {
    pub label: String,
    pub count: u8,
}

impl RosterSlot {
    pub fn new(label: impl Into<String>, count: u8) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Fraction of a lineup set a player must (min) or may (max) appear in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureBounds {
    pub min: f64,
    pub max: f64,
}

impl ExposureBounds {
    pub const UNBOUNDED: Self = Self { min: 0.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Smallest number of lineups out of `k` that satisfies `min`.
    pub fn min_count(&self, k: usize) -> usize {
        (self.min * k as f64 - 1e-9).ceil().max(0.0) as usize
    }

    /// Largest number of lineups out of `k` that satisfies `max`.
    pub fn max_count(&self, k: usize) -> usize {
        ((self.max * k as f64 + 1e-9).floor().max(0.0) as usize).min(k)
    }
}

impl Default for ExposureBounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Grouping key a stack rule counts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackKey {
    Team,
    Game,
}

/// Stacking rule.
///
/// `max`: no single team (or game) may contribute more than `max` players.
/// `min`: at least one team (or game) must contribute `min` or more players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackRule {
    pub key: StackKey,
    #[serde(default)]
    pub min: Option<u8>,
    #[serde(default)]
    pub max: Option<u8>,
}

impl StackRule {
    pub fn team(min: Option<u8>, max: Option<u8>) -> Self {
        Self {
            key: StackKey::Team,
            min,
            max,
        }
    }

    pub fn game(min: Option<u8>, max: Option<u8>) -> Self {
        Self {
            key: StackKey::Game,
            min,
            max,
        }
    }
}

fn default_min_unique() -> u8 {
    1
}

/// Constraints for one optimization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub platform: Platform,
    pub salary_cap: Cents,
    pub slots: Vec<RosterSlot>,
    #[serde(default)]
    pub locked: BTreeSet<PlayerId>,
    #[serde(default)]
    pub excluded: BTreeSet<PlayerId>,
    #[serde(default)]
    pub exposure: BTreeMap<PlayerId, ExposureBounds>,
    #[serde(default)]
    pub stacks: Vec<StackRule>,
    /// Minimum number of players any two lineups of a set must differ by.
    /// 0 allows duplicate lineups.
    #[serde(default = "default_min_unique")]
    pub min_unique_players: u8,
}

impl Constraints {
    pub fn new(platform: Platform, salary_cap: Cents, slots: Vec<RosterSlot>) -> Self {
        Self {
            platform,
            salary_cap,
            slots,
            locked: BTreeSet::new(),
            excluded: BTreeSet::new(),
            exposure: BTreeMap::new(),
            stacks: Vec::new(),
            min_unique_players: default_min_unique(),
        }
    }

    pub fn lock(mut self, id: u32) -> Self {
        self.locked.insert(PlayerId(id));
        self
    }

    pub fn exclude(mut self, id: u32) -> Self {
        self.excluded.insert(PlayerId(id));
        self
    }

    pub fn with_exposure(mut self, id: u32, min: f64, max: f64) -> Self {
        self.exposure.insert(PlayerId(id), ExposureBounds::new(min, max));
        self
    }

    pub fn with_stack(mut self, rule: StackRule) -> Self {
        self.stacks.push(rule);
        self
    }

    pub fn with_min_unique(mut self, min_unique: u8) -> Self {
        self.min_unique_players = min_unique;
        self
    }

    /// Number of players per lineup (R).
    pub fn roster_size(&self) -> usize {
        self.slots.iter().map(|s| s.count as usize).sum()
    }

    /// Exposure bounds for a player, unbounded when not configured.
    pub fn exposure_for(&self, id: PlayerId) -> ExposureBounds {
        self.exposure.get(&id).copied().unwrap_or_default()
    }

    /// Validate the constraints against a pool.
    pub fn validate(&self, pool: &[Player]) -> Result<(), ValidationError> {
        if pool.is_empty() {
            return Err(ValidationError::EmptyPool);
        }
        let mut ids = HashSet::with_capacity(pool.len());
        for p in pool {
            if !ids.insert(p.id) {
                return Err(ValidationError::DuplicatePlayer(p.id));
            }
        }
        if self.salary_cap <= 0 {
            return Err(ValidationError::NonPositiveCap(self.salary_cap));
        }
        if self.slots.is_empty() {
            return Err(ValidationError::NoRosterSlots);
        }
        let mut labels = HashSet::with_capacity(self.slots.len());
        for slot in &self.slots {
            if slot.count == 0 {
                return Err(ValidationError::EmptySlot(slot.label.clone()));
            }
            if !labels.insert(slot.label.as_str()) {
                return Err(ValidationError::DuplicateSlot(slot.label.clone()));
            }
        }
        let largest = self.slots.iter().map(|s| s.count).max().unwrap_or(0);
        if self.slots.len() > MAX_ROSTER_SLOTS || largest > MAX_SLOT_COUNT {
            return Err(ValidationError::RosterTooLarge {
                slots: self.slots.len(),
                max_slots: MAX_ROSTER_SLOTS,
                largest,
                max_count: MAX_SLOT_COUNT,
            });
        }
        for id in self.locked.iter().chain(&self.excluded).chain(self.exposure.keys()) {
            if !ids.contains(id) {
                return Err(ValidationError::UnknownPlayer(*id));
            }
        }
        if let Some(id) = self.locked.intersection(&self.excluded).next() {
            return Err(ValidationError::LockedAndExcluded(*id));
        }
        for (id, bounds) in &self.exposure {
            let in_range = (0.0..=1.0).contains(&bounds.min) && (0.0..=1.0).contains(&bounds.max);
            if !in_range || bounds.min > bounds.max {
                return Err(ValidationError::InvalidExposure {
                    player: *id,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        for rule in &self.stacks {
            if let (Some(min), Some(max)) = (rule.min, rule.max) {
                if min > max {
                    return Err(ValidationError::InvalidStack { min, max });
                }
            }
        }
        let roster_size = self.roster_size();
        if self.min_unique_players as usize > roster_size {
            return Err(ValidationError::MinUniqueTooLarge {
                min_unique: self.min_unique_players,
                roster_size,
            });
        }
        Ok(())
    }
}
