//! Player pool entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Cents, PlayerId};

/// Contest platform. Salaries differ per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    DraftKings,
    FanDuel,
    Yahoo,
    Custom,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DraftKings => "draftkings",
            Self::FanDuel => "fanduel",
            Self::Yahoo => "yahoo",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A player in the pool. Immutable for the duration of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    /// Roster slot labels this player may fill (multi-position eligibility).
    pub positions: SmallVec<[String; 3]>,
    /// Salary per platform, in cents.
    pub salaries: BTreeMap<Platform, Cents>,
    pub projection: f64,
    pub floor: f64,
    pub ceiling: f64,
    /// Projected ownership, in percent (0-100).
    #[serde(default)]
    pub ownership: f64,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub game: String,
    /// Tee-time wave or similar start-window grouping.
    #[serde(default)]
    pub wave: Option<String>,
    /// Explicit volatility; derived from floor/ceiling when absent.
    #[serde(default)]
    pub volatility: Option<f64>,
    /// Recent fantasy scores, most recent last.
    #[serde(default)]
    pub history: Vec<f64>,
}

impl Player {
    /// Create a player with a single-platform salary and a symmetric
    /// floor/ceiling equal to the projection.
    pub fn new(
        id: u32,
        positions: &[&str],
        platform: Platform,
        salary: Cents,
        projection: f64,
    ) -> Self {
        let mut salaries = BTreeMap::new();
        salaries.insert(platform, salary);
        Self {
            id: PlayerId(id),
            name: format!("player-{id}"),
            positions: positions.iter().map(|p| p.to_string()).collect(),
            salaries,
            projection,
            floor: projection,
            ceiling: projection,
            ownership: 0.0,
            team: String::new(),
            game: String::new(),
            wave: None,
            volatility: None,
            history: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_range(mut self, floor: f64, ceiling: f64) -> Self {
        self.floor = floor;
        self.ceiling = ceiling;
        self
    }

    pub fn with_team(mut self, team: impl Into<String>, game: impl Into<String>) -> Self {
        self.team = team.into();
        self.game = game.into();
        self
    }

    pub fn with_wave(mut self, wave: impl Into<String>) -> Self {
        self.wave = Some(wave.into());
        self
    }

    pub fn with_ownership(mut self, ownership: f64) -> Self {
        self.ownership = ownership;
        self
    }

    pub fn with_salary(mut self, platform: Platform, salary: Cents) -> Self {
        self.salaries.insert(platform, salary);
        self
    }

    pub fn with_history(mut self, history: Vec<f64>) -> Self {
        self.history = history;
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    /// Salary on the given platform, if the player is listed there.
    pub fn salary_on(&self, platform: Platform) -> Option<Cents> {
        self.salaries.get(&platform).copied()
    }

    /// Whether this player may fill the given roster slot.
    pub fn is_eligible(&self, slot: &str) -> bool {
        self.positions.iter().any(|p| p == slot)
    }
}
