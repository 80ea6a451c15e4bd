//! Depth-first branch-and-bound lineup search.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use slate_core::config::{ScoringWeights, SearchLimits};
use slate_core::constants::SCORE_EPSILON;
use slate_core::{
    CancellationToken, Cents, Constraints, GeneratedLineup, LineupSlot, Player,
    StackKey, Strategy,
};

use super::bound::{full_signature, slot_remaining, take_slot, total_remaining, CompletionBound, Signature};
use super::candidates::{prepare, Candidate, PoolEntry, NO_GROUP};
use super::scoring::Scorer;
use super::types::{LineupSearch, SearchAdjustments, SearchReport, SearchStats, StopReason};
use crate::analytics::AnalyticsBatch;
use crate::correlation::CorrelationMatrix;

/// Tightest stack limits for one grouping key.
#[derive(Debug, Clone, Copy, Default)]
struct StackLimits {
    min: Option<u8>,
    max: Option<u8>,
}

impl StackLimits {
    fn collect(constraints: &Constraints, key: StackKey) -> Self {
        constraints
            .stacks
            .iter()
            .filter(|r| r.key == key)
            .fold(Self::default(), |acc, r| Self {
                min: match (acc.min, r.min) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                },
                max: match (acc.max, r.max) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                },
            })
    }
}

/// Best lineup search for one (pool, constraints, strategy) call.
///
/// Per-player scores, slot eligibility and group indices are computed once
/// in [`LineupOptimizer::new`]; each [`search`](Self::search) only layers
/// the exposure manager's adjustments on top.
pub struct LineupOptimizer<'a> {
    pool: &'a [Player],
    constraints: &'a Constraints,
    scorer: Scorer,
    analytics: &'a AnalyticsBatch,
    limits: SearchLimits,
    entries: Vec<PoolEntry>,
    team_groups: usize,
    game_groups: usize,
    team_limits: StackLimits,
    game_limits: StackLimits,
}

impl<'a> LineupOptimizer<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: &'a [Player],
        constraints: &'a Constraints,
        strategy: Strategy,
        weights: ScoringWeights,
        analytics: &'a AnalyticsBatch,
        matrix: &CorrelationMatrix,
        limits: SearchLimits,
    ) -> Self {
        let scorer = Scorer::new(strategy, weights, pool, matrix);
        let mut teams: FxHashMap<&str, u16> = FxHashMap::default();
        let mut games: FxHashMap<&str, u16> = FxHashMap::default();
        let intern = |map: &mut FxHashMap<&'a str, u16>, key: &'a str| -> u16 {
            if key.is_empty() {
                return NO_GROUP;
            }
            let next = map.len() as u16;
            *map.entry(key).or_insert(next)
        };
        let entries = pool
            .iter()
            .map(|p| {
                let salary = p.salary_on(constraints.platform);
                let slot_mask = constraints
                    .slots
                    .iter()
                    .enumerate()
                    .filter(|(_, slot)| p.is_eligible(&slot.label))
                    .fold(0u16, |m, (s, _)| m | (1 << s));
                PoolEntry {
                    salary,
                    score: scorer.player_score(p, analytics, salary.unwrap_or(0)),
                    slot_mask,
                    team: intern(&mut teams, p.team.as_str()),
                    game: intern(&mut games, p.game.as_str()),
                }
            })
            .collect();
        Self {
            pool,
            constraints,
            scorer,
            analytics,
            limits,
            entries,
            team_groups: teams.len(),
            game_groups: games.len(),
            team_limits: StackLimits::collect(constraints, StackKey::Team),
            game_limits: StackLimits::collect(constraints, StackKey::Game),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.scorer.strategy()
    }

    pub fn roster_size(&self) -> usize {
        self.constraints.roster_size()
    }

    /// Run one search under the given adjustments.
    ///
    /// The per-slot candidate cap only narrows branching: when the capped
    /// set has no lineup the search is repeated over every eligible player,
    /// so `Infeasible` always comes from the uncapped set.
    pub fn search(&self, adjust: &SearchAdjustments, token: &CancellationToken) -> SearchReport {
        let capped = self.search_with_cap(adjust, token, self.limits.candidates_per_slot);
        match (&capped.outcome, self.limits.candidates_per_slot) {
            (LineupSearch::Infeasible { .. }, Some(per_slot)) => {
                tracing::debug!(per_slot, "capped candidates admit no lineup, searching the full pool");
                let mut full = self.search_with_cap(adjust, token, None);
                full.stats.nodes += capped.stats.nodes;
                full
            }
            _ => capped,
        }
    }

    fn search_with_cap(
        &self,
        adjust: &SearchAdjustments,
        token: &CancellationToken,
        per_slot_cap: Option<usize>,
    ) -> SearchReport {
        let set = match prepare(
            self.pool,
            &self.entries,
            self.constraints,
            adjust,
            per_slot_cap,
            self.scorer.pair_bonus(),
        ) {
            Ok(set) => set,
            Err(reason) => {
                return SearchReport {
                    outcome: LineupSearch::Infeasible { reason },
                    stats: SearchStats::default(),
                }
            }
        };

        let cap = self.constraints.salary_cap;
        let mut bound = CompletionBound::new(
            &set.candidates,
            &set.locked_suffix,
            cap,
            self.limits.max_buckets,
            self.limits.poll_interval,
            token,
        );
        let sig = full_signature(&self.constraints.slots);
        let root = bound.best(0, sig, bound.bucket(cap));
        if root == f64::NEG_INFINITY {
            tracing::debug!(candidates = set.candidates.len(), "relaxation proves no lineup exists");
            return SearchReport {
                outcome: LineupSearch::Infeasible {
                    reason: "no combination of eligible players fills the roster under the salary cap"
                        .to_string(),
                },
                stats: SearchStats {
                    nodes: 0,
                    memo_entries: bound.memo_entries(),
                    stopped: None,
                },
            };
        }

        let mut dfs = Dfs {
            candidates: &set.candidates,
            locked_suffix: &set.locked_suffix,
            cap,
            bound,
            team_counts: vec![0; self.team_groups],
            game_counts: vec![0; self.game_groups],
            team_limits: self.team_limits,
            game_limits: self.game_limits,
            overlaps: vec![0; adjust.avoid.len()],
            max_shared: adjust.max_shared,
            chosen: Vec::with_capacity(self.roster_size()),
            in_lineup: vec![false; set.candidates.len()],
            incumbent: None,
            nodes: 0,
            node_budget: self.limits.node_budget,
            poll_interval: self.limits.poll_interval.max(1),
            token,
            stopped: None,
        };
        dfs.run(0, sig, 0, 0.0, 0.0);

        let stats = SearchStats {
            nodes: dfs.nodes,
            memo_entries: dfs.bound.memo_entries(),
            stopped: dfs.stopped,
        };
        tracing::debug!(
            nodes = stats.nodes,
            memo = stats.memo_entries,
            stopped = ?stats.stopped,
            "lineup search finished"
        );
        let outcome = match (dfs.incumbent.take(), dfs.stopped) {
            (Some(inc), stopped) => LineupSearch::Found {
                lineup: self.to_lineup(&set.candidates, inc),
                partial: stopped.is_some(),
            },
            (None, Some(_)) => LineupSearch::Exhausted,
            (None, None) => LineupSearch::Infeasible {
                reason: "no lineup satisfies the roster, salary, stacking and diversity constraints"
                    .to_string(),
            },
        };
        SearchReport { outcome, stats }
    }

    fn to_lineup(&self, candidates: &[Candidate], inc: Incumbent) -> GeneratedLineup {
        let mut picks: Vec<(usize, usize)> = inc
            .picks
            .iter()
            .map(|&(ci, slot)| (slot, candidates[ci].pool_index))
            .collect();
        picks.sort_unstable();
        let players: Vec<&Player> = picks.iter().map(|&(_, pi)| &self.pool[pi]).collect();
        let salaries: Vec<Cents> = picks
            .iter()
            .map(|&(_, pi)| self.entries[pi].salary.unwrap_or(0))
            .collect();
        GeneratedLineup {
            slots: picks
                .iter()
                .map(|&(slot, pi)| LineupSlot {
                    slot: self.constraints.slots[slot].label.clone(),
                    player: self.pool[pi].id,
                })
                .collect(),
            total_salary: inc.salary,
            total_projection: inc.projection,
            score: self.scorer.lineup_score(&players, self.analytics, &salaries),
        }
    }
}

struct Incumbent {
    score: f64,
    projection: f64,
    salary: Cents,
    /// Sorted pool indices, the final tie-break.
    members: Vec<usize>,
    /// (candidate index, slot index)
    picks: Vec<(usize, usize)>,
}

impl Incumbent {
    /// Higher score, then higher projection, then lower salary, then the
    /// lexicographically smaller set of pool positions.
    fn cmp_quality(&self, score: f64, projection: f64, salary: Cents, members: &[usize]) -> Ordering {
        if (score - self.score).abs() > SCORE_EPSILON {
            return score.total_cmp(&self.score);
        }
        if (projection - self.projection).abs() > SCORE_EPSILON {
            return projection.total_cmp(&self.projection);
        }
        self.salary
            .cmp(&salary)
            .then_with(|| self.members.as_slice().cmp(members))
    }
}

struct Dfs<'s> {
    candidates: &'s [Candidate],
    locked_suffix: &'s [u32],
    cap: Cents,
    bound: CompletionBound<'s>,
    team_counts: Vec<u8>,
    game_counts: Vec<u8>,
    team_limits: StackLimits,
    game_limits: StackLimits,
    overlaps: Vec<u8>,
    max_shared: usize,
    chosen: Vec<(usize, usize)>,
    in_lineup: Vec<bool>,
    incumbent: Option<Incumbent>,
    nodes: u64,
    node_budget: u64,
    poll_interval: u64,
    token: &'s CancellationToken,
    stopped: Option<StopReason>,
}

impl<'s> Dfs<'s> {
    fn poll(&mut self) {
        if self.nodes == 1 || self.nodes % self.poll_interval == 0 {
            if self.token.should_stop() {
                self.stopped = Some(StopReason::Cancelled);
            } else if self.nodes >= self.node_budget {
                self.stopped = Some(StopReason::NodeBudget);
            }
        }
        if self.stopped.is_none() && self.bound.stopped() {
            self.stopped = Some(StopReason::Cancelled);
        }
    }

    fn run(&mut self, i: usize, sig: Signature, spent: Cents, score: f64, projection: f64) {
        self.nodes += 1;
        self.poll();
        if self.stopped.is_some() {
            return;
        }
        if sig == 0 {
            if self.locked_suffix[i] == 0 && self.stack_mins_met(0) {
                self.offer(score, projection, spent);
            }
            return;
        }
        let candidates = self.candidates;
        if i >= candidates.len() {
            return;
        }
        let remaining = total_remaining(sig);
        if !self.stack_mins_met(remaining) {
            return;
        }
        let bucket = self.bound.bucket(self.cap - spent);
        let completion = self.bound.best(i, sig, bucket);
        if completion == f64::NEG_INFINITY {
            return;
        }
        if let Some(inc) = &self.incumbent {
            if score + completion < inc.score - SCORE_EPSILON {
                return;
            }
        }

        let c = &candidates[i];
        if self.can_include(c, spent) {
            let gain = c.score
                + c.partners
                    .iter()
                    .filter(|(ci, _)| self.in_lineup[*ci as usize])
                    .map(|(_, v)| *v)
                    .sum::<f64>();
            self.apply(i, c, 1);
            let mut mask = c.slot_mask;
            while mask != 0 && self.stopped.is_none() {
                let s = mask.trailing_zeros() as usize;
                mask &= mask - 1;
                if slot_remaining(sig, s) == 0 {
                    continue;
                }
                self.chosen.push((i, s));
                self.run(
                    i + 1,
                    take_slot(sig, s),
                    spent + c.salary,
                    score + gain,
                    projection + c.projection,
                );
                self.chosen.pop();
            }
            self.apply(i, c, -1);
        }
        if !c.locked && self.stopped.is_none() {
            self.run(i + 1, sig, spent, score, projection);
        }
    }

    fn can_include(&self, c: &Candidate, spent: Cents) -> bool {
        if spent + c.salary > self.cap {
            return false;
        }
        if let Some(max) = self.team_limits.max {
            if c.team != NO_GROUP && self.team_counts[c.team as usize] >= max {
                return false;
            }
        }
        if let Some(max) = self.game_limits.max {
            if c.game != NO_GROUP && self.game_counts[c.game as usize] >= max {
                return false;
            }
        }
        c.avoid_in
            .iter()
            .all(|&k| (self.overlaps[k as usize] as usize) < self.max_shared)
    }

    fn apply(&mut self, i: usize, c: &Candidate, delta: i8) {
        let bump = |v: &mut u8| *v = v.wrapping_add_signed(delta);
        if c.team != NO_GROUP {
            bump(&mut self.team_counts[c.team as usize]);
        }
        if c.game != NO_GROUP {
            bump(&mut self.game_counts[c.game as usize]);
        }
        for &k in &c.avoid_in {
            bump(&mut self.overlaps[k as usize]);
        }
        self.in_lineup[i] = delta > 0;
    }

    /// Whether every stack minimum is still reachable with `remaining`
    /// open roster spots (with 0, whether it is met).
    fn stack_mins_met(&self, remaining: u64) -> bool {
        let reachable = |min: Option<u8>, counts: &[u8]| match min {
            Some(m) => {
                let best = counts.iter().copied().max().unwrap_or(0) as u64;
                best + remaining >= u64::from(m)
            }
            None => true,
        };
        reachable(self.team_limits.min, &self.team_counts)
            && reachable(self.game_limits.min, &self.game_counts)
    }

    fn offer(&mut self, score: f64, projection: f64, salary: Cents) {
        let mut members: Vec<usize> = self
            .chosen
            .iter()
            .map(|&(ci, _)| self.candidates[ci].pool_index)
            .collect();
        members.sort_unstable();
        let better = match &self.incumbent {
            None => true,
            Some(inc) => inc.cmp_quality(score, projection, salary, &members) == Ordering::Greater,
        };
        if better {
            self.incumbent = Some(Incumbent {
                score,
                projection,
                salary,
                members,
                picks: self.chosen.clone(),
            });
        }
    }
}
