//! Generate-and-adjust loop over the lineup optimizer.

use std::collections::{BTreeMap, BTreeSet};

use slate_core::events::{ProgressEvent, ProgressKind, ProgressReporter};
use slate_core::{
    CancellationToken, Constraints, DiversityRelaxation, ExposureReport, GeneratedLineup, PlayerId,
};

use super::report::summarize;
use crate::optimizer::{LineupOptimizer, LineupSearch, SearchAdjustments};

/// Search effort spent on a lineup set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetStats {
    pub searches: u32,
    pub nodes: u64,
    pub memo_entries: u64,
}

#[derive(Debug, Clone)]
pub enum ExposureOutcome {
    /// Lineups in generation order. May be short of the request (see
    /// `report.generated`) or empty when stopped before the first lineup.
    Built {
        lineups: Vec<GeneratedLineup>,
        report: ExposureReport,
        partial: bool,
        stats: SetStats,
    },
    /// Not even a relaxed search produced a first lineup.
    Infeasible { reason: String, stats: SetStats },
}

pub struct ExposureManager<'o, 'a> {
    optimizer: &'o LineupOptimizer<'a>,
    constraints: &'a Constraints,
    max_retries: u32,
    reporter: &'o dyn ProgressReporter,
}

impl<'o, 'a> ExposureManager<'o, 'a> {
    pub fn new(
        optimizer: &'o LineupOptimizer<'a>,
        constraints: &'a Constraints,
        max_retries: u32,
        reporter: &'o dyn ProgressReporter,
    ) -> Self {
        Self {
            optimizer,
            constraints,
            max_retries: max_retries.max(1),
            reporter,
        }
    }

    /// Build up to `k` lineups.
    pub fn build(&self, k: usize, token: &CancellationToken) -> ExposureOutcome {
        let roster_size = self.constraints.roster_size();
        let mut lineups: Vec<GeneratedLineup> = Vec::with_capacity(k);
        let mut accepted: Vec<Vec<PlayerId>> = Vec::with_capacity(k);
        let mut counts: BTreeMap<PlayerId, usize> = BTreeMap::new();
        let mut report = ExposureReport {
            requested: k,
            ..Default::default()
        };
        let mut stats = SetStats::default();
        let mut level = self.constraints.min_unique_players.min(roster_size as u8);
        let mut partial = false;

        'lineups: for idx in 0..k {
            let remaining = k - idx;
            let mut excluded = self.at_max_exposure(&counts, k);
            let mut locks = self.min_exposure_locks(&counts, k, remaining, &excluded);
            let mut overrides = false;
            let mut retries = 0u32;

            loop {
                let adjust = SearchAdjustments {
                    extra_locked: locks.clone(),
                    extra_excluded: if overrides { BTreeSet::new() } else { excluded.clone() },
                    avoid: if level > 0 { accepted.clone() } else { Vec::new() },
                    max_shared: roster_size - level as usize,
                };
                let search = self.optimizer.search(&adjust, token);
                stats.searches += 1;
                stats.nodes += search.stats.nodes;
                stats.memo_entries = stats.memo_entries.max(search.stats.memo_entries);

                match search.outcome {
                    LineupSearch::Found { lineup, partial: stopped } => {
                        if !overrides {
                            if let Some(id) = self.first_over_max(&lineup, &counts, k) {
                                excluded.insert(id);
                                retries += 1;
                                if retries >= self.max_retries {
                                    retries = 0;
                                    if level > 0 {
                                        self.relax(&mut level, idx, &mut report);
                                    } else {
                                        overrides = true;
                                        report.exposure_overrides.push(idx);
                                    }
                                }
                                continue;
                            }
                        }
                        for id in lineup.player_ids() {
                            *counts.entry(id).or_insert(0) += 1;
                        }
                        accepted.push(lineup.sorted_ids());
                        lineups.push(lineup);
                        self.reporter.try_emit(ProgressEvent::new(
                            ProgressKind::LineupGenerated,
                            (idx + 1) as u32,
                            k as u32,
                            format!("lineup {} of {k}", idx + 1),
                        ));
                        if stopped {
                            partial = true;
                            break 'lineups;
                        }
                        break;
                    }
                    LineupSearch::Exhausted => {
                        partial = true;
                        break 'lineups;
                    }
                    LineupSearch::Infeasible { reason } => {
                        if !locks.is_empty() {
                            tracing::warn!(lineup = idx, locks = locks.len(), "dropping min-exposure locks");
                            report.dropped_locks.push(idx);
                            locks.clear();
                        } else if level > 0 {
                            self.relax(&mut level, idx, &mut report);
                        } else if !overrides && !excluded.is_empty() {
                            tracing::warn!(lineup = idx, "lifting max-exposure exclusions");
                            overrides = true;
                            report.exposure_overrides.push(idx);
                        } else if idx == 0 {
                            return ExposureOutcome::Infeasible { reason, stats };
                        } else {
                            tracing::warn!(generated = idx, requested = k, %reason, "lineup set is short");
                            break 'lineups;
                        }
                    }
                }
            }
        }

        summarize(&mut report, self.constraints, &lineups);
        ExposureOutcome::Built {
            lineups,
            report,
            partial,
            stats,
        }
    }

    fn relax(&self, level: &mut u8, idx: usize, report: &mut ExposureReport) {
        let from = *level;
        *level = from.saturating_sub(1);
        tracing::warn!(lineup = idx, from, to = *level, "relaxing lineup diversity");
        report.relaxations.push(DiversityRelaxation {
            lineup_index: idx,
            from,
            to: *level,
        });
    }

    /// Players whose max exposure is used up.
    fn at_max_exposure(&self, counts: &BTreeMap<PlayerId, usize>, k: usize) -> BTreeSet<PlayerId> {
        self.constraints
            .exposure
            .iter()
            .filter(|&(&id, b)| {
                !self.constraints.locked.contains(&id)
                    && counts.get(&id).copied().unwrap_or(0) >= b.max_count(k)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Players that must appear in every remaining lineup to reach their
    /// min exposure, largest deficit first, capped by free roster spots.
    fn min_exposure_locks(
        &self,
        counts: &BTreeMap<PlayerId, usize>,
        k: usize,
        remaining: usize,
        excluded: &BTreeSet<PlayerId>,
    ) -> BTreeSet<PlayerId> {
        let mut due: Vec<(usize, PlayerId)> = self
            .constraints
            .exposure
            .iter()
            .filter(|&(&id, _)| {
                !self.constraints.locked.contains(&id)
                    && !self.constraints.excluded.contains(&id)
                    && !excluded.contains(&id)
            })
            .filter_map(|(id, b)| {
                let deficit = b.min_count(k).saturating_sub(counts.get(id).copied().unwrap_or(0));
                (deficit > 0 && deficit >= remaining).then_some((deficit, *id))
            })
            .collect();
        due.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let free = self
            .constraints
            .roster_size()
            .saturating_sub(self.constraints.locked.len());
        due.into_iter().take(free).map(|(_, id)| id).collect()
    }

    fn first_over_max(
        &self,
        lineup: &GeneratedLineup,
        counts: &BTreeMap<PlayerId, usize>,
        k: usize,
    ) -> Option<PlayerId> {
        lineup.player_ids().find(|id| {
            !self.constraints.locked.contains(id)
                && counts.get(id).copied().unwrap_or(0) + 1 > self.constraints.exposure_for(*id).max_count(k)
        })
    }
}
