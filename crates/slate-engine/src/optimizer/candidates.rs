//! Candidate preparation for one search.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use slate_core::{Cents, Constraints, Player, PlayerId};

use super::scoring::PairBonus;
use super::types::SearchAdjustments;

/// Group index for players without a team or game key.
pub(crate) const NO_GROUP: u16 = u16::MAX;

/// Per-pool-player data that does not change between searches of a call.
#[derive(Debug, Clone)]
pub(crate) struct PoolEntry {
    pub salary: Option<Cents>,
    pub score: f64,
    /// Bit `s` set when the player may fill roster slot `s`.
    pub slot_mask: u16,
    pub team: u16,
    pub game: u16,
}

#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub pool_index: usize,
    pub id: PlayerId,
    pub salary: Cents,
    pub projection: f64,
    pub score: f64,
    /// Score plus the best pairwise bonuses this player could collect.
    pub optimistic: f64,
    pub slot_mask: u16,
    pub locked: bool,
    pub team: u16,
    pub game: u16,
    /// (candidate index, bonus), for the correlation strategy.
    pub partners: SmallVec<[(u32, f64); 8]>,
    /// Indices of avoided lineups containing this player.
    pub avoid_in: SmallVec<[u16; 4]>,
}

#[derive(Debug)]
pub(crate) struct CandidateSet {
    /// Locked first, then by score descending, then by pool index.
    pub candidates: Vec<Candidate>,
    /// `locked_suffix[i]` = locked candidates at index `i` or later.
    pub locked_suffix: Vec<u32>,
}

/// Filter, cap and order the candidates. `Err` carries an infeasibility
/// reason that is known before any search.
pub(crate) fn prepare(
    pool: &[Player],
    entries: &[PoolEntry],
    constraints: &Constraints,
    adjust: &SearchAdjustments,
    per_slot_cap: Option<usize>,
    bonus: &PairBonus,
) -> Result<CandidateSet, String> {
    let locked: BTreeSet<PlayerId> = constraints
        .locked
        .iter()
        .chain(&adjust.extra_locked)
        .copied()
        .collect();
    let roster_size = constraints.roster_size();
    if locked.len() > roster_size {
        return Err(format!(
            "{} locked players exceed the roster size of {roster_size}",
            locked.len()
        ));
    }

    let mut eligible: Vec<usize> = Vec::with_capacity(pool.len());
    for (i, (player, entry)) in pool.iter().zip(entries).enumerate() {
        let is_locked = locked.contains(&player.id);
        if !is_locked
            && (constraints.excluded.contains(&player.id)
                || adjust.extra_excluded.contains(&player.id))
        {
            continue;
        }
        match entry.salary {
            Some(s) if s >= 0 => {}
            _ => {
                if is_locked {
                    return Err(format!(
                        "locked player {} has no salary on {}",
                        player.id, constraints.platform
                    ));
                }
                continue;
            }
        }
        if entry.slot_mask == 0 {
            if is_locked {
                return Err(format!(
                    "locked player {} is not eligible for any roster slot",
                    player.id
                ));
            }
            continue;
        }
        eligible.push(i);
    }

    if let Some(cap) = per_slot_cap {
        let mut keep = vec![false; pool.len()];
        for slot in 0..constraints.slots.len() {
            let mut in_slot: Vec<usize> = eligible
                .iter()
                .copied()
                .filter(|&i| entries[i].slot_mask & (1 << slot) != 0)
                .collect();
            in_slot.sort_by(|&a, &b| entries[b].score.total_cmp(&entries[a].score).then(a.cmp(&b)));
            for &i in in_slot.iter().take(cap) {
                keep[i] = true;
            }
        }
        eligible.retain(|&i| keep[i] || locked.contains(&pool[i].id));
    }

    eligible.sort_by(|&a, &b| {
        let la = locked.contains(&pool[a].id);
        let lb = locked.contains(&pool[b].id);
        lb.cmp(&la)
            .then(entries[b].score.total_cmp(&entries[a].score))
            .then(a.cmp(&b))
    });

    let index_of: FxHashMap<PlayerId, u32> = eligible
        .iter()
        .enumerate()
        .map(|(ci, &pi)| (pool[pi].id, ci as u32))
        .collect();

    let mut candidates: Vec<Candidate> = eligible
        .iter()
        .map(|&pi| {
            let player = &pool[pi];
            let entry = &entries[pi];
            Candidate {
                pool_index: pi,
                id: player.id,
                salary: entry.salary.unwrap_or(0),
                projection: if player.projection.is_finite() { player.projection } else { 0.0 },
                score: entry.score,
                optimistic: entry.score,
                slot_mask: entry.slot_mask,
                locked: locked.contains(&player.id),
                team: entry.team,
                game: entry.game,
                partners: SmallVec::new(),
                avoid_in: SmallVec::new(),
            }
        })
        .collect();

    if !bonus.is_empty() {
        let partners_allowed = roster_size.saturating_sub(1);
        for c in candidates.iter_mut() {
            let mut partners: SmallVec<[(u32, f64); 8]> = bonus
                .partners(c.id)
                .iter()
                .filter_map(|(other, v)| index_of.get(other).map(|&ci| (ci, *v)))
                .collect();
            partners.sort_unstable_by_key(|(ci, _)| *ci);
            let mut positive: Vec<f64> = partners.iter().map(|(_, v)| *v).filter(|v| *v > 0.0).collect();
            positive.sort_unstable_by(|a, b| b.total_cmp(a));
            c.optimistic = c.score + positive.iter().take(partners_allowed).sum::<f64>();
            c.partners = partners;
        }
    }

    for (k, lineup) in adjust.avoid.iter().enumerate() {
        for id in lineup {
            if let Some(&ci) = index_of.get(id) {
                candidates[ci as usize].avoid_in.push(k as u16);
            }
        }
    }

    let mut locked_suffix = vec![0u32; candidates.len() + 1];
    for i in (0..candidates.len()).rev() {
        locked_suffix[i] = locked_suffix[i + 1] + u32::from(candidates[i].locked);
    }

    Ok(CandidateSet {
        candidates,
        locked_suffix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::{Platform, RosterSlot};

    fn setup() -> (Vec<Player>, Vec<PoolEntry>, Constraints) {
        let pool: Vec<Player> = (1..=6)
            .map(|i| Player::new(i, &["G"], Platform::DraftKings, 100_000 * i as i64, i as f64))
            .collect();
        let entries = pool
            .iter()
            .map(|p| PoolEntry {
                salary: p.salary_on(Platform::DraftKings),
                score: p.projection,
                slot_mask: 1,
                team: NO_GROUP,
                game: NO_GROUP,
            })
            .collect();
        let constraints = Constraints::new(Platform::DraftKings, 10_000_000, vec![RosterSlot::new("G", 2)]);
        (pool, entries, constraints)
    }

    #[test]
    fn locked_first_then_by_score() {
        let (pool, entries, constraints) = setup();
        let constraints = constraints.lock(2).exclude(6);
        let set = prepare(&pool, &entries, &constraints, &SearchAdjustments::default(), None, &PairBonus::default())
            .unwrap();
        let ids: Vec<u32> = set.candidates.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![2, 5, 4, 3, 1]);
        assert_eq!(set.locked_suffix[0], 1);
        assert_eq!(set.locked_suffix[1], 0);
    }

    #[test]
    fn per_slot_cap_keeps_locked() {
        let (pool, entries, constraints) = setup();
        let constraints = constraints.lock(1);
        let set = prepare(&pool, &entries, &constraints, &SearchAdjustments::default(), Some(2), &PairBonus::default())
            .unwrap();
        let ids: Vec<u32> = set.candidates.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 6, 5]);
    }

    #[test]
    fn locked_without_salary_is_infeasible() {
        let (pool, mut entries, constraints) = setup();
        entries[0].salary = None;
        let err = prepare(
            &pool,
            &entries,
            &constraints.lock(1),
            &SearchAdjustments::default(),
            None,
            &PairBonus::default(),
        )
        .unwrap_err();
        assert!(err.contains("no salary"));
    }
}
