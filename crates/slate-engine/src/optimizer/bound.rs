//! Memoized completion bound.
//!
//! `best(i, sig, bucket)` is the highest optimistic score obtainable by
//! filling the remaining slots `sig` from candidates `i..` with a salary
//! budget of `bucket` buckets. Salaries and budget are floored to buckets,
//! so the table is a relaxation of the exact problem and never
//! underestimates a feasible completion.

use rustc_hash::FxHashMap;

use slate_core::{CancellationToken, Cents, RosterSlot};

use super::candidates::Candidate;

/// Remaining-slot signature: 4 bits of remaining count per slot.
pub(crate) type Signature = u64;

pub(crate) fn full_signature(slots: &[RosterSlot]) -> Signature {
    slots
        .iter()
        .enumerate()
        .fold(0, |sig, (s, slot)| sig | (u64::from(slot.count) << (4 * s)))
}

#[inline]
pub(crate) fn slot_remaining(sig: Signature, slot: usize) -> u64 {
    (sig >> (4 * slot)) & 0xF
}

#[inline]
pub(crate) fn take_slot(sig: Signature, slot: usize) -> Signature {
    sig - (1u64 << (4 * slot))
}

#[inline]
pub(crate) fn total_remaining(sig: Signature) -> u64 {
    (0..16).map(|s| slot_remaining(sig, s)).sum()
}

fn gcd(mut a: Cents, mut b: Cents) -> Cents {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

/// Bucket width: the GCD of all salaries and the cap, widened so the cap
/// spans at most `max_buckets` buckets.
pub(crate) fn granularity(candidates: &[Candidate], cap: Cents, max_buckets: u32) -> Cents {
    let exact = candidates
        .iter()
        .map(|c| c.salary)
        .filter(|&s| s > 0)
        .fold(cap, gcd)
        .max(1);
    let coarse = (cap + Cents::from(max_buckets) - 1) / Cents::from(max_buckets);
    exact.max(coarse).max(1)
}

pub(crate) struct CompletionBound<'a> {
    candidates: &'a [Candidate],
    locked_suffix: &'a [u32],
    costs: Vec<u32>,
    granularity: Cents,
    memo: FxHashMap<(u32, Signature, u32), f64>,
    memo_limit: usize,
    evaluations: u64,
    poll_interval: u64,
    token: &'a CancellationToken,
    stopped: bool,
}

impl<'a> CompletionBound<'a> {
    pub fn new(
        candidates: &'a [Candidate],
        locked_suffix: &'a [u32],
        cap: Cents,
        max_buckets: u32,
        poll_interval: u64,
        token: &'a CancellationToken,
    ) -> Self {
        let granularity = granularity(candidates, cap, max_buckets);
        let costs = candidates
            .iter()
            .map(|c| (c.salary.max(0) / granularity) as u32)
            .collect();
        Self {
            candidates,
            locked_suffix,
            costs,
            granularity,
            memo: FxHashMap::default(),
            memo_limit: max_buckets as usize * 4096,
            evaluations: 0,
            poll_interval: poll_interval.max(1),
            token,
            stopped: false,
        }
    }

    /// Budget bucket for a remaining salary amount.
    pub fn bucket(&self, remaining: Cents) -> u32 {
        (remaining.max(0) / self.granularity) as u32
    }

    pub fn memo_entries(&self) -> u64 {
        self.memo.len() as u64
    }

    /// Whether cancellation was observed while evaluating.
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    /// Upper bound on the completion score, `NEG_INFINITY` when no
    /// completion exists even under the relaxation. Once stopped (or when
    /// the table is full) it returns `INFINITY`, which disables pruning.
    pub fn best(&mut self, i: usize, sig: Signature, bucket: u32) -> f64 {
        if sig == 0 {
            return if self.locked_suffix[i] == 0 { 0.0 } else { f64::NEG_INFINITY };
        }
        let n = self.candidates.len();
        let remaining = total_remaining(sig);
        if i >= n || remaining > (n - i) as u64 || u64::from(self.locked_suffix[i]) > remaining {
            return f64::NEG_INFINITY;
        }
        let key = (i as u32, sig, bucket);
        if let Some(&v) = self.memo.get(&key) {
            return v;
        }

        self.evaluations += 1;
        if (self.evaluations == 1 || self.evaluations % self.poll_interval == 0) && self.token.should_stop() {
            self.stopped = true;
        }
        if self.stopped || self.memo.len() >= self.memo_limit {
            return f64::INFINITY;
        }

        let candidates = self.candidates;
        let c = &candidates[i];
        let cost = self.costs[i];
        let mut best = if c.locked {
            f64::NEG_INFINITY
        } else {
            self.best(i + 1, sig, bucket)
        };
        if cost <= bucket {
            let mut mask = c.slot_mask;
            while mask != 0 {
                let s = mask.trailing_zeros() as usize;
                mask &= mask - 1;
                if slot_remaining(sig, s) == 0 {
                    continue;
                }
                let rest = self.best(i + 1, take_slot(sig, s), bucket - cost);
                if rest > f64::NEG_INFINITY {
                    best = best.max(c.optimistic + rest);
                }
            }
        }

        if self.stopped {
            return f64::INFINITY;
        }
        self.memo.insert(key, best);
        best
    }
}
