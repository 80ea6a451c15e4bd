//! Result cache collaborator interface.
//!
//! The engine never touches global state: a `ResultCache` is injected at
//! construction. Implementations provide compute-if-absent with
//! single-flight semantics; concurrent callers for one key share one
//! computation.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::CacheError;
use crate::types::{OptimizeOutcome, SimulationResult};

/// Content-addressed cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Hash of the player pool alone, used for pool-wide invalidation.
    pub pool_fingerprint: u64,
    /// Hash of the full canonicalized request.
    pub request_hash: u128,
}

#[derive(Debug, Clone)]
pub enum CachedValue {
    Optimization(Arc<OptimizeOutcome>),
    Simulation(Arc<SimulationResult>),
}

/// What a computation produced and whether it may be stored.
#[derive(Debug, Clone)]
pub enum Computed {
    Store(CachedValue),
    /// Returned to the caller but not cached (partial or non-deterministic).
    Bypass(CachedValue),
}

#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub value: CachedValue,
    /// Served from the cache (or from another caller's in-flight computation).
    pub hit: bool,
}

pub trait ResultCache: Send + Sync {
    /// Return the cached value for `key`, or run `compute` once and store its
    /// result with the given TTL. A backend failure is reported as an error
    /// before `compute` runs, so callers can fall back to computing directly.
    /// A [`Computed::Bypass`] result belongs to the caller that produced it;
    /// concurrent waiters on the same key run their own `compute`.
    fn compute_if_absent(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: &mut dyn FnMut() -> Computed,
    ) -> Result<CacheLookup, CacheError>;

    /// Drop every entry computed from the given pool.
    fn invalidate_pool(&self, pool_fingerprint: u64) -> Result<(), CacheError>;
}

/// Cache that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl ResultCache for NoCache {
    fn compute_if_absent(
        &self,
        _key: CacheKey,
        _ttl: Duration,
        compute: &mut dyn FnMut() -> Computed,
    ) -> Result<CacheLookup, CacheError> {
        let value = match compute() {
            Computed::Store(v) | Computed::Bypass(v) => v,
        };
        Ok(CacheLookup { value, hit: false })
    }

    fn invalidate_pool(&self, _pool_fingerprint: u64) -> Result<(), CacheError> {
        Ok(())
    }
}
