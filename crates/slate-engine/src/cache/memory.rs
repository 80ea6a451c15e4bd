//! In-process result cache using moka.
//!
//! Single-flight compute-if-absent, per-entry TTL, size-bounded eviction
//! and invalidation by pool fingerprint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::sync::Cache;
use moka::Expiry;

use slate_core::config::CacheConfig;
use slate_core::{CacheError, CacheKey, CacheLookup, CachedValue, Computed, ResultCache};

#[derive(Debug, Clone)]
struct Entry {
    value: CachedValue,
    ttl: Duration,
}

/// Expires each entry after its own TTL.
struct PerEntryTtl;

impl Expiry<CacheKey, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &CacheKey, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Computation result that must not be stored. Travels through moka's
/// error channel; waiters that receive it compute their own result.
#[derive(Debug)]
struct Bypassed(CachedValue);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

pub struct MokaResultCache {
    cache: Cache<CacheKey, Entry>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MokaResultCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .support_invalidation_closures()
            .build();
        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.effective_max_entries())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains_key(key)
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl ResultCache for MokaResultCache {
    fn compute_if_absent(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: &mut dyn FnMut() -> Computed,
    ) -> Result<CacheLookup, CacheError> {
        let mut ran = false;
        let result = self.cache.try_get_with(key, || {
            ran = true;
            match compute() {
                Computed::Store(value) => Ok(Entry { value, ttl }),
                Computed::Bypass(value) => Err(Bypassed(value)),
            }
        });
        let lookup = match result {
            Ok(entry) => CacheLookup {
                value: entry.value,
                hit: !ran,
            },
            Err(bypassed) if ran => CacheLookup {
                value: bypassed.0.clone(),
                hit: false,
            },
            // Another caller's result was degraded by its own deadline or
            // cancellation; it is not ours to return.
            Err(_) => {
                tracing::debug!(pool = key.pool_fingerprint, "in-flight result was bypassed, recomputing");
                let value = match compute() {
                    Computed::Store(value) => {
                        self.cache.insert(key, Entry { value: value.clone(), ttl });
                        value
                    }
                    Computed::Bypass(value) => value,
                };
                CacheLookup { value, hit: false }
            }
        };
        if lookup.hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(lookup)
    }

    fn invalidate_pool(&self, pool_fingerprint: u64) -> Result<(), CacheError> {
        self.cache
            .invalidate_entries_if(move |key, _| key.pool_fingerprint == pool_fingerprint)
            .map(|_| ())
            .map_err(|e| CacheError::Invalidation(e.to_string()))
    }
}
