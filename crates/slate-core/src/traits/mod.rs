//! Collaborator traits: cancellation and result caching.

pub mod cancellation;
pub mod result_cache;

pub use cancellation::{Cancellable, CancellationToken};
pub use result_cache::{CacheKey, CacheLookup, CachedValue, Computed, NoCache, ResultCache};
