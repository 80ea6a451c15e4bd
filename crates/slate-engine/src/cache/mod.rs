//! Result cache: content-addressed keys and the default moka backend.

pub mod key;
pub mod memory;

pub use key::{pool_fingerprint, request_key};
pub use memory::{CacheStats, MokaResultCache};
