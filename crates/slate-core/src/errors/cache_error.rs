//! Result cache errors. Never fatal to a request: callers fall back to
//! uncached computation.

use super::error_code::{self, SlateErrorCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache invalidation rejected: {0}")]
    Invalidation(String),
}

impl SlateErrorCode for CacheError {
    fn error_code(&self) -> &'static str {
        error_code::CACHE_UNAVAILABLE
    }
}
