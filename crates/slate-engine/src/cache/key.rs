//! Content-addressed cache keys.
//!
//! Requests are hashed from their canonical JSON encoding. Every map in the
//! request types is a `BTreeMap`/`BTreeSet`, so the encoding is stable.

use serde::Serialize;
use xxhash_rust::xxh3::{xxh3_128, xxh3_64};

use slate_core::{CacheKey, Player};

/// Fingerprint of a player pool alone.
pub fn pool_fingerprint(pool: &[Player]) -> u64 {
    match serde_json::to_vec(pool) {
        Ok(bytes) => xxh3_64(&bytes),
        Err(e) => {
            tracing::warn!(error = %e, "pool not serializable; fingerprint falls back to ids");
            let ids: Vec<u32> = pool.iter().map(|p| p.id.raw()).collect();
            xxh3_64(&ids.iter().flat_map(|id| id.to_le_bytes()).collect::<Vec<u8>>())
        }
    }
}

/// Key for a request against a pool. `kind` separates request families
/// that could otherwise encode identically.
pub fn request_key<T: Serialize>(kind: &str, pool_fingerprint: u64, request: &T) -> Option<CacheKey> {
    let body = serde_json::to_vec(request).ok()?;
    let mut bytes = Vec::with_capacity(kind.len() + 9 + body.len());
    bytes.extend_from_slice(kind.as_bytes());
    bytes.push(0);
    bytes.extend_from_slice(&pool_fingerprint.to_le_bytes());
    bytes.extend_from_slice(&body);
    Some(CacheKey {
        pool_fingerprint,
        request_hash: xxh3_128(&bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::Platform;

    fn pool() -> Vec<Player> {
        vec![
            Player::new(1, &["G"], Platform::DraftKings, 500_000, 20.0),
            Player::new(2, &["G"], Platform::DraftKings, 400_000, 18.0),
        ]
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = pool();
        let mut b = pool();
        assert_eq!(pool_fingerprint(&a), pool_fingerprint(&b));
        b[1].projection = 18.5;
        assert_ne!(pool_fingerprint(&a), pool_fingerprint(&b));
    }

    #[test]
    fn request_kind_separates_keys() {
        let fp = pool_fingerprint(&pool());
        let a = request_key("optimize", fp, &(1u32, "x")).unwrap();
        let b = request_key("simulate", fp, &(1u32, "x")).unwrap();
        assert_ne!(a.request_hash, b.request_hash);
        assert_eq!(a.pool_fingerprint, b.pool_fingerprint);
        assert_eq!(a, request_key("optimize", fp, &(1u32, "x")).unwrap());
    }
}
