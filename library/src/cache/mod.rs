//! Caching of plug digests and computed values.

pub mod hash;
pub mod hash_cache;
pub mod value_cache;

use std::sync::atomic::{AtomicU64, Ordering};

pub use hash::{Digest, HashAccumulator};
pub use hash_cache::HashCache;
pub use value_cache::ValueCache;

/// Counters describing cache behaviour since the last reset.
#[derive(Default)]
pub struct CacheStats {
    hash_hits: AtomicU64,
    hash_misses: AtomicU64,
    value_hits: AtomicU64,
    value_misses: AtomicU64,
    evictions: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub hash_hits: u64,
    pub hash_misses: u64,
    pub value_hits: u64,
    /// Number of node computes started.
    pub value_misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub(crate) fn record_hash_hit(&self) {
        self.hash_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hash_miss(&self) {
        self.hash_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_value_hit(&self) {
        self.value_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_value_miss(&self) {
        self.value_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hash_hits: self.hash_hits.load(Ordering::Relaxed),
            hash_misses: self.hash_misses.load(Ordering::Relaxed),
            value_hits: self.value_hits.load(Ordering::Relaxed),
            value_misses: self.value_misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.hash_hits,
            &self.hash_misses,
            &self.value_hits,
            &self.value_misses,
            &self.evictions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
