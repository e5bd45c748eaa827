//! Memo of plug digests per (plug, context).

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use super::hash::Digest;
use crate::error::GraphResult;
use crate::model::PlugId;

#[derive(Clone, Copy)]
struct HashEntry {
    dirty_count: u64,
    digest: Digest,
}

/// Maps `(plug, context digest)` to the plug's digest under that context.
///
/// Entries remember the plug's dirty count at the time they were made; a
/// plug dirtied since then misses and has its digest recomputed.
pub struct HashCache {
    entries: Mutex<LruCache<(PlugId, Digest), HashEntry>>,
}

impl HashCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(
        &self,
        plug: PlugId,
        context: Digest,
        dirty_count: u64,
    ) -> GraphResult<Option<Digest>> {
        let mut entries = self.entries.lock()?;
        Ok(entries
            .get(&(plug, context))
            .filter(|entry| entry.dirty_count == dirty_count)
            .map(|entry| entry.digest))
    }

    pub fn put(
        &self,
        plug: PlugId,
        context: Digest,
        dirty_count: u64,
        digest: Digest,
    ) -> GraphResult<()> {
        self.entries
            .lock()?
            .put((plug, context), HashEntry { dirty_count, digest });
        Ok(())
    }

    pub fn clear(&self) -> GraphResult<()> {
        self.entries.lock()?.clear();
        Ok(())
    }
}
