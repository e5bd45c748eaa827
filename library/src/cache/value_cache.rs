//! Digest-keyed value store with at-most-one compute per key.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use log::trace;
use lru::LruCache;

use super::CacheStats;
use super::hash::Digest;
use crate::error::{GraphError, GraphResult};
use crate::model::Value;

/// Completion slot for a compute in progress. Late callers block on it
/// instead of starting a redundant compute.
struct InFlight {
    result: Mutex<Option<GraphResult<Value>>>,
    ready: Condvar,
}

impl InFlight {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn wait(&self) -> GraphResult<Value> {
        let mut slot = self.result.lock()?;
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            slot = self.ready.wait(slot)?;
        }
    }

    fn publish(&self, result: GraphResult<Value>) {
        // A poisoned slot still has to wake its waiters.
        let mut slot = self.result.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(result);
        self.ready.notify_all();
    }
}

struct State {
    values: LruCache<Digest, Value>,
    in_flight: HashMap<Digest, Arc<InFlight>>,
}

enum Claim<'a> {
    Ready(Value),
    Wait(Arc<InFlight>),
    Compute(ComputeGuard<'a>),
}

/// Capacity-bounded LRU of computed values.
///
/// Only successful results are stored. Eviction only costs a recompute.
pub struct ValueCache {
    state: Mutex<State>,
}

impl ValueCache {
    pub fn new(capacity: std::num::NonZeroUsize) -> Self {
        Self {
            state: Mutex::new(State {
                values: LruCache::new(capacity),
                in_flight: HashMap::new(),
            }),
        }
    }

    pub fn get(&self, digest: &Digest) -> GraphResult<Option<Value>> {
        Ok(self.state.lock()?.values.get(digest).cloned())
    }

    pub fn len(&self) -> GraphResult<usize> {
        Ok(self.state.lock()?.values.len())
    }

    pub fn is_empty(&self) -> GraphResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&self) -> GraphResult<()> {
        self.state.lock()?.values.clear();
        Ok(())
    }

    /// Returns the value stored under `digest`, running `compute` if this
    /// caller is the first to ask for it. Concurrent callers for the same
    /// digest wait for that single compute and share its outcome.
    pub fn get_or_compute<F>(
        &self,
        digest: Digest,
        stats: &CacheStats,
        compute: F,
    ) -> GraphResult<Value>
    where
        F: FnOnce() -> GraphResult<Value>,
    {
        let guard = loop {
            match self.claim(digest)? {
                Claim::Ready(value) => {
                    trace!("value cache hit {}", digest);
                    stats.record_value_hit();
                    return Ok(value);
                }
                Claim::Wait(flight) => match flight.wait() {
                    Ok(value) => {
                        stats.record_value_hit();
                        return Ok(value);
                    }
                    // The winner was cancelled; this caller may still want the value.
                    Err(e) if e.is_retryable() => continue,
                    Err(e) => return Err(e),
                },
                Claim::Compute(guard) => break guard,
            }
        };

        stats.record_value_miss();
        let result = compute();
        guard.complete(result.clone(), stats);
        result
    }

    fn claim(&self, digest: Digest) -> GraphResult<Claim<'_>> {
        let mut state = self.state.lock()?;
        if let Some(value) = state.values.get(&digest) {
            return Ok(Claim::Ready(value.clone()));
        }
        if let Some(flight) = state.in_flight.get(&digest) {
            return Ok(Claim::Wait(Arc::clone(flight)));
        }
        let flight = Arc::new(InFlight::new());
        state.in_flight.insert(digest, Arc::clone(&flight));
        Ok(Claim::Compute(ComputeGuard {
            cache: self,
            digest,
            flight,
            done: false,
        }))
    }
}

/// Ownership of an in-flight slot. Dropping it without completing (for
/// instance when the compute panics) releases waiters with
/// [`GraphError::Cancelled`] so one of them retries.
struct ComputeGuard<'a> {
    cache: &'a ValueCache,
    digest: Digest,
    flight: Arc<InFlight>,
    done: bool,
}

impl ComputeGuard<'_> {
    /// Stores a successful result, then wakes every waiter. Runs even on a
    /// poisoned state lock so the slot is never left behind.
    fn complete(mut self, result: GraphResult<Value>, stats: &CacheStats) {
        {
            let mut state = self
                .cache
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Ok(value) = &result {
                if let Some((evicted, _)) = state.values.push(self.digest, value.clone()) {
                    if evicted != self.digest {
                        stats.record_eviction();
                    }
                }
            }
            state.in_flight.remove(&self.digest);
        }
        self.flight.publish(result);
        self.done = true;
    }
}

impl Drop for ComputeGuard<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        self.cache
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight
            .remove(&self.digest);
        self.flight.publish(Err(GraphError::Cancelled));
    }
}
