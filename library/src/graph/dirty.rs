//! Dirty propagation over the affects relation and connections.
//!
//! Dirtiness carries no context. Each plug keeps a dirty count that is
//! bumped whenever the plug is reached by a propagation pass; hash cache
//! entries recorded under an older count are ignored.

use std::collections::{HashSet, VecDeque};

use log::{debug, warn};

use super::Graph;
use crate::error::{GraphError, GraphResult};
use crate::model::PlugId;

/// Handle returned by [`Graph::subscribe_dirtied`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl Graph {
    /// Plugs reachable from `plug` in one step: declared affects on the same
    /// node, then downstream connections.
    pub(crate) fn dependents(
        &self,
        plug: PlugId,
    ) -> GraphResult<impl Iterator<Item = PlugId> + '_> {
        let record = self.plug_record(plug)?;
        Ok(record.affects.iter().chain(record.outputs.iter()).copied())
    }

    /// Breadth-first closure of `roots` over [`dependents`](Self::dependents).
    ///
    /// Each plug is visited at most once. Exceeding the configured visit
    /// budget fails with [`GraphError::CyclicAffects`].
    pub(crate) fn collect_dirty(&self, roots: &[PlugId]) -> GraphResult<Vec<PlugId>> {
        let budget = self.config().dirty_visit_budget;
        let mut visited: HashSet<PlugId> = HashSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<PlugId> = roots.iter().copied().collect();
        let mut steps = 0usize;

        while let Some(plug) = queue.pop_front() {
            if !visited.insert(plug) {
                continue;
            }
            order.push(plug);
            for next in self.dependents(plug)? {
                steps += 1;
                if steps > budget {
                    warn!(
                        "Dirty propagation exceeded {} steps at {}",
                        budget,
                        self.plug_path(plug)
                    );
                    return Err(GraphError::CyclicAffects {
                        plug: self.plug_path(plug),
                    });
                }
                if !visited.contains(&next) {
                    queue.push_back(next);
                }
            }
        }
        Ok(order)
    }

    /// True if `target` is reachable from `from` along dependents.
    pub(crate) fn reaches(&self, from: PlugId, target: PlugId) -> GraphResult<bool> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([from]);
        while let Some(plug) = queue.pop_front() {
            if plug == target {
                return Ok(true);
            }
            if !visited.insert(plug) {
                continue;
            }
            queue.extend(self.dependents(plug)?);
        }
        Ok(false)
    }

    /// Bumps the dirty count of every plug in `dirtied` and notifies subscribers.
    pub(crate) fn mark_dirty(&mut self, dirtied: &[PlugId]) {
        if dirtied.is_empty() {
            return;
        }
        for &plug in dirtied {
            if let Ok(record) = self.plug_record_mut(plug) {
                record.dirty_count += 1;
            }
        }
        debug!("Dirtied {} plugs", dirtied.len());
        for (_, callback) in &self.subscribers {
            callback(dirtied);
        }
    }

    /// Number of times `plug` has been dirtied.
    pub fn dirty_count(&self, plug: PlugId) -> GraphResult<u64> {
        Ok(self.plug_record(plug)?.dirty_count)
    }

    /// Registers a callback receiving the plugs dirtied by each edit, in
    /// propagation order.
    pub fn subscribe_dirtied<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&[PlugId]) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(s, _)| *s != id);
        self.subscribers.len() != before
    }
}
