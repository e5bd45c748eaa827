//! Digest computation and memoized value requests.

use log::{debug, trace};
use rayon::prelude::*;

use super::context::EvalContext;
use crate::cache::hash::{Digest, HashAccumulator};
use crate::context::Context;
use crate::error::GraphResult;
use crate::graph::Graph;
use crate::model::{PlugId, Value};

impl Graph {
    /// Digest of `plug`'s effective inputs under `context`.
    ///
    /// Connected plugs report their source's digest. Only digests are
    /// computed on the way upstream, never values, unless a node's own
    /// hash needs a parameter value.
    pub fn hash(&self, plug: PlugId, context: &Context) -> GraphResult<Digest> {
        let record = self.plug_record(plug)?;
        if let Some(source) = record.input {
            return self.hash(source, context);
        }
        if record.is_input() {
            let mut h = HashAccumulator::new();
            record.static_value().hash_into(&mut h);
            return Ok(h.finish());
        }

        let context_digest = context.hash();
        if let Some(digest) = self
            .hash_cache
            .get(plug, context_digest, record.dirty_count)?
        {
            self.stats.record_hash_hit();
            return Ok(digest);
        }
        self.stats.record_hash_miss();

        let node = &self.node_record(record.node)?.node;
        let mut h = HashAccumulator::new();
        h.append_str(node.type_name())
            .append_str(&record.definition.name);
        let ctx = EvalContext::new(self, record.node, plug, context);
        node.hash(&record.definition.name, &ctx, &mut h)?;
        let digest = h.finish();

        self.hash_cache
            .put(plug, context_digest, record.dirty_count, digest)?;
        Ok(digest)
    }

    /// Value of `plug` under `context`, computed at most once per digest.
    pub fn get_value(&self, plug: PlugId, context: &Context) -> GraphResult<Value> {
        let record = self.plug_record(plug)?;
        if let Some(source) = record.input {
            return self.get_value(source, context);
        }
        if record.is_input() {
            return Ok(record.static_value());
        }

        let digest = self.hash(plug, context)?;
        let node = &self.node_record(record.node)?.node;
        self.value_cache.get_or_compute(digest, &self.stats, || {
            context.check_cancelled()?;
            debug!("Computing {} ({})", self.plug_path(plug), digest);
            let ctx = EvalContext::new(self, record.node, plug, context);
            let value = node.compute(&record.definition.name, &ctx);
            if let Err(e) = &value {
                trace!("Compute of {} failed: {}", self.plug_path(plug), e);
            }
            value
        })
    }

    /// Evaluates independent plugs in parallel on the rayon thread pool.
    pub fn get_values(&self, plugs: &[PlugId], context: &Context) -> GraphResult<Vec<Value>> {
        plugs
            .par_iter()
            .map(|&plug| self.get_value(plug, context))
            .collect()
    }
}
