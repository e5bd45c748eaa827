//! Plug arena: nodes, their plugs and the connections between them.
//!
//! Topology edits take `&mut Graph` and are therefore serialized; value and
//! hash requests take `&Graph` and may run concurrently. Share a graph
//! between an editor and evaluators with `Arc<RwLock<Graph>>`.

mod connections;
mod dirty;

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

pub use dirty::SubscriptionId;

use crate::cache::{CacheStats, CacheStatsSnapshot, HashCache, ValueCache};
use crate::config::EngineConfig;
use crate::error::{GraphError, GraphResult};
use crate::evaluation::ComputeNode;
use crate::model::{NodeId, PlugDefinition, PlugDirection, PlugId, Value};

pub(crate) struct PlugRecord {
    pub node: NodeId,
    pub definition: PlugDefinition,
    /// Upstream source. For outputs this is only ever a pass-through input
    /// of the same node.
    pub input: Option<PlugId>,
    /// Plugs whose `input` is this plug.
    pub outputs: Vec<PlugId>,
    /// Outputs of the owning node declared as affected by this plug.
    pub affects: Vec<PlugId>,
    /// Explicitly set value of an unconnected input.
    pub value: Option<Value>,
    pub dirty_count: u64,
}

impl PlugRecord {
    pub fn is_input(&self) -> bool {
        self.definition.direction == PlugDirection::Input
    }

    /// Value reported by an unconnected input.
    pub fn static_value(&self) -> Value {
        self.value
            .clone()
            .unwrap_or_else(|| self.definition.fallback_value())
    }
}

pub(crate) struct NodeRecord {
    pub name: String,
    pub node: Box<dyn ComputeNode>,
    pub plugs: Vec<PlugId>,
}

type DirtiedCallback = Box<dyn Fn(&[PlugId]) + Send + Sync>;

/// A dependency-tracked computation graph.
pub struct Graph {
    nodes: Vec<Option<NodeRecord>>,
    plugs: Vec<Option<PlugRecord>>,
    names: HashMap<String, NodeId>,
    config: EngineConfig,
    pub(crate) hash_cache: HashCache,
    pub(crate) value_cache: ValueCache,
    pub(crate) stats: CacheStats,
    subscribers: Vec<(SubscriptionId, DirtiedCallback)>,
    next_subscription: u64,
}

impl Graph {
    pub fn new() -> Self {
        // The default configuration always validates.
        Self::build(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> GraphResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let value_capacity = config
            .value_capacity()
            .unwrap_or(std::num::NonZeroUsize::MIN);
        let hash_capacity = config
            .hash_capacity()
            .unwrap_or(std::num::NonZeroUsize::MIN);
        Self {
            nodes: Vec::new(),
            plugs: Vec::new(),
            names: HashMap::new(),
            hash_cache: HashCache::new(hash_capacity),
            value_cache: ValueCache::new(value_capacity),
            stats: CacheStats::default(),
            config,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Adds a node and creates its plugs.
    ///
    /// The node's affects relation and pass-through plugs are resolved here,
    /// once. Affects declarations that target an input or that loop back on
    /// themselves are rejected with [`GraphError::CyclicAffects`].
    pub fn add_node(
        &mut self,
        name: &str,
        node: impl ComputeNode + 'static,
    ) -> GraphResult<NodeId> {
        if name.is_empty() || name.contains('.') {
            return Err(GraphError::InvalidEdit {
                plug: name.to_string(),
                reason: "node names must be non-empty and contain no '.'".into(),
            });
        }
        if self.names.contains_key(name) {
            return Err(GraphError::DuplicateName(name.to_string()));
        }

        let definitions = node.plugs();
        let mut by_name: HashMap<&str, usize> = HashMap::new();
        for (i, def) in definitions.iter().enumerate() {
            if by_name.insert(def.name.as_str(), i).is_some() {
                return Err(GraphError::DuplicateName(format!("{}.{}", name, def.name)));
            }
        }

        let local = |plug: &str| -> GraphResult<usize> {
            by_name
                .get(plug)
                .copied()
                .ok_or_else(|| GraphError::UnknownPlug(format!("{}.{}", name, plug)))
        };

        let mut affects: Vec<Vec<usize>> = vec![Vec::new(); definitions.len()];
        for (i, def) in definitions.iter().enumerate() {
            for target in node.affects(&def.name) {
                let t = local(target)?;
                if definitions[t].direction == PlugDirection::Input {
                    warn!(
                        "{} declares input {}.{} as affected",
                        node.type_name(),
                        name,
                        target
                    );
                    return Err(GraphError::CyclicAffects {
                        plug: format!("{}.{}", name, target),
                    });
                }
                affects[i].push(t);
            }
        }
        if let Some(i) = find_affects_cycle(&affects) {
            return Err(GraphError::CyclicAffects {
                plug: format!("{}.{}", name, definitions[i].name),
            });
        }

        let mut pass_through = Vec::new();
        for (output, input) in node.pass_through() {
            let (o, i) = (local(output)?, local(input)?);
            let (out_def, in_def) = (&definitions[o], &definitions[i]);
            if out_def.direction != PlugDirection::Output
                || in_def.direction != PlugDirection::Input
            {
                return Err(GraphError::invalid_connection(format!(
                    "pass-through {}.{} <- {}.{} must run from an input to an output",
                    name, output, name, input
                )));
            }
            if !in_def.data_type.accepts(out_def.data_type) {
                return Err(GraphError::invalid_connection(format!(
                    "pass-through {}.{} <- {}.{}: {} is not compatible with {}",
                    name, output, name, input, in_def.data_type, out_def.data_type
                )));
            }
            pass_through.push((o, i));
        }

        let node_id = NodeId(self.nodes.len() as u32);
        let base = self.plugs.len() as u32;
        let plug_ids: Vec<PlugId> = (0..definitions.len() as u32)
            .map(|i| PlugId(base + i))
            .collect();

        for (i, definition) in definitions.into_iter().enumerate() {
            self.plugs.push(Some(PlugRecord {
                node: node_id,
                definition,
                input: None,
                outputs: Vec::new(),
                affects: affects[i].iter().map(|&t| plug_ids[t]).collect(),
                value: None,
                dirty_count: 0,
            }));
        }
        for (o, i) in pass_through {
            self.plug_record_mut(plug_ids[o])?.input = Some(plug_ids[i]);
            self.plug_record_mut(plug_ids[i])?.outputs.push(plug_ids[o]);
        }

        debug!("Added node {} ({})", name, node.type_name());
        self.names.insert(name.to_string(), node_id);
        self.nodes.push(Some(NodeRecord {
            name: name.to_string(),
            node: Box::new(node),
            plugs: plug_ids,
        }));
        Ok(node_id)
    }

    /// Removes a node, disconnecting every plug that referenced it.
    ///
    /// Returns the plugs dirtied on the remaining nodes.
    pub fn remove_node(&mut self, node: NodeId) -> GraphResult<Vec<PlugId>> {
        let plug_ids = self.node_record(node)?.plugs.clone();
        let owned: HashSet<PlugId> = plug_ids.iter().copied().collect();

        let mut downstream = Vec::new();
        for &plug in &plug_ids {
            let record = self.plug_record(plug)?;
            downstream.extend(record.outputs.iter().filter(|p| !owned.contains(p)));
        }
        let dirtied = self.collect_dirty(&downstream)?;

        for &plug in &plug_ids {
            let (source, outputs) = {
                let record = self.plug_record(plug)?;
                (record.input, record.outputs.clone())
            };
            if let Some(source) = source.filter(|s| !owned.contains(s)) {
                self.plug_record_mut(source)?.outputs.retain(|&p| p != plug);
            }
            for target in outputs.into_iter().filter(|p| !owned.contains(p)) {
                self.plug_record_mut(target)?.input = None;
            }
        }
        for &plug in &plug_ids {
            self.plugs[plug.index()] = None;
        }
        if let Some(record) = self.nodes[node.index()].take() {
            debug!("Removed node {}", record.name);
            self.names.remove(&record.name);
        }

        self.mark_dirty(&dirtied);
        Ok(dirtied)
    }

    pub fn node(&self, name: &str) -> GraphResult<NodeId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    pub fn node_name(&self, node: NodeId) -> GraphResult<&str> {
        Ok(&self.node_record(node)?.name)
    }

    pub fn node_type(&self, node: NodeId) -> GraphResult<&str> {
        Ok(self.node_record(node)?.node.type_name())
    }

    /// Live nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Plugs of `node` in declaration order.
    pub fn plugs(&self, node: NodeId) -> GraphResult<&[PlugId]> {
        Ok(&self.node_record(node)?.plugs)
    }

    pub fn plug(&self, node: NodeId, name: &str) -> GraphResult<PlugId> {
        let record = self.node_record(node)?;
        record
            .plugs
            .iter()
            .copied()
            .find(|&p| {
                self.plug_record(p)
                    .map(|r| r.definition.name == name)
                    .unwrap_or(false)
            })
            .ok_or_else(|| GraphError::UnknownPlug(format!("{}.{}", record.name, name)))
    }

    /// Looks up a plug by its `"node.plug"` path.
    pub fn find_plug(&self, path: &str) -> GraphResult<PlugId> {
        let (node, plug) = path
            .split_once('.')
            .ok_or_else(|| GraphError::UnknownPlug(path.to_string()))?;
        self.plug(self.node(node)?, plug)
    }

    pub fn plug_path(&self, plug: PlugId) -> String {
        self.plug_record(plug)
            .and_then(|r| Ok(format!("{}.{}", self.node_record(r.node)?.name, r.definition.name)))
            .unwrap_or_else(|_| format!("<removed plug {}>", plug))
    }

    pub fn plug_definition(&self, plug: PlugId) -> GraphResult<&PlugDefinition> {
        Ok(&self.plug_record(plug)?.definition)
    }

    pub fn plug_node(&self, plug: PlugId) -> GraphResult<NodeId> {
        Ok(self.plug_record(plug)?.node)
    }

    /// The explicitly set value of an unconnected input, if any.
    pub fn static_value(&self, plug: PlugId) -> GraphResult<Option<&Value>> {
        Ok(self.plug_record(plug)?.value.as_ref())
    }

    /// Sets the value of an unconnected input and dirties what it affects.
    ///
    /// Setting the value already held is a no-op and dirties nothing.
    pub fn set_value(
        &mut self,
        plug: PlugId,
        value: impl Into<Value>,
    ) -> GraphResult<Vec<PlugId>> {
        let value = value.into();
        let record = self.plug_record(plug)?;
        if !record.is_input() {
            return Err(GraphError::InvalidEdit {
                plug: self.plug_path(plug),
                reason: "outputs cannot be set".into(),
            });
        }
        if record.input.is_some() {
            return Err(GraphError::InvalidEdit {
                plug: self.plug_path(plug),
                reason: "plug has an input connection".into(),
            });
        }
        if !record.definition.data_type.accepts(value.data_type()) {
            return Err(GraphError::TypeMismatch {
                plug: self.plug_path(plug),
                expected: record.definition.data_type.to_string(),
                found: value.data_type().to_string(),
            });
        }
        if record.value.as_ref() == Some(&value) {
            return Ok(Vec::new());
        }

        let dirtied = self.collect_dirty(&[plug])?;
        debug!("Set {} = {:?}", self.plug_path(plug), value);
        self.plug_record_mut(plug)?.value = Some(value);
        self.mark_dirty(&dirtied);
        Ok(dirtied)
    }

    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_cache_stats(&self) {
        self.stats.reset();
    }

    /// Drops every cached digest and value. Only affects performance.
    pub fn clear_caches(&self) -> GraphResult<()> {
        self.hash_cache.clear()?;
        self.value_cache.clear()
    }

    pub(crate) fn plug_record(&self, plug: PlugId) -> GraphResult<&PlugRecord> {
        self.plugs
            .get(plug.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| GraphError::UnknownPlug(plug.to_string()))
    }

    pub(crate) fn plug_record_mut(&mut self, plug: PlugId) -> GraphResult<&mut PlugRecord> {
        self.plugs
            .get_mut(plug.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| GraphError::UnknownPlug(plug.to_string()))
    }

    pub(crate) fn node_record(&self, node: NodeId) -> GraphResult<&NodeRecord> {
        self.nodes
            .get(node.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| GraphError::UnknownNode(format!("{:?}", node)))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a plug index that lies on a cycle of the intra-node affects
/// relation, if there is one.
fn find_affects_cycle(affects: &[Vec<usize>]) -> Option<usize> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(i: usize, affects: &[Vec<usize>], marks: &mut [Mark]) -> Option<usize> {
        match marks[i] {
            Mark::InProgress => return Some(i),
            Mark::Done => return None,
            Mark::Unvisited => {}
        }
        marks[i] = Mark::InProgress;
        for &next in &affects[i] {
            if let Some(found) = visit(next, affects, marks) {
                return Some(found);
            }
        }
        marks[i] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::Unvisited; affects.len()];
    (0..affects.len()).find_map(|i| visit(i, affects, &mut marks))
}
