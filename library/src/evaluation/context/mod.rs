//! Evaluation handle passed to node `hash` and `compute` implementations.

use crate::cache::hash::HashAccumulator;
use crate::context::Context;
use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::model::{NodeId, PlugId, Value};

/// Access to the graph while one plug of one node is hashed or computed.
///
/// Plugs are addressed by name on the current node. The plain accessors
/// evaluate under the incoming context; the `_in` variants take a context
/// the node derived itself, which is how context processors present
/// modified variables upstream.
pub struct EvalContext<'a> {
    graph: &'a Graph,
    node: NodeId,
    plug: PlugId,
    context: &'a Context,
}

impl<'a> EvalContext<'a> {
    pub(crate) fn new(graph: &'a Graph, node: NodeId, plug: PlugId, context: &'a Context) -> Self {
        Self {
            graph,
            node,
            plug,
            context,
        }
    }

    /// The context this request was made in.
    pub fn context(&self) -> &'a Context {
        self.context
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// The plug being hashed or computed.
    pub fn plug(&self) -> PlugId {
        self.plug
    }

    pub fn plug_id(&self, name: &str) -> GraphResult<PlugId> {
        self.graph.plug(self.node, name)
    }

    pub fn value(&self, name: &str) -> GraphResult<Value> {
        self.value_in(name, self.context)
    }

    pub fn value_in(&self, name: &str, context: &Context) -> GraphResult<Value> {
        self.graph.get_value(self.plug_id(name)?, context)
    }

    /// Appends the digest of plug `name` to `h`.
    pub fn hash_plug(&self, name: &str, h: &mut HashAccumulator) -> GraphResult<()> {
        self.hash_plug_in(name, self.context, h)
    }

    pub fn hash_plug_in(
        &self,
        name: &str,
        context: &Context,
        h: &mut HashAccumulator,
    ) -> GraphResult<()> {
        h.append_digest(self.graph.hash(self.plug_id(name)?, context)?);
        Ok(())
    }

    pub fn float(&self, name: &str) -> GraphResult<f64> {
        let value = self.value(name)?;
        value
            .as_float()
            .ok_or_else(|| self.type_error(name, "float", &value))
    }

    pub fn string(&self, name: &str) -> GraphResult<String> {
        match self.value(name)? {
            Value::String(s) => Ok(s),
            other => Err(self.type_error(name, "string", &other)),
        }
    }

    /// Cooperative cancellation point for long computes.
    pub fn check_cancelled(&self) -> GraphResult<()> {
        self.context.check_cancelled()
    }

    /// A compute error attributed to the plug being evaluated.
    pub fn error(&self, message: impl Into<String>) -> GraphError {
        GraphError::Compute {
            plug: self.graph.plug_path(self.plug),
            message: message.into(),
        }
    }

    fn type_error(&self, name: &str, expected: &str, found: &Value) -> GraphError {
        GraphError::TypeMismatch {
            plug: format!("{}.{}", self.node_path(), name),
            expected: expected.to_string(),
            found: found.data_type().to_string(),
        }
    }

    fn node_path(&self) -> &str {
        self.graph.node_name(self.node).unwrap_or("<removed>")
    }
}
