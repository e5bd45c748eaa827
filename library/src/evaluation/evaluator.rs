//! The capability every node type implements.

use super::context::EvalContext;
use crate::cache::hash::HashAccumulator;
use crate::error::GraphResult;
use crate::model::{PlugDefinition, Value};

/// Behaviour of a node type.
///
/// Nodes are dispatched through `Box<dyn ComputeNode>`. All methods must be
/// deterministic: `hash` and `compute` may only depend on plug values and
/// context variables reached through the [`EvalContext`].
pub trait ComputeNode: Send + Sync {
    /// Name of the node type, included in every output digest.
    fn type_name(&self) -> &str;

    /// Plugs created for each instance, in declaration order.
    fn plugs(&self) -> Vec<PlugDefinition>;

    /// Outputs of this node whose value can change when `plug` changes.
    ///
    /// Queried once when the node is added. Must over-approximate true
    /// data dependencies; a missing entry leaves stale cached values behind.
    fn affects(&self, plug: &str) -> Vec<&str>;

    /// `(output, input)` pairs whose output simply forwards the input.
    fn pass_through(&self) -> Vec<(&str, &str)> {
        Vec::new()
    }

    /// Appends everything `compute(output)` depends on to `h`.
    ///
    /// Node type and output name are already appended by the caller.
    fn hash(&self, output: &str, ctx: &EvalContext, h: &mut HashAccumulator) -> GraphResult<()>;

    /// Computes the value of `output` under `ctx`.
    fn compute(&self, output: &str, ctx: &EvalContext) -> GraphResult<Value>;
}
