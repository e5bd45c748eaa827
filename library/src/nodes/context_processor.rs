//! Nodes that evaluate their input under a modified context.

use crate::cache::hash::HashAccumulator;
use crate::context::{Context, EditableScope};
use crate::error::GraphResult;
use crate::evaluation::{ComputeNode, EvalContext};
use crate::model::{PlugDefinition, PlugType, Value};

pub const IN: &str = "in";
pub const OUT: &str = "out";

/// The part of a context processor that varies between node types.
///
/// Parameters are read through the [`EvalContext`], which still holds the
/// caller's unmodified context.
pub trait ContextProcessor: Send + Sync {
    fn type_name(&self) -> &str;

    /// Parameter plugs in addition to `in` and `out`.
    fn parameters(&self) -> Vec<PlugDefinition>;

    /// Whether parameter `plug` changes the context presented upstream.
    fn affects_context(&self, plug: &str) -> bool;

    /// Rewrites the variables seen by the `in` plug.
    fn process_context(&self, ctx: &EvalContext, scope: &mut EditableScope) -> GraphResult<()>;
}

/// Forwards `in` to `out`, pulling `in` under the context produced by
/// [`ContextProcessor::process_context`].
///
/// Processors compose: a chain of them applies each override in turn,
/// starting from the one nearest the original request.
pub struct ContextProcessorNode<P> {
    processor: P,
    data_type: PlugType,
}

impl<P: ContextProcessor> ContextProcessorNode<P> {
    pub fn with_processor(processor: P) -> Self {
        Self::with_type(processor, PlugType::Any)
    }

    pub fn with_type(processor: P, data_type: PlugType) -> Self {
        Self {
            processor,
            data_type,
        }
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    fn processed_context(&self, ctx: &EvalContext) -> GraphResult<Context> {
        ctx.context()
            .derive(|scope| self.processor.process_context(ctx, scope))
    }
}

impl<P: ContextProcessor + Default> Default for ContextProcessorNode<P> {
    fn default() -> Self {
        Self::with_processor(P::default())
    }
}

impl<P: ContextProcessor> ComputeNode for ContextProcessorNode<P> {
    fn type_name(&self) -> &str {
        self.processor.type_name()
    }

    fn plugs(&self) -> Vec<PlugDefinition> {
        let mut plugs = vec![
            PlugDefinition::input(IN, self.data_type),
            PlugDefinition::output(OUT, self.data_type),
        ];
        plugs.extend(self.processor.parameters());
        plugs
    }

    fn affects(&self, plug: &str) -> Vec<&str> {
        if plug == IN || self.processor.affects_context(plug) {
            vec![OUT]
        } else {
            Vec::new()
        }
    }

    fn hash(&self, _output: &str, ctx: &EvalContext, h: &mut HashAccumulator) -> GraphResult<()> {
        let processed = self.processed_context(ctx)?;
        ctx.hash_plug_in(IN, &processed, h)
    }

    fn compute(&self, _output: &str, ctx: &EvalContext) -> GraphResult<Value> {
        let processed = self.processed_context(ctx)?;
        ctx.value_in(IN, &processed)
    }
}
