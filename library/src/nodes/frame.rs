use crate::cache::hash::HashAccumulator;
use crate::error::GraphResult;
use crate::evaluation::{ComputeNode, EvalContext};
use crate::model::{PlugDefinition, PlugType, Value};

/// Outputs the `frame` context variable.
#[derive(Default)]
pub struct FrameSource;

impl FrameSource {
    pub fn new() -> Self {
        Self
    }
}

impl ComputeNode for FrameSource {
    fn type_name(&self) -> &str {
        "FrameSource"
    }

    fn plugs(&self) -> Vec<PlugDefinition> {
        vec![PlugDefinition::output("out", PlugType::Float)]
    }

    fn affects(&self, _plug: &str) -> Vec<&str> {
        Vec::new()
    }

    fn hash(&self, _output: &str, ctx: &EvalContext, h: &mut HashAccumulator) -> GraphResult<()> {
        h.append_f64(ctx.context().frame()?);
        Ok(())
    }

    fn compute(&self, _output: &str, ctx: &EvalContext) -> GraphResult<Value> {
        Ok(Value::float(ctx.context().frame()?))
    }
}
