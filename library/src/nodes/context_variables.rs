use super::context_processor::{ContextProcessor, ContextProcessorNode};
use crate::context::EditableScope;
use crate::error::GraphResult;
use crate::evaluation::EvalContext;
use crate::model::{PlugDefinition, PlugType, Value};

pub const VARIABLES: &str = "variables";

/// Overlays a map of variables onto the context seen upstream.
#[derive(Default)]
pub struct ContextVariablesProcessor;

pub type ContextVariables = ContextProcessorNode<ContextVariablesProcessor>;

impl ContextVariables {
    pub fn new() -> Self {
        ContextProcessorNode::with_processor(ContextVariablesProcessor)
    }
}

impl ContextProcessor for ContextVariablesProcessor {
    fn type_name(&self) -> &str {
        "ContextVariables"
    }

    fn parameters(&self) -> Vec<PlugDefinition> {
        vec![PlugDefinition::input(VARIABLES, PlugType::Map)]
    }

    fn affects_context(&self, plug: &str) -> bool {
        plug == VARIABLES
    }

    fn process_context(&self, ctx: &EvalContext, scope: &mut EditableScope) -> GraphResult<()> {
        match ctx.value(VARIABLES)? {
            Value::Map(variables) => {
                for (name, value) in variables {
                    scope.set(&name, value);
                }
                Ok(())
            }
            other => Err(ctx.error(format!(
                "\"{}\" must be a map, found {}",
                VARIABLES,
                other.data_type()
            ))),
        }
    }
}
