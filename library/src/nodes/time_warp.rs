use super::context_processor::{ContextProcessor, ContextProcessorNode};
use crate::context::EditableScope;
use crate::error::GraphResult;
use crate::evaluation::EvalContext;
use crate::model::{PlugDefinition, PlugType};

pub const SPEED: &str = "speed";
pub const OFFSET: &str = "offset";

/// Remaps the frame seen upstream to `frame * speed + offset`.
#[derive(Default)]
pub struct TimeWarpProcessor;

pub type TimeWarp = ContextProcessorNode<TimeWarpProcessor>;

impl TimeWarp {
    pub fn new() -> Self {
        ContextProcessorNode::with_processor(TimeWarpProcessor)
    }
}

impl ContextProcessor for TimeWarpProcessor {
    fn type_name(&self) -> &str {
        "TimeWarp"
    }

    fn parameters(&self) -> Vec<PlugDefinition> {
        vec![
            PlugDefinition::input(SPEED, PlugType::Float).with_default(1.0),
            PlugDefinition::input(OFFSET, PlugType::Float).with_default(0.0),
        ]
    }

    fn affects_context(&self, plug: &str) -> bool {
        plug == SPEED || plug == OFFSET
    }

    fn process_context(&self, ctx: &EvalContext, scope: &mut EditableScope) -> GraphResult<()> {
        let speed = ctx.float(SPEED)?;
        let offset = ctx.float(OFFSET)?;
        let frame = scope.frame()?;
        scope.set_frame(frame * speed + offset);
        Ok(())
    }
}
