use crate::cache::hash::HashAccumulator;
use crate::error::GraphResult;
use crate::evaluation::{ComputeNode, EvalContext};
use crate::model::{PlugDefinition, PlugType, Value};

/// `sum = a + b`.
#[derive(Default)]
pub struct Add;

impl Add {
    pub fn new() -> Self {
        Self
    }
}

impl ComputeNode for Add {
    fn type_name(&self) -> &str {
        "Add"
    }

    fn plugs(&self) -> Vec<PlugDefinition> {
        vec![
            PlugDefinition::input("a", PlugType::Float),
            PlugDefinition::input("b", PlugType::Float),
            PlugDefinition::output("sum", PlugType::Float),
        ]
    }

    fn affects(&self, plug: &str) -> Vec<&str> {
        match plug {
            "a" | "b" => vec!["sum"],
            _ => Vec::new(),
        }
    }

    fn hash(&self, _output: &str, ctx: &EvalContext, h: &mut HashAccumulator) -> GraphResult<()> {
        ctx.hash_plug("a", h)?;
        ctx.hash_plug("b", h)
    }

    fn compute(&self, _output: &str, ctx: &EvalContext) -> GraphResult<Value> {
        Ok(Value::float(ctx.float("a")? + ctx.float("b")?))
    }
}
