#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use plugraph::{
    ComputeNode, EvalContext, GraphResult, HashAccumulator, PlugDefinition, PlugType, Value,
};

/// Instrumented node: `out = in + frame` (frame defaults to 0).
///
/// Counts computes, can sleep to widen race windows, and can be told to fail.
/// `unrelated` is declared but affects nothing.
#[derive(Clone, Default)]
pub struct Probe {
    pub calls: Arc<AtomicUsize>,
    pub fail: Arc<AtomicBool>,
    pub delay: Duration,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl ComputeNode for Probe {
    fn type_name(&self) -> &str {
        "Probe"
    }

    fn plugs(&self) -> Vec<PlugDefinition> {
        vec![
            PlugDefinition::input("in", PlugType::Float),
            PlugDefinition::input("unrelated", PlugType::Float),
            PlugDefinition::output("out", PlugType::Float),
        ]
    }

    fn affects(&self, plug: &str) -> Vec<&str> {
        match plug {
            "in" => vec!["out"],
            _ => Vec::new(),
        }
    }

    fn hash(&self, _output: &str, ctx: &EvalContext, h: &mut HashAccumulator) -> GraphResult<()> {
        ctx.hash_plug("in", h)?;
        if let Ok(frame) = ctx.context().frame() {
            h.append_f64(frame);
        }
        Ok(())
    }

    fn compute(&self, _output: &str, ctx: &EvalContext) -> GraphResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        ctx.check_cancelled()?;
        if self.fail.load(Ordering::SeqCst) {
            return Err(ctx.error("probe failure"));
        }
        let frame = ctx.context().frame().unwrap_or(0.0);
        Ok(Value::float(ctx.float("in")? + frame))
    }
}
