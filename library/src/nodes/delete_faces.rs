//! Mesh face deletion driven by a per-face variable.

use std::sync::Arc;

use crate::cache::hash::HashAccumulator;
use crate::error::GraphResult;
use crate::evaluation::{ComputeNode, EvalContext};
use crate::model::{PlugDefinition, PlugType, Value};

pub const IN_OBJECT: &str = "in_object";
pub const IN_BOUND: &str = "in_bound";
pub const IN_ATTRIBUTES: &str = "in_attributes";
pub const FACES: &str = "faces";
pub const OUT_OBJECT: &str = "out_object";
pub const OUT_BOUND: &str = "out_bound";
pub const OUT_ATTRIBUTES: &str = "out_attributes";

/// Deletes the faces flagged by the per-face variable named in `faces`.
///
/// Attributes pass straight through. The output bound follows the processed
/// mesh, or the input bound when the object is not a mesh.
#[derive(Default)]
pub struct DeleteFaces;

impl DeleteFaces {
    pub fn new() -> Self {
        Self
    }
}

impl ComputeNode for DeleteFaces {
    fn type_name(&self) -> &str {
        "DeleteFaces"
    }

    fn plugs(&self) -> Vec<PlugDefinition> {
        vec![
            PlugDefinition::input(IN_OBJECT, PlugType::Any),
            PlugDefinition::input(IN_BOUND, PlugType::Bound),
            PlugDefinition::input(IN_ATTRIBUTES, PlugType::Map),
            PlugDefinition::input(FACES, PlugType::String).with_default("deleteFaces"),
            PlugDefinition::output(OUT_OBJECT, PlugType::Any),
            PlugDefinition::output(OUT_BOUND, PlugType::Bound),
            PlugDefinition::output(OUT_ATTRIBUTES, PlugType::Map),
        ]
    }

    fn affects(&self, plug: &str) -> Vec<&str> {
        match plug {
            IN_OBJECT | FACES => vec![OUT_OBJECT],
            OUT_OBJECT | IN_BOUND => vec![OUT_BOUND],
            _ => Vec::new(),
        }
    }

    fn pass_through(&self) -> Vec<(&str, &str)> {
        vec![(OUT_ATTRIBUTES, IN_ATTRIBUTES)]
    }

    fn hash(&self, output: &str, ctx: &EvalContext, h: &mut HashAccumulator) -> GraphResult<()> {
        match output {
            OUT_OBJECT => {
                ctx.hash_plug(IN_OBJECT, h)?;
                ctx.hash_plug(FACES, h)
            }
            OUT_BOUND => {
                ctx.hash_plug(OUT_OBJECT, h)?;
                ctx.hash_plug(IN_BOUND, h)
            }
            other => Err(ctx.error(format!("unexpected output \"{}\"", other))),
        }
    }

    fn compute(&self, output: &str, ctx: &EvalContext) -> GraphResult<Value> {
        match output {
            OUT_OBJECT => {
                let input = ctx.value(IN_OBJECT)?;
                let Some(mesh) = input.as_mesh() else {
                    return Ok(input);
                };
                let variable = ctx.string(FACES)?;
                if variable.trim().is_empty() {
                    return Ok(input);
                }
                ctx.check_cancelled()?;
                let result = mesh.delete_faces(&variable).ok_or_else(|| {
                    ctx.error(format!("No primitive variable \"{}\" found", variable))
                })?;
                Ok(Value::Mesh(Arc::new(result)))
            }
            OUT_BOUND => match ctx.value(OUT_OBJECT)? {
                Value::Mesh(mesh) => Ok(Value::Bound(mesh.bound())),
                _ => ctx.value(IN_BOUND),
            },
            other => Err(ctx.error(format!("unexpected output \"{}\"", other))),
        }
    }
}
