//! Typed values carried by plugs and context variables.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ordered_float::OrderedFloat;

use super::mesh::{Box3, Mesh};
use crate::cache::hash::HashAccumulator;

/// Data type of a plug.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlugType {
    Float,
    Int,
    Bool,
    String,
    List,
    Map,
    Mesh,
    Bound,
    /// Accepts any value.
    Any,
}

impl PlugType {
    /// Whether a value produced by a plug of type `source` may feed a plug of this type.
    pub fn accepts(self, source: PlugType) -> bool {
        self == PlugType::Any || source == PlugType::Any || self == source
    }

    /// Value used by an unconnected input that has neither a set value nor a default.
    pub fn zero_value(self) -> Value {
        match self {
            PlugType::Float => Value::Float(OrderedFloat(0.0)),
            PlugType::Int => Value::Int(0),
            PlugType::Bool => Value::Bool(false),
            PlugType::String => Value::String(String::new()),
            PlugType::List => Value::List(Vec::new()),
            PlugType::Map | PlugType::Any => Value::Map(BTreeMap::new()),
            PlugType::Mesh => Value::Mesh(Arc::new(Mesh::default())),
            PlugType::Bound => Value::Bound(Box3::empty()),
        }
    }
}

impl fmt::Display for PlugType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlugType::Float => "float",
            PlugType::Int => "int",
            PlugType::Bool => "bool",
            PlugType::String => "string",
            PlugType::List => "list",
            PlugType::Map => "map",
            PlugType::Mesh => "mesh",
            PlugType::Bound => "bound",
            PlugType::Any => "any",
        };
        write!(f, "{}", s)
    }
}

/// A plug or context value.
///
/// Structured payloads are reference counted so that cache hits and
/// pass-through plugs never deep-copy them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Float(OrderedFloat<f64>),
    Int(i64),
    Bool(bool),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Mesh(Arc<Mesh>),
    Bound(Box3),
}

impl Value {
    pub fn float(value: f64) -> Self {
        Value::Float(OrderedFloat(value))
    }

    pub fn data_type(&self) -> PlugType {
        match self {
            Value::Float(_) => PlugType::Float,
            Value::Int(_) => PlugType::Int,
            Value::Bool(_) => PlugType::Bool,
            Value::String(_) => PlugType::String,
            Value::List(_) => PlugType::List,
            Value::Map(_) => PlugType::Map,
            Value::Mesh(_) => PlugType::Mesh,
            Value::Bound(_) => PlugType::Bound,
        }
    }

    /// Numeric view; integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(v.0),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&Arc<Mesh>> {
        match self {
            Value::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_bound(&self) -> Option<Box3> {
        match self {
            Value::Bound(b) => Some(*b),
            _ => None,
        }
    }

    /// Appends a deterministic, type-tagged contribution to `h`.
    pub fn hash_into(&self, h: &mut HashAccumulator) {
        match self {
            Value::Float(v) => {
                h.append_tag(0).append_f64(v.0);
            }
            Value::Int(v) => {
                h.append_tag(1).append_i64(*v);
            }
            Value::Bool(v) => {
                h.append_tag(2).append_bool(*v);
            }
            Value::String(s) => {
                h.append_tag(3).append_str(s);
            }
            Value::List(items) => {
                h.append_tag(4).append_u64(items.len() as u64);
                for item in items {
                    item.hash_into(h);
                }
            }
            Value::Map(map) => {
                h.append_tag(5).append_u64(map.len() as u64);
                for (key, value) in map {
                    h.append_str(key);
                    value.hash_into(h);
                }
            }
            Value::Mesh(mesh) => {
                h.append_tag(6);
                mesh.hash_into(h);
            }
            Value::Bound(bound) => {
                h.append_tag(7);
                bound.hash_into(h);
            }
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Mesh> for Value {
    fn from(value: Mesh) -> Self {
        Value::Mesh(Arc::new(value))
    }
}

impl From<Box3> for Value {
    fn from(value: Box3) -> Self {
        Value::Bound(value)
    }
}
