//! Plug identity and declaration.

use std::fmt;

use super::value::{PlugType, Value};

/// Handle of a node in the graph arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

/// Handle of a plug in the graph arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlugId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl PlugId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction of a plug.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlugDirection {
    Input,
    Output,
}

/// Declaration of a plug on a node type.
#[derive(Clone, Debug, PartialEq)]
pub struct PlugDefinition {
    pub name: String,
    pub direction: PlugDirection,
    pub data_type: PlugType,
    /// Value used when the input is unconnected and has not been set.
    pub default_value: Option<Value>,
}

impl PlugDefinition {
    pub fn input(name: &str, data_type: PlugType) -> Self {
        Self {
            name: name.to_string(),
            direction: PlugDirection::Input,
            data_type,
            default_value: None,
        }
    }

    pub fn output(name: &str, data_type: PlugType) -> Self {
        Self {
            name: name.to_string(),
            direction: PlugDirection::Output,
            data_type,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// The value an unconnected, unset input reports.
    pub fn fallback_value(&self) -> Value {
        self.default_value
            .clone()
            .unwrap_or_else(|| self.data_type.zero_value())
    }
}
