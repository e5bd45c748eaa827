//! Dependency-tracked computation graph.
//!
//! Nodes expose typed input and output plugs. Outputs are computed lazily
//! and memoized by a digest of their effective inputs, so identical inputs
//! never recompute. Context processors let a node evaluate its upstream
//! graph under different variables (for instance a remapped frame) without
//! touching the graph or the caller's context.

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluation;
pub mod graph;
pub mod model;
pub mod nodes;

pub use cache::{CacheStatsSnapshot, Digest, HashAccumulator};
pub use config::EngineConfig;
pub use context::{Canceller, Context, EditableScope};
pub use error::{GraphError, GraphResult};
pub use evaluation::{ComputeNode, EvalContext};
pub use graph::{Graph, SubscriptionId};
pub use model::{Box3, Mesh, NodeId, PlugDefinition, PlugDirection, PlugId, PlugType, Value};
