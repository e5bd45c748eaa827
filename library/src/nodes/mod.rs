//! Built-in node types.

pub mod context_processor;
pub mod context_variables;
pub mod delete_faces;
pub mod frame;
pub mod math;
pub mod time_warp;

pub use context_processor::{ContextProcessor, ContextProcessorNode};
pub use context_variables::ContextVariables;
pub use delete_faces::DeleteFaces;
pub use frame::FrameSource;
pub use math::Add;
pub use time_warp::TimeWarp;
