pub mod mesh;
pub mod plug;
pub mod value;

pub use mesh::{Box3, Mesh, Point3};
pub use plug::{NodeId, PlugDefinition, PlugDirection, PlugId};
pub use value::{PlugType, Value};
