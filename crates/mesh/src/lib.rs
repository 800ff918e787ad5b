//! Mesh model, vertex-group weight fields, and the topology tools that feed
//! jiggle-region weight painting.

pub mod adjacency;
pub mod mesh;
pub mod refine;
pub mod vertex_group;
pub mod weights;

pub use adjacency::*;
pub use mesh::*;
pub use refine::*;
pub use vertex_group::*;
pub use weights::*;
