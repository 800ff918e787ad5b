//! Spring-bone configuration: colliders, collider groups, springs and their
//! joints, plus the passes that populate and rescale them.

pub mod assign;
pub mod config;
pub mod presets;
pub mod propagate;

pub use assign::*;
pub use config::*;
pub use presets::*;
pub use propagate::*;
