//! Armature model and procedural jiggle-chain generation.

pub mod bone;
pub mod chain;
pub mod classify;
pub mod skeleton;

pub use bone::*;
pub use chain::*;
pub use classify::*;
pub use skeleton::*;
