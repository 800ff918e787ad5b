//! Rig augmentation pipeline for VRM humanoids.
//!
//! Operations resolve the armature and its mesh once, run to completion, and
//! return an [`OperationReport`](rig_core::OperationReport). Nothing is rolled
//! back: work finished before a failure stays applied.

pub mod ops;
pub mod paint;
pub mod scene;
pub mod settings;

pub use ops::*;
pub use paint::*;
pub use scene::*;
pub use settings::*;
