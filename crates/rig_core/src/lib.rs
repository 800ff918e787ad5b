//! Core types shared by the rig augmentation crates.
//!
//! This crate provides the foundational pieces every other crate builds on:
//! - Object transforms and the scoped object-mode guard
//! - Bone-axis projection and falloff functions
//! - The error taxonomy, warning collection, and per-operation reports

pub mod error;
pub mod mode;
pub mod projection;
pub mod report;
pub mod transform;

pub use error::*;
pub use mode::*;
pub use projection::*;
pub use report::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat3, Mat4, Quat, Vec3};
