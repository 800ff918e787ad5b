//! Object transform for host scene objects (armature, mesh).

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position, rotation and scale of a scene object relative to the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with a uniform scale at the origin.
    pub fn from_uniform_scale(scale: f32) -> Self {
        Self {
            scale: Vec3::splat(scale),
            ..Default::default()
        }
    }

    /// Local-to-world matrix.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Map a point from object space into world space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * point)
    }

    /// Multiply the scale by `factor` on every axis.
    pub fn scale_by(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Take the scale out of the transform, leaving unit scale behind.
    ///
    /// Callers are expected to multiply their object-space data by the
    /// returned value so world-space positions stay where they were.
    pub fn take_scale(&mut self) -> Vec3 {
        std::mem::replace(&mut self.scale, Vec3::ONE)
    }

    pub fn has_unit_scale(&self) -> bool {
        self.scale.abs_diff_eq(Vec3::ONE, 1e-6)
    }
}
