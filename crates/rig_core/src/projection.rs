//! Bone-axis projection and falloff functions.
//!
//! A point is decomposed relative to a bone's head→tail axis into a signed
//! axial distance (along the axis, measured from the head) and a radial
//! distance (perpendicular to the axis). All functions here are pure.

use glam::Vec3;

use crate::error::GeometryError;

/// Bones shorter than this have no usable axis.
pub const MIN_BONE_LENGTH: f32 = 1e-6;

/// Axial and radial coordinates of a point relative to a bone axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisProjection {
    /// Signed distance along the axis from the head, unclamped.
    pub axial: f32,
    /// Distance from the (infinite) axis line.
    pub radial: f32,
}

/// A validated, non-degenerate bone axis in a single coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneAxis {
    head: Vec3,
    direction: Vec3,
    length: f32,
}

impl BoneAxis {
    pub fn new(head: Vec3, tail: Vec3) -> Result<Self, GeometryError> {
        let delta = tail - head;
        let length = delta.length();
        if !(length > MIN_BONE_LENGTH) {
            return Err(GeometryError::DegenerateBone { length });
        }
        Ok(Self {
            head,
            direction: delta / length,
            length,
        })
    }

    pub fn head(&self) -> Vec3 {
        self.head
    }

    pub fn tail(&self) -> Vec3 {
        self.head + self.direction * self.length
    }

    /// Unit vector from head to tail.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn midpoint(&self) -> Vec3 {
        self.head + self.direction * (self.length * 0.5)
    }

    /// `(p - head) · dir`
    pub fn axial(&self, point: Vec3) -> f32 {
        (point - self.head).dot(self.direction)
    }

    /// `|p - (head + axial(p) * dir)|`
    pub fn radial(&self, point: Vec3) -> f32 {
        let foot = self.head + self.direction * self.axial(point);
        (point - foot).length()
    }

    pub fn project(&self, point: Vec3) -> AxisProjection {
        let axial = self.axial(point);
        let foot = self.head + self.direction * axial;
        AxisProjection {
            axial,
            radial: (point - foot).length(),
        }
    }
}

/// Signed distance of `point` along the head→tail axis.
pub fn axial_distance(point: Vec3, head: Vec3, tail: Vec3) -> Result<f32, GeometryError> {
    Ok(BoneAxis::new(head, tail)?.axial(point))
}

/// Perpendicular distance of `point` from the head→tail axis.
pub fn radial_distance(point: Vec3, head: Vec3, tail: Vec3) -> Result<f32, GeometryError> {
    Ok(BoneAxis::new(head, tail)?.radial(point))
}

/// `1 - distance / radius`, floored at zero. A non-positive radius yields zero.
pub fn linear_falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / radius).max(0.0)
}

/// `exp(-rate * |distance| / length)`.
pub fn exponential_decay(distance: f32, length: f32, rate: f32) -> f32 {
    (-rate * distance.abs() / length).exp()
}
