//! A single armature bone in edit (rest) space.

use glam::{Mat3, Quat, Vec3};
use rig_core::{BoneAxis, GeometryError};
use serde::{Deserialize, Serialize};

use crate::classify::JointClass;

/// Bone with head/tail in armature space.
///
/// The local frame has +Y along head→tail; +X and +Z follow from the minimal
/// rotation taking +Y onto the bone, then `roll` radians about +Y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub head: Vec3,
    pub tail: Vec3,
    #[serde(default)]
    pub roll: f32,
    #[serde(default)]
    pub parent: Option<String>,
    /// Joint class assigned once when the bone is created or tagged.
    #[serde(default)]
    pub joint_class: Option<JointClass>,
}

impl Bone {
    pub fn new(name: impl Into<String>, head: Vec3, tail: Vec3) -> Self {
        Self {
            name: name.into(),
            head,
            tail,
            roll: 0.0,
            parent: None,
            joint_class: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_roll(mut self, roll: f32) -> Self {
        self.roll = roll;
        self
    }

    pub fn with_joint_class(mut self, class: JointClass) -> Self {
        self.joint_class = Some(class);
        self
    }

    pub fn length(&self) -> f32 {
        self.head.distance(self.tail)
    }

    pub fn midpoint(&self) -> Vec3 {
        (self.head + self.tail) * 0.5
    }

    pub fn axis(&self) -> Result<BoneAxis, GeometryError> {
        BoneAxis::new(self.head, self.tail)
    }

    /// Rotation from the bone's local frame into armature space.
    pub fn orientation(&self) -> Result<Quat, GeometryError> {
        let dir = self.axis()?.direction();
        Ok(Quat::from_rotation_arc(Vec3::Y, dir) * Quat::from_rotation_y(self.roll))
    }

    /// Local basis as columns (X, Y, Z) in armature space.
    pub fn frame(&self) -> Result<Mat3, GeometryError> {
        Ok(Mat3::from_quat(self.orientation()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upright_bone_frame_matches_editor_convention() {
        let bone = Bone::new("Spine", Vec3::ZERO, Vec3::Z);
        let frame = bone.frame().unwrap();
        assert!(frame.x_axis.abs_diff_eq(Vec3::X, 1e-5));
        assert!(frame.y_axis.abs_diff_eq(Vec3::Z, 1e-5));
        assert!(frame.z_axis.abs_diff_eq(-Vec3::Y, 1e-5));
    }

    #[test]
    fn roll_spins_about_bone_axis() {
        let bone = Bone::new("b", Vec3::ZERO, Vec3::Y).with_roll(std::f32::consts::FRAC_PI_2);
        let frame = bone.frame().unwrap();
        assert!(frame.y_axis.abs_diff_eq(Vec3::Y, 1e-5));
        assert!(frame.x_axis.abs_diff_eq(-Vec3::Z, 1e-5));
    }

    #[test]
    fn zero_length_bone_has_no_frame() {
        let bone = Bone::new("b", Vec3::ONE, Vec3::ONE);
        assert!(bone.frame().is_err());
        assert_eq!(bone.length(), 0.0);
    }
}
