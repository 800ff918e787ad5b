//! Armature: a named tree of bones plus its object transform.

use rig_core::{
    BoneAxis, EntityKind, ModeSwitch, ObjectMode, RigError, RigResult, Transform, Vec3,
};
use serde::{Deserialize, Serialize};

use crate::bone::Bone;
use crate::classify::JointClass;

/// Host armature object.
///
/// Bones live in armature space; `transform` maps armature space to world
/// space. New bones can only be added while the armature is in edit mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skeleton {
    pub name: String,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    mode: ObjectMode,
    #[serde(default)]
    bones: Vec<Bone>,
}

impl ModeSwitch for Skeleton {
    fn mode(&self) -> ObjectMode {
        self.mode
    }

    fn set_mode(&mut self, mode: ObjectMode) {
        self.mode = mode;
    }
}

impl Skeleton {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a skeleton from bones listed parent-first.
    pub fn from_bones(name: impl Into<String>, bones: Vec<Bone>) -> RigResult<Self> {
        let mut skeleton = Self::new(name);
        skeleton.mode = ObjectMode::Edit;
        for bone in bones {
            skeleton.add_bone(bone)?;
        }
        skeleton.mode = ObjectMode::Object;
        Ok(skeleton)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn bone_mut(&mut self, name: &str) -> Option<&mut Bone> {
        self.bones.iter_mut().find(|b| b.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bone(name).is_some()
    }

    /// Look up a bone, reporting a missing one as a recoverable error.
    pub fn require(&self, name: &str) -> RigResult<&Bone> {
        self.bone(name)
            .ok_or_else(|| RigError::missing(EntityKind::Bone, name))
    }

    /// Append a bone. Requires edit mode, a unique name and an existing parent.
    pub fn add_bone(&mut self, bone: Bone) -> RigResult<()> {
        if self.mode != ObjectMode::Edit {
            return Err(RigError::unexpected(format!(
                "armature '{}' must be in edit mode to add bone '{}'",
                self.name, bone.name
            )));
        }
        if self.contains(&bone.name) {
            return Err(RigError::unexpected(format!(
                "bone '{}' already exists",
                bone.name
            )));
        }
        if let Some(parent) = &bone.parent {
            if !self.contains(parent) {
                return Err(RigError::missing(EntityKind::Bone, parent.clone()));
            }
        }
        log::debug!("add bone '{}' (parent {:?})", bone.name, bone.parent);
        self.bones.push(bone);
        Ok(())
    }

    /// World-space position of an armature-space point.
    pub fn to_world(&self, point: Vec3) -> Vec3 {
        self.transform.transform_point(point)
    }

    /// World-space axis of a bone.
    pub fn world_axis(&self, name: &str) -> RigResult<BoneAxis> {
        let bone = self.require(name)?;
        Ok(BoneAxis::new(self.to_world(bone.head), self.to_world(bone.tail))?)
    }

    /// Assign a joint class to every bone that has none yet.
    ///
    /// Returns how many bones were tagged.
    pub fn tag_joint_classes(&mut self) -> usize {
        let mut tagged = 0;
        for bone in self.bones.iter_mut().filter(|b| b.joint_class.is_none()) {
            bone.joint_class = Some(JointClass::from_bone_name(&bone.name));
            tagged += 1;
        }
        tagged
    }

    /// Joint class of a bone: its tag, or the naming table for untagged or
    /// unknown bones.
    pub fn joint_class(&self, name: &str) -> JointClass {
        self.bone(name)
            .and_then(|b| b.joint_class)
            .unwrap_or_else(|| JointClass::from_bone_name(name))
    }

    /// Fold the object scale into the bones.
    ///
    /// Heads and tails are multiplied by the current object scale and the
    /// object scale is reset to one. World positions are unchanged; the
    /// previous object scale cannot be recovered.
    pub fn bake_scale(&mut self) -> Vec3 {
        let scale = self.transform.take_scale();
        for bone in &mut self.bones {
            bone.head *= scale;
            bone.tail *= scale;
        }
        log::debug!("baked scale {:?} into {} bones", scale, self.bones.len());
        scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig_core::ModeScope;

    fn sample() -> Skeleton {
        Skeleton::from_bones(
            "Armature",
            vec![
                Bone::new("Hips", Vec3::ZERO, Vec3::new(0.0, 0.0, 0.1)),
                Bone::new("Spine", Vec3::new(0.0, 0.0, 0.1), Vec3::new(0.0, 0.0, 0.3))
                    .with_parent("Hips"),
                Bone::new("J_Sec_L_Bust1", Vec3::new(0.1, 0.0, 0.3), Vec3::new(0.1, -0.1, 0.3))
                    .with_parent("Spine"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn add_bone_requires_edit_mode() {
        let mut s = sample();
        let err = s
            .add_bone(Bone::new("Extra", Vec3::ZERO, Vec3::X))
            .unwrap_err();
        assert!(!err.is_recoverable());

        let mut edit = ModeScope::enter(&mut s, ObjectMode::Edit);
        edit.add_bone(Bone::new("Extra", Vec3::ZERO, Vec3::X)).unwrap();
        drop(edit);
        assert_eq!(s.mode(), ObjectMode::Object);
        assert!(s.contains("Extra"));
    }

    #[test]
    fn add_bone_rejects_missing_parent() {
        let mut s = sample();
        s.set_mode(ObjectMode::Edit);
        let err = s
            .add_bone(Bone::new("Orphan", Vec3::ZERO, Vec3::X).with_parent("Nope"))
            .unwrap_err();
        assert_eq!(err, RigError::missing(EntityKind::Bone, "Nope"));
    }

    #[test]
    fn tagging_is_applied_once() {
        let mut s = sample();
        assert_eq!(s.tag_joint_classes(), 3);
        assert_eq!(s.tag_joint_classes(), 0);
        assert_eq!(s.joint_class("J_Sec_L_Bust1"), JointClass::BustFirst);
        assert_eq!(s.joint_class("Spine"), JointClass::Other);
    }

    #[test]
    fn explicit_tag_wins_over_name() {
        let mut s = sample();
        s.bone_mut("Spine").unwrap().joint_class = Some(JointClass::BustEnd);
        assert_eq!(s.joint_class("Spine"), JointClass::BustEnd);
    }

    #[test]
    fn bake_scale_preserves_world_positions() {
        let mut s = sample();
        s.transform.scale_by(20.0);
        let before = s.world_axis("Spine").unwrap();
        s.bake_scale();
        let after = s.world_axis("Spine").unwrap();
        assert!(s.transform.has_unit_scale());
        assert!(before.head().abs_diff_eq(after.head(), 1e-4));
        assert!((s.bone("Spine").unwrap().length() - 4.0).abs() < 1e-4);
    }
}
