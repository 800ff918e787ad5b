//! Spring-bone configuration consumed by the runtime spring simulation.

use rig_core::Vec3;
use serde::{Deserialize, Serialize};
use skeleton::JointClass;

/// Collision shape in the attached bone's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere { offset: Vec3, radius: f32 },
    Capsule { offset: Vec3, tail: Vec3, radius: f32 },
}

impl ColliderShape {
    pub fn radius(&self) -> f32 {
        match *self {
            ColliderShape::Sphere { radius, .. } | ColliderShape::Capsule { radius, .. } => radius,
        }
    }

    /// Uniformly scaled copy: radius, offset and tail all grow by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        match *self {
            ColliderShape::Sphere { offset, radius } => ColliderShape::Sphere {
                offset: offset * factor,
                radius: radius * factor,
            },
            ColliderShape::Capsule {
                offset,
                tail,
                radius,
            } => ColliderShape::Capsule {
                offset: offset * factor,
                tail: tail * factor,
                radius: radius * factor,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub name: String,
    pub bone: String,
    pub shape: ColliderShape,
}

/// Named set of collider references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColliderGroup {
    pub name: String,
    #[serde(default)]
    pub colliders: Vec<String>,
}

/// Physical parameters of one spring joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointParams {
    pub stiffness: f32,
    pub angular_stiffness: f32,
    pub drag_force: f32,
    /// Collision radius of the joint.
    pub hit_radius: f32,
    pub gravity_power: f32,
    pub gravity_dir: Vec3,
    /// Maximum swing in degrees.
    pub max_angle: f32,
}

impl Default for JointParams {
    fn default() -> Self {
        Self {
            stiffness: 1.0,
            angular_stiffness: 0.0,
            drag_force: 0.4,
            hit_radius: 0.02,
            gravity_power: 0.0,
            gravity_dir: Vec3::NEG_Y,
            max_angle: 180.0,
        }
    }
}

impl JointParams {
    /// Starting parameters for a freshly generated joint of `class`.
    pub fn preset(class: JointClass) -> Self {
        match class {
            JointClass::BustFirst => Self {
                stiffness: 0.3,
                drag_force: 0.1,
                gravity_power: 0.05,
                hit_radius: 0.03,
                max_angle: 30.0,
                ..Default::default()
            },
            JointClass::BustThird => Self {
                stiffness: 0.25,
                drag_force: 0.15,
                gravity_power: 0.05,
                hit_radius: 0.025,
                max_angle: 30.0,
                ..Default::default()
            },
            JointClass::BustEnd => Self {
                stiffness: 0.2,
                drag_force: 0.2,
                gravity_power: 0.05,
                hit_radius: 0.02,
                max_angle: 30.0,
                ..Default::default()
            },
            JointClass::Other => Self {
                stiffness: 0.6,
                drag_force: 0.3,
                gravity_power: 0.1,
                hit_radius: 0.02,
                max_angle: 45.0,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringJoint {
    pub bone: String,
    #[serde(default)]
    pub params: JointParams,
}

/// Ordered joints (root to tip) plus the collider groups they collide with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub name: String,
    #[serde(default)]
    pub joints: Vec<SpringJoint>,
    #[serde(default)]
    pub collider_groups: Vec<String>,
}

impl Spring {
    /// Reference `group` unless it is already referenced.
    pub fn attach_group(&mut self, group: &str) -> bool {
        if self.collider_groups.iter().any(|g| g == group) {
            return false;
        }
        self.collider_groups.push(group.to_string());
        true
    }
}

/// The whole spring-bone extension of an armature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpringBoneConfig {
    #[serde(default)]
    pub colliders: Vec<Collider>,
    #[serde(default)]
    pub collider_groups: Vec<ColliderGroup>,
    #[serde(default)]
    pub springs: Vec<Spring>,
}

impl SpringBoneConfig {
    pub fn collider_index(&self, name: &str) -> Option<usize> {
        self.colliders.iter().position(|c| c.name == name)
    }

    pub fn collider(&self, name: &str) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.name == name)
    }

    pub fn collider_group(&self, name: &str) -> Option<&ColliderGroup> {
        self.collider_groups.iter().find(|g| g.name == name)
    }

    pub fn has_collider_group(&self, name: &str) -> bool {
        self.collider_group(name).is_some()
    }

    pub fn spring(&self, name: &str) -> Option<&Spring> {
        self.springs.iter().find(|s| s.name == name)
    }

    pub fn has_spring(&self, name: &str) -> bool {
        self.spring(name).is_some()
    }

    /// Springs whose name contains `pattern`.
    pub fn springs_matching<'a>(&'a mut self, pattern: &'a str) -> impl Iterator<Item = &'a mut Spring> + 'a {
        self.springs
            .iter_mut()
            .filter(move |s| s.name.contains(pattern))
    }
}
