//! Rescaling of spring parameters when the whole model is scaled.
//!
//! Stiffness and drag follow per-class power laws of the scale factor; the
//! hit radius scales linearly.

use std::collections::BTreeSet;

use rig_core::{RigError, RigResult};
use skeleton::{JointClass, Skeleton};

use crate::config::{ColliderShape, JointParams, SpringBoneConfig};

/// Power-law exponents applied as `S^exponent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleExponents {
    pub stiffness: f32,
    pub drag_force: f32,
}

impl ScaleExponents {
    pub fn for_class(class: JointClass) -> Self {
        let (stiffness, drag_force) = match class {
            JointClass::BustFirst => (0.9, 0.001),
            JointClass::BustEnd => (0.8, 0.2),
            JointClass::BustThird => (0.7, 0.1),
            JointClass::Other => (1.4, 1.4),
        };
        Self {
            stiffness,
            drag_force,
        }
    }
}

/// Joint parameters after scaling the model by `factor`.
///
/// Collision radius grows linearly; gravity, angular stiffness and max angle
/// are unchanged.
pub fn scale_joint(params: &JointParams, class: JointClass, factor: f32) -> JointParams {
    let exp = ScaleExponents::for_class(class);
    JointParams {
        stiffness: params.stiffness * factor.powf(exp.stiffness),
        drag_force: params.drag_force * factor.powf(exp.drag_force),
        hit_radius: params.hit_radius * factor,
        ..*params
    }
}

/// Every change a scale pass will make, computed before anything is written.
#[derive(Debug, Clone, Default)]
pub struct ScalePlan {
    pub factor: f32,
    /// (spring index, joint index, new parameters)
    pub joints: Vec<(usize, usize, JointParams)>,
    /// (collider index, new shape)
    pub colliders: Vec<(usize, ColliderShape)>,
}

/// Counts reported by a scale pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScaleSummary {
    pub joints: usize,
    pub colliders: usize,
}

/// Walk springs → joints → collider groups → colliders and plan the new
/// values.
///
/// Collider names that do not resolve are skipped silently. Colliders no
/// spring references are scaled as well, each collider exactly once.
pub fn plan_scale(config: &SpringBoneConfig, skeleton: &Skeleton, factor: f32) -> RigResult<ScalePlan> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(RigError::unexpected(format!(
            "scale factor must be positive and finite, got {}",
            factor
        )));
    }

    let mut plan = ScalePlan {
        factor,
        ..Default::default()
    };
    let mut scaled: BTreeSet<usize> = BTreeSet::new();

    for (si, spring) in config.springs.iter().enumerate() {
        for (ji, joint) in spring.joints.iter().enumerate() {
            let class = skeleton.joint_class(&joint.bone);
            plan.joints.push((si, ji, scale_joint(&joint.params, class, factor)));
        }

        for group_name in &spring.collider_groups {
            let Some(group) = config.collider_group(group_name) else {
                log::debug!("spring '{}': collider group '{}' not found", spring.name, group_name);
                continue;
            };
            for collider_name in &group.colliders {
                let Some(ci) = config.collider_index(collider_name) else {
                    log::debug!("group '{}': collider '{}' not found", group.name, collider_name);
                    continue;
                };
                if scaled.insert(ci) {
                    plan.colliders.push((ci, config.colliders[ci].shape.scaled(factor)));
                }
            }
        }
    }

    for (ci, collider) in config.colliders.iter().enumerate() {
        if scaled.insert(ci) {
            plan.colliders.push((ci, collider.shape.scaled(factor)));
        }
    }

    Ok(plan)
}

/// Write a plan into the configuration and scale + bake the armature.
///
/// Baking folds the object scale into the bones and cannot be undone.
pub fn apply_scale(config: &mut SpringBoneConfig, skeleton: &mut Skeleton, plan: &ScalePlan) -> ScaleSummary {
    for &(si, ji, params) in &plan.joints {
        if let Some(joint) = config.springs.get_mut(si).and_then(|s| s.joints.get_mut(ji)) {
            joint.params = params;
        }
    }
    for &(ci, shape) in &plan.colliders {
        if let Some(collider) = config.colliders.get_mut(ci) {
            collider.shape = shape;
        }
    }
    skeleton.transform.scale_by(plan.factor);
    skeleton.bake_scale();

    ScaleSummary {
        joints: plan.joints.len(),
        colliders: plan.colliders.len(),
    }
}

/// Plan and apply in one step.
pub fn scale_springs(config: &mut SpringBoneConfig, skeleton: &mut Skeleton, factor: f32) -> RigResult<ScaleSummary> {
    let plan = plan_scale(config, skeleton, factor)?;
    let summary = apply_scale(config, skeleton, &plan);
    log::info!(
        "scaled model by {}: {} joints, {} colliders",
        factor,
        summary.joints,
        summary.colliders
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Collider, ColliderGroup, Spring, SpringJoint};
    use rig_core::Vec3;
    use skeleton::Bone;

    fn rig() -> (SpringBoneConfig, Skeleton) {
        let mut skeleton = Skeleton::from_bones(
            "Armature",
            vec![
                Bone::new("J_Bip_C_Chest", Vec3::ZERO, Vec3::new(0.0, 0.0, 0.2)),
                Bone::new("J_Sec_L_Bust1", Vec3::new(0.1, 0.0, 0.1), Vec3::new(0.1, -0.1, 0.1))
                    .with_parent("J_Bip_C_Chest"),
                Bone::new("J_Sec_Hair1", Vec3::new(0.0, 0.0, 0.3), Vec3::new(0.0, 0.0, 0.2)),
            ],
        )
        .unwrap();
        skeleton.tag_joint_classes();

        let joint = |bone: &str| SpringJoint {
            bone: bone.into(),
            params: JointParams {
                stiffness: 1.0,
                drag_force: 1.0,
                hit_radius: 0.1,
                gravity_power: 0.5,
                ..Default::default()
            },
        };
        let config = SpringBoneConfig {
            colliders: vec![
                Collider {
                    name: "J_Bip_C_Chest".into(),
                    bone: "J_Bip_C_Chest".into(),
                    shape: ColliderShape::Sphere { offset: Vec3::Y, radius: 0.1 },
                },
                Collider {
                    name: "Loose".into(),
                    bone: "J_Bip_C_Chest".into(),
                    shape: ColliderShape::Sphere { offset: Vec3::ZERO, radius: 0.05 },
                },
            ],
            collider_groups: vec![ColliderGroup {
                name: "Body".into(),
                colliders: vec!["J_Bip_C_Chest".into(), "Gone".into()],
            }],
            springs: vec![
                Spring {
                    name: "Bust".into(),
                    joints: vec![joint("J_Sec_L_Bust1")],
                    collider_groups: vec!["Body".into(), "Missing".into()],
                },
                Spring {
                    name: "Hair".into(),
                    joints: vec![joint("J_Sec_Hair1")],
                    collider_groups: vec!["Body".into()],
                },
            ],
        };
        (config, skeleton)
    }

    #[test]
    fn exponent_table() {
        assert_eq!(
            ScaleExponents::for_class(JointClass::BustFirst),
            ScaleExponents { stiffness: 0.9, drag_force: 0.001 }
        );
        assert_eq!(
            ScaleExponents::for_class(JointClass::BustEnd),
            ScaleExponents { stiffness: 0.8, drag_force: 0.2 }
        );
        assert_eq!(
            ScaleExponents::for_class(JointClass::BustThird),
            ScaleExponents { stiffness: 0.7, drag_force: 0.1 }
        );
        assert_eq!(
            ScaleExponents::for_class(JointClass::Other),
            ScaleExponents { stiffness: 1.4, drag_force: 1.4 }
        );
    }

    #[test]
    fn first_bust_joint_at_twenty() {
        let params = JointParams { stiffness: 1.0, ..Default::default() };
        let scaled = scale_joint(&params, JointClass::BustFirst, 20.0);
        assert!((scaled.stiffness - 20f32.powf(0.9)).abs() < 1e-3);
        assert!((scaled.stiffness - 14.82).abs() < 0.01);
    }

    #[test]
    fn other_joint_at_twenty() {
        let params = JointParams { stiffness: 1.0, ..Default::default() };
        let scaled = scale_joint(&params, JointClass::Other, 20.0);
        assert!((scaled.stiffness - 20f32.powf(1.4)).abs() < 1e-2);
        assert!((scaled.stiffness - 66.29).abs() < 0.05);
    }

    #[test]
    fn radius_linear_gravity_invariant() {
        let params = JointParams {
            hit_radius: 0.02,
            gravity_power: 0.3,
            gravity_dir: Vec3::NEG_Z,
            max_angle: 40.0,
            ..Default::default()
        };
        for class in JointClass::ALL {
            let s = scale_joint(&params, class, 3.0);
            assert!((s.hit_radius - 0.06).abs() < 1e-6);
            assert_eq!(s.gravity_power, 0.3);
            assert_eq!(s.gravity_dir, Vec3::NEG_Z);
            assert_eq!(s.max_angle, 40.0);
        }
    }

    #[test]
    fn scale_springs_uses_tags_and_skips_missing_references() {
        let (mut config, mut skeleton) = rig();
        let summary = scale_springs(&mut config, &mut skeleton, 20.0).unwrap();
        assert_eq!(summary, ScaleSummary { joints: 2, colliders: 2 });

        let bust = &config.springs[0].joints[0].params;
        assert!((bust.stiffness - 20f32.powf(0.9)).abs() < 1e-3);
        assert!((bust.drag_force - 20f32.powf(0.001)).abs() < 1e-4);
        assert_eq!(bust.gravity_power, 0.5);

        let hair = &config.springs[1].joints[0].params;
        assert!((hair.stiffness - 20f32.powf(1.4)).abs() < 1e-2);

        // Shared collider scaled once, unreferenced collider scaled too
        assert!((config.colliders[0].shape.radius() - 2.0).abs() < 1e-5);
        assert!((config.colliders[1].shape.radius() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn scale_bakes_armature() {
        let (mut config, mut skeleton) = rig();
        scale_springs(&mut config, &mut skeleton, 2.0).unwrap();
        assert!(skeleton.transform.has_unit_scale());
        let chest = skeleton.bone("J_Bip_C_Chest").unwrap();
        assert!((chest.length() - 0.4).abs() < 1e-5);
    }

    #[test]
    fn invalid_factor_changes_nothing() {
        let (mut config, mut skeleton) = rig();
        let before = config.clone();
        assert!(scale_springs(&mut config, &mut skeleton, 0.0).is_err());
        assert!(scale_springs(&mut config, &mut skeleton, f32::NAN).is_err());
        assert_eq!(config, before);
    }
}
