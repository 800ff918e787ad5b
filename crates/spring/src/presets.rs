//! Ready-made collider sets for VRoid-style humanoids.
//!
//! Each preset adds colliders on well-known bones, groups them, and lets every
//! hair spring collide with the new groups.

use rig_core::{EntityKind, RigError, Vec3, Warnings};
use skeleton::Skeleton;

use crate::config::{Collider, ColliderGroup, ColliderShape, SpringBoneConfig};

pub const BREAST_GROUP: &str = "Breasts";
pub const LONG_HAIR_GROUP: &str = "LongHairHelper";
pub const LEFT_ARM_GROUP: &str = "LeftArmColliders";
pub const RIGHT_ARM_GROUP: &str = "RightArmColliders";

/// Springs whose name contains this receive preset groups.
pub const HAIR_SPRING_PATTERN: &str = "Hair";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderPreset {
    Breast,
    LongHair,
    ArmsAndHands,
}

/// A group a preset creates, with the colliders it holds.
#[derive(Debug, Clone)]
pub struct PresetGroup {
    pub name: &'static str,
    pub colliders: Vec<(&'static str, ColliderShape)>,
}

fn sphere(offset: [f32; 3], radius: f32) -> ColliderShape {
    ColliderShape::Sphere {
        offset: Vec3::from(offset),
        radius,
    }
}

fn capsule(offset: [f32; 3], tail: [f32; 3], radius: f32) -> ColliderShape {
    ColliderShape::Capsule {
        offset: Vec3::from(offset),
        tail: Vec3::from(tail),
        radius,
    }
}

fn arm_colliders(side: &str) -> Vec<(&'static str, ColliderShape)> {
    let (upper, lower, hand) = if side == "L" {
        ("J_Bip_L_UpperArm", "J_Bip_L_LowerArm", "J_Bip_L_Hand")
    } else {
        ("J_Bip_R_UpperArm", "J_Bip_R_LowerArm", "J_Bip_R_Hand")
    };
    vec![
        (upper, capsule([0.0; 3], [0.0, 0.2, 0.0], 0.043)),
        (lower, capsule([0.0; 3], [0.0, 0.2, 0.0], 0.041)),
        (hand, sphere([0.000003, 0.08, 0.0], 0.054)),
    ]
}

/// Name of the collider a preset group places on `bone`.
pub fn preset_collider_name(bone: &str, group: &str) -> String {
    format!("{}_{}", bone, group)
}

impl ColliderPreset {
    pub fn label(&self) -> &'static str {
        match self {
            ColliderPreset::Breast => "breast physics colliders",
            ColliderPreset::LongHair => "long hair body penetration prevention",
            ColliderPreset::ArmsAndHands => "arm and hand colliders",
        }
    }

    pub fn groups(&self) -> Vec<PresetGroup> {
        match self {
            ColliderPreset::Breast => vec![PresetGroup {
                name: BREAST_GROUP,
                colliders: vec![
                    ("J_Sec_L_Bust1", sphere([-0.13, -0.052, 0.018], 0.07)),
                    ("J_Sec_R_Bust1", sphere([0.13, -0.052, 0.018], 0.07)),
                ],
            }],
            ColliderPreset::LongHair => vec![PresetGroup {
                name: LONG_HAIR_GROUP,
                colliders: vec![(
                    "J_Bip_C_Chest",
                    capsule([0.0, -0.08, 0.0], [0.0, 0.14, 0.0], 0.12),
                )],
            }],
            ColliderPreset::ArmsAndHands => vec![
                PresetGroup {
                    name: LEFT_ARM_GROUP,
                    colliders: arm_colliders("L"),
                },
                PresetGroup {
                    name: RIGHT_ARM_GROUP,
                    colliders: arm_colliders("R"),
                },
            ],
        }
    }

    /// Add the preset to `config`.
    ///
    /// Skipped entirely when any of its groups already exists. Colliders on
    /// bones the armature lacks are reported and left out. Preset colliders
    /// are named per group, so colliders the rig already has on the same bones
    /// are left alone.
    pub fn install(
        &self,
        config: &mut SpringBoneConfig,
        skeleton: &Skeleton,
        warnings: &mut Warnings,
    ) -> PresetOutcome {
        let groups = self.groups();
        if let Some(existing) = groups.iter().find(|g| config.has_collider_group(g.name)) {
            log::info!("{}: group '{}' already present, skipping", self.label(), existing.name);
            return PresetOutcome::default();
        }

        let mut outcome = PresetOutcome::default();
        for group in &groups {
            let mut members = Vec::new();
            for (bone, shape) in &group.colliders {
                if !skeleton.contains(bone) {
                    warnings.push(RigError::missing(EntityKind::Bone, *bone));
                    continue;
                }
                let name = preset_collider_name(bone, group.name);
                if config.collider(&name).is_none() {
                    config.colliders.push(Collider {
                        name: name.clone(),
                        bone: bone.to_string(),
                        shape: *shape,
                    });
                    outcome.colliders_added += 1;
                }
                members.push(name);
            }
            config.collider_groups.push(ColliderGroup {
                name: group.name.to_string(),
                colliders: members,
            });
            outcome.groups_added += 1;

            for spring in config.springs_matching(HAIR_SPRING_PATTERN) {
                if spring.attach_group(group.name) {
                    outcome.springs_attached += 1;
                }
            }
        }
        outcome
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresetOutcome {
    pub colliders_added: usize,
    pub groups_added: usize,
    pub springs_attached: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Spring;
    use skeleton::Bone;

    fn humanoid() -> Skeleton {
        let names = [
            "J_Bip_C_Chest",
            "J_Sec_L_Bust1",
            "J_Sec_R_Bust1",
            "J_Bip_L_UpperArm",
            "J_Bip_L_LowerArm",
            "J_Bip_L_Hand",
            "J_Bip_R_UpperArm",
            "J_Bip_R_LowerArm",
            "J_Bip_R_Hand",
        ];
        let bones = names
            .iter()
            .enumerate()
            .map(|(i, n)| Bone::new(*n, Vec3::new(i as f32, 0.0, 0.0), Vec3::new(i as f32, 0.1, 0.0)))
            .collect();
        Skeleton::from_bones("Armature", bones).unwrap()
    }

    fn config_with_springs() -> SpringBoneConfig {
        SpringBoneConfig {
            springs: ["HairFront", "HairBack", "Skirt"]
                .iter()
                .map(|n| Spring {
                    name: n.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn breast_preset_matches_reference_values() {
        let mut config = config_with_springs();
        let mut warnings = Warnings::new();
        let outcome = ColliderPreset::Breast.install(&mut config, &humanoid(), &mut warnings);
        assert!(warnings.is_empty());
        assert_eq!(outcome, PresetOutcome { colliders_added: 2, groups_added: 1, springs_attached: 2 });

        let left = config.collider("J_Sec_L_Bust1_Breasts").unwrap();
        assert_eq!(left.bone, "J_Sec_L_Bust1");
        assert_eq!(left.shape, sphere([-0.13, -0.052, 0.018], 0.07));
        assert_eq!(
            config.collider_group(BREAST_GROUP).unwrap().colliders,
            vec!["J_Sec_L_Bust1_Breasts".to_string(), "J_Sec_R_Bust1_Breasts".to_string()]
        );
        assert!(config.spring("Skirt").unwrap().collider_groups.is_empty());
        assert_eq!(config.spring("HairBack").unwrap().collider_groups, vec![BREAST_GROUP.to_string()]);
    }

    #[test]
    fn long_hair_preset_is_a_chest_capsule() {
        let mut config = config_with_springs();
        ColliderPreset::LongHair.install(&mut config, &humanoid(), &mut Warnings::new());
        let chest = config.collider("J_Bip_C_Chest_LongHairHelper").unwrap();
        assert_eq!(chest.shape, capsule([0.0, -0.08, 0.0], [0.0, 0.14, 0.0], 0.12));
    }

    #[test]
    fn existing_body_collider_on_the_same_bone_is_kept() {
        let mut config = config_with_springs();
        let body = Collider {
            name: "J_Bip_C_Chest".to_string(),
            bone: "J_Bip_C_Chest".to_string(),
            shape: sphere([0.0; 3], 0.05),
        };
        config.colliders.push(body.clone());

        let outcome = ColliderPreset::LongHair.install(&mut config, &humanoid(), &mut Warnings::new());
        assert_eq!(outcome.colliders_added, 1);
        assert_eq!(config.collider("J_Bip_C_Chest"), Some(&body));

        let group = config.collider_group(LONG_HAIR_GROUP).unwrap();
        assert_eq!(group.colliders.len(), 1);
        let helper = config.collider(&group.colliders[0]).unwrap();
        assert_eq!(helper.bone, "J_Bip_C_Chest");
        assert_eq!(helper.shape, capsule([0.0, -0.08, 0.0], [0.0, 0.14, 0.0], 0.12));
    }

    #[test]
    fn arm_preset_splits_sides() {
        let mut config = config_with_springs();
        let outcome = ColliderPreset::ArmsAndHands.install(&mut config, &humanoid(), &mut Warnings::new());
        assert_eq!(outcome.colliders_added, 6);
        assert_eq!(outcome.groups_added, 2);
        let left = config.collider_group(LEFT_ARM_GROUP).unwrap();
        assert!(left.colliders.iter().all(|c| c.contains("_L_")));
        let right = config.collider_group(RIGHT_ARM_GROUP).unwrap();
        assert!(right.colliders.iter().all(|c| c.contains("_R_")));
        assert_eq!(
            config.spring("HairFront").unwrap().collider_groups,
            vec![LEFT_ARM_GROUP.to_string(), RIGHT_ARM_GROUP.to_string()]
        );
    }

    #[test]
    fn reinstall_is_skipped() {
        let mut config = config_with_springs();
        let skeleton = humanoid();
        ColliderPreset::Breast.install(&mut config, &skeleton, &mut Warnings::new());
        let before = config.clone();
        let outcome = ColliderPreset::Breast.install(&mut config, &skeleton, &mut Warnings::new());
        assert_eq!(outcome, PresetOutcome::default());
        assert_eq!(config, before);
    }

    #[test]
    fn missing_bone_is_warned_and_skipped() {
        let mut config = config_with_springs();
        let skeleton = Skeleton::from_bones(
            "Armature",
            vec![Bone::new("J_Sec_L_Bust1", Vec3::ZERO, Vec3::Y)],
        )
        .unwrap();
        let mut warnings = Warnings::new();
        let outcome = ColliderPreset::Breast.install(&mut config, &skeleton, &mut warnings);
        assert_eq!(warnings.len(), 1);
        assert_eq!(outcome.colliders_added, 1);
        assert_eq!(config.collider_group(BREAST_GROUP).unwrap().colliders.len(), 1);
    }
}
