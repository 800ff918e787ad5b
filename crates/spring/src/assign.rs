//! Springs for generated jiggle chains.

use rig_core::{RigError, Warnings};
use skeleton::{ChainRecord, Side, Skeleton};

use crate::config::{JointParams, Spring, SpringBoneConfig, SpringJoint};
use crate::presets::{LEFT_ARM_GROUP, RIGHT_ARM_GROUP};

/// Side of a spring from its joints' bone names; `None` when ambiguous.
pub fn spring_side(spring: &Spring) -> Option<Side> {
    Side::resolve(spring.joints.iter().map(|j| j.bone.as_str()))
}

/// Arm collider groups a spring on `side` should collide with.
fn side_groups(side: Side) -> &'static [&'static str] {
    match side {
        Side::Left => &[LEFT_ARM_GROUP],
        Side::Right => &[RIGHT_ARM_GROUP],
        Side::Center => &[LEFT_ARM_GROUP, RIGHT_ARM_GROUP],
    }
}

/// Build the spring for one chain: one joint per segment, root to tip, with
/// the per-class preset parameters.
pub fn chain_spring(chain: &ChainRecord, skeleton: &Skeleton) -> Spring {
    let joints = chain
        .bones
        .iter()
        .map(|bone| SpringJoint {
            bone: bone.clone(),
            params: JointParams::preset(skeleton.joint_class(bone)),
        })
        .collect();
    Spring {
        name: chain.spring_name(),
        joints,
        collider_groups: Vec::new(),
    }
}

/// Create a spring for every chain that has none yet.
///
/// Springs collide with the arm collider groups on their side when those
/// groups exist. A spring already present under the chain's name is kept as
/// is, but reported when its joints (possibly edited outside this crate) span
/// both sides. Chains supplied from outside the generator can mix sides too;
/// such springs are reported and not added. Returns the number of springs
/// created.
pub fn assign_chain_springs(
    config: &mut SpringBoneConfig,
    skeleton: &Skeleton,
    chains: &[ChainRecord],
    warnings: &mut Warnings,
) -> usize {
    let mut created = 0;
    for chain in chains {
        let mut spring = chain_spring(chain, skeleton);
        if let Some(existing) = config.spring(&spring.name) {
            if spring_side(existing).is_none() {
                warnings.push(RigError::AmbiguousClassification {
                    spring: existing.name.clone(),
                });
            } else {
                log::debug!("spring '{}' exists, skipping", spring.name);
            }
            continue;
        }
        let Some(side) = spring_side(&spring) else {
            warnings.push(RigError::AmbiguousClassification {
                spring: spring.name.clone(),
            });
            continue;
        };
        for group in side_groups(side) {
            if config.has_collider_group(group) {
                spring.attach_group(group);
            }
        }
        log::debug!(
            "spring '{}' ({:?}): {} joints, groups {:?}",
            spring.name,
            side,
            spring.joints.len(),
            spring.collider_groups
        );
        config.springs.push(spring);
        created += 1;
    }
    created
}
