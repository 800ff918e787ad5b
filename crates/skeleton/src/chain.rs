//! Procedural jiggle-chain generation.
//!
//! A chain is three short bones sprouting from a source bone. Chains are
//! planned first (pure, validated) and then applied to the armature in edit
//! mode, so a failed plan never leaves half a chain behind.
//!
//! Bone names encode `(source, chain, segment)` and later passes (spring
//! assignment, weight painting) recover chain membership from names alone.

use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::fmt;

use rig_core::{ModeScope, ObjectMode, RigError, RigResult, Vec3, Warnings};

use crate::bone::Bone;
use crate::classify::JointClass;
use crate::skeleton::Skeleton;

pub const SEGMENTS_PER_CHAIN: u32 = 3;
/// Length of every generated segment.
pub const SEGMENT_LENGTH: f32 = 0.05;
/// Distance of the first head from the source bone's midpoint.
pub const RADIAL_OFFSET: f32 = 0.05;

const JIGGLE_MARKER: &str = "_Jiggle";

/// Parsed form of a generated bone name: `{source}_Jiggle{chain}_{segment}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainBoneName {
    pub source: String,
    pub chain: u32,
    pub segment: u32,
}

impl ChainBoneName {
    pub fn new(source: impl Into<String>, chain: u32, segment: u32) -> Self {
        Self {
            source: source.into(),
            chain,
            segment,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let (rest, segment) = name.rsplit_once('_')?;
        let (source, chain) = rest.rsplit_once(JIGGLE_MARKER)?;
        if source.is_empty() {
            return None;
        }
        let chain: u32 = chain.parse().ok()?;
        let segment: u32 = segment.parse().ok()?;
        if chain == 0 || !(1..=SEGMENTS_PER_CHAIN).contains(&segment) {
            return None;
        }
        Some(Self::new(source, chain, segment))
    }
}

impl fmt::Display for ChainBoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}_{}",
            self.source, JIGGLE_MARKER, self.chain, self.segment
        )
    }
}

pub fn chain_bone_name(source: &str, chain: u32, segment: u32) -> String {
    ChainBoneName::new(source, chain, segment).to_string()
}

/// Name of the spring that drives a chain.
pub fn chain_spring_name(source: &str, chain: u32) -> String {
    format!("{}{}{}", source, JIGGLE_MARKER, chain)
}

/// Directions in the source bone's local frame, one per chain.
///
/// A single chain uses the canonical forward direction (+Z); more chains are
/// spread evenly around the bone's +Y axis starting from +X.
pub fn sample_directions(count: u32) -> Vec<Vec3> {
    match count {
        0 => Vec::new(),
        1 => vec![Vec3::Z],
        n => (0..n)
            .map(|i| {
                let theta = TAU * i as f32 / n as f32;
                Vec3::new(theta.cos(), 0.0, theta.sin())
            })
            .collect(),
    }
}

/// One generated (or already present) chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainRecord {
    pub source: String,
    /// 1-based chain index.
    pub chain: u32,
    /// Bone names root to tip.
    pub bones: Vec<String>,
    /// Head of the first segment in armature space.
    pub head: Vec3,
    /// Head of the first segment in world space.
    pub world_head: Vec3,
}

impl ChainRecord {
    pub fn root_bone(&self) -> &str {
        self.bones.first().map(String::as_str).unwrap_or_default()
    }

    pub fn spring_name(&self) -> String {
        chain_spring_name(&self.source, self.chain)
    }
}

/// Bones to create plus the resulting chain records.
#[derive(Debug, Clone, Default)]
pub struct ChainPlan {
    pub new_bones: Vec<Bone>,
    pub chains: Vec<ChainRecord>,
}

/// Generates `bone_quantity` chains per source bone.
#[derive(Debug, Clone, Copy)]
pub struct ChainGenerator {
    pub bone_quantity: u32,
}

impl Default for ChainGenerator {
    fn default() -> Self {
        Self { bone_quantity: 1 }
    }
}

impl ChainGenerator {
    pub fn new(bone_quantity: u32) -> Self {
        Self { bone_quantity }
    }

    /// Compute the chains for one source bone without touching the skeleton.
    ///
    /// Bones whose name already exists are reused instead of planned again.
    pub fn plan(&self, skeleton: &Skeleton, source: &str) -> RigResult<ChainPlan> {
        let source_bone = skeleton.require(source)?;
        let frame = source_bone
            .frame()
            .map_err(|e| RigError::degenerate(format!("source bone '{}': {}", source, e)))?;
        let midpoint = source_bone.midpoint();

        let mut plan = ChainPlan::default();
        for (i, local_dir) in sample_directions(self.bone_quantity).into_iter().enumerate() {
            let chain = i as u32 + 1;
            let dir = frame * local_dir;
            let mut head = midpoint + dir * RADIAL_OFFSET;
            let mut parent = source.to_string();
            let mut names = Vec::with_capacity(SEGMENTS_PER_CHAIN as usize);
            let mut chain_head = head;

            for segment in 1..=SEGMENTS_PER_CHAIN {
                let name = chain_bone_name(source, chain, segment);
                let tail = match skeleton.bone(&name) {
                    Some(existing) => {
                        log::debug!("bone '{}' exists, reusing", name);
                        if segment == 1 {
                            chain_head = existing.head;
                        }
                        existing.tail
                    }
                    None => {
                        let tail = head + dir * SEGMENT_LENGTH;
                        plan.new_bones.push(
                            Bone::new(name.clone(), head, tail)
                                .with_parent(parent.clone())
                                .with_joint_class(JointClass::Other),
                        );
                        tail
                    }
                };
                head = tail;
                parent = name.clone();
                names.push(name);
            }

            plan.chains.push(ChainRecord {
                source: source.to_string(),
                chain,
                bones: names,
                head: chain_head,
                world_head: skeleton.to_world(chain_head),
            });
        }
        Ok(plan)
    }

    /// Create the planned bones, holding the armature in edit mode.
    pub fn apply(skeleton: &mut Skeleton, plan: ChainPlan) -> RigResult<Vec<ChainRecord>> {
        let mut edit = ModeScope::enter(skeleton, ObjectMode::Edit);
        let count = plan.new_bones.len();
        for bone in plan.new_bones {
            edit.add_bone(bone)?;
        }
        log::info!(
            "created {} bones across {} chains",
            count,
            plan.chains.len()
        );
        Ok(plan.chains)
    }

    /// Plan and apply chains for every source bone.
    ///
    /// Missing or degenerate source bones are reported and skipped.
    pub fn generate_all(
        &self,
        skeleton: &mut Skeleton,
        sources: &[String],
        warnings: &mut Warnings,
    ) -> RigResult<Vec<ChainRecord>> {
        let mut records = Vec::new();
        for source in sources {
            match self.plan(skeleton, source) {
                Ok(plan) => records.extend(Self::apply(skeleton, plan)?),
                Err(err) if err.is_recoverable() => warnings.push(err),
                Err(err) => return Err(err),
            }
        }
        Ok(records)
    }
}

/// Re-derive generated chains from bone names.
///
/// Only complete chains (all segments present) are returned, ordered by
/// source name and chain index.
pub fn find_chains(skeleton: &Skeleton) -> Vec<ChainRecord> {
    let mut grouped: BTreeMap<(String, u32), BTreeMap<u32, &Bone>> = BTreeMap::new();
    for bone in skeleton.bones() {
        if let Some(parsed) = ChainBoneName::parse(&bone.name) {
            grouped
                .entry((parsed.source, parsed.chain))
                .or_default()
                .insert(parsed.segment, bone);
        }
    }

    grouped
        .into_iter()
        .filter(|(_, segments)| segments.len() == SEGMENTS_PER_CHAIN as usize)
        .filter_map(|((source, chain), segments)| {
            let root = segments.get(&1)?;
            Some(ChainRecord {
                source,
                chain,
                head: root.head,
                world_head: skeleton.to_world(root.head),
                bones: segments.values().map(|b| b.name.clone()).collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig_core::{EntityKind, ModeSwitch, Transform};

    fn leg_skeleton() -> Skeleton {
        Skeleton::from_bones(
            "Armature",
            vec![
                Bone::new("J_Bip_C_Hips", Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.1)),
                Bone::new(
                    "J_Bip_L_UpperLeg",
                    Vec3::new(0.1, 0.0, 1.0),
                    Vec3::new(0.1, 0.0, 0.6),
                )
                .with_parent("J_Bip_C_Hips"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn names_round_trip_through_parse() {
        let name = chain_bone_name("J_Bip_L_UpperLeg", 2, 3);
        assert_eq!(name, "J_Bip_L_UpperLeg_Jiggle2_3");
        let parsed = ChainBoneName::parse(&name).unwrap();
        assert_eq!(parsed, ChainBoneName::new("J_Bip_L_UpperLeg", 2, 3));
        assert_eq!(chain_spring_name("J_Bip_L_UpperLeg", 2), "J_Bip_L_UpperLeg_Jiggle2");
    }

    #[test]
    fn parse_rejects_non_chain_names() {
        assert!(ChainBoneName::parse("J_Bip_L_UpperLeg").is_none());
        assert!(ChainBoneName::parse("Foo_Jiggle1_4").is_none());
        assert!(ChainBoneName::parse("Foo_Jiggle0_1").is_none());
        assert!(ChainBoneName::parse("_Jiggle1_1").is_none());
    }

    #[test]
    fn single_chain_creates_three_linked_bones() {
        let mut s = leg_skeleton();
        let gen = ChainGenerator::new(1);
        let mut warnings = Warnings::new();
        let records = gen
            .generate_all(&mut s, &["J_Bip_L_UpperLeg".to_string()], &mut warnings)
            .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(s.len(), 5);
        assert_eq!(s.mode(), ObjectMode::Object);

        let names: Vec<_> = (1..=3).map(|i| chain_bone_name("J_Bip_L_UpperLeg", 1, i)).collect();
        assert_eq!(records[0].bones, names);

        let b1 = s.bone(&names[0]).unwrap();
        let b2 = s.bone(&names[1]).unwrap();
        let b3 = s.bone(&names[2]).unwrap();
        assert_eq!(b1.parent.as_deref(), Some("J_Bip_L_UpperLeg"));
        assert_eq!(b2.parent.as_deref(), Some(names[0].as_str()));
        assert_eq!(b3.parent.as_deref(), Some(names[1].as_str()));
        assert_eq!(b2.head, b1.tail);
        assert_eq!(b3.head, b2.tail);
        for b in [b1, b2, b3] {
            assert!((b.length() - SEGMENT_LENGTH).abs() < 1e-5);
        }
    }

    #[test]
    fn first_head_is_offset_from_midpoint() {
        let s = leg_skeleton();
        let plan = ChainGenerator::new(1).plan(&s, "J_Bip_L_UpperLeg").unwrap();
        let source = s.bone("J_Bip_L_UpperLeg").unwrap();
        let offset = plan.chains[0].head - source.midpoint();
        assert!((offset.length() - RADIAL_OFFSET).abs() < 1e-5);
        // Offset is perpendicular to the source bone.
        assert!(offset.dot(source.axis().unwrap().direction()).abs() < 1e-5);
    }

    #[test]
    fn multiple_chains_are_spread_evenly() {
        let s = leg_skeleton();
        let plan = ChainGenerator::new(4).plan(&s, "J_Bip_L_UpperLeg").unwrap();
        assert_eq!(plan.chains.len(), 4);
        assert_eq!(plan.new_bones.len(), 12);
        let mid = s.bone("J_Bip_L_UpperLeg").unwrap().midpoint();
        let d0 = (plan.chains[0].head - mid).normalize();
        let d1 = (plan.chains[1].head - mid).normalize();
        let d2 = (plan.chains[2].head - mid).normalize();
        assert!(d0.dot(d1).abs() < 1e-4);
        assert!((d0.dot(d2) + 1.0).abs() < 1e-4);
    }

    #[test]
    fn sample_directions_counts() {
        assert!(sample_directions(0).is_empty());
        assert_eq!(sample_directions(1), vec![Vec3::Z]);
        let dirs = sample_directions(3);
        assert_eq!(dirs.len(), 3);
        for d in dirs {
            assert!((d.length() - 1.0).abs() < 1e-6);
            assert_eq!(d.y, 0.0);
        }
    }

    #[test]
    fn missing_source_is_skipped_with_warning() {
        let mut s = leg_skeleton();
        let mut warnings = Warnings::new();
        let records = ChainGenerator::new(1)
            .generate_all(
                &mut s,
                &["Nope".to_string(), "J_Bip_L_UpperLeg".to_string()],
                &mut warnings,
            )
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings.iter().next(),
            Some(&RigError::missing(EntityKind::Bone, "Nope"))
        );
    }

    #[test]
    fn rerun_reuses_existing_bones() {
        let mut s = leg_skeleton();
        let gen = ChainGenerator::new(2);
        let sources = vec!["J_Bip_L_UpperLeg".to_string()];
        let mut warnings = Warnings::new();
        let first = gen.generate_all(&mut s, &sources, &mut warnings).unwrap();
        let count = s.len();
        let second = gen.generate_all(&mut s, &sources, &mut warnings).unwrap();
        assert_eq!(s.len(), count);
        assert_eq!(first, second);
    }

    #[test]
    fn find_chains_recovers_records_from_names() {
        let mut s = leg_skeleton().with_transform(Transform::from_position(Vec3::X));
        let mut warnings = Warnings::new();
        let created = ChainGenerator::new(3)
            .generate_all(&mut s, &["J_Bip_L_UpperLeg".to_string()], &mut warnings)
            .unwrap();
        let found = find_chains(&s);
        assert_eq!(found, created);
        assert!(found[0].world_head.abs_diff_eq(found[0].head + Vec3::X, 1e-6));
    }

    #[test]
    fn degenerate_source_is_recoverable() {
        let mut s = leg_skeleton();
        s.set_mode(ObjectMode::Edit);
        s.add_bone(Bone::new("Flat", Vec3::ONE, Vec3::ONE)).unwrap();
        s.set_mode(ObjectMode::Object);
        let err = ChainGenerator::new(1).plan(&s, "Flat").unwrap_err();
        assert!(matches!(err, RigError::DegenerateGeometry(_)));
    }
}
