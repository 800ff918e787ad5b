//! Weight field synthesis for jiggle regions.
//!
//! A region field scores every candidate vertex by its position relative to
//! an anchor (a bone axis or a point), then writes the scores into a named
//! vertex group with replace semantics.

use std::collections::BTreeSet;

use rig_core::{
    exponential_decay, linear_falloff, AxisProjection, BoneAxis, EntityKind, ModeScope,
    ObjectMode, RigError, Vec3, Warnings,
};

use crate::mesh::Mesh;
use crate::vertex_group::WeightMap;

/// Multiplier applied before clamping cylindrical weights.
pub const WEIGHT_BOOST: f32 = 1.5;
/// Decay rate for vertices above the bone head (toward the torso).
pub const TORSO_DECAY_RATE: f32 = 2.0;
/// The affect window extends this far past the bone, as a fraction of its length.
pub const EXTENSION_FACTOR: f32 = 1.2;
/// Vertices weighted above this in an exclusion group are dropped.
pub const EXCLUSION_THRESHOLD: f32 = 0.1;
/// Lowest weight a vertex inside a spherical field can receive.
pub const SPHERICAL_FLOOR: f32 = 0.1;

/// Cylindrical weight from a projection onto a bone of length `length`.
///
/// Returns `None` outside the affect window or radius, or when the clamped
/// weight is zero.
pub fn cylindrical_weight(proj: AxisProjection, length: f32, affect_radius: f32) -> Option<f32> {
    let extended = length * EXTENSION_FACTOR;
    let t = proj.axial;
    let axial_weight = if t < 0.0 {
        exponential_decay(t, length, TORSO_DECAY_RATE)
    } else if t <= extended {
        1.0 - t / extended
    } else {
        return None;
    };

    if proj.radial >= affect_radius {
        return None;
    }
    let weight = (axial_weight * linear_falloff(proj.radial, affect_radius) * WEIGHT_BOOST)
        .clamp(0.0, 1.0);
    (weight > 0.0).then_some(weight)
}

/// Spherical weight for a vertex `distance` away from the anchor.
pub fn spherical_weight(distance: f32, affect_radius: f32) -> Option<f32> {
    if distance < affect_radius {
        Some(linear_falloff(distance, affect_radius).max(SPHERICAL_FLOOR))
    } else {
        None
    }
}

/// Where a field is anchored, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldShape {
    /// Directional falloff along and around a bone (limb regions).
    Cylindrical { anchor: BoneAxis },
    /// Symmetric falloff around a point (chain root heads).
    Spherical { center: Vec3 },
}

/// One region to paint.
#[derive(Debug, Clone)]
pub struct RegionField {
    /// Output vertex group.
    pub group: String,
    /// Only vertices with nonzero weight here are candidates.
    pub parent_group: Option<String>,
    /// Vertices weighted above [`EXCLUSION_THRESHOLD`] in any of these are dropped.
    pub exclusion_groups: Vec<String>,
    /// Vertices in this set are dropped (expanded masks).
    pub exclusion_mask: BTreeSet<u32>,
    pub shape: FieldShape,
    pub affect_radius: f32,
}

impl RegionField {
    pub fn new(group: impl Into<String>, shape: FieldShape, affect_radius: f32) -> Self {
        Self {
            group: group.into(),
            parent_group: None,
            exclusion_groups: Vec::new(),
            exclusion_mask: BTreeSet::new(),
            shape,
            affect_radius,
        }
    }

    pub fn with_parent_group(mut self, parent: impl Into<String>) -> Self {
        self.parent_group = Some(parent.into());
        self
    }

    pub fn with_exclusion_group(mut self, group: impl Into<String>) -> Self {
        self.exclusion_groups.push(group.into());
        self
    }

    pub fn with_exclusion_mask(mut self, mask: BTreeSet<u32>) -> Self {
        self.exclusion_mask.extend(mask);
        self
    }

    /// Score the mesh without writing anything.
    ///
    /// A missing parent group yields an empty result plus a warning; a missing
    /// exclusion group is reported and ignored.
    pub fn evaluate(&self, mesh: &Mesh, warnings: &mut Warnings) -> WeightMap {
        let candidates: Vec<u32> = match &self.parent_group {
            Some(parent) => match mesh.vertex_groups.get(parent) {
                Some(group) => group
                    .iter()
                    .filter(|&(_, &w)| w > 0.0)
                    .map(|(&v, _)| v)
                    .collect(),
                None => {
                    warnings.push(RigError::missing(EntityKind::VertexGroup, parent.clone()));
                    return WeightMap::new();
                }
            },
            None => (0..mesh.vertex_count() as u32).collect(),
        };

        let mut excluded = self.exclusion_mask.clone();
        for name in &self.exclusion_groups {
            if mesh.vertex_groups.contains(name) {
                excluded.extend(mesh.vertex_groups.vertices_above(name, EXCLUSION_THRESHOLD));
            } else {
                warnings.push(RigError::missing(EntityKind::VertexGroup, name.clone()));
            }
        }

        candidates
            .into_iter()
            .filter(|v| !excluded.contains(v))
            .filter_map(|v| {
                let p = mesh.world_position(v)?;
                self.score(p).map(|w| (v, w))
            })
            .collect()
    }

    fn score(&self, point: Vec3) -> Option<f32> {
        match self.shape {
            FieldShape::Cylindrical { anchor } => {
                cylindrical_weight(anchor.project(point), anchor.length(), self.affect_radius)
            }
            FieldShape::Spherical { center } => {
                spherical_weight(point.distance(center), self.affect_radius)
            }
        }
    }

    /// Evaluate and replace the output group. Returns the number of weighted
    /// vertices.
    pub fn paint(&self, mesh: &mut Mesh, warnings: &mut Warnings) -> usize {
        let weights = self.evaluate(mesh, warnings);
        let count = weights.len();
        let mut paint = ModeScope::enter(mesh, ObjectMode::WeightPaint);
        paint.vertex_groups.replace(self.group.clone(), weights);
        log::debug!("painted '{}' on {} vertices", self.group, count);
        count
    }
}
