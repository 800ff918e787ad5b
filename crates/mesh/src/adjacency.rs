//! Vertex adjacency and ring expansion used to build exclusion masks.

use std::collections::BTreeSet;

use rig_core::{EntityKind, RigError, RigResult};

use crate::mesh::Mesh;

/// Number of one-ring expansions applied to a seed set.
///
/// Fixed: it encodes the anatomical margin kept between jiggle weights and
/// the hip/torso region.
pub const EXPANSION_RINGS: usize = 2;

/// Seed vertices need a weight strictly above this.
pub const SEED_THRESHOLD: f32 = 0.1;

/// Undirected vertex → neighbour-set graph.
///
/// Derived data: rebuild it whenever mesh topology changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjacencyGraph {
    neighbors: Vec<BTreeSet<u32>>,
}

impl AdjacencyGraph {
    pub fn from_edges(vertex_count: usize, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut neighbors = vec![BTreeSet::new(); vertex_count];
        for (a, b) in edges {
            if a == b || a as usize >= vertex_count || b as usize >= vertex_count {
                continue;
            }
            neighbors[a as usize].insert(b);
            neighbors[b as usize].insert(a);
        }
        Self { neighbors }
    }

    pub fn from_mesh(mesh: &Mesh) -> Self {
        Self::from_edges(mesh.vertex_count(), mesh.edges())
    }

    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn neighbors(&self, vertex: u32) -> impl Iterator<Item = u32> + '_ {
        self.neighbors
            .get(vertex as usize)
            .into_iter()
            .flat_map(|n| n.iter().copied())
    }

    /// Seed plus every vertex within [`EXPANSION_RINGS`] edges of it.
    pub fn expand_margin(&self, seed: &BTreeSet<u32>) -> BTreeSet<u32> {
        let mut selected = seed.clone();
        let mut frontier: Vec<u32> = seed.iter().copied().collect();
        for _ in 0..EXPANSION_RINGS {
            let mut next = Vec::new();
            for v in frontier {
                for n in self.neighbors(v) {
                    if selected.insert(n) {
                        next.push(n);
                    }
                }
            }
            frontier = next;
        }
        selected
    }
}

/// Expanded exclusion mask grown from the vertices of `group` above the seed
/// threshold.
pub fn exclusion_mask(
    mesh: &Mesh,
    adjacency: &AdjacencyGraph,
    group: &str,
) -> RigResult<BTreeSet<u32>> {
    if !mesh.vertex_groups.contains(group) {
        return Err(RigError::missing(EntityKind::VertexGroup, group));
    }
    let seed = mesh.vertex_groups.vertices_above(group, SEED_THRESHOLD);
    let mask = adjacency.expand_margin(&seed);
    log::debug!(
        "mask '{}': {} seed vertices expanded to {}",
        group,
        seed.len(),
        mask.len()
    );
    Ok(mask)
}
