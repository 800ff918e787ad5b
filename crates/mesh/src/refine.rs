//! Local subdivision of weighted regions.
//!
//! Faces whose vertices all carry weight in the selected groups are split;
//! neighbouring faces receive the new edge vertices so no T-junctions are
//! left. Vertex indices change, so the adjacency graph is rebuilt and the
//! caller's weight synthesis runs again on the refined mesh.

use std::collections::{BTreeMap, BTreeSet};

use rig_core::{ModeScope, ObjectMode, RigResult, Vec3};

use crate::adjacency::AdjacencyGraph;
use crate::mesh::{edge_key, Mesh};

/// How much to subdivide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineSettings {
    /// Number of subdivision passes; zero leaves topology alone.
    pub cuts: u32,
    /// 0 = flat midpoints, 1 = full Hermite bulge along vertex normals.
    pub smoothness: f32,
}

impl Default for RefineSettings {
    fn default() -> Self {
        Self {
            cuts: 1,
            smoothness: 0.0,
        }
    }
}

/// Result of a refine pass.
#[derive(Debug, Clone)]
pub struct RefineOutcome {
    /// Vertices selected after the last pass (original plus new).
    pub selection: BTreeSet<u32>,
    pub vertices_added: usize,
    /// Adjacency of the refined mesh.
    pub adjacency: AdjacencyGraph,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyRefiner {
    pub settings: RefineSettings,
}

impl TopologyRefiner {
    pub fn new(settings: RefineSettings) -> Self {
        Self { settings }
    }

    /// Vertices with nonzero weight in any of `groups`.
    pub fn select(mesh: &Mesh, groups: &[String]) -> BTreeSet<u32> {
        mesh.vertex_groups
            .nonzero_in_any(groups.iter().map(String::as_str))
    }

    /// Subdivide the selected region, rebuild adjacency, then hand the mesh to
    /// `resynthesize` so weights can be derived for the new vertex set.
    ///
    /// `resynthesize` runs even when `cuts` is zero.
    pub fn refine<F>(
        &self,
        mesh: &mut Mesh,
        groups: &[String],
        mut resynthesize: F,
    ) -> RigResult<RefineOutcome>
    where
        F: FnMut(&mut Mesh, &AdjacencyGraph) -> RigResult<()>,
    {
        let before = mesh.vertex_count();
        let mut selection = Self::select(mesh, groups);
        {
            let mut edit = ModeScope::enter(mesh, ObjectMode::Edit);
            for pass in 0..self.settings.cuts {
                selection = subdivide_selected(&mut edit, &selection, self.settings.smoothness);
                log::debug!("subdivide pass {}: {} vertices", pass + 1, edit.vertex_count());
            }
        }

        let adjacency = AdjacencyGraph::from_mesh(mesh);
        resynthesize(mesh, &adjacency)?;

        let vertices_added = mesh.vertex_count() - before;
        log::info!(
            "refined '{}': {} cuts, {} vertices added",
            mesh.name,
            self.settings.cuts,
            vertices_added
        );
        Ok(RefineOutcome {
            selection,
            vertices_added,
            adjacency,
        })
    }
}

/// One subdivision pass over the faces fully inside `selection`.
///
/// Returns the grown selection. Vertex groups are interpolated onto new
/// vertices (edge midpoints from their endpoints, face centres from their
/// corners).
pub fn subdivide_selected(mesh: &mut Mesh, selection: &BTreeSet<u32>, smoothness: f32) -> BTreeSet<u32> {
    let selected_faces: Vec<usize> = mesh
        .faces
        .iter()
        .enumerate()
        .filter(|(_, f)| f.len() >= 3 && f.iter().all(|v| selection.contains(v)))
        .map(|(i, _)| i)
        .collect();
    let mut grown = selection.clone();
    if selected_faces.is_empty() {
        return grown;
    }

    let normals = mesh.vertex_normals();
    let mut midpoints: BTreeMap<(u32, u32), u32> = BTreeMap::new();

    // Create edge midpoint vertices
    for &fi in &selected_faces {
        let face = mesh.faces[fi].clone();
        for i in 0..face.len() {
            let key = edge_key(face[i], face[(i + 1) % face.len()]);
            if midpoints.contains_key(&key) {
                continue;
            }
            let pos = smoothed_midpoint(mesh, &normals, key, smoothness);
            let index = push_vertex(mesh, pos, &[key.0, key.1]);
            midpoints.insert(key, index);
            grown.insert(index);
        }
    }

    let mut faces = Vec::with_capacity(mesh.faces.len() + selected_faces.len() * 3);
    let selected: BTreeSet<usize> = selected_faces.iter().copied().collect();
    let old_faces = std::mem::take(&mut mesh.faces);

    for (fi, face) in old_faces.into_iter().enumerate() {
        let n = face.len();
        let mid = |i: usize| midpoints[&edge_key(face[i], face[(i + 1) % n])];

        if !selected.contains(&fi) {
            // Insert any new midpoints into the boundary of neighbouring faces
            let mut loop_ = Vec::with_capacity(n * 2);
            for i in 0..n {
                loop_.push(face[i]);
                if let Some(&m) = midpoints.get(&edge_key(face[i], face[(i + 1) % n])) {
                    loop_.push(m);
                }
            }
            faces.push(loop_);
            continue;
        }

        if n == 3 {
            let (m01, m12, m20) = (mid(0), mid(1), mid(2));
            faces.push(vec![face[0], m01, m20]);
            faces.push(vec![m01, face[1], m12]);
            faces.push(vec![m20, m12, face[2]]);
            faces.push(vec![m01, m12, m20]);
        } else {
            let centre = mesh.face_centroid(&face);
            let c = push_vertex(mesh, centre, &face);
            grown.insert(c);
            for i in 0..n {
                let prev = (i + n - 1) % n;
                faces.push(vec![face[i], mid(i), c, mid(prev)]);
            }
        }
    }
    mesh.faces = faces;

    // Split loose edges that gained a midpoint
    let loose = std::mem::take(&mut mesh.loose_edges);
    for [a, b] in loose {
        match midpoints.get(&edge_key(a, b)) {
            Some(&m) => {
                mesh.loose_edges.push([a, m]);
                mesh.loose_edges.push([m, b]);
            }
            None => mesh.loose_edges.push([a, b]),
        }
    }

    grown
}

fn push_vertex(mesh: &mut Mesh, position: Vec3, sources: &[u32]) -> u32 {
    let index = mesh.positions.len() as u32;
    mesh.positions.push(position);
    mesh.vertex_groups.interpolate(index, sources);
    index
}

/// Hermite midpoint of an edge: flat midpoint plus `s * (ta - tb) / 8`, where
/// `ta`/`tb` are the edge vector projected onto each endpoint's tangent plane.
fn smoothed_midpoint(mesh: &Mesh, normals: &[Vec3], (a, b): (u32, u32), smoothness: f32) -> Vec3 {
    let pa = mesh.positions[a as usize];
    let pb = mesh.positions[b as usize];
    let mid = (pa + pb) * 0.5;
    if smoothness == 0.0 {
        return mid;
    }
    let edge = pb - pa;
    let na = normals[a as usize];
    let nb = normals[b as usize];
    let ta = edge - na * edge.dot(na);
    let tb = edge - nb * edge.dot(nb);
    mid + (ta - tb) * (smoothness * 0.125)
}
