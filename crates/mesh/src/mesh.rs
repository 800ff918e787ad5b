//! Polygon mesh owned by the host scene.

use std::collections::BTreeSet;

use rig_core::{ModeSwitch, ObjectMode, Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::vertex_group::VertexGroups;

/// Edge key for hashing (smaller index first).
pub fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Mesh object: object-space positions, polygon faces, and vertex groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    /// Name of the parent object, if any.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    mode: ObjectMode,
    pub positions: Vec<Vec3>,
    /// Polygons as vertex index loops.
    #[serde(default)]
    pub faces: Vec<Vec<u32>>,
    /// Edges not belonging to any face.
    #[serde(default)]
    pub loose_edges: Vec<[u32; 2]>,
    #[serde(default)]
    pub vertex_groups: VertexGroups,
}

impl ModeSwitch for Mesh {
    fn mode(&self) -> ObjectMode {
        self.mode
    }

    fn set_mode(&mut self, mode: ObjectMode) {
        self.mode = mode;
    }
}

impl Mesh {
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, faces: Vec<Vec<u32>>) -> Self {
        Self {
            name: name.into(),
            positions,
            faces,
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Flat grid of quads in the XY plane, `cols` × `rows` faces.
    ///
    /// Vertex `(x, y)` has index `y * (cols + 1) + x`.
    pub fn grid(name: impl Into<String>, cols: u32, rows: u32, spacing: f32) -> Self {
        let stride = cols + 1;
        let mut positions = Vec::with_capacity(((cols + 1) * (rows + 1)) as usize);
        for y in 0..=rows {
            for x in 0..=cols {
                positions.push(Vec3::new(x as f32 * spacing, y as f32 * spacing, 0.0));
            }
        }
        let mut faces = Vec::with_capacity((cols * rows) as usize);
        for y in 0..rows {
            for x in 0..cols {
                let i = y * stride + x;
                faces.push(vec![i, i + 1, i + 1 + stride, i + stride]);
            }
        }
        Self::new(name, positions, faces)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn world_position(&self, vertex: u32) -> Option<Vec3> {
        self.positions
            .get(vertex as usize)
            .map(|&p| self.transform.transform_point(p))
    }

    /// Unique undirected edges from faces and loose edges.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut edges = BTreeSet::new();
        for face in &self.faces {
            for i in 0..face.len() {
                let a = face[i];
                let b = face[(i + 1) % face.len()];
                if a != b {
                    edges.insert(edge_key(a, b));
                }
            }
        }
        for &[a, b] in &self.loose_edges {
            if a != b {
                edges.insert(edge_key(a, b));
            }
        }
        edges.into_iter().collect()
    }

    /// Area-weighted vertex normals in object space.
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for face in &self.faces {
            let n = self.face_normal(face);
            for &v in face {
                if let Some(acc) = normals.get_mut(v as usize) {
                    *acc += n;
                }
            }
        }
        normals.into_iter().map(Vec3::normalize_or_zero).collect()
    }

    /// Unnormalized face normal (twice the area for planar faces).
    fn face_normal(&self, face: &[u32]) -> Vec3 {
        if face.len() < 3 {
            return Vec3::ZERO;
        }
        let p = |i: u32| self.positions.get(i as usize).copied().unwrap_or(Vec3::ZERO);
        let origin = p(face[0]);
        face.windows(2)
            .skip(1)
            .map(|w| (p(w[0]) - origin).cross(p(w[1]) - origin))
            .sum()
    }

    /// Scale the mesh in world space about `pivot`, baking the factor into
    /// the object-space positions.
    pub fn scale_about(&mut self, pivot: Vec3, factor: f32) {
        for p in &mut self.positions {
            *p *= factor;
        }
        self.transform.position = pivot + (self.transform.position - pivot) * factor;
    }

    pub fn face_centroid(&self, face: &[u32]) -> Vec3 {
        if face.is_empty() {
            return Vec3::ZERO;
        }
        let sum: Vec3 = face
            .iter()
            .filter_map(|&i| self.positions.get(i as usize))
            .copied()
            .sum();
        sum / face.len() as f32
    }
}
