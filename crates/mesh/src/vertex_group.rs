//! Named per-vertex weight fields.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

/// Sparse vertex index → weight map. Absent means zero.
pub type WeightMap = BTreeMap<u32, f32>;

/// All vertex groups of a mesh, keyed by name.
///
/// Writes use replace semantics: assigning a group overwrites whatever it held
/// before, so repeating the same assignment is idempotent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexGroups {
    #[serde(deserialize_with = "sparse_groups")]
    groups: BTreeMap<String, WeightMap>,
}

/// Clamp to [0, 1] and drop zero entries.
fn sparse(weights: WeightMap) -> WeightMap {
    weights
        .into_iter()
        .map(|(v, w)| (v, w.clamp(0.0, 1.0)))
        .filter(|&(_, w)| w > 0.0)
        .collect()
}

fn sparse_groups<'de, D>(deserializer: D) -> Result<BTreeMap<String, WeightMap>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, WeightMap>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(name, g)| (name, sparse(g))).collect())
}

impl VertexGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&WeightMap> {
        self.groups.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Weight of `vertex` in `name`; zero when either is absent.
    pub fn weight(&self, name: &str, vertex: u32) -> f32 {
        self.groups
            .get(name)
            .and_then(|g| g.get(&vertex))
            .copied()
            .unwrap_or(0.0)
    }

    /// Replace the whole group. Weights are clamped to [0, 1] and zeros dropped.
    pub fn replace(&mut self, name: impl Into<String>, weights: WeightMap) {
        self.groups.insert(name.into(), sparse(weights));
    }

    /// Set `weight` on each listed vertex, overwriting previous values.
    pub fn assign(&mut self, name: &str, vertices: impl IntoIterator<Item = u32>, weight: f32) {
        let group = self.groups.entry(name.to_string()).or_default();
        let weight = weight.clamp(0.0, 1.0);
        for v in vertices {
            if weight > 0.0 {
                group.insert(v, weight);
            } else {
                group.remove(&v);
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<WeightMap> {
        self.groups.remove(name)
    }

    /// Vertices of `name` whose weight is strictly above `threshold`.
    pub fn vertices_above(&self, name: &str, threshold: f32) -> BTreeSet<u32> {
        self.groups
            .get(name)
            .map(|g| {
                g.iter()
                    .filter(|&(_, &w)| w > threshold)
                    .map(|(&v, _)| v)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Vertices with nonzero weight in any of `names`.
    pub fn nonzero_in_any<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> BTreeSet<u32> {
        names
            .into_iter()
            .filter_map(|n| self.groups.get(n))
            .flat_map(|g| g.iter().filter(|&(_, &w)| w > 0.0).map(|(&v, _)| v))
            .collect()
    }

    /// Give `target` the mean of the `sources` weights in every group.
    pub fn interpolate(&mut self, target: u32, sources: &[u32]) {
        if sources.is_empty() {
            return;
        }
        let n = sources.len() as f32;
        for group in self.groups.values_mut() {
            let sum: f32 = sources.iter().filter_map(|s| group.get(s)).sum();
            if sum > 0.0 {
                group.insert(target, (sum / n).min(1.0));
            }
        }
    }
}
