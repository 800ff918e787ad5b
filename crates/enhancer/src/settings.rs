//! Pipeline settings. Loaded from a RON file; missing or invalid files fall
//! back to defaults.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use spring::ColliderPreset;

/// Which weight field paints a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldVariant {
    /// One group per source bone, directional falloff along the bone.
    Cylindrical,
    /// One group per chain, symmetric falloff around the chain root.
    Spherical,
}

/// A source bone that receives jiggle chains, and how to weight its region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSettings {
    pub source_bone: String,
    #[serde(default = "default_variant")]
    pub variant: FieldVariant,
    /// Candidate vertices must be weighted here; defaults to the source bone.
    #[serde(default)]
    pub parent_group: Option<String>,
    /// Vertices weighted above 0.1 here are never painted.
    #[serde(default)]
    pub exclusion_groups: Vec<String>,
    /// Group whose vertices, grown by two rings, are never painted.
    #[serde(default)]
    pub hips_mask_group: Option<String>,
    #[serde(default = "default_affect_radius")]
    pub affect_radius: f32,
}

impl RegionSettings {
    pub fn parent_group(&self) -> &str {
        self.parent_group.as_deref().unwrap_or(&self.source_bone)
    }

    fn thigh(side: &str) -> Self {
        Self {
            source_bone: format!("J_Bip_{}_UpperLeg", side),
            variant: FieldVariant::Cylindrical,
            parent_group: None,
            exclusion_groups: vec![format!("J_Bip_{}_LowerLeg", side)],
            hips_mask_group: Some("J_Bip_C_Hips".to_string()),
            affect_radius: default_affect_radius(),
        }
    }
}

fn default_variant() -> FieldVariant {
    FieldVariant::Cylindrical
}
fn default_affect_radius() -> f32 {
    0.15
}
fn default_bone_quantity() -> u32 {
    1
}
fn default_regions() -> Vec<RegionSettings> {
    vec![RegionSettings::thigh("L"), RegionSettings::thigh("R")]
}
fn default_refine_cuts() -> u32 {
    1
}
fn default_scale_factor() -> f32 {
    1.0
}

/// Preset names as written in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresetName {
    Breast,
    LongHair,
    ArmsAndHands,
}

impl From<PresetName> for ColliderPreset {
    fn from(name: PresetName) -> Self {
        match name {
            PresetName::Breast => ColliderPreset::Breast,
            PresetName::LongHair => ColliderPreset::LongHair,
            PresetName::ArmsAndHands => ColliderPreset::ArmsAndHands,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancerSettings {
    /// Chains generated per source bone.
    #[serde(default = "default_bone_quantity")]
    pub bone_quantity: u32,
    #[serde(default = "default_regions")]
    pub regions: Vec<RegionSettings>,
    #[serde(default = "default_refine_cuts")]
    pub refine_cuts: u32,
    #[serde(default)]
    pub refine_smoothness: f32,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f32,
    #[serde(default)]
    pub presets: Vec<PresetName>,
}

impl Default for EnhancerSettings {
    fn default() -> Self {
        Self {
            bone_quantity: default_bone_quantity(),
            regions: default_regions(),
            refine_cuts: default_refine_cuts(),
            refine_smoothness: 0.0,
            scale_factor: default_scale_factor(),
            presets: Vec::new(),
        }
    }
}

impl EnhancerSettings {
    /// Load settings from `path`. If the file is missing or invalid, returns defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match Self::from_ron(&data) {
                Ok(s) => return s,
                Err(e) => log::warn!("Invalid settings at {:?}: {:#}, using defaults", path, e),
            },
            Err(e) => log::debug!("No settings at {:?} ({}), using defaults", path, e),
        }
        Self::default()
    }

    pub fn from_ron(data: &str) -> anyhow::Result<Self> {
        ron::from_str(data).context("parsing enhancer settings")
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let s = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("serializing enhancer settings")?;
        std::fs::write(path, s).with_context(|| format!("writing {:?}", path))
    }

    pub fn source_bones(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.source_bone.clone()).collect()
    }
}
