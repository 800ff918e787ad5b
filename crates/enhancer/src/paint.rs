//! Jiggle-region weight painting driven by settings and generated chains.

use mesh::{exclusion_mask, AdjacencyGraph, FieldShape, Mesh, RegionField};
use rig_core::{RigResult, Warnings};
use skeleton::{ChainRecord, Skeleton};

use crate::settings::{FieldVariant, RegionSettings};

/// Build the fields for one region. Chains are those generated from the
/// region's source bone.
///
/// Cylindrical regions yield a single field written to the first chain's root
/// bone group; spherical regions yield one field per chain.
pub fn region_fields(
    region: &RegionSettings,
    chains: &[&ChainRecord],
    skeleton: &Skeleton,
    mesh: &Mesh,
    adjacency: &AdjacencyGraph,
    warnings: &mut Warnings,
) -> RigResult<Vec<RegionField>> {
    let Some(first) = chains.first() else {
        return Ok(Vec::new());
    };

    let mask = match &region.hips_mask_group {
        Some(group) => match exclusion_mask(mesh, adjacency, group) {
            Ok(mask) => mask,
            Err(err) if err.is_recoverable() => {
                warnings.push(err);
                Default::default()
            }
            Err(err) => return Err(err),
        },
        None => Default::default(),
    };

    let configure = |field: RegionField| {
        let field = region
            .exclusion_groups
            .iter()
            .fold(field, |f, g| f.with_exclusion_group(g.clone()));
        field
            .with_parent_group(region.parent_group())
            .with_exclusion_mask(mask.clone())
    };

    let fields = match region.variant {
        FieldVariant::Cylindrical => {
            let anchor = skeleton.world_axis(&region.source_bone)?;
            vec![configure(RegionField::new(
                first.root_bone(),
                FieldShape::Cylindrical { anchor },
                region.affect_radius,
            ))]
        }
        FieldVariant::Spherical => chains
            .iter()
            .map(|chain| {
                configure(RegionField::new(
                    chain.root_bone(),
                    FieldShape::Spherical {
                        center: chain.world_head,
                    },
                    region.affect_radius,
                ))
            })
            .collect(),
    };
    Ok(fields)
}

/// Paint every configured region. Regions that cannot be painted (missing or
/// degenerate source bone) are reported and skipped.
///
/// Returns the names of the groups written.
pub fn paint_regions(
    regions: &[RegionSettings],
    chains: &[ChainRecord],
    skeleton: &Skeleton,
    mesh: &mut Mesh,
    adjacency: &AdjacencyGraph,
    warnings: &mut Warnings,
) -> RigResult<Vec<String>> {
    let mut painted = Vec::new();
    for region in regions {
        let own: Vec<&ChainRecord> = chains
            .iter()
            .filter(|c| c.source == region.source_bone)
            .collect();
        if own.is_empty() {
            log::debug!("no chains on '{}', nothing to paint", region.source_bone);
            continue;
        }
        let fields = match region_fields(region, &own, skeleton, mesh, adjacency, warnings) {
            Ok(fields) => fields,
            Err(err) if err.is_recoverable() => {
                warnings.push(err);
                continue;
            }
            Err(err) => return Err(err),
        };
        for field in fields {
            let count = field.paint(mesh, warnings);
            log::debug!("region '{}': {} vertices", field.group, count);
            painted.push(field.group);
        }
    }
    Ok(painted)
}

/// Output groups the regions paint, derived from chain names.
pub fn region_groups(regions: &[RegionSettings], chains: &[ChainRecord]) -> Vec<String> {
    let mut groups = Vec::new();
    for region in regions {
        let own = chains.iter().filter(|c| c.source == region.source_bone);
        match region.variant {
            FieldVariant::Cylindrical => {
                if let Some(first) = own.min_by_key(|c| c.chain) {
                    groups.push(first.root_bone().to_string());
                }
            }
            FieldVariant::Spherical => groups.extend(own.map(|c| c.root_bone().to_string())),
        }
    }
    groups
}
