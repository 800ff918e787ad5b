//! Public operations. Each runs to completion and reports a terminal status.

use mesh::{AdjacencyGraph, RefineSettings, TopologyRefiner};
use rig_core::{run_operation, OperationReport, RigResult, Warnings};
use skeleton::{find_chains, ChainGenerator};
use spring::{apply_scale, assign_chain_springs, plan_scale, ColliderPreset};

use crate::paint::{paint_regions, region_groups};
use crate::scene::{ObjectLookup, RigContext, Scene};
use crate::settings::EnhancerSettings;

fn with_context<F>(
    scene: &mut Scene,
    lookup: &ObjectLookup,
    warnings: &mut Warnings,
    body: F,
) -> RigResult<String>
where
    F: FnOnce(RigContext<'_>, &mut Warnings) -> RigResult<String>,
{
    let handles = lookup.resolve(scene)?;
    let ctx = scene.context(handles)?;
    body(ctx, warnings)
}

/// Generate jiggle chains on every configured source bone, give each chain a
/// spring, and paint the chain regions on the armature's mesh.
pub fn add_jiggle_chains(scene: &mut Scene, lookup: &ObjectLookup, settings: &EnhancerSettings) -> OperationReport {
    run_operation("add_jiggle_chains", |warnings| {
        with_context(scene, lookup, warnings, |mut ctx, warnings| {
            ctx.skeleton.tag_joint_classes();
            let generator = ChainGenerator::new(settings.bone_quantity);
            let chains = generator.generate_all(ctx.skeleton, &settings.source_bones(), warnings)?;
            let springs = assign_chain_springs(ctx.spring_bones, ctx.skeleton, &chains, warnings);

            let painted = match ctx.skeleton_and_mesh() {
                Ok((skeleton, mesh)) => {
                    let adjacency = AdjacencyGraph::from_mesh(mesh);
                    paint_regions(&settings.regions, &chains, skeleton, mesh, &adjacency, warnings)?.len()
                }
                Err(err) => {
                    warnings.push(err);
                    0
                }
            };
            Ok(format!(
                "Added {} jiggle chains, {} springs, painted {} groups",
                chains.len(),
                springs,
                painted
            ))
        })
    })
}

/// Repaint the regions of chains already on the armature.
pub fn paint_jiggle_weights(scene: &mut Scene, lookup: &ObjectLookup, settings: &EnhancerSettings) -> OperationReport {
    run_operation("paint_jiggle_weights", |warnings| {
        with_context(scene, lookup, warnings, |mut ctx, warnings| {
            let chains = find_chains(ctx.skeleton);
            let (skeleton, mesh) = match ctx.skeleton_and_mesh() {
                Ok(pair) => pair,
                Err(err) => {
                    warnings.push(err);
                    return Ok("No mesh to paint".to_string());
                }
            };
            let adjacency = AdjacencyGraph::from_mesh(mesh);
            let painted = paint_regions(&settings.regions, &chains, skeleton, mesh, &adjacency, warnings)?;
            Ok(format!("Painted {} groups", painted.len()))
        })
    })
}

/// Subdivide the painted regions and repaint them on the refined mesh.
pub fn refine_jiggle_regions(scene: &mut Scene, lookup: &ObjectLookup, settings: &EnhancerSettings) -> OperationReport {
    run_operation("refine_jiggle_regions", |warnings| {
        with_context(scene, lookup, warnings, |mut ctx, warnings| {
            let chains = find_chains(ctx.skeleton);
            let groups = region_groups(&settings.regions, &chains);
            let refiner = TopologyRefiner::new(RefineSettings {
                cuts: settings.refine_cuts,
                smoothness: settings.refine_smoothness,
            });
            let (skeleton, mesh) = match ctx.skeleton_and_mesh() {
                Ok(pair) => pair,
                Err(err) => {
                    warnings.push(err);
                    return Ok("No mesh to refine".to_string());
                }
            };
            let outcome = refiner.refine(mesh, &groups, |mesh, adjacency| {
                paint_regions(&settings.regions, &chains, skeleton, mesh, adjacency, warnings).map(|_| ())
            })?;
            Ok(format!(
                "Refined {} groups, {} vertices added",
                groups.len(),
                outcome.vertices_added
            ))
        })
    })
}

/// Scale the whole model by `factor`, rescaling spring parameters with the
/// per-class power laws.
///
/// The armature scale is baked into its bones afterwards; this cannot be
/// undone. An invalid factor cancels before anything is touched.
pub fn scale_model(scene: &mut Scene, lookup: &ObjectLookup, factor: f32) -> OperationReport {
    run_operation("scale_model", |warnings| {
        with_context(scene, lookup, warnings, |ctx, _| {
            let plan = plan_scale(ctx.spring_bones, ctx.skeleton, factor)?;
            let pivot = ctx.skeleton.transform.position;
            let summary = apply_scale(ctx.spring_bones, ctx.skeleton, &plan);
            if let Some(mesh) = ctx.mesh {
                mesh.scale_about(pivot, factor);
            }
            Ok(format!(
                "Scaled by {}: {} joints, {} colliders",
                factor, summary.joints, summary.colliders
            ))
        })
    })
}

/// Install a collider preset and hook it up to hair springs.
pub fn add_collider_preset(scene: &mut Scene, lookup: &ObjectLookup, preset: ColliderPreset) -> OperationReport {
    run_operation("add_collider_preset", |warnings| {
        with_context(scene, lookup, warnings, |ctx, warnings| {
            let outcome = preset.install(ctx.spring_bones, ctx.skeleton, warnings);
            if outcome.groups_added == 0 {
                return Ok(format!("{} already present", preset.label()));
            }
            Ok(format!(
                "Added {}: {} colliders, {} groups, {} hair springs",
                preset.label(),
                outcome.colliders_added,
                outcome.groups_added,
                outcome.springs_attached
            ))
        })
    })
}

pub fn add_breast_colliders(scene: &mut Scene, lookup: &ObjectLookup) -> OperationReport {
    add_collider_preset(scene, lookup, ColliderPreset::Breast)
}

pub fn add_long_hair_collider(scene: &mut Scene, lookup: &ObjectLookup) -> OperationReport {
    add_collider_preset(scene, lookup, ColliderPreset::LongHair)
}

pub fn add_arm_hand_colliders(scene: &mut Scene, lookup: &ObjectLookup) -> OperationReport {
    add_collider_preset(scene, lookup, ColliderPreset::ArmsAndHands)
}
