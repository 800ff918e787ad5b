use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use enhancer::{
    add_arm_hand_colliders, add_breast_colliders, add_collider_preset, add_jiggle_chains,
    add_long_hair_collider, paint_jiggle_weights, refine_jiggle_regions, scale_model,
    EnhancerSettings, ObjectLookup, Scene,
};
use rig_core::OperationReport;

#[derive(Parser, Debug)]
#[command(name = "vrm-enhance", version, about = "Secondary-motion rig tools for VRM humanoids")]
struct Cli {
    /// Scene file (RON)
    scene: PathBuf,
    /// Operations to run, in order
    #[arg(value_enum, required = true)]
    ops: Vec<Operation>,
    /// Settings file (RON); defaults are used when missing
    #[arg(long, default_value = "enhancer.ron")]
    settings: PathBuf,
    /// Armature to work on; the first one when omitted
    #[arg(long)]
    armature: Option<String>,
    /// Overrides the scale factor from the settings
    #[arg(long)]
    scale: Option<f32>,
    /// Where to write the result; stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Operation {
    /// Generate jiggle chains, springs and weights
    Chains,
    /// Repaint weights for existing chains
    Paint,
    /// Subdivide painted regions and repaint
    Refine,
    /// Scale the model and its spring parameters
    Scale,
    BreastColliders,
    LongHairCollider,
    ArmColliders,
    /// Every collider preset listed in the settings
    Presets,
}

fn run(op: Operation, scene: &mut Scene, lookup: &ObjectLookup, settings: &EnhancerSettings) -> Vec<OperationReport> {
    match op {
        Operation::Chains => vec![add_jiggle_chains(scene, lookup, settings)],
        Operation::Paint => vec![paint_jiggle_weights(scene, lookup, settings)],
        Operation::Refine => vec![refine_jiggle_regions(scene, lookup, settings)],
        Operation::Scale => vec![scale_model(scene, lookup, settings.scale_factor)],
        Operation::BreastColliders => vec![add_breast_colliders(scene, lookup)],
        Operation::LongHairCollider => vec![add_long_hair_collider(scene, lookup)],
        Operation::ArmColliders => vec![add_arm_hand_colliders(scene, lookup)],
        Operation::Presets => settings
            .presets
            .iter()
            .map(|&p| add_collider_preset(scene, lookup, p.into()))
            .collect(),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut settings = EnhancerSettings::load(&cli.settings);
    if let Some(scale) = cli.scale {
        settings.scale_factor = scale;
    }
    let data = std::fs::read_to_string(&cli.scene)
        .with_context(|| format!("reading scene {:?}", cli.scene))?;
    let mut scene: Scene = ron::from_str(&data).with_context(|| format!("parsing scene {:?}", cli.scene))?;
    let lookup = ObjectLookup {
        armature: cli.armature.clone(),
    };

    let mut cancelled = Vec::new();
    for op in &cli.ops {
        for report in run(*op, &mut scene, &lookup, &settings) {
            for warning in &report.warnings {
                eprintln!("  warning: {}", warning);
            }
            eprintln!("{}: {:?} - {}", report.operation, report.status, report.message);
            if report.is_cancelled() {
                cancelled.push(report.operation);
            }
        }
    }

    let out = ron::ser::to_string_pretty(&scene, ron::ser::PrettyConfig::default())
        .context("serializing scene")?;
    match &cli.out {
        Some(path) => std::fs::write(path, out).with_context(|| format!("writing {:?}", path))?,
        None => println!("{}", out),
    }

    if !cancelled.is_empty() {
        bail!("cancelled: {}", cancelled.join(", "));
    }
    Ok(())
}
