//! trial_plan CLI
//!
//! Dump planned trials as backend JSON, inspect the catalogs, and replay a
//! recorded ball trajectory through the termination monitor.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use trial_core::{
    Command, TerminationMonitor, TerminationState, TrialConfig, TrialEndpoints, TrialPlan,
    TrialPlanner, TrialSession, Vec3,
};

#[derive(Parser)]
#[command(name = "trial_plan")]
#[command(version = trial_core::VERSION)]
#[command(about = "Plan and inspect light/shadow ball trials", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan trials and write the backend commands as JSON
    Plan {
        /// RNG seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Number of trials
        #[arg(long, default_value = "1")]
        count: u32,

        /// YAML config overriding the defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List sectors, materials and eligible lighting presets
    Catalogs {
        /// YAML config overriding the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Replay recorded ball positions through the termination monitor
    Check {
        /// Start point as x,y,z
        #[arg(long, value_parser = parse_point)]
        start: Vec3,

        /// Target point as x,y,z
        #[arg(long, value_parser = parse_point)]
        target: Vec3,

        /// JSON array of [x, y, z] readings; null marks a frame without one
        #[arg(long)]
        positions: PathBuf,

        /// Arrival tolerance
        #[arg(long, default_value = "0.01")]
        tolerance: f32,
    },
}

#[derive(Serialize)]
struct PlanDump {
    generator_version: &'static str,
    seed: u64,
    field_of_view: f32,
    scene: Vec<Command>,
    per_frame: Vec<Command>,
    trials: Vec<TrialDump>,
}

#[derive(Serialize)]
struct TrialDump {
    index: u32,
    plan: TrialPlan,
    commands: Vec<Command>,
    teardown: Vec<Command>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan { seed, count, config, out } => {
            let config = load_config(config.as_deref())?;
            let dump = plan_dump(config, seed, count)?;
            let json = serde_json::to_string_pretty(&dump).context("Failed to serialize plan")?;
            write_output(out.as_deref(), &json)?;
            log::info!("planned {} trial(s) with seed {}", count, seed);
        }

        Commands::Catalogs { config } => {
            let config = load_config(config.as_deref())?;
            let planner = TrialPlanner::new(config).context("Failed to build trial planner")?;
            print_catalogs(&planner);
        }

        Commands::Check { start, target, positions, tolerance } => {
            let frames = load_positions(&positions)?;
            match replay(start, target, &frames, tolerance)? {
                TerminationState::Done { reason, frame } => {
                    println!("done at frame {} ({:?}) of {}", frame, reason, frames.len());
                }
                TerminationState::Running => {
                    println!("still running after {} frame(s)", frames.len());
                }
            }
        }
    }

    Ok(())
}

/// Plan `count` trials from `seed`, each followed by its teardown.
fn plan_dump(config: TrialConfig, seed: u64, count: u32) -> Result<PlanDump> {
    let mut session = TrialSession::new(config, seed).context("Failed to build trial planner")?;

    let mut trials = Vec::with_capacity(count as usize);
    for index in 0..count {
        let commands = session.plan_trial();
        let plan = session
            .current_plan()
            .cloned()
            .context("planned trial missing from session")?;
        let teardown = session.trial_teardown_commands();
        trials.push(TrialDump { index, plan, commands, teardown });
    }

    Ok(PlanDump {
        generator_version: trial_core::VERSION,
        seed,
        field_of_view: session.field_of_view(),
        scene: session.scene_initialization_commands(),
        per_frame: session.per_frame_commands(),
        trials,
    })
}

/// Feed recorded frames to a fresh monitor until it terminates.
fn replay(
    start: Vec3,
    target: Vec3,
    frames: &[Option<Vec3>],
    tolerance: f32,
) -> Result<TerminationState> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        bail!("tolerance must be positive, got {}", tolerance);
    }
    let mut monitor = TerminationMonitor::new(TrialEndpoints::new(start, target), tolerance);
    for frame in frames {
        if monitor.is_done(*frame) {
            break;
        }
    }
    Ok(monitor.state())
}

fn load_config(path: Option<&Path>) -> Result<TrialConfig> {
    match path {
        Some(path) => TrialConfig::from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(TrialConfig::default()),
    }
}

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(path, text)
                .with_context(|| format!("Failed to write output: {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", text).context("Failed to write to stdout")
        }
    }
}

fn print_catalogs(planner: &TrialPlanner) {
    println!("Sectors ({}):", planner.sectors().len());
    for sector in planner.sectors().sectors() {
        let c0 = sector.center(trial_core::SubRegion::First);
        let c1 = sector.center(trial_core::SubRegion::Second);
        println!(
            "   {:<12} ({:>5.2}, {:>5.2}) <-> ({:>5.2}, {:>5.2})",
            sector.name(),
            c0.x,
            c0.z,
            c1.x,
            c1.z
        );
    }
    println!("Materials: {}", planner.materials().len());
    println!(
        "Lighting presets (intensity >= {}): {}",
        planner.config().lighting.min_intensity,
        planner.lighting().len()
    );
    for preset in planner.lighting().presets() {
        println!("   {:<36} {:.2}", preset.name, preset.intensity);
    }
}

fn parse_point(s: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("invalid coordinate '{}': {}", p, e)))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{}'", s)),
    }
}

fn parse_positions(json: &str) -> Result<Vec<Option<Vec3>>> {
    let raw: Vec<Option<[f32; 3]>> =
        serde_json::from_str(json).context("positions must be a JSON array of [x, y, z] or null")?;
    Ok(raw.into_iter().map(|p| p.map(Vec3::from)).collect())
}

fn load_positions(path: &Path) -> Result<Vec<Option<Vec3>>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read positions: {}", path.display()))?;
    parse_positions(&text)
}
