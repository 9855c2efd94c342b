//! armtraj CLI - plan blended arm trajectories and run calibrations.
//!
//! Results are written to stdout as JSON; logs go to stderr and follow
//! `RUST_LOG`.

use anyhow::{Context, Result};
use armtraj::armtraj_calib::{solve_tool_offset, LmConfig};
use armtraj::{calibrate_base_frame, resolve_and_blend, Trajectory};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

mod input;
mod logging;

use input::{BaseCalibrationInput, JobFile, ToolCalibrationInput};

#[derive(Parser)]
#[command(name = "armtraj")]
#[command(about = "Blended trajectory planner and calibration tool for robotic arms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the pose sequence for a job file
    Plan {
        /// Job file (.toml)
        job: PathBuf,
        /// Write the trajectory here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the blended corners of a job file
    Info {
        /// Job file (.toml)
        job: PathBuf,
    },
    /// Solve the tool offset from four flange poses touching one point
    CalibrateTool {
        /// File with `poses = [...]` (.toml)
        file: PathBuf,
    },
    /// Derive a work frame from origin, X-axis and Y-axis probe points
    CalibrateBase {
        /// File with `points = [[x, y, z], ...]` (.toml)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan { job, output } => plan(&job, output.as_deref())?,
        Commands::Info { job } => show_info(&job)?,
        Commands::CalibrateTool { file } => calibrate_tool(&file)?,
        Commands::CalibrateBase { file } => calibrate_base(&file)?,
    }

    Ok(())
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn load_job(path: &Path) -> Result<JobFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    JobFile::parse(&text).with_context(|| format!("in {}", path.display()))
}

fn build_trajectory(job: &JobFile) -> Result<Trajectory> {
    let plan = job.plan()?;
    let mut trajectory = Trajectory::new();
    let mut current = job.start;
    for (run, head) in plan.heads.iter().enumerate() {
        let part = resolve_and_blend(&plan.chain, current, *head, &job.settings)
            .with_context(|| format!("motion run {} failed", run + 1))?;
        trajectory.extend_path(part.into_points());
        current = trajectory.end().copied();
    }
    Ok(trajectory)
}

fn plan(job_path: &Path, output: Option<&Path>) -> Result<()> {
    let job = load_job(job_path)?;
    let trajectory = build_trajectory(&job)?;
    info!(
        poses = trajectory.len(),
        length_mm = trajectory.path_length(),
        "trajectory planned"
    );

    let json = serde_json::to_string_pretty(&trajectory)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {} poses to {}", trajectory.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn show_info(job_path: &Path) -> Result<()> {
    let job = load_job(job_path)?;
    let plan = job.plan()?;

    println!("armtraj job: {}", job_path.display());
    println!("  Motions: {}", job.motions.len());
    println!("  Runs: {}", plan.heads.len());
    println!("  Spline: {:?}", job.settings.spline);
    println!("  Samples per primitive: {}", job.settings.sample_count);

    for (run, head) in plan.heads.iter().enumerate() {
        let corners = plan.chain.corners(*head)?;
        println!("\nRun {}: {} blended corner(s)", run + 1, corners.len());
        for (i, corner) in corners.iter().enumerate() {
            let at = plan.chain.pose(corner.incoming.terminal())?;
            println!(
                "  {}: {} at ({:.3}, {:.3}, {:.3}), distance {:.3}",
                i + 1,
                corner.kind(),
                at.x,
                at.y,
                at.z,
                corner.distance
            );
        }
    }

    match build_trajectory(&job) {
        Ok(trajectory) => {
            println!("\nTrajectory:");
            println!("  Poses: {}", trajectory.len());
            println!("  Path length: {:.3} mm", trajectory.path_length());
        }
        Err(e) => {
            println!("\nFailed to build: {e:#}");
        }
    }
    Ok(())
}

fn calibrate_tool(path: &Path) -> Result<()> {
    let input: ToolCalibrationInput = read_toml(path)?;
    let calibration = solve_tool_offset(&input.poses, &LmConfig::default())?;
    info!(
        spread_mm = calibration.spread,
        iterations = calibration.iterations,
        "tool offset solved"
    );
    let json = serde_json::json!({
        "x": calibration.offset.x,
        "y": calibration.offset.y,
        "z": calibration.offset.z,
        "spread": calibration.spread,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn calibrate_base(path: &Path) -> Result<()> {
    let input: BaseCalibrationInput = read_toml(path)?;
    let frame = calibrate_base_frame(&input.points())?;
    info!(a = frame.a, b = frame.b, c = frame.c, "base frame derived");
    println!("{}", serde_json::to_string_pretty(&frame)?);
    Ok(())
}
