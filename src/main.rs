mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use report::render_summary;
use suspx::{load_config, load_vehicle, run_simulation};

/// Sweep a suspension corner through its travel and report its kinematics.
#[derive(Parser, Debug)]
#[command(name = "suspx", version)]
struct Args {
    /// Vehicle hardpoint description (JSON).
    #[arg(long)]
    vehicle: PathBuf,
    /// Simulation configuration (JSON).
    #[arg(long)]
    config: PathBuf,
    /// Print the full report as JSON instead of a text summary.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays clean on stdout. `RUST_LOG`
    // overrides the default level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Load the vehicle first. Missing corners are mirrored from the other
    // side of the same axle end while the corners are built.
    let vehicle = load_vehicle(&args.vehicle)
        .with_context(|| format!("loading vehicle from {}", args.vehicle.display()))?;
    let config = load_config(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;

    // Sweep the selected half. Travel values the mechanism cannot reach end
    // up as gaps in the report rather than failing the run.
    let report = run_simulation(&vehicle, &config)?;

    // Print either the full machine-readable report or a short summary.
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_summary(&report));
    }

    Ok(())
}
