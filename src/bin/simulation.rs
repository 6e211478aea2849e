//! Engine Fleet Simulation
//!
//! Generates synthetic run-to-failure data for testing SmartMach. Every
//! engine starts near the middle of each sensor's band and drifts toward
//! (and past) its thresholds as remaining life runs out:
//! - Odd-positioned sensors drift upward, toward HIGH / critical
//! - Even-positioned sensors drift downward, toward LOW / warning
//! - Gaussian noise on every reading
//!
//! # Usage
//! ```bash
//! ./simulation --engines 20 --seed 7 > fleet.csv
//! smartmach fleet --data fleet.csv
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use smartmach::config::SmartMachConfig;
use smartmach::sensors::{generate_synthetic_fleet, SyntheticFleet};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "smartmach-simulation")]
#[command(about = "Synthetic engine fleet data for SmartMach testing")]
#[command(version = "1.0")]
struct Args {
    /// Number of engines
    #[arg(short, long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..=10_000))]
    engines: u32,

    /// Fewest recorded cycles per engine
    #[arg(long, default_value = "60")]
    min_cycles: u32,

    /// Most recorded cycles per engine
    #[arg(long, default_value = "250")]
    max_cycles: u32,

    /// Largest remaining life at the end of the recording
    #[arg(long, default_value = "200")]
    max_remaining: u32,

    /// Standard deviation of reading noise (normalized scale)
    #[arg(long, default_value = "0.02")]
    noise: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Sensor table to simulate (defaults to the standard table)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress the run summary on stderr
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.min_cycles == 0 {
        bail!("--min-cycles must be at least 1");
    }

    let config = match &args.config {
        Some(p) => SmartMachConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display()))?,
        None => SmartMachConfig::default(),
    };
    let registry = config.registry()?;

    let params = SyntheticFleet {
        engines: args.engines,
        min_cycles: args.min_cycles,
        max_cycles: args.max_cycles,
        max_remaining: args.max_remaining,
        noise_std: args.noise,
        seed: args.seed.unwrap_or_else(rand::random),
    };
    let dataset = generate_synthetic_fleet(&params, &registry)
        .map_err(|e| anyhow::anyhow!("Invalid noise level {}: {e}", args.noise))?;

    let stdout = io::stdout();
    dataset
        .write_csv(BufWriter::new(stdout.lock()))
        .context("Failed to write CSV to stdout")?;

    if !args.quiet {
        let cycles: usize = dataset
            .engine_ids()
            .filter_map(|id| dataset.cycles(id))
            .map(<[_]>::len)
            .sum();
        eprintln!(
            "Simulated {} engines, {} cycles, {} sensors (seed {})",
            dataset.engine_count(),
            cycles,
            registry.len(),
            params.seed
        );
    }
    Ok(())
}
