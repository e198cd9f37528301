//! OpenModes command line driver
//!
//! Runs either an extinction sweep or a pole search on the parts described
//! by a JSON configuration and writes the results as JSON.
//!
//! Usage:
//!   cargo run --release --bin openmodes -- --config configs/srr.json --mode poles
//!   cargo run --release --bin openmodes -- --help

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;
use num_complex::Complex64;
use openmodes::config::{MeshConfig, PartConfig};
use openmodes::{Simulation, SimulationConfig, GIT_HASH, VERSION};
use serde::Serialize;
use std::f64::consts::PI;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "openmodes")]
#[command(about = "Eigenmode solver for open electromagnetic resonators")]
struct Args {
    /// Path to JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON file path
    #[arg(short, long, default_value = "openmodes_output.json")]
    output: PathBuf,

    /// Analysis to run
    #[arg(short, long, default_value = "extinction")]
    mode: CliMode,

    /// Number of worker threads (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    Extinction,
    Poles,
}

#[derive(Serialize)]
struct ExtinctionOutput {
    frequencies_hz: Vec<f64>,
    extinction_real: Vec<f64>,
    extinction_imag: Vec<f64>,
}

#[derive(Serialize)]
struct PartPoles {
    part: String,
    frequencies_hz_real: Vec<f64>,
    frequencies_hz_imag: Vec<f64>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Results {
    Extinction(ExtinctionOutput),
    Poles(Vec<PartPoles>),
}

#[derive(Serialize)]
struct Output {
    version: &'static str,
    git_hash: &'static str,
    date: String,
    num_unknowns: usize,
    elapsed_seconds: f64,
    config: SimulationConfig,
    results: Results,
}

/// A 5 mm sphere, the smallest useful run
fn default_config() -> SimulationConfig {
    SimulationConfig {
        geometry: vec![PartConfig {
            mesh: MeshConfig::Sphere {
                radius: 5e-3,
                subdivisions: 2,
            },
            rotations: Vec::new(),
            translation: [0.0; 3],
        }],
        operator: Default::default(),
        integration: Default::default(),
        sweep: Default::default(),
        source: Default::default(),
        poles: Default::default(),
        threads: None,
    }
}

fn run_extinction(sim: &Simulation, config: &SimulationConfig) -> anyhow::Result<Results> {
    let source = config.source.to_source()?;
    let freqs = config.sweep.frequencies();
    let extinction = sim.extinction(&source, &freqs)?;
    Ok(Results::Extinction(ExtinctionOutput {
        frequencies_hz: freqs,
        extinction_real: extinction.iter().map(|z| z.re).collect(),
        extinction_imag: extinction.iter().map(|z| z.im).collect(),
    }))
}

fn run_poles(sim: &Simulation, config: &SimulationConfig) -> anyhow::Result<Results> {
    let s_start = Complex64::new(0.0, 2.0 * PI * config.poles.frequency_hz);
    let mut out = Vec::new();
    for part in sim.parts() {
        let estimates = sim
            .estimate_poles(s_start, &config.poles.modes, part.id())
            .with_context(|| format!("estimating poles of part {}", part.id()))?;
        let modes = sim
            .refine_poles(&estimates, &config.poles.options)
            .with_context(|| format!("refining poles of part {}", part.id()))?;
        let freqs = modes.frequencies_hz();
        out.push(PartPoles {
            part: part.id().to_string(),
            frequencies_hz_real: freqs.iter().map(|z| z.re).collect(),
            frequencies_hz_imag: freqs.iter().map(|z| z.im).collect(),
        });
    }
    Ok(Results::Poles(out))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    info!("OpenModes {} ({})", VERSION, GIT_HASH);

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            SimulationConfig::from_file(path)
                .with_context(|| format!("reading {}", path.display()))?
        }
        None => {
            info!("No configuration file specified, using a 5 mm sphere");
            default_config()
        }
    };
    if args.threads.is_some() {
        config.threads = args.threads;
    }

    let start = Instant::now();
    let sim = Simulation::new(&config)?;
    info!(
        "{} parts, {} unknowns, threads: {} (parallel: {})",
        sim.parts().len(),
        sim.num_unknowns(),
        openmodes::core::get_threads(),
        openmodes::parallel::is_parallel_available()
    );

    let results = match args.mode {
        CliMode::Extinction => run_extinction(&sim, &config)?,
        CliMode::Poles => run_poles(&sim, &config)?,
    };

    let output = Output {
        version: VERSION,
        git_hash: GIT_HASH,
        date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        num_unknowns: sim.num_unknowns(),
        elapsed_seconds: start.elapsed().as_secs_f64(),
        config,
        results,
    };

    info!("Saving results to: {}", args.output.display());
    fs::write(&args.output, serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
