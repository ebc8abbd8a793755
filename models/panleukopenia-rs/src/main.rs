pub mod environment;
pub mod error;
pub mod output;
pub mod parameters;

use std::process::ExitCode;

use fpv_sim::{RandomStream, SimulationRun, SpreadSimulator, aggregate, run_ensemble};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use environment::Environment;
use error::Result;
use output::{RUN_HEADERS, RunManifest, run_rows, summary_headers, summary_rows};
use parameters::{Mode, ModelInput};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FPV_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads a TOML run file if a path is given, otherwise JSON from stdin.
fn load() -> Result<Environment<ModelInput>> {
    let ctx = match std::env::args().nth(1) {
        Some(path) => Environment::from_toml_file(path)?,
        None => Environment::from_stdin()?,
    };
    ctx.with_input_type::<ModelInput>()
}

fn write_run<I>(ctx: &Environment<I>, run: &SimulationRun) -> Result<()> {
    if let Some(day) = run.extinction_day() {
        warn!(day, "simulation ended early, all cats died");
    }
    ctx.write_csv("panleukopenia_output.csv", &RUN_HEADERS, &run_rows(run))
}

fn run() -> Result<()> {
    let ctx = load()?;
    let parameters = &ctx.input.parameters;
    let mode = ctx.input.mode;
    info!(?mode, seed = ctx.seed, replicate = ctx.replicate, "loaded run input");

    let runs = match mode {
        Mode::Single => {
            let mut rng = RandomStream::for_replicate(ctx.seed, ctx.replicate);
            let run = SpreadSimulator::simulate(parameters, &mut rng)?;
            write_run(&ctx, &run)?;
            vec![run]
        }
        Mode::Deterministic => {
            let run = SpreadSimulator::simulate_deterministic(parameters)?;
            write_run(&ctx, &run)?;
            vec![run]
        }
        Mode::Ensemble => {
            let runs = run_ensemble(parameters, parameters.num_simulations, ctx.seed)?;
            let headers = summary_headers();
            let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
            ctx.write_csv(
                "panleukopenia_summary.csv",
                &headers,
                &summary_rows(&aggregate(&runs)),
            )?;
            runs
        }
    };

    let manifest = RunManifest::new(mode, parameters, ctx.seed, ctx.replicate, &runs);
    let written = ctx.write_file("run_manifest.json", &serde_json::to_vec_pretty(&manifest)?)?;
    if written.is_none() {
        // stdout carries the CSV table only
        info!(
            fingerprint = %manifest.fingerprint,
            runs = manifest.runs,
            extinct_runs = manifest.extinct_runs,
            "run finished"
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
