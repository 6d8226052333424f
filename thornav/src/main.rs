//! # THORNAV Evaluation
//!
//! Evaluates a uniformly random policy on every task of an experiment file
//! and prints the per-task and per-scene statistics as JSON. Logging goes to
//! stderr and is filtered by `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use thornav::app;
use thornav::experiment::ExperimentConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "thornav", about = "Evaluate navigation tasks over precomputed scenes")]
struct Cli {
    /// Experiment file (JSON).
    #[arg(long)]
    config: PathBuf,

    /// Override the number of episodes per task.
    #[arg(long)]
    episodes: Option<usize>,

    /// Override the environment seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ExperimentConfig::load(&cli.config)?;
    if let Some(episodes) = cli.episodes {
        config = config.with_episodes(episodes);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let report = app::run(&config)?;
    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}
