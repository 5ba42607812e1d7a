//! Cardiovascular Risk Classifier - Training Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use cli::{init_logging, render_report, train, AppConfig};
use std::path::PathBuf;
use tracing::info;

/// Select the best risk model for a labeled dataset and save it
#[derive(Debug, Parser)]
#[command(name = "cardio-train", version, about)]
struct Args {
    /// Configuration file (defaults to ./cardio.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Labeled CSV dataset
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Output path for the model artifact
    #[arg(long)]
    artifact: Option<PathBuf>,

    /// Seed for the hold-out split
    #[arg(long)]
    seed: Option<u64>,

    /// Cross-validation folds
    #[arg(long)]
    folds: Option<usize>,

    /// Share of rows held out for testing
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Worker threads for the grid search (0 = all cores)
    #[arg(long)]
    jobs: Option<usize>,

    /// Minimum log level
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(self, config: &mut AppConfig) {
        if let Some(path) = self.dataset {
            config.dataset_path = path;
        }
        if let Some(path) = self.artifact {
            config.artifact_path = path;
        }
        if let Some(seed) = self.seed {
            config.selection.seed = seed;
        }
        if let Some(folds) = self.folds {
            config.selection.folds = folds;
        }
        if let Some(fraction) = self.test_fraction {
            config.selection.test_fraction = fraction;
        }
        if let Some(jobs) = self.jobs {
            config.selection.n_jobs = jobs;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    args.apply(&mut config);
    init_logging(&config.log_level, config.log_json);

    info!("=== cardio-train v{} ===", env!("CARGO_PKG_VERSION"));
    let selection = train(&config)?;

    print!("{}", render_report(&selection));
    println!(
        "Best model ({}) saved to {} with CV accuracy: {:.4}",
        selection.name(),
        config.artifact_path.display(),
        selection.cv_accuracy()
    );
    Ok(())
}
