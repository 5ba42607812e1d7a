//! Cardiovascular Risk Classifier Entry Points
//!
//! Shared plumbing for the `cardio-train` and `cardio-predict` binaries:
//! logging setup, configuration, the training run, and report rendering.

mod settings;

pub use settings::{AppConfig, DEFAULT_CONFIG_FILE};

use anyhow::{Context, Result};
use data_validator::{DatasetLoader, DatasetValidator};
use model_selection::{default_candidates, ModelSelector, Selection};
use std::str::FromStr;
use storage::ArtifactStore;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Initialize logging on stderr, so stdout stays free for results
pub fn init_logging(level: &str, json: bool) {
    let max_level = Level::from_str(level).unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    if installed.is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// Load the dataset, select the best pipeline, and write its artifact.
/// Nothing is written unless selection succeeds.
pub fn train(config: &AppConfig) -> Result<Selection> {
    let dataset = DatasetLoader::new()
        .load_path(&config.dataset_path)
        .with_context(|| format!("loading dataset {}", config.dataset_path.display()))?;
    info!(
        "Loaded {} samples from {}",
        dataset.len(),
        config.dataset_path.display()
    );

    // Out-of-range values are accepted; the report only logs them
    DatasetValidator::default().report(&dataset);

    let selection = ModelSelector::new(config.selection.clone())
        .select(&dataset, &default_candidates())
        .context("model selection failed")?;

    ArtifactStore::new(&config.artifact_path)
        .save(&selection.artifact)
        .with_context(|| format!("saving artifact {}", config.artifact_path.display()))?;
    Ok(selection)
}

/// Human-readable summary of a selection run
pub fn render_report(selection: &Selection) -> String {
    let mut out = String::from("Candidate leaderboard (best mean CV accuracy):\n");
    for entry in &selection.leaderboard {
        out.push_str(&format!(
            "  {:<4} {:.4}  [{}]\n",
            entry.name, entry.cv_accuracy, entry.params
        ));
    }
    let (train, test) = selection.split_sizes;
    out.push_str(&format!(
        "Best model: {} [{}]\n",
        selection.name(),
        selection.params()
    ));
    out.push_str(&format!("CV accuracy: {:.4}\n", selection.cv_accuracy()));
    out.push_str(&format!(
        "Held-out accuracy: {:.4} ({} train / {} test rows)\n",
        selection.test_accuracy, train, test
    ));
    out
}
