//! Application Configuration
//!
//! Layered as: built-in defaults, then an optional TOML file, then
//! `CARDIO__*` environment variables (`CARDIO__SELECTION__SEED=7`).

use config::{Config, ConfigError, Environment, File};
use model_selection::SelectionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "cardio.toml";

/// Settings shared by the training and serving binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Labeled CSV used for training
    pub dataset_path: PathBuf,
    /// Where the model artifact is written and read
    pub artifact_path: PathBuf,
    /// Minimum log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    pub selection: SelectionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("heart.csv"),
            artifact_path: PathBuf::from("heart.model"),
            log_level: "info".to_string(),
            log_json: false,
            selection: SelectionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `file` (required when given) or `cardio.toml` (optional),
    /// then apply environment overrides
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("CARDIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
