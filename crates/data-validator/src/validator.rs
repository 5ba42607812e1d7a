//! Dataset Validator
//!
//! Fail-fast checks run before any model search starts, plus an
//! informational report of numeric values outside their declared ranges
//! (those values are accepted, only counted).

use crate::dataset::TrainingDataset;
use crate::error::ValidationError;
use feature_engine::{FieldKind, FEATURE_SCHEMA};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum number of samples required
    pub min_samples: usize,
    /// Reject datasets that contain a single class
    pub require_both_classes: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_samples: 1,
            require_both_classes: true,
        }
    }
}

/// Result of a full validation pass
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether every check passed
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of samples inspected
    pub samples_checked: usize,
    /// Samples with a numeric value outside its declared range (accepted as-is)
    pub out_of_range: usize,
}

/// Dataset validator
pub struct DatasetValidator {
    config: ValidationConfig,
}

impl DatasetValidator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validator requiring at least `min_samples` rows
    pub fn with_min_samples(min_samples: usize) -> Self {
        Self::new(ValidationConfig {
            min_samples: min_samples.max(1),
            ..Default::default()
        })
    }

    /// Return the first failing check, if any
    pub fn validate(&self, dataset: &TrainingDataset) -> Result<(), ValidationError> {
        match self.checks(dataset).into_iter().next() {
            Some(err) => Err(err),
            None => {
                debug!("Dataset with {} samples passed validation", dataset.len());
                Ok(())
            }
        }
    }

    /// Run every check and collect the outcome
    pub fn report(&self, dataset: &TrainingDataset) -> ValidationResult {
        let errors = self.checks(dataset);
        let out_of_range = count_out_of_range(dataset);
        if out_of_range > 0 {
            warn!(
                "{} of {} samples carry numeric values outside declared ranges",
                out_of_range,
                dataset.len()
            );
        }
        ValidationResult {
            valid: errors.is_empty(),
            errors,
            samples_checked: dataset.len(),
            out_of_range,
        }
    }

    fn checks(&self, dataset: &TrainingDataset) -> Vec<ValidationError> {
        if dataset.is_empty() {
            return vec![ValidationError::EmptyDataset];
        }

        let mut errors = Vec::new();
        if dataset.len() < self.config.min_samples {
            errors.push(ValidationError::InsufficientSamples {
                required: self.config.min_samples,
                actual: dataset.len(),
            });
        }

        if self.config.require_both_classes {
            let counts = dataset.class_counts();
            if let Some(missing) = counts.iter().position(|&c| c == 0) {
                errors.push(ValidationError::SingleClass {
                    class: (1 - missing) as u8,
                });
            }
        }

        errors
    }
}

impl Default for DatasetValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

fn count_out_of_range(dataset: &TrainingDataset) -> usize {
    dataset
        .rows()
        .iter()
        .filter(|row| {
            FEATURE_SCHEMA
                .iter()
                .zip(row.values())
                .any(|(spec, value)| match spec.kind {
                    FieldKind::Numeric { min, max } => {
                        let v = value.as_f64();
                        v < min as f64 || v > max as f64
                    }
                    FieldKind::Categorical { .. } => false,
                })
        })
        .count()
}
