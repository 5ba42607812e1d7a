//! Model Artifact

use crate::pipeline::FittedPipeline;
use classifiers::{ClassifierError, ClassifierParams};
use feature_engine::FeatureRow;
use serde::{Deserialize, Serialize};

/// The winning pipeline with its name and cross-validated accuracy.
/// Immutable once built; the accuracy is informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    name: String,
    cv_accuracy: f64,
    pipeline: FittedPipeline,
}

impl ModelArtifact {
    pub fn new(name: impl Into<String>, cv_accuracy: f64, pipeline: FittedPipeline) -> Self {
        Self {
            name: name.into(),
            cv_accuracy,
            pipeline,
        }
    }

    /// Name of the winning candidate
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cv_accuracy(&self) -> f64 {
        self.cv_accuracy
    }

    pub fn params(&self) -> ClassifierParams {
        self.pipeline.params()
    }

    pub fn pipeline(&self) -> &FittedPipeline {
        &self.pipeline
    }

    pub fn predict(&self, row: &FeatureRow) -> Result<u8, ClassifierError> {
        self.pipeline.predict(row)
    }

    pub fn predict_proba(&self, row: &FeatureRow) -> Result<f64, ClassifierError> {
        self.pipeline.predict_proba(row)
    }
}
