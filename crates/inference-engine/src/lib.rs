//! Inference Service
//!
//! Serves risk predictions from a model artifact that is loaded on first use
//! and cached for the life of the service.

mod engine;

pub use engine::{Assessment, InferenceService, RiskLabel};

use classifiers::ClassifierError;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model artifact unavailable at {path}: {reason}")]
    ArtifactUnavailable { path: String, reason: String },
    #[error("Prediction failed: {0}")]
    Prediction(#[from] ClassifierError),
    #[error("Model cache lock poisoned")]
    LockPoisoned,
}
