//! Selection Error Types

use classifiers::ClassifierError;
use data_validator::ValidationError;
use feature_engine::FeatureError;
use thiserror::Error;

/// Errors raised while searching for and selecting a model
#[derive(Debug, Error)]
pub enum SelectionError {
    /// Dataset rejected before the search started
    #[error("Data validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Preprocessing could not be fitted
    #[error("Preprocessing failed: {0}")]
    Feature(#[from] FeatureError),

    /// A classifier could not be fitted or applied
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Nothing to select from
    #[error("No candidate pipelines were supplied")]
    NoCandidates,

    /// Every grid point of a candidate failed
    #[error("Candidate {candidate} has no viable grid point")]
    NoViableGridPoint { candidate: String },

    /// Selection settings out of range
    #[error("Invalid selection config: {0}")]
    InvalidConfig(String),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
