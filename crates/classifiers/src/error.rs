//! Classifier Error Types

use thiserror::Error;

/// Errors during classifier fitting or prediction
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    /// Hyperparameter value not usable for this training set
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No training samples
    #[error("Cannot fit a classifier on an empty training set")]
    EmptyTrainingSet,

    /// Training labels hold a single class
    #[error("Training set contains a single class ({0})")]
    SingleClass(u8),

    /// Label outside {0, 1}
    #[error("Label {0} is not 0 or 1")]
    InvalidLabel(u8),

    /// Wrong number of features or labels
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// SVC solver or probability calibration failure
    #[error("SVC fit failed: {0}")]
    Solver(String),

    /// Neighbor index could not be built or queried
    #[error("Neighbor search failed: {0}")]
    NeighborSearch(String),
}
