//! Feature Engine Error Types

use thiserror::Error;

/// Errors during preprocessing
#[derive(Debug, Clone, Error)]
pub enum FeatureError {
    /// Fit was called without any rows
    #[error("Cannot fit preprocessor on an empty set of rows")]
    EmptyInput,
}
