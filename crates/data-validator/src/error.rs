//! Validation Error Types

use thiserror::Error;

/// Errors raised while loading or validating a training dataset
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// No rows to train on
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Missing required column
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A cell could not be parsed for its field
    #[error("Row {row}: column {column} has invalid value {value:?}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// Label outside {0, 1}
    #[error("Row {row}: label {value:?} is not 0 or 1")]
    InvalidLabel { row: usize, value: String },

    /// Only one class present
    #[error("Dataset contains a single class ({class}); binary classification needs both")]
    SingleClass { class: u8 },

    /// Too few rows for the requested resampling
    #[error("Need at least {required} samples, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Source could not be opened or read
    #[error("Cannot read dataset from {path}: {reason}")]
    Unreadable { path: String, reason: String },
}
