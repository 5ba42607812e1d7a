//! Training Data Loading and Validation
//!
//! Reads the raw tabular source into a labeled dataset and rejects data that
//! cannot be trained on before any model search begins.

mod dataset;
mod error;
mod loader;
mod validator;

pub use dataset::{Label, TrainingDataset};
pub use error::ValidationError;
pub use loader::{ColumnMap, DatasetLoader};
pub use validator::{DatasetValidator, ValidationConfig, ValidationResult};
