//! Model Selection
//!
//! Candidate pipelines (preprocessor + classifier), cross-validated grid
//! search on a worker pool, and selection of the single best pipeline as a
//! model artifact.

mod artifact;
mod error;
mod grid;
mod metrics;
mod pipeline;
mod search;
mod selector;
mod split;

pub use artifact::ModelArtifact;
pub use error::SelectionError;
pub use grid::{default_candidates, Candidate};
pub use metrics::accuracy;
pub use pipeline::FittedPipeline;
pub use search::{GridPointScore, GridSearch, SearchOutcome};
pub use selector::{LeaderboardEntry, ModelSelector, Selection, SelectionConfig};
pub use split::{test_size, train_test_split, Fold, StratifiedKFold};
