//! Feature Engineering Engine
//!
//! Static feature schema and the preprocessing transformer shared by training
//! and serving.

mod error;
mod preprocess;
mod schema;
mod statistics;

pub use error::FeatureError;
pub use preprocess::{Preprocessor, Standardizer};
pub use schema::{
    FeatureRow, FieldKind, FieldSpec, FieldValue, ENCODED_DIMENSION, EXCLUDED_COLUMNS,
    FEATURE_COUNT, FEATURE_SCHEMA, LABEL_COLUMN, NUMERIC_COUNT, UNKNOWN_CATEGORY,
};
pub use statistics::ColumnStats;
