//! Storage Layer
//!
//! Persists a single serialized artifact per file path. Writes go through a
//! temporary file and an atomic rename; reads verify a magic tag and a
//! SHA-256 digest before decoding.

mod store;

pub use store::{decode, encode, ArtifactStore, DIGEST_LEN, MAGIC};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No artifact found at {path}")]
    NotFound { path: String },
    #[error("Artifact at {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Missing or unreadable artifact, as opposed to an environment failure
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StorageError::NotFound { .. } | StorageError::Corrupt { .. })
    }
}
