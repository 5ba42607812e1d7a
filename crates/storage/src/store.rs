//! Artifact Store
//!
//! Blob layout: 4-byte magic, SHA-256 of the payload, postcard payload.

use crate::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Leading tag of every artifact blob
pub const MAGIC: [u8; 4] = *b"CRA1";

/// Length of the payload digest
pub const DIGEST_LEN: usize = 32;

const HEADER_LEN: usize = MAGIC.len() + DIGEST_LEN;

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(HEADER_LEN + payload.len());
    blob.extend_from_slice(&MAGIC);
    blob.extend_from_slice(&Sha256::digest(payload));
    blob.extend_from_slice(payload);
    blob
}

/// Serialize a value into a framed blob
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    let payload =
        postcard::to_allocvec(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(frame(&payload))
}

/// Verify and decode a framed blob; the error is the corruption reason
pub fn decode<T: DeserializeOwned>(blob: &[u8]) -> Result<T, String> {
    if blob.len() < HEADER_LEN {
        return Err(format!("truncated header ({} bytes)", blob.len()));
    }
    let (magic, rest) = blob.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(format!("bad magic {:02x?}", magic));
    }
    let (digest, payload) = rest.split_at(DIGEST_LEN);
    if Sha256::digest(payload).as_slice() != digest {
        return Err("payload digest mismatch".to_string());
    }

    let (value, remainder) =
        postcard::take_from_bytes::<T>(payload).map_err(|e| format!("decode failed: {}", e))?;
    if !remainder.is_empty() {
        return Err(format!("{} trailing bytes after payload", remainder.len()));
    }
    Ok(value)
}

/// One artifact at one file path
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.display(),
            source,
        }
    }

    /// Replace the stored artifact. Readers see either the old or the new
    /// blob, never a partial one.
    pub fn save<T: Serialize>(&self, value: &T) -> Result<(), StorageError> {
        let blob = encode(value)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&blob).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        info!("Saved artifact ({} bytes) to {}", blob.len(), self.display());
        Ok(())
    }

    /// Read and verify the stored artifact
    pub fn load<T: DeserializeOwned>(&self) -> Result<T, StorageError> {
        let blob = match fs::read(&self.path) {
            Ok(blob) => blob,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    path: self.display(),
                })
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let value = decode(&blob).map_err(|reason| StorageError::Corrupt {
            path: self.display(),
            reason,
        })?;
        debug!("Loaded artifact ({} bytes) from {}", blob.len(), self.display());
        Ok(value)
    }
}
