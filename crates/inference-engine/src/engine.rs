//! Inference Service Implementation

use crate::InferenceError;
use feature_engine::FeatureRow;
use model_selection::ModelArtifact;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storage::ArtifactStore;
use tracing::{debug, info, warn};

/// Binary risk outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    /// Class 0
    Low,
    /// Class 1
    Elevated,
}

impl RiskLabel {
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            RiskLabel::Elevated
        } else {
            RiskLabel::Low
        }
    }

    pub fn class(&self) -> u8 {
        match self {
            RiskLabel::Low => 0,
            RiskLabel::Elevated => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Low heart disease risk",
            RiskLabel::Elevated => "Potential heart disease risk detected",
        }
    }

    /// Recommended follow-up
    pub fn recommended_action(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Cardiovascular health appears stable; keep up healthy habits",
            RiskLabel::Elevated => "Higher risk identified; medical consultation recommended",
        }
    }
}

/// Full read-only answer for one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub label: RiskLabel,
    /// Probability of class 1
    pub probability: f64,
    /// Name of the winning candidate that produced the artifact
    pub model: String,
}

/// Prediction service over one artifact store
pub struct InferenceService {
    /// `None` when built around an in-memory artifact
    store: Option<ArtifactStore>,
    cache: Mutex<Option<Arc<ModelArtifact>>>,
    /// Successful reads from the store
    loads: AtomicUsize,
}

impl InferenceService {
    /// Service that loads from `store` on first use
    pub fn new(store: ArtifactStore) -> Self {
        info!("Creating inference service for {}", store.path().display());
        Self {
            store: Some(store),
            cache: Mutex::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    /// Service around an artifact that is already in memory
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        info!("Creating inference service around in-memory {} model", artifact.name());
        Self {
            store: None,
            cache: Mutex::new(Some(Arc::new(artifact))),
            loads: AtomicUsize::new(0),
        }
    }

    /// The cached artifact, loading it first if needed. Concurrent first
    /// callers wait on the lock and share one load; failures are not cached.
    pub fn artifact(&self) -> Result<Arc<ModelArtifact>, InferenceError> {
        let mut cache = self.cache.lock().map_err(|_| InferenceError::LockPoisoned)?;
        if let Some(artifact) = cache.as_ref() {
            return Ok(Arc::clone(artifact));
        }

        let Some(store) = self.store.as_ref() else {
            return Err(InferenceError::ArtifactUnavailable {
                path: "<memory>".to_string(),
                reason: "no artifact store configured".to_string(),
            });
        };
        let artifact = store.load::<ModelArtifact>().map_err(|e| {
            warn!("Failed to load model artifact: {}", e);
            InferenceError::ArtifactUnavailable {
                path: store.path().display().to_string(),
                reason: e.to_string(),
            }
        })?;

        info!(
            "Loaded {} model (CV accuracy {:.4}) from {}",
            artifact.name(),
            artifact.cv_accuracy(),
            store.path().display()
        );
        self.loads.fetch_add(1, Ordering::Relaxed);
        let artifact = Arc::new(artifact);
        *cache = Some(Arc::clone(&artifact));
        Ok(artifact)
    }

    /// Drop the cached artifact so the next call reads the store again
    pub fn reload(&self) -> Result<(), InferenceError> {
        if self.store.is_none() {
            debug!("In-memory service: reload keeps the current artifact");
            return Ok(());
        }
        let mut cache = self.cache.lock().map_err(|_| InferenceError::LockPoisoned)?;
        *cache = None;
        info!("Model cache cleared");
        Ok(())
    }

    /// How many times the artifact has been read from the store
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Whether an artifact is currently cached
    pub fn is_loaded(&self) -> bool {
        self.cache.lock().map(|c| c.is_some()).unwrap_or(false)
    }

    /// Predicted class (0 or 1) for one row
    pub fn predict(&self, row: &FeatureRow) -> Result<u8, InferenceError> {
        let label = self.artifact()?.predict(row)?;
        debug!("Predicted class {}", label);
        Ok(label)
    }

    /// Probability of class 1 for one row
    pub fn predict_proba(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
        Ok(self.artifact()?.predict_proba(row)?)
    }

    /// Label, probability, and model name for one row
    pub fn assess(&self, row: &FeatureRow) -> Result<Assessment, InferenceError> {
        let artifact = self.artifact()?;
        Ok(Assessment {
            label: RiskLabel::from_class(artifact.predict(row)?),
            probability: artifact.predict_proba(row)?,
            model: artifact.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classifiers::{ClassifierParams, TreeParams};
    use model_selection::FittedPipeline;
    use std::fs;
    use tempfile::tempdir;

    fn row(age: f64) -> FeatureRow {
        FeatureRow::from_array([age, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 0.0])
    }

    fn artifact() -> ModelArtifact {
        let rows: Vec<FeatureRow> = (0..20).map(|i| row(40.0 + i as f64)).collect();
        let labels: Vec<u8> = (0..20).map(|i| u8::from(i >= 10)).collect();
        let params = ClassifierParams::DecisionTree(TreeParams::default());
        let pipeline = FittedPipeline::fit(&params, &rows, &labels).unwrap();
        ModelArtifact::new("DT", 0.9, pipeline)
    }

    #[test]
    fn test_in_memory_service() {
        let service = InferenceService::from_artifact(artifact());
        assert!(service.is_loaded());
        assert_eq!(service.load_count(), 0);
        assert_eq!(service.predict(&row(42.0)).unwrap(), 0);
        assert_eq!(service.predict(&row(63.0)).unwrap(), 1);

        let assessment = service.assess(&row(63.0)).unwrap();
        assert_eq!(assessment.label, RiskLabel::Elevated);
        assert_eq!(assessment.probability, 1.0);
        assert_eq!(assessment.model, "DT");

        service.reload().unwrap();
        assert!(service.is_loaded());
    }

    #[test]
    fn test_loads_once_and_reload_rereads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heart.model");
        ArtifactStore::new(&path).save(&artifact()).unwrap();

        let service = InferenceService::new(ArtifactStore::new(&path));
        assert!(!service.is_loaded());
        let first = service.predict(&row(63.0)).unwrap();
        assert!(service.is_loaded());

        // Cached: the file is no longer consulted
        fs::remove_file(&path).unwrap();
        assert_eq!(service.predict(&row(63.0)).unwrap(), first);

        service.reload().unwrap();
        assert!(matches!(
            service.predict(&row(63.0)),
            Err(InferenceError::ArtifactUnavailable { .. })
        ));
    }

    #[test]
    fn test_failed_load_is_retried() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heart.model");
        let service = InferenceService::new(ArtifactStore::new(&path));

        assert!(matches!(
            service.predict(&row(50.0)),
            Err(InferenceError::ArtifactUnavailable { .. })
        ));
        assert!(!service.is_loaded());

        ArtifactStore::new(&path).save(&artifact()).unwrap();
        assert_eq!(service.predict(&row(50.0)).unwrap(), 1);
    }

    #[test]
    fn test_corrupt_artifact_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heart.model");
        fs::write(&path, b"definitely not a model").unwrap();

        let service = InferenceService::new(ArtifactStore::new(&path));
        let err = service.assess(&row(50.0)).unwrap_err();
        assert!(matches!(err, InferenceError::ArtifactUnavailable { .. }));
    }

    #[test]
    fn test_concurrent_first_calls_agree() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heart.model");
        ArtifactStore::new(&path).save(&artifact()).unwrap();
        let service = InferenceService::new(ArtifactStore::new(&path));

        let results: Vec<u8> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| service.predict(&row(63.0)).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.iter().all(|&r| r == 1));
    }

    #[test]
    fn test_concurrent_first_calls_share_one_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heart.model");
        ArtifactStore::new(&path).save(&artifact()).unwrap();
        let service = InferenceService::new(ArtifactStore::new(&path));
        assert_eq!(service.load_count(), 0);

        let barrier = std::sync::Barrier::new(16);
        std::thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| {
                    barrier.wait();
                    service.assess(&row(63.0)).unwrap();
                });
            }
        });
        assert_eq!(service.load_count(), 1);

        service.reload().unwrap();
        service.predict(&row(63.0)).unwrap();
        assert_eq!(service.load_count(), 2);
    }

    #[test]
    fn test_risk_label() {
        assert_eq!(RiskLabel::from_class(0), RiskLabel::Low);
        assert_eq!(RiskLabel::from_class(1).class(), 1);
    }
}
