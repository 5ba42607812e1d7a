use cli::{render_report, train, AppConfig};
use data_validator::ValidationError;
use feature_engine::FeatureRow;
use inference_engine::{InferenceError, InferenceService};
use model_selection::{SelectionConfig, SelectionError};
use std::fs;
use std::path::{Path, PathBuf};
use storage::ArtifactStore;
use tempfile::tempdir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/heart.csv")
}

fn config(dataset: PathBuf, artifact: PathBuf) -> AppConfig {
    AppConfig {
        dataset_path: dataset,
        artifact_path: artifact,
        selection: SelectionConfig {
            n_jobs: 2,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn example_row() -> FeatureRow {
    FeatureRow::from_array([63.0, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 0.0])
}

#[test]
fn test_train_then_predict() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("heart.model");
    let selection = train(&config(fixture(), artifact.clone())).unwrap();

    assert_eq!(selection.leaderboard.len(), 3);
    let names: Vec<&str> = selection.leaderboard.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["KNN", "SVM", "DT"]);
    assert!(selection
        .leaderboard
        .iter()
        .all(|e| e.cv_accuracy <= selection.cv_accuracy()));
    assert_eq!(selection.split_sizes, (99, 25));

    let report = render_report(&selection);
    assert!(report.contains(selection.name()));
    assert!(report.contains("(99 train / 25 test rows)"));
    // Header, one line per candidate, then three summary lines
    assert_eq!(report.lines().count(), 1 + 3 + 3);
    assert!(report.ends_with('\n'));

    let service = InferenceService::new(ArtifactStore::new(&artifact));
    let first = service.predict(&example_row()).unwrap();
    assert!(first == 0 || first == 1);
    assert_eq!(service.predict(&example_row()).unwrap(), first);

    let assessment = service.assess(&example_row()).unwrap();
    assert_eq!(assessment.label.class(), first);
    assert_eq!(assessment.model, selection.name());
    assert!((0.0..=1.0).contains(&assessment.probability));

    service.reload().unwrap();
    assert_eq!(service.predict(&example_row()).unwrap(), first);
}

#[test]
fn test_empty_dataset_keeps_prior_artifact() {
    let dir = tempdir().unwrap();
    let dataset = dir.path().join("empty.csv");
    fs::write(
        &dataset,
        "age,sex,cp,trtbps,chol,fbs,restecg,thalachh,exng,oldpeak,slp,caa,thall,output\n",
    )
    .unwrap();
    let artifact = dir.path().join("heart.model");
    fs::write(&artifact, b"previous artifact").unwrap();

    let err = train(&config(dataset, artifact.clone())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SelectionError>(),
        Some(SelectionError::Validation(ValidationError::EmptyDataset))
    ));
    assert_eq!(fs::read(&artifact).unwrap(), b"previous artifact");
}

#[test]
fn test_missing_column_is_rejected() {
    let dir = tempdir().unwrap();
    let dataset = dir.path().join("partial.csv");
    fs::write(
        &dataset,
        "age,sex,cp,trtbps,chol,fbs,restecg,thalachh,exng,output\n63,1,3,145,233,1,0,150,0,1\n",
    )
    .unwrap();
    let artifact = dir.path().join("heart.model");

    let err = train(&config(dataset, artifact.clone())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ValidationError>(),
        Some(ValidationError::MissingColumn(column)) if column == "caa"
    ));
    assert!(!artifact.exists());
}

#[test]
fn test_corrupted_artifact_is_unavailable() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("heart.model");
    fs::write(&artifact, [0u8; 64]).unwrap();

    let service = InferenceService::new(ArtifactStore::new(&artifact));
    assert!(matches!(
        service.predict(&example_row()),
        Err(InferenceError::ArtifactUnavailable { .. })
    ));
    assert!(!service.is_loaded());
}
