//! Model Selector
//!
//! Validates the dataset, holds out a seeded test split, grid-searches every
//! candidate with stratified k-fold cross-validation, and keeps the candidate
//! whose best CV accuracy is strictly greater than all earlier ones.

use crate::artifact::ModelArtifact;
use crate::error::SelectionError;
use crate::grid::Candidate;
use crate::metrics::accuracy;
use crate::search::{GridSearch, SearchOutcome};
use crate::split::{test_size, train_test_split, StratifiedKFold};
use classifiers::ClassifierParams;
use data_validator::{DatasetValidator, TrainingDataset};
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Share of rows held out for the final test score
    pub test_fraction: f64,
    /// Seed for the hold-out shuffle
    pub seed: u64,
    /// Cross-validation folds
    pub folds: usize,
    /// Worker threads for the search (0 = all cores)
    pub n_jobs: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            folds: 5,
            n_jobs: 0,
        }
    }
}

impl SelectionConfig {
    fn check(&self) -> Result<(), SelectionError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(SelectionError::InvalidConfig(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.folds < 2 {
            return Err(SelectionError::InvalidConfig(format!(
                "folds must be at least 2, got {}",
                self.folds
            )));
        }
        Ok(())
    }

    /// Smallest dataset whose training split still has one row per fold
    pub fn min_samples(&self) -> usize {
        let mut n = self.folds.max(1);
        while n - test_size(n, self.test_fraction) < self.folds {
            n += 1;
        }
        n
    }
}

/// One row of the selection report
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub params: ClassifierParams,
    pub cv_accuracy: f64,
}

/// Outcome of a selection run
#[derive(Debug, Clone)]
pub struct Selection {
    /// Best CV accuracy per candidate, in comparison order
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Winner's accuracy on the held-out split (reporting only)
    pub test_accuracy: f64,
    /// Rows in the training and test splits
    pub split_sizes: (usize, usize),
    pub artifact: ModelArtifact,
}

impl Selection {
    pub fn name(&self) -> &str {
        self.artifact.name()
    }

    pub fn params(&self) -> ClassifierParams {
        self.artifact.params()
    }

    pub fn cv_accuracy(&self) -> f64 {
        self.artifact.cv_accuracy()
    }

    pub fn into_artifact(self) -> ModelArtifact {
        self.artifact
    }
}

/// Runs the full search over a set of candidates
#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    config: SelectionConfig,
}

impl ModelSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Pick the best candidate for `dataset`. All validation happens before
    /// any search; a run that fails part-way never yields a winner.
    pub fn select(
        &self,
        dataset: &TrainingDataset,
        candidates: &[Candidate],
    ) -> Result<Selection, SelectionError> {
        self.config.check()?;
        DatasetValidator::with_min_samples(self.config.min_samples()).validate(dataset)?;
        if candidates.is_empty() {
            return Err(SelectionError::NoCandidates);
        }
        if let Some(empty) = candidates.iter().find(|c| c.is_empty()) {
            return Err(SelectionError::NoViableGridPoint {
                candidate: empty.name().to_string(),
            });
        }

        let (train_idx, test_idx) =
            train_test_split(dataset.len(), self.config.test_fraction, self.config.seed);
        let train = dataset.subset(&train_idx);
        let test = dataset.subset(&test_idx);
        info!(
            "Split {} samples into {} training and {} test rows (seed {})",
            dataset.len(),
            train.len(),
            test.len(),
            self.config.seed
        );
        // The hold-out can leave the training rows with one class or fewer
        // rows than folds; reject that before any fitting starts
        DatasetValidator::with_min_samples(self.config.folds)
            .validate(&train)
            .map_err(|e| {
                warn!("Training split rejected: {}", e);
                e
            })?;

        let folds = StratifiedKFold::new(self.config.folds).split(train.labels());
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.n_jobs)
            .build()?;
        let search = GridSearch::new(&pool, train.rows(), train.labels(), &folds)?;

        let mut leaderboard = Vec::with_capacity(candidates.len());
        let mut best: Option<SearchOutcome> = None;
        for candidate in candidates {
            let outcome = search.run(candidate)?;
            leaderboard.push(LeaderboardEntry {
                name: outcome.name.clone(),
                params: outcome.best_params,
                cv_accuracy: outcome.cv_accuracy,
            });
            if best
                .as_ref()
                .map_or(true, |b| outcome.cv_accuracy > b.cv_accuracy)
            {
                best = Some(outcome);
            }
        }

        let Some(winner) = best else {
            return Err(SelectionError::NoCandidates);
        };

        let predicted = winner.pipeline.predict_batch(test.rows())?;
        let test_accuracy = accuracy(test.labels(), &predicted);
        info!(
            "Selected {} (CV accuracy {:.4}, held-out accuracy {:.4})",
            winner.name, winner.cv_accuracy, test_accuracy
        );

        Ok(Selection {
            leaderboard,
            test_accuracy,
            split_sizes: (train.len(), test.len()),
            artifact: ModelArtifact::new(winner.name, winner.cv_accuracy, winner.pipeline),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::default_candidates;
    use classifiers::{KnnParams, TreeParams};
    use data_validator::ValidationError;
    use feature_engine::FeatureRow;

    fn dataset(n: usize) -> TrainingDataset {
        let rows = (0..n)
            .map(|i| {
                let sick = i % 3 == 0;
                let age = if sick { 62.0 } else { 45.0 } + (i % 7) as f64;
                let thalach = if sick { 120.0 } else { 165.0 } - (i % 5) as f64;
                FeatureRow::from_array([
                    age,
                    (i % 2) as f64,
                    (i % 4) as f64,
                    120.0 + (i % 9) as f64,
                    200.0 + (i % 11) as f64 * 5.0,
                    0.0,
                    (i % 3) as f64,
                    thalach,
                    u8::from(sick) as f64,
                    (i % 5) as f64,
                ])
            })
            .collect();
        let labels = (0..n).map(|i| u8::from(i % 3 == 0)).collect();
        TrainingDataset::from_parts(rows, labels).unwrap()
    }

    fn small_config() -> SelectionConfig {
        SelectionConfig {
            n_jobs: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_min_samples() {
        assert_eq!(SelectionConfig::default().min_samples(), 7);
        let three = SelectionConfig {
            folds: 3,
            test_fraction: 0.5,
            ..Default::default()
        };
        assert_eq!(three.min_samples(), 6);
    }

    #[test]
    fn test_empty_dataset_fails_fast() {
        let selector = ModelSelector::new(small_config());
        assert!(matches!(
            selector.select(&TrainingDataset::new(), &default_candidates()),
            Err(SelectionError::Validation(ValidationError::EmptyDataset))
        ));
    }

    #[test]
    fn test_single_class_fails_fast() {
        let rows = vec![FeatureRow::from_array([50.0, 1.0, 0.0, 120.0, 200.0, 0.0, 0.0, 150.0, 0.0, 0.0]); 20];
        let data = TrainingDataset::from_parts(rows, vec![1; 20]).unwrap();
        assert!(matches!(
            ModelSelector::new(small_config()).select(&data, &default_candidates()),
            Err(SelectionError::Validation(ValidationError::SingleClass { class: 1 }))
        ));
    }

    #[test]
    fn test_single_class_training_split_fails_fast() {
        let (_, held_out) = train_test_split(10, 0.2, 42);
        let positive = held_out[0];
        let rows = (0..10)
            .map(|i| {
                FeatureRow::from_array([
                    40.0 + i as f64,
                    1.0,
                    0.0,
                    120.0,
                    200.0,
                    0.0,
                    0.0,
                    150.0,
                    0.0,
                    0.0,
                ])
            })
            .collect();
        let labels = (0..10).map(|i| u8::from(i == positive)).collect();
        let data = TrainingDataset::from_parts(rows, labels).unwrap();

        assert!(matches!(
            ModelSelector::new(small_config()).select(&data, &default_candidates()),
            Err(SelectionError::Validation(ValidationError::SingleClass { class: 0 }))
        ));
    }

    #[test]
    fn test_too_few_samples_for_folds() {
        assert!(matches!(
            ModelSelector::new(small_config()).select(&dataset(6), &default_candidates()),
            Err(SelectionError::Validation(ValidationError::InsufficientSamples {
                required: 7,
                actual: 6
            }))
        ));
    }

    #[test]
    fn test_no_candidates() {
        assert!(matches!(
            ModelSelector::new(small_config()).select(&dataset(30), &[]),
            Err(SelectionError::NoCandidates)
        ));
    }

    #[test]
    fn test_invalid_config() {
        let config = SelectionConfig {
            test_fraction: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            ModelSelector::new(config).select(&dataset(30), &default_candidates()),
            Err(SelectionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_winner_has_highest_cv_accuracy() {
        let selection = ModelSelector::new(small_config())
            .select(&dataset(60), &default_candidates())
            .unwrap();

        assert_eq!(selection.split_sizes, (48, 12));
        assert_eq!(selection.leaderboard.len(), 3);
        let top = selection
            .leaderboard
            .iter()
            .map(|e| e.cv_accuracy)
            .fold(f64::MIN, f64::max);
        assert_eq!(selection.cv_accuracy(), top);

        // First candidate reaching the top score wins
        let first = selection
            .leaderboard
            .iter()
            .find(|e| e.cv_accuracy == top)
            .unwrap();
        assert_eq!(selection.name(), first.name);
        assert_eq!(selection.params(), first.params);
        assert!((0.0..=1.0).contains(&selection.test_accuracy));
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        let tree = ClassifierParams::DecisionTree(TreeParams::default());
        let candidates = vec![Candidate::new("first", vec![tree]), Candidate::new("second", vec![tree])];
        let selection = ModelSelector::new(small_config())
            .select(&dataset(40), &candidates)
            .unwrap();
        assert_eq!(selection.leaderboard[0].cv_accuracy, selection.leaderboard[1].cv_accuracy);
        assert_eq!(selection.name(), "first");
    }

    #[test]
    fn test_selection_is_reproducible() {
        let candidates = vec![
            Candidate::new(
                "KNN",
                vec![ClassifierParams::Knn(KnnParams::default())],
            ),
            Candidate::decision_tree(),
        ];
        let a = ModelSelector::new(small_config()).select(&dataset(50), &candidates).unwrap();
        let b = ModelSelector::new(small_config()).select(&dataset(50), &candidates).unwrap();
        assert_eq!(a.leaderboard, b.leaderboard);
        assert_eq!(a.artifact, b.artifact);
    }
}
