//! Cross-Validated Grid Search
//!
//! Every (grid point, fold) pair is an independent task on the selector's
//! thread pool. Results are collected in task order, so the reduction to a
//! best point does not depend on which task finished first.

use crate::error::SelectionError;
use crate::grid::Candidate;
use crate::metrics::accuracy;
use crate::pipeline::FittedPipeline;
use crate::split::Fold;
use classifiers::{ClassifierError, ClassifierParams};
use feature_engine::{FeatureRow, Preprocessor};
use ndarray::Array2;
use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, info, warn};

/// Encoded matrices of one fold; the transformer sees only the fold's
/// training part
struct FoldData {
    x_train: Array2<f64>,
    y_train: Vec<u8>,
    x_test: Array2<f64>,
    y_test: Vec<u8>,
}

impl FoldData {
    fn prepare(rows: &[FeatureRow], labels: &[u8], fold: &Fold) -> Result<Self, SelectionError> {
        let pick_rows = |idx: &[usize]| idx.iter().map(|&i| rows[i]).collect::<Vec<_>>();
        let pick_labels = |idx: &[usize]| idx.iter().map(|&i| labels[i]).collect::<Vec<_>>();

        let train_rows = pick_rows(&fold.train);
        let preprocessor = Preprocessor::fit(&train_rows)?;
        Ok(Self {
            x_train: preprocessor.transform(&train_rows),
            y_train: pick_labels(&fold.train),
            x_test: preprocessor.transform(&pick_rows(&fold.test)),
            y_test: pick_labels(&fold.test),
        })
    }

    fn score(&self, params: &ClassifierParams) -> Result<f64, ClassifierError> {
        let model = params.fit(self.x_train.view(), &self.y_train)?;
        let predicted = model.predict(self.x_test.view())?;
        Ok(accuracy(&self.y_test, &predicted))
    }
}

/// Mean cross-validated accuracy of one grid point
#[derive(Debug, Clone, PartialEq)]
pub struct GridPointScore {
    pub params: ClassifierParams,
    /// `None` when the point failed to fit on some fold
    pub mean_accuracy: Option<f64>,
}

/// Best grid point of one candidate, refitted on the whole training split
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub name: String,
    pub best_index: usize,
    pub best_params: ClassifierParams,
    pub cv_accuracy: f64,
    pub scores: Vec<GridPointScore>,
    pub pipeline: FittedPipeline,
}

/// Grid search over a fixed training split and fold layout
pub struct GridSearch<'a> {
    pool: &'a ThreadPool,
    rows: &'a [FeatureRow],
    labels: &'a [u8],
    folds: Vec<FoldData>,
}

impl<'a> GridSearch<'a> {
    /// Encode every fold once; the encoding does not depend on the grid point
    pub fn new(
        pool: &'a ThreadPool,
        rows: &'a [FeatureRow],
        labels: &'a [u8],
        folds: &[Fold],
    ) -> Result<Self, SelectionError> {
        let folds = folds
            .iter()
            .map(|fold| FoldData::prepare(rows, labels, fold))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            pool,
            rows,
            labels,
            folds,
        })
    }

    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }

    /// Score every grid point of `candidate` and refit the best one
    pub fn run(&self, candidate: &Candidate) -> Result<SearchOutcome, SelectionError> {
        let grid = candidate.grid();
        let k = self.folds.len();
        if grid.is_empty() || k == 0 {
            return Err(SelectionError::NoViableGridPoint {
                candidate: candidate.name().to_string(),
            });
        }

        let tasks: Vec<(usize, usize)> = (0..grid.len())
            .flat_map(|point| (0..k).map(move |fold| (point, fold)))
            .collect();
        debug!(
            "Searching {}: {} grid points x {} folds on {} threads",
            candidate.name(),
            grid.len(),
            k,
            self.pool.current_num_threads()
        );

        let results: Vec<Result<f64, ClassifierError>> = self.pool.install(|| {
            tasks
                .par_iter()
                .map(|&(point, fold)| self.folds[fold].score(&grid[point]))
                .collect()
        });

        let mut scores = Vec::with_capacity(grid.len());
        let mut best: Option<(usize, f64)> = None;
        for (index, (params, fold_results)) in grid.iter().zip(results.chunks(k)).enumerate() {
            let mean_accuracy = match fold_results.iter().cloned().collect::<Result<Vec<f64>, _>>() {
                Ok(accuracies) => Some(accuracies.iter().sum::<f64>() / k as f64),
                Err(err) => {
                    warn!("{} grid point [{}] excluded: {}", candidate.name(), params, err);
                    None
                }
            };
            if let Some(score) = mean_accuracy {
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((index, score));
                }
            }
            scores.push(GridPointScore {
                params: *params,
                mean_accuracy,
            });
        }

        let Some((best_index, cv_accuracy)) = best else {
            return Err(SelectionError::NoViableGridPoint {
                candidate: candidate.name().to_string(),
            });
        };

        let best_params = grid[best_index];
        let pipeline = FittedPipeline::fit(&best_params, self.rows, self.labels)?;
        info!(
            "{} best CV accuracy {:.4} with [{}]",
            candidate.name(),
            cv_accuracy,
            best_params
        );

        Ok(SearchOutcome {
            name: candidate.name().to_string(),
            best_index,
            best_params,
            cv_accuracy,
            scores,
            pipeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::StratifiedKFold;
    use classifiers::{KnnParams, TreeParams};
    use rayon::ThreadPoolBuilder;

    fn training_set() -> (Vec<FeatureRow>, Vec<u8>) {
        let rows = (0..40)
            .map(|i| {
                let high = i % 2 == 1;
                let age = if high { 60.0 } else { 40.0 } + (i % 5) as f64;
                FeatureRow::from_array([age, 1.0, (i % 4) as f64, 130.0, 230.0, 0.0, 1.0, 150.0, 0.0, 0.0])
            })
            .collect();
        let labels = (0..40).map(|i| (i % 2) as u8).collect();
        (rows, labels)
    }

    fn pool(threads: usize) -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(threads).build().unwrap()
    }

    #[test]
    fn test_separable_data_scores_perfectly() {
        let (rows, labels) = training_set();
        let folds = StratifiedKFold::new(5).split(&labels);
        let pool = pool(2);
        let search = GridSearch::new(&pool, &rows, &labels, &folds).unwrap();
        assert_eq!(search.n_folds(), 5);

        let outcome = search.run(&Candidate::decision_tree()).unwrap();
        assert_eq!(outcome.best_index, 0);
        assert_eq!(outcome.cv_accuracy, 1.0);
        assert_eq!(outcome.scores.len(), 45);
        assert_eq!(outcome.pipeline.predict_batch(&rows).unwrap(), labels);
    }

    #[test]
    fn test_failed_points_are_excluded() {
        let (rows, labels) = training_set();
        let folds = StratifiedKFold::new(5).split(&labels);
        let pool = pool(1);
        let search = GridSearch::new(&pool, &rows, &labels, &folds).unwrap();

        // 32 training rows per fold cannot supply 40 neighbors
        let too_many = ClassifierParams::Knn(KnnParams {
            n_neighbors: 40,
            ..Default::default()
        });
        let fine = ClassifierParams::Knn(KnnParams {
            n_neighbors: 3,
            ..Default::default()
        });
        let outcome = search
            .run(&Candidate::new("KNN", vec![too_many, fine]))
            .unwrap();
        assert_eq!(outcome.scores[0].mean_accuracy, None);
        assert_eq!(outcome.best_index, 1);
        assert_eq!(outcome.best_params, fine);

        let hopeless = Candidate::new("KNN", vec![too_many]);
        assert!(matches!(
            search.run(&hopeless),
            Err(SelectionError::NoViableGridPoint { .. })
        ));
    }

    #[test]
    fn test_result_independent_of_thread_count() {
        let (rows, labels) = training_set();
        let folds = StratifiedKFold::new(4).split(&labels);
        let candidate = Candidate::new(
            "DT",
            vec![
                ClassifierParams::DecisionTree(TreeParams {
                    max_depth: Some(1),
                    ..Default::default()
                }),
                ClassifierParams::DecisionTree(TreeParams::default()),
            ],
        );

        let single = pool(1);
        let many = pool(4);
        let a = GridSearch::new(&single, &rows, &labels, &folds).unwrap().run(&candidate).unwrap();
        let b = GridSearch::new(&many, &rows, &labels, &folds).unwrap().run(&candidate).unwrap();
        assert_eq!(a.scores, b.scores);
        assert_eq!(a.best_index, b.best_index);
        assert_eq!(a.pipeline, b.pipeline);
    }
}
