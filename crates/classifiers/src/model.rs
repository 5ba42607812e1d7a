//! Classifier Families
//!
//! Tagged hyperparameter sets and fitted models for the three families, so a
//! search can enumerate parameters uniformly and a fitted model can be
//! serialized without trait objects.

use crate::error::ClassifierError;
use crate::knn::{KnnClassifier, KnnParams};
use crate::svm::{SvmClassifier, SvmParams};
use crate::tree::{DecisionTree, TreeParams};
use crate::Classifier;
use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classifier family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    /// Distance-based
    Knn,
    /// Margin-based
    Svm,
    /// Tree-based
    DecisionTree,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Knn => "KNN",
            Family::Svm => "SVM",
            Family::DecisionTree => "DT",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point of a hyperparameter grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClassifierParams {
    Knn(KnnParams),
    Svm(SvmParams),
    DecisionTree(TreeParams),
}

impl ClassifierParams {
    pub fn family(&self) -> Family {
        match self {
            ClassifierParams::Knn(_) => Family::Knn,
            ClassifierParams::Svm(_) => Family::Svm,
            ClassifierParams::DecisionTree(_) => Family::DecisionTree,
        }
    }

    /// Fit a classifier of this family on an encoded matrix
    pub fn fit(&self, x: ArrayView2<f64>, y: &[u8]) -> Result<FittedClassifier, ClassifierError> {
        Ok(match *self {
            ClassifierParams::Knn(p) => FittedClassifier::Knn(KnnClassifier::fit(p, x, y)?),
            ClassifierParams::Svm(p) => FittedClassifier::Svm(SvmClassifier::fit(p, x, y)?),
            ClassifierParams::DecisionTree(p) => {
                FittedClassifier::DecisionTree(DecisionTree::fit(p, x, y)?)
            }
        })
    }
}

impl fmt::Display for ClassifierParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierParams::Knn(p) => write!(
                f,
                "algorithm={}, n_neighbors={}, p={}, weights={}",
                p.algorithm.as_str(),
                p.n_neighbors,
                p.p,
                p.weights.as_str()
            ),
            ClassifierParams::Svm(p) => write!(
                f,
                "C={}, gamma={}, kernel={}",
                p.c,
                p.gamma.as_str(),
                p.kernel.as_str()
            ),
            ClassifierParams::DecisionTree(p) => {
                match p.max_depth {
                    Some(depth) => write!(f, "max_depth={}", depth)?,
                    None => f.write_str("max_depth=None")?,
                }
                write!(
                    f,
                    ", min_samples_leaf={}, min_samples_split={}",
                    p.min_samples_leaf, p.min_samples_split
                )
            }
        }
    }
}

/// A fitted classifier of any family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedClassifier {
    Knn(KnnClassifier),
    Svm(SvmClassifier),
    DecisionTree(DecisionTree),
}

impl FittedClassifier {
    fn inner(&self) -> &dyn Classifier {
        match self {
            FittedClassifier::Knn(m) => m,
            FittedClassifier::Svm(m) => m,
            FittedClassifier::DecisionTree(m) => m,
        }
    }

    /// Hyperparameters the model was fitted with
    pub fn params(&self) -> ClassifierParams {
        match self {
            FittedClassifier::Knn(m) => ClassifierParams::Knn(*m.params()),
            FittedClassifier::Svm(m) => ClassifierParams::Svm(*m.params()),
            FittedClassifier::DecisionTree(m) => ClassifierParams::DecisionTree(*m.params()),
        }
    }

    pub fn family(&self) -> Family {
        self.params().family()
    }

    /// Width of the vectors the model expects
    pub fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn check_width(&self, actual: usize) -> Result<(), ClassifierError> {
        if actual != self.n_features() {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.n_features(),
                actual,
            });
        }
        Ok(())
    }

    /// Predicted label for one encoded vector
    pub fn predict_one(&self, x: ArrayView1<f64>) -> Result<u8, ClassifierError> {
        single(self.predict(x.insert_axis(Axis(0)))?)
    }

    /// Probability of class 1 for one encoded vector
    pub fn predict_proba_one(&self, x: ArrayView1<f64>) -> Result<f64, ClassifierError> {
        single(self.predict_proba(x.insert_axis(Axis(0)))?)
    }

    /// Predicted labels for every row of an encoded matrix
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<u8>, ClassifierError> {
        self.check_width(x.ncols())?;
        self.inner().decide_rows(x)
    }

    /// Probability of class 1 for every row of an encoded matrix
    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Result<Vec<f64>, ClassifierError> {
        self.check_width(x.ncols())?;
        self.inner().probability_rows(x)
    }
}

fn single<T>(mut values: Vec<T>) -> Result<T, ClassifierError> {
    match (values.pop(), values.len()) {
        (Some(value), 0) => Ok(value),
        (_, rest) => Err(ClassifierError::DimensionMismatch {
            expected: 1,
            actual: rest + 1,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knn::Weighting;
    use crate::neighbors::SearchAlgorithm;
    use crate::svm::{GammaPolicy, Kernel};
    use ndarray::{array, Array1};

    #[test]
    fn test_display_lists_params() {
        let knn = ClassifierParams::Knn(KnnParams {
            n_neighbors: 7,
            weights: Weighting::Distance,
            algorithm: SearchAlgorithm::KdTree,
            p: 1,
        });
        assert_eq!(knn.to_string(), "algorithm=kd_tree, n_neighbors=7, p=1, weights=distance");

        let svm = ClassifierParams::Svm(SvmParams {
            c: 10.0,
            kernel: Kernel::Linear,
            gamma: GammaPolicy::Auto,
            ..Default::default()
        });
        assert_eq!(svm.to_string(), "C=10, gamma=auto, kernel=linear");

        let tree = ClassifierParams::DecisionTree(TreeParams::default());
        assert_eq!(tree.to_string(), "max_depth=None, min_samples_leaf=1, min_samples_split=2");
    }

    #[test]
    fn test_fit_dispatches_and_checks_dimension() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [4.0, 4.0], [4.0, 5.0]];
        let y = [0, 0, 1, 1];
        for params in [
            ClassifierParams::Knn(KnnParams {
                n_neighbors: 1,
                ..Default::default()
            }),
            ClassifierParams::Svm(SvmParams::default()),
            ClassifierParams::DecisionTree(TreeParams::default()),
        ] {
            let model = params.fit(x.view(), &y).unwrap();
            assert_eq!(model.params(), params);
            assert_eq!(model.n_features(), 2);
            assert_eq!(model.predict(x.view()).unwrap(), vec![0, 0, 1, 1]);

            let wrong = Array1::zeros(3);
            assert!(matches!(
                model.predict_one(wrong.view()),
                Err(ClassifierError::DimensionMismatch { expected: 2, actual: 3 })
            ));
        }
    }

    #[test]
    fn test_single_row_views() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [4.0, 4.0], [4.0, 5.0]];
        let y = [0, 0, 1, 1];
        let model = ClassifierParams::DecisionTree(TreeParams::default())
            .fit(x.view(), &y)
            .unwrap();

        // A borrowed row of a larger matrix and a strided column view
        assert_eq!(model.predict_one(x.row(2)).unwrap(), 1);
        let transposed = x.t().to_owned();
        assert_eq!(model.predict_one(transposed.column(1)).unwrap(), 0);

        let proba = model.predict_proba_one(x.row(3)).unwrap();
        assert_eq!(proba, 1.0);
        assert_eq!(model.predict_proba(x.view()).unwrap(), vec![0.0, 0.0, 1.0, 1.0]);
    }
}
