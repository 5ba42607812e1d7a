//! Binary Classifiers
//!
//! k-nearest-neighbors, support vector, and CART decision tree classifiers
//! over dense encoded feature matrices. Labels are 0 and 1 throughout.

mod error;
mod knn;
mod model;
mod neighbors;
mod svm;
mod tree;

pub use error::ClassifierError;
pub use knn::{KnnClassifier, KnnParams, Weighting};
pub use model::{ClassifierParams, Family, FittedClassifier};
pub use neighbors::{Neighbor, NeighborSearch, SearchAlgorithm};
pub use svm::{GammaPolicy, Kernel, PlattScaler, SvmClassifier, SvmParams};
pub use tree::{DecisionTree, TreeParams};

use ndarray::ArrayView2;

/// A fitted model that labels rows of an encoded matrix
pub trait Classifier {
    /// Width of the vectors the model was fitted on
    fn n_features(&self) -> usize;

    /// Predicted label for each row; callers check the width first
    fn decide_rows(&self, x: ArrayView2<f64>) -> Result<Vec<u8>, ClassifierError>;

    /// Estimated probability of class 1 for each row
    fn probability_rows(&self, x: ArrayView2<f64>) -> Result<Vec<f64>, ClassifierError>;
}

pub(crate) fn check_training_set(x: ArrayView2<f64>, y: &[u8]) -> Result<(), ClassifierError> {
    if x.nrows() == 0 {
        return Err(ClassifierError::EmptyTrainingSet);
    }
    if y.len() != x.nrows() {
        return Err(ClassifierError::DimensionMismatch {
            expected: x.nrows(),
            actual: y.len(),
        });
    }
    if let Some(&bad) = y.iter().find(|&&l| l > 1) {
        return Err(ClassifierError::InvalidLabel(bad));
    }
    Ok(())
}
