//! k-Nearest-Neighbors Classifier

use crate::error::ClassifierError;
use crate::neighbors::{Neighbor, NeighborSearch, SearchAlgorithm};
use crate::{check_training_set, Classifier};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How neighbor votes are weighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weighting {
    /// Every neighbor counts once
    Uniform,
    /// Neighbors count by inverse distance
    Distance,
}

impl Weighting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weighting::Uniform => "uniform",
            Weighting::Distance => "distance",
        }
    }
}

/// KNN hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KnnParams {
    /// Number of neighbors that vote
    pub n_neighbors: usize,
    /// Vote weighting
    pub weights: Weighting,
    /// Neighbor-search strategy
    pub algorithm: SearchAlgorithm,
    /// Minkowski exponent
    pub p: u32,
}

impl Default for KnnParams {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            weights: Weighting::Uniform,
            algorithm: SearchAlgorithm::Auto,
            p: 2,
        }
    }
}

/// Fitted KNN model; keeps the training set it votes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnClassifier {
    params: KnnParams,
    dim: usize,
    /// Training rows, row-major
    data: Vec<f64>,
    labels: Vec<u8>,
}

impl KnnClassifier {
    /// Store the training set the neighbors are drawn from
    pub fn fit(params: KnnParams, x: ArrayView2<f64>, y: &[u8]) -> Result<Self, ClassifierError> {
        check_training_set(x, y)?;
        if params.n_neighbors == 0 {
            return Err(ClassifierError::InvalidParameter(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        if params.n_neighbors > x.nrows() {
            return Err(ClassifierError::InvalidParameter(format!(
                "n_neighbors={} exceeds {} training samples",
                params.n_neighbors,
                x.nrows()
            )));
        }
        if params.p == 0 {
            return Err(ClassifierError::InvalidParameter(
                "Minkowski exponent p must be at least 1".to_string(),
            ));
        }
        if x.ncols() == 0 {
            return Err(ClassifierError::InvalidParameter(
                "training rows have no features".to_string(),
            ));
        }

        debug!("Fitted KNN on {} samples with {:?}", x.nrows(), params);
        Ok(Self {
            params,
            dim: x.ncols(),
            data: x.iter().copied().collect(),
            labels: y.to_vec(),
        })
    }

    pub fn params(&self) -> &KnnParams {
        &self.params
    }

    /// Neighbors of each query row among the training set
    pub fn kneighbors(&self, x: ArrayView2<f64>) -> Result<Vec<Vec<Neighbor>>, ClassifierError> {
        let points = ArrayView2::from_shape((self.labels.len(), self.dim), &self.data)
            .map_err(|e| ClassifierError::NeighborSearch(e.to_string()))?;
        NeighborSearch::new(self.params.algorithm, self.params.n_neighbors, self.params.p)
            .query(points, x)
    }

    /// Weighted class votes for each query row
    fn votes(&self, x: ArrayView2<f64>) -> Result<Vec<[f64; 2]>, ClassifierError> {
        Ok(self
            .kneighbors(x)?
            .iter()
            .map(|neighbors| self.tally(neighbors))
            .collect())
    }

    fn tally(&self, neighbors: &[Neighbor]) -> [f64; 2] {
        let mut votes = [0.0; 2];
        match self.params.weights {
            Weighting::Uniform => {
                for n in neighbors {
                    votes[self.labels[n.index] as usize] += 1.0;
                }
            }
            Weighting::Distance => {
                // Exact matches take the whole vote
                let exact: Vec<_> = neighbors.iter().filter(|n| n.distance == 0.0).collect();
                if exact.is_empty() {
                    for n in neighbors {
                        votes[self.labels[n.index] as usize] += 1.0 / n.distance;
                    }
                } else {
                    for n in exact {
                        votes[self.labels[n.index] as usize] += 1.0;
                    }
                }
            }
        }
        votes
    }
}

impl Classifier for KnnClassifier {
    fn n_features(&self) -> usize {
        self.dim
    }

    fn decide_rows(&self, x: ArrayView2<f64>) -> Result<Vec<u8>, ClassifierError> {
        Ok(self
            .votes(x)?
            .into_iter()
            .map(|votes| u8::from(votes[1] > votes[0]))
            .collect())
    }

    fn probability_rows(&self, x: ArrayView2<f64>) -> Result<Vec<f64>, ClassifierError> {
        Ok(self
            .votes(x)?
            .into_iter()
            .map(|votes| {
                let total = votes[0] + votes[1];
                if total > 0.0 {
                    votes[1] / total
                } else {
                    0.0
                }
            })
            .collect())
    }
}
