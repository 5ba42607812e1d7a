//! Candidate Pipelines and Search Spaces
//!
//! Grids are enumerated with parameter names in alphabetical order, the first
//! name varying slowest. A grid's order is the tie-break inside a candidate.

use classifiers::{
    ClassifierParams, GammaPolicy, Kernel, KnnParams, SearchAlgorithm, SvmParams, TreeParams,
    Weighting,
};

const KNN_NEIGHBORS: [usize; 5] = [3, 5, 7, 9, 11];
const KNN_WEIGHTS: [Weighting; 2] = [Weighting::Uniform, Weighting::Distance];
const KNN_ALGORITHMS: [SearchAlgorithm; 3] = [
    SearchAlgorithm::Auto,
    SearchAlgorithm::BallTree,
    SearchAlgorithm::KdTree,
];
const KNN_P: [u32; 2] = [1, 2];

const SVM_C: [f64; 4] = [0.1, 1.0, 10.0, 100.0];
const SVM_KERNELS: [Kernel; 2] = [Kernel::Linear, Kernel::Rbf];
const SVM_GAMMAS: [GammaPolicy; 2] = [GammaPolicy::Scale, GammaPolicy::Auto];

const TREE_MAX_DEPTH: [Option<usize>; 5] = [Some(3), Some(5), Some(7), Some(10), None];
const TREE_MIN_SPLIT: [usize; 3] = [2, 5, 10];
const TREE_MIN_LEAF: [usize; 3] = [1, 2, 4];

/// A named pipeline family with the hyperparameter points to search
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    name: String,
    grid: Vec<ClassifierParams>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, grid: Vec<ClassifierParams>) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }

    /// Distance-based candidate: 60 points over
    /// algorithm, n_neighbors, p, weights
    pub fn knn() -> Self {
        let mut grid = Vec::with_capacity(60);
        for algorithm in KNN_ALGORITHMS {
            for n_neighbors in KNN_NEIGHBORS {
                for p in KNN_P {
                    for weights in KNN_WEIGHTS {
                        grid.push(ClassifierParams::Knn(KnnParams {
                            n_neighbors,
                            weights,
                            algorithm,
                            p,
                        }));
                    }
                }
            }
        }
        Self::new("KNN", grid)
    }

    /// Margin-based candidate: 16 points over C, gamma, kernel
    pub fn svm() -> Self {
        let mut grid = Vec::with_capacity(16);
        for c in SVM_C {
            for gamma in SVM_GAMMAS {
                for kernel in SVM_KERNELS {
                    grid.push(ClassifierParams::Svm(SvmParams {
                        c,
                        kernel,
                        gamma,
                        ..Default::default()
                    }));
                }
            }
        }
        Self::new("SVM", grid)
    }

    /// Tree-based candidate: 45 points over
    /// max_depth, min_samples_leaf, min_samples_split
    pub fn decision_tree() -> Self {
        let mut grid = Vec::with_capacity(45);
        for max_depth in TREE_MAX_DEPTH {
            for min_samples_leaf in TREE_MIN_LEAF {
                for min_samples_split in TREE_MIN_SPLIT {
                    grid.push(ClassifierParams::DecisionTree(TreeParams {
                        max_depth,
                        min_samples_split,
                        min_samples_leaf,
                    }));
                }
            }
        }
        Self::new("DT", grid)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &[ClassifierParams] {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

/// The three standard candidates in comparison order
pub fn default_candidates() -> Vec<Candidate> {
    vec![Candidate::knn(), Candidate::svm(), Candidate::decision_tree()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_sizes() {
        let sizes: Vec<(String, usize)> = default_candidates()
            .iter()
            .map(|c| (c.name().to_string(), c.len()))
            .collect();
        assert_eq!(
            sizes,
            vec![("KNN".into(), 60), ("SVM".into(), 16), ("DT".into(), 45)]
        );
    }

    #[test]
    fn test_grid_order() {
        let knn = Candidate::knn();
        assert_eq!(
            knn.grid()[0].to_string(),
            "algorithm=auto, n_neighbors=3, p=1, weights=uniform"
        );
        assert_eq!(
            knn.grid()[1].to_string(),
            "algorithm=auto, n_neighbors=3, p=1, weights=distance"
        );
        assert_eq!(
            knn.grid()[59].to_string(),
            "algorithm=kd_tree, n_neighbors=11, p=2, weights=distance"
        );

        let svm = Candidate::svm();
        assert_eq!(svm.grid()[0].to_string(), "C=0.1, gamma=scale, kernel=linear");
        assert_eq!(svm.grid()[15].to_string(), "C=100, gamma=auto, kernel=rbf");

        let tree = Candidate::decision_tree();
        assert_eq!(
            tree.grid()[1].to_string(),
            "max_depth=3, min_samples_leaf=1, min_samples_split=5"
        );
        assert_eq!(
            tree.grid()[44].to_string(),
            "max_depth=None, min_samples_leaf=4, min_samples_split=10"
        );
    }

    #[test]
    fn test_grids_have_no_duplicates() {
        for candidate in default_candidates() {
            let grid = candidate.grid();
            for (i, a) in grid.iter().enumerate() {
                assert!(grid[i + 1..].iter().all(|b| a != b), "{} repeats {}", candidate.name(), a);
            }
        }
    }
}
