//! CART Decision Tree
//!
//! Binary splits chosen by Gini impurity decrease. Features are scanned in
//! column order and thresholds in ascending order; only a strictly better
//! split replaces the current best, so fitting is deterministic.

use crate::error::ClassifierError;
use crate::{check_training_set, Classifier};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Decision tree hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth; `None` grows until leaves are pure or too small
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may split
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        counts: [usize; 2],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Fitted decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    params: TreeParams,
    dim: usize,
    nodes: Vec<TreeNode>,
}

fn gini(counts: [usize; 2]) -> f64 {
    let total = (counts[0] + counts[1]) as f64;
    if total == 0.0 {
        return 0.0;
    }
    let p0 = counts[0] as f64 / total;
    let p1 = counts[1] as f64 / total;
    1.0 - p0 * p0 - p1 * p1
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl DecisionTree {
    pub fn fit(params: TreeParams, x: ArrayView2<f64>, y: &[u8]) -> Result<Self, ClassifierError> {
        check_training_set(x, y)?;
        if params.min_samples_split < 2 {
            return Err(ClassifierError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if params.min_samples_leaf < 1 {
            return Err(ClassifierError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }

        let mut tree = Self {
            params,
            dim: x.ncols(),
            nodes: Vec::new(),
        };
        tree.grow(x, y, (0..x.nrows()).collect(), 0);
        debug!(
            "Fitted decision tree with {} nodes, depth {}",
            tree.nodes.len(),
            tree.depth()
        );
        Ok(tree)
    }

    fn grow(&mut self, x: ArrayView2<f64>, y: &[u8], indices: Vec<usize>, depth: usize) -> usize {
        let mut counts = [0usize; 2];
        for &i in &indices {
            counts[y[i] as usize] += 1;
        }

        let id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { counts });

        let n = indices.len();
        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        if depth_reached
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
            || counts[0] == 0
            || counts[1] == 0
        {
            return id;
        }

        let Some(split) = self.best_split(x, y, &indices, counts) else {
            return id;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[[i, split.feature]] <= split.threshold);
        let left = self.grow(x, y, left_idx, depth + 1);
        let right = self.grow(x, y, right_idx, depth + 1);
        self.nodes[id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn best_split(
        &self,
        x: ArrayView2<f64>,
        y: &[u8],
        indices: &[usize],
        counts: [usize; 2],
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let parent = gini(counts);
        let min_leaf = self.params.min_samples_leaf;
        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for feature in 0..x.ncols() {
            sorted.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]).then(a.cmp(&b)));

            let mut left = [0usize; 2];
            for pos in 1..n {
                left[y[sorted[pos - 1]] as usize] += 1;
                if pos < min_leaf || n - pos < min_leaf {
                    continue;
                }
                let lo = x[[sorted[pos - 1], feature]];
                let hi = x[[sorted[pos], feature]];
                if hi <= lo {
                    continue;
                }

                let right = [counts[0] - left[0], counts[1] - left[1]];
                let weighted =
                    (pos as f64 * gini(left) + (n - pos) as f64 * gini(right)) / n as f64;
                let gain = parent - weighted;
                if best.as_ref().map_or(true, |b| gain > b.gain) {
                    let mut threshold = (lo + hi) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }
        best
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// Number of nodes, leaves included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], node: usize) -> usize {
            match nodes[node] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    fn leaf_counts(&self, x: ArrayView1<f64>) -> [usize; 2] {
        let mut node = 0;
        loop {
            match self.nodes[node] {
                TreeNode::Leaf { counts } => return counts,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    /// Majority class of the leaf `x` falls into
    pub fn decide(&self, x: &[f64]) -> u8 {
        leaf_class(self.leaf_counts(ArrayView1::from(x)))
    }

    /// Class-1 frequency of the leaf `x` falls into
    pub fn probability(&self, x: &[f64]) -> f64 {
        leaf_probability(self.leaf_counts(ArrayView1::from(x)))
    }
}

fn leaf_class(counts: [usize; 2]) -> u8 {
    u8::from(counts[1] > counts[0])
}

fn leaf_probability(counts: [usize; 2]) -> f64 {
    let total = counts[0] + counts[1];
    if total == 0 {
        0.0
    } else {
        counts[1] as f64 / total as f64
    }
}

impl Classifier for DecisionTree {
    fn n_features(&self) -> usize {
        self.dim
    }

    fn decide_rows(&self, x: ArrayView2<f64>) -> Result<Vec<u8>, ClassifierError> {
        Ok(x.rows().into_iter().map(|row| leaf_class(self.leaf_counts(row))).collect())
    }

    fn probability_rows(&self, x: ArrayView2<f64>) -> Result<Vec<f64>, ClassifierError> {
        Ok(x
            .rows()
            .into_iter()
            .map(|row| leaf_probability(self.leaf_counts(row)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn staircase() -> (Array2<f64>, Vec<u8>) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| if j == 0 { i as f64 } else { (i % 4) as f64 });
        let y = (0..40).map(|i| ((i / 10) % 2) as u8).collect();
        (x, y)
    }

    #[test]
    fn test_unbounded_tree_fits_training_set() {
        let (x, y) = staircase();
        let tree = DecisionTree::fit(TreeParams::default(), x.view(), &y).unwrap();
        for (row, &label) in x.rows().into_iter().zip(&y) {
            assert_eq!(tree.decide(row.as_slice().unwrap()), label);
        }
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let (x, y) = staircase();
        let params = TreeParams {
            max_depth: Some(1),
            ..Default::default()
        };
        let tree = DecisionTree::fit(params, x.view(), &y).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_min_samples_leaf() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = [1, 0, 0, 0, 0, 0];
        let strict = TreeParams {
            min_samples_leaf: 2,
            ..Default::default()
        };
        let tree = DecisionTree::fit(strict, x.view(), &y).unwrap();
        // The lone positive can never be isolated
        assert_eq!(tree.decide(&[0.0]), 0);
        assert!((tree.probability(&[0.0]) - 0.5).abs() < 1e-12);

        let loose = DecisionTree::fit(TreeParams::default(), x.view(), &y).unwrap();
        assert_eq!(loose.decide(&[0.0]), 1);
        assert_eq!(loose.decide(&[0.4]), 1);
        assert_eq!(loose.decide(&[0.6]), 0);
    }

    #[test]
    fn test_min_samples_split() {
        let x = array![[0.0], [1.0], [2.0]];
        let params = TreeParams {
            min_samples_split: 5,
            ..Default::default()
        };
        let tree = DecisionTree::fit(params, x.view(), &[0, 1, 1]).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.decide(&[0.0]), 1);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = staircase();
        let a = DecisionTree::fit(TreeParams::default(), x.view(), &y).unwrap();
        let b = DecisionTree::fit(TreeParams::default(), x.view(), &y).unwrap();
        assert_eq!(a, b);
    }
}
