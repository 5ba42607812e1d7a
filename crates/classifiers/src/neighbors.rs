//! Exact Nearest-Neighbor Search
//!
//! Queries run on `linfa-nn` indexes. Backends may break distance ties in
//! any order, so each query is widened to every point within the k-th
//! distance and re-ranked by (distance, training index). All strategies
//! therefore return identical neighbors.

use crate::error::ClassifierError;
use linfa_nn::distance::{Distance, L1Dist, L2Dist, LpDist};
use linfa_nn::{CommonNearestNeighbour, NearestNeighbour, NearestNeighbourIndex};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Relative widening of the tie radius so rounding never drops a tied point
const RANGE_SLACK: f64 = 1e-9;

/// Neighbor-search strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchAlgorithm {
    /// Brute force when k covers half the training set, k-d tree otherwise
    Auto,
    BallTree,
    KdTree,
    Brute,
}

impl SearchAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchAlgorithm::Auto => "auto",
            SearchAlgorithm::BallTree => "ball_tree",
            SearchAlgorithm::KdTree => "kd_tree",
            SearchAlgorithm::Brute => "brute",
        }
    }

    /// Index backend for `k` neighbors out of `n_points`
    pub fn resolve(&self, k: usize, n_points: usize) -> CommonNearestNeighbour {
        match self {
            SearchAlgorithm::Auto if k * 2 >= n_points => CommonNearestNeighbour::LinearSearch,
            SearchAlgorithm::Auto | SearchAlgorithm::KdTree => CommonNearestNeighbour::KdTree,
            SearchAlgorithm::BallTree => CommonNearestNeighbour::BallTree,
            SearchAlgorithm::Brute => CommonNearestNeighbour::LinearSearch,
        }
    }
}

/// A neighbor returned by a search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the training point
    pub index: usize,
    /// Minkowski distance to the query
    pub distance: f64,
}

fn search_error(e: impl std::fmt::Display) -> ClassifierError {
    ClassifierError::NeighborSearch(e.to_string())
}

/// k-nearest-neighbor query under a Minkowski metric of exponent `p`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborSearch {
    algorithm: SearchAlgorithm,
    k: usize,
    p: u32,
}

impl NeighborSearch {
    pub fn new(algorithm: SearchAlgorithm, k: usize, p: u32) -> Self {
        Self { algorithm, k, p }
    }

    /// Neighbors of every query row among `points`, nearest first
    pub fn query(
        &self,
        points: ArrayView2<f64>,
        queries: ArrayView2<f64>,
    ) -> Result<Vec<Vec<Neighbor>>, ClassifierError> {
        match self.p {
            1 => self.query_with(points, queries, L1Dist),
            2 => self.query_with(points, queries, L2Dist),
            p => self.query_with(points, queries, LpDist::new(p as f64)),
        }
    }

    fn query_with<D>(
        &self,
        points: ArrayView2<f64>,
        queries: ArrayView2<f64>,
        dist: D,
    ) -> Result<Vec<Vec<Neighbor>>, ClassifierError>
    where
        D: Distance<f64> + Clone + 'static,
    {
        let k = self.k.min(points.nrows());
        if k == 0 {
            return Ok(vec![Vec::new(); queries.nrows()]);
        }
        if queries.ncols() != points.ncols() {
            return Err(ClassifierError::DimensionMismatch {
                expected: points.ncols(),
                actual: queries.ncols(),
            });
        }

        let index = self
            .algorithm
            .resolve(k, points.nrows())
            .from_batch(&points, dist.clone())
            .map_err(search_error)?;

        queries
            .rows()
            .into_iter()
            .map(|query| {
                let nearest = index.k_nearest(query, k).map_err(search_error)?;
                let radius = nearest
                    .iter()
                    .map(|(point, _)| dist.distance(point.view(), query))
                    .fold(0.0, f64::max);

                // Every point tied with the k-th neighbor competes on index
                let range = radius * (1.0 + RANGE_SLACK) + RANGE_SLACK;
                let mut ranked: Vec<Neighbor> = index
                    .within_range(query, range)
                    .map_err(search_error)?
                    .into_iter()
                    .map(|(point, index)| Neighbor {
                        index,
                        distance: dist.distance(point, query),
                    })
                    .collect();
                ranked.sort_by(|a, b| {
                    a.distance
                        .total_cmp(&b.distance)
                        .then(a.index.cmp(&b.index))
                });
                ranked.truncate(k);
                Ok(ranked)
            })
            .collect()
    }
}
