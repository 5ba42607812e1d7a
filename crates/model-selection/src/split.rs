//! Resampling
//!
//! Seeded hold-out split and stratified k-fold partitioning. Both work on
//! indices so the callers decide how rows are materialized.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Rows held out for testing: `ceil(n · fraction)`, capped at `n`
pub fn test_size(n_samples: usize, test_fraction: f64) -> usize {
    ((n_samples as f64 * test_fraction).ceil() as usize).min(n_samples)
}

/// Shuffle `0..n_samples` with a seeded RNG and cut it into (train, test)
pub fn train_test_split(n_samples: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(test_size(n_samples, test_fraction));
    (train, indices)
}

/// One cross-validation fold, as indices into the split it was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified k-fold splitter without shuffling
#[derive(Debug, Clone, Copy)]
pub struct StratifiedKFold {
    n_splits: usize,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits: n_splits.max(2),
        }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Assign every sample to one test fold, keeping class proportions per
    /// fold within one sample of each other
    pub fn split(&self, labels: &[u8]) -> Vec<Fold> {
        let k = self.n_splits;

        // Deal the label-sorted sequence round-robin to get per-fold class quotas
        let mut sorted = labels.to_vec();
        sorted.sort_unstable();
        let mut quota = vec![[0usize; 2]; k];
        for (pos, &label) in sorted.iter().enumerate() {
            quota[pos % k][label as usize] += 1;
        }

        // Within each class, fill folds in order following the quotas
        let mut assignment = vec![0usize; labels.len()];
        for class in 0..2u8 {
            let mut folds = quota
                .iter()
                .enumerate()
                .flat_map(|(fold, q)| std::iter::repeat(fold).take(q[class as usize]));
            for (i, &label) in labels.iter().enumerate() {
                if label == class {
                    if let Some(fold) = folds.next() {
                        assignment[i] = fold;
                    }
                }
            }
        }

        (0..k)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..labels.len()).partition(|&i| assignment[i] == fold);
                Fold { train, test }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_train_test_split_sizes() {
        let (train, test) = train_test_split(303, 0.2, 42);
        assert_eq!(test.len(), 61);
        assert_eq!(train.len(), 242);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..303).collect::<Vec<_>>());
    }

    #[test]
    fn test_train_test_split_is_seeded() {
        assert_eq!(train_test_split(50, 0.2, 42), train_test_split(50, 0.2, 42));
        assert_ne!(train_test_split(50, 0.2, 42), train_test_split(50, 0.2, 7));
    }

    #[test]
    fn test_stratified_quotas() {
        let labels = [0, 1, 0, 0, 1, 0, 1, 0, 1, 0];
        let folds = StratifiedKFold::new(5).split(&labels);
        assert_eq!(folds.len(), 5);

        let positives: Vec<usize> = folds
            .iter()
            .map(|f| f.test.iter().filter(|&&i| labels[i] == 1).count())
            .collect();
        assert_eq!(positives, vec![0, 1, 1, 1, 1]);
        assert!(folds.iter().all(|f| f.test.len() == 2));
    }

    proptest! {
        #[test]
        fn prop_folds_partition_samples(
            labels in proptest::collection::vec(0u8..2, 2..80),
            k in 2usize..8,
        ) {
            let folds = StratifiedKFold::new(k).split(&labels);
            prop_assert_eq!(folds.len(), k);

            let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test.iter().copied()).collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..labels.len()).collect::<Vec<_>>());

            for fold in &folds {
                prop_assert_eq!(fold.train.len() + fold.test.len(), labels.len());
                prop_assert!(fold.train.iter().all(|i| !fold.test.contains(i)));
            }

            let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
            let spread = sizes.iter().max().unwrap() - sizes.iter().min().unwrap();
            prop_assert!(spread <= 1);
        }
    }
}
