//! Column Statistics Computation

use serde::{Deserialize, Serialize};

/// Summary statistics for one numeric column
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Mean value
    pub mean: f64,
    /// Population standard deviation (divisor n)
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Number of values summarized
    pub count: usize,
}

impl ColumnStats {
    /// Compute statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;

        let mean = values.iter().sum::<f64>() / n;

        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        let m2: f64 = values.iter().map(|&v| (v - mean) * (v - mean)).sum();
        let std_dev = (m2 / n).sqrt();

        Self {
            mean,
            std_dev,
            min,
            max,
            count: values.len(),
        }
    }

    /// Divisor used for standardization; a degenerate column scales by 1
    pub fn scale(&self) -> f64 {
        if self.std_dev > f64::EPSILON {
            self.std_dev
        } else {
            1.0
        }
    }
}
