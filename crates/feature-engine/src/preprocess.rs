//! Preprocessing Transformer
//!
//! Turns feature rows into the dense numeric matrix consumed by every
//! classifier: standardized numeric columns first (schema order), then one
//! one-hot block per categorical field over its declared domain with the
//! first category dropped.

use crate::error::FeatureError;
use crate::schema::{FeatureRow, FieldKind, ENCODED_DIMENSION, FEATURE_SCHEMA};
use crate::statistics::ColumnStats;
use ndarray::{Array1, Array2, ArrayViewMut1};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fitted standardization for one numeric field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    /// Index of the field in the schema
    pub field: usize,
    /// Training mean
    pub mean: f64,
    /// Training standard deviation (1 for a constant column)
    pub scale: f64,
}

impl Standardizer {
    #[inline]
    fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// Fitted preprocessing state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    scalers: Vec<Standardizer>,
}

impl Preprocessor {
    /// Fit standardization statistics on the given rows
    pub fn fit(rows: &[FeatureRow]) -> Result<Self, FeatureError> {
        if rows.is_empty() {
            return Err(FeatureError::EmptyInput);
        }

        let mut scalers = Vec::new();
        for (field, spec) in FEATURE_SCHEMA.iter().enumerate() {
            if spec.is_categorical() {
                continue;
            }
            let column: Vec<f64> = rows.iter().map(|r| r.values()[field].as_f64()).collect();
            let stats = ColumnStats::compute(&column);
            debug!(
                "Fitted {}: mean={:.3}, std_dev={:.3} over {} rows",
                spec.name, stats.mean, stats.std_dev, stats.count
            );
            scalers.push(Standardizer {
                field,
                mean: stats.mean,
                scale: stats.scale(),
            });
        }

        Ok(Self { scalers })
    }

    /// Fitted numeric standardizers, in schema order
    pub fn scalers(&self) -> &[Standardizer] {
        &self.scalers
    }

    /// Width of every encoded vector
    pub fn output_dimension(&self) -> usize {
        ENCODED_DIMENSION
    }

    /// Encode a single row
    pub fn transform_row(&self, row: &FeatureRow) -> Array1<f64> {
        let mut out = Array1::zeros(ENCODED_DIMENSION);
        self.encode_into(row, out.view_mut());
        out
    }

    /// Encode a batch of rows into an `n x ENCODED_DIMENSION` matrix
    pub fn transform(&self, rows: &[FeatureRow]) -> Array2<f64> {
        let mut out = Array2::zeros((rows.len(), ENCODED_DIMENSION));
        for (row, target) in rows.iter().zip(out.rows_mut()) {
            self.encode_into(row, target);
        }
        out
    }

    fn encode_into(&self, row: &FeatureRow, mut out: ArrayViewMut1<f64>) {
        let values = row.values();
        let mut idx = 0;

        for scaler in &self.scalers {
            out[idx] = scaler.apply(values[scaler.field].as_f64());
            idx += 1;
        }

        for (spec, value) in FEATURE_SCHEMA.iter().zip(values) {
            let FieldKind::Categorical { domain } = spec.kind else {
                continue;
            };
            let code = value.as_code();
            // Reference category and unknown codes leave the block all-zero
            if let Some(pos) = domain.iter().position(|&d| d == code) {
                if pos > 0 {
                    out[idx + pos - 1] = 1.0;
                }
            }
            idx += spec.encoded_width();
        }
    }

    /// Names of the encoded columns, in output order
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .scalers
            .iter()
            .map(|s| FEATURE_SCHEMA[s.field].name.to_string())
            .collect();
        for spec in FEATURE_SCHEMA.iter() {
            if let FieldKind::Categorical { domain } = spec.kind {
                names.extend(domain.iter().skip(1).map(|c| format!("{}={}", spec.name, c)));
            }
        }
        names
    }
}
