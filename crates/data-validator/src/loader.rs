//! Tabular Dataset Loader
//!
//! Reads the raw CSV source, resolves every required column before touching
//! any row, and keeps only the schema fields plus the label. Excluded and
//! unknown columns are skipped.

use crate::dataset::{Label, TrainingDataset};
use crate::error::ValidationError;
use feature_engine::{
    FeatureRow, FieldKind, FieldValue, EXCLUDED_COLUMNS, FEATURE_COUNT, FEATURE_SCHEMA,
    LABEL_COLUMN,
};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Positions of the required columns inside a header record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    /// Raw column index of every schema field, in schema order
    pub features: [usize; FEATURE_COUNT],
    /// Raw column index of the label
    pub label: usize,
}

impl ColumnMap {
    /// Resolve required columns from a header, failing on the first missing one
    pub fn resolve<'a, I>(headers: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| *h == name)
                .ok_or_else(|| ValidationError::MissingColumn(name.to_string()))
        };

        let mut features = [0; FEATURE_COUNT];
        for (slot, spec) in features.iter_mut().zip(FEATURE_SCHEMA.iter()) {
            *slot = find(spec.column)?;
        }
        let label = find(LABEL_COLUMN)?;

        for excluded in EXCLUDED_COLUMNS {
            if headers.contains(&excluded) {
                debug!("Dropping excluded column {}", excluded);
            }
        }

        Ok(Self { features, label })
    }
}

/// CSV dataset loader
#[derive(Debug, Clone, Copy)]
pub struct DatasetLoader;

impl DatasetLoader {
    /// Create a loader for comma-separated input
    pub fn new() -> Self {
        Self
    }

    /// Load a dataset from a file
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<TrainingDataset, ValidationError> {
        let path = path.as_ref();
        info!("Loading dataset from {}", path.display());
        let file = std::fs::File::open(path).map_err(|e| ValidationError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.load_reader(file)
    }

    /// Load a dataset from any reader
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<TrainingDataset, ValidationError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = csv
            .headers()
            .map_err(|e| ValidationError::InvalidFormat(e.to_string()))?
            .clone();
        let columns = ColumnMap::resolve(headers.iter())?;

        let mut dataset = TrainingDataset::new();
        for (idx, record) in csv.records().enumerate() {
            let row_number = idx + 1;
            let record = record.map_err(|e| ValidationError::InvalidFormat(e.to_string()))?;
            let cell = |column: usize| record.get(column).unwrap_or("").trim();

            let mut values = [FieldValue::Numeric(0.0); FEATURE_COUNT];
            for (field, spec) in FEATURE_SCHEMA.iter().enumerate() {
                let raw = cell(columns.features[field]);
                values[field] = parse_field(row_number, spec.column, spec.kind, raw)?;
            }

            let label = parse_label(row_number, cell(columns.label))?;
            dataset.push(FeatureRow::from_values(&values), label)?;
        }

        info!(
            "Loaded {} samples (class counts {:?})",
            dataset.len(),
            dataset.class_counts()
        );
        Ok(dataset)
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_field(
    row: usize,
    column: &'static str,
    kind: FieldKind,
    raw: &str,
) -> Result<FieldValue, ValidationError> {
    let invalid = || ValidationError::InvalidValue {
        row,
        column,
        value: raw.to_string(),
    };
    let value = parse_number(raw).ok_or_else(invalid)?;
    match kind {
        FieldKind::Numeric { .. } => Ok(FieldValue::Numeric(value)),
        FieldKind::Categorical { .. } if value.fract() == 0.0 => {
            Ok(FieldValue::Categorical(value as i64))
        }
        FieldKind::Categorical { .. } => Err(invalid()),
    }
}

fn parse_label(row: usize, raw: &str) -> Result<Label, ValidationError> {
    match parse_number(raw) {
        Some(v) if v == 0.0 => Ok(0),
        Some(v) if v == 1.0 => Ok(1),
        _ => Err(ValidationError::InvalidLabel {
            row,
            value: raw.to_string(),
        }),
    }
}
