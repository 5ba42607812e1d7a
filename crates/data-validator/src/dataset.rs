//! Labeled Training Dataset

use crate::error::ValidationError;
use feature_engine::FeatureRow;

/// Binary target value (0 or 1)
pub type Label = u8;

/// Ordered sequence of (feature row, label) pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingDataset {
    rows: Vec<FeatureRow>,
    labels: Vec<Label>,
}

impl TrainingDataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from parallel row and label vectors
    pub fn from_parts(rows: Vec<FeatureRow>, labels: Vec<Label>) -> Result<Self, ValidationError> {
        if rows.len() != labels.len() {
            return Err(ValidationError::InvalidFormat(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if let Some((row, label)) = labels.iter().enumerate().find(|(_, &l)| l > 1) {
            return Err(ValidationError::InvalidLabel {
                row: row + 1,
                value: label.to_string(),
            });
        }
        Ok(Self { rows, labels })
    }

    /// Append one sample
    pub fn push(&mut self, row: FeatureRow, label: Label) -> Result<(), ValidationError> {
        if label > 1 {
            return Err(ValidationError::InvalidLabel {
                row: self.rows.len() + 1,
                value: label.to_string(),
            });
        }
        self.rows.push(row);
        self.labels.push(label);
        Ok(())
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no samples
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature rows, in dataset order
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Labels, in dataset order
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// New dataset holding the samples at `indices`, in that order
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            rows: indices.iter().map(|&i| self.rows[i]).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Sample count per class, indexed by label
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0; 2];
        for &label in &self.labels {
            counts[label as usize] += 1;
        }
        counts
    }

    /// Iterate over (row, label) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&FeatureRow, Label)> + '_ {
        self.rows.iter().zip(self.labels.iter().copied())
    }
}
