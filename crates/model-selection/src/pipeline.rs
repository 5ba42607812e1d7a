//! Fitted Pipeline
//!
//! The preprocessing transformer followed by one classifier. The transformer
//! is always fitted on exactly the rows the classifier is trained on.

use crate::error::SelectionError;
use classifiers::{ClassifierError, ClassifierParams, FittedClassifier};
use feature_engine::{FeatureRow, Preprocessor};
use serde::{Deserialize, Serialize};

/// Preprocessor and classifier fitted together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    preprocessor: Preprocessor,
    classifier: FittedClassifier,
}

impl FittedPipeline {
    /// Fit the transformer on `rows`, then the classifier on the encoded rows
    pub fn fit(
        params: &ClassifierParams,
        rows: &[FeatureRow],
        labels: &[u8],
    ) -> Result<Self, SelectionError> {
        let preprocessor = Preprocessor::fit(rows)?;
        let encoded = preprocessor.transform(rows);
        let classifier = params.fit(encoded.view(), labels)?;
        Ok(Self {
            preprocessor,
            classifier,
        })
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn classifier(&self) -> &FittedClassifier {
        &self.classifier
    }

    pub fn params(&self) -> ClassifierParams {
        self.classifier.params()
    }

    /// Predicted risk label for one row
    pub fn predict(&self, row: &FeatureRow) -> Result<u8, ClassifierError> {
        let encoded = self.preprocessor.transform_row(row);
        self.classifier.predict_one(encoded.view())
    }

    /// Probability of class 1 for one row
    pub fn predict_proba(&self, row: &FeatureRow) -> Result<f64, ClassifierError> {
        let encoded = self.preprocessor.transform_row(row);
        self.classifier.predict_proba_one(encoded.view())
    }

    /// Predicted labels for many rows
    pub fn predict_batch(&self, rows: &[FeatureRow]) -> Result<Vec<u8>, ClassifierError> {
        let encoded = self.preprocessor.transform(rows);
        self.classifier.predict(encoded.view())
    }
}
