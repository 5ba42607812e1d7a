//! Static Feature Schema
//!
//! Declares the ten clinical input fields in their fixed order, together with
//! the raw column each one is read from and, for categorical fields, the full
//! declared value domain. Training and serving both encode against this table,
//! so the encoded width never depends on which categories a dataset happens
//! to contain.

use serde::{Deserialize, Serialize};

/// Number of fields in a feature row
pub const FEATURE_COUNT: usize = 10;

/// Raw column holding the binary target
pub const LABEL_COLUMN: &str = "output";

/// Raw columns present in the source data that never enter the model
pub const EXCLUDED_COLUMNS: [&str; 3] = ["oldpeak", "slp", "thall"];

/// Code assigned to a categorical value that cannot be represented as an
/// integer. It lies outside every declared domain.
pub const UNKNOWN_CATEGORY: i64 = i64::MIN;

/// Semantic kind of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer measurement; the range is informational only
    Numeric { min: i64, max: i64 },
    /// Categorical code with its declared domain in ascending order
    Categorical { domain: &'static [i64] },
}

/// One entry of the feature schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name used in logs and encoded column names
    pub name: &'static str,
    /// Header of the raw tabular column
    pub column: &'static str,
    /// Semantic kind
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Number of encoded columns this field produces
    pub const fn encoded_width(&self) -> usize {
        match self.kind {
            FieldKind::Numeric { .. } => 1,
            // First category is the dropped reference column
            FieldKind::Categorical { domain } => domain.len().saturating_sub(1),
        }
    }

    /// Whether the field is categorical
    pub const fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Categorical { .. })
    }
}

/// The ten input fields, in row order
pub const FEATURE_SCHEMA: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        name: "age",
        column: "age",
        kind: FieldKind::Numeric { min: 1, max: 120 },
    },
    FieldSpec {
        name: "sex",
        column: "sex",
        kind: FieldKind::Categorical { domain: &[0, 1] },
    },
    FieldSpec {
        name: "chest_pain_type",
        column: "cp",
        kind: FieldKind::Categorical { domain: &[0, 1, 2, 3] },
    },
    FieldSpec {
        name: "resting_bp",
        column: "trtbps",
        kind: FieldKind::Numeric { min: 50, max: 200 },
    },
    FieldSpec {
        name: "cholesterol",
        column: "chol",
        kind: FieldKind::Numeric { min: 100, max: 600 },
    },
    FieldSpec {
        name: "fasting_blood_sugar",
        column: "fbs",
        kind: FieldKind::Categorical { domain: &[0, 1] },
    },
    FieldSpec {
        name: "resting_ecg",
        column: "restecg",
        kind: FieldKind::Categorical { domain: &[0, 1, 2] },
    },
    FieldSpec {
        name: "max_heart_rate",
        column: "thalachh",
        kind: FieldKind::Numeric { min: 60, max: 220 },
    },
    FieldSpec {
        name: "exercise_angina",
        column: "exng",
        kind: FieldKind::Categorical { domain: &[0, 1] },
    },
    FieldSpec {
        name: "major_vessels",
        column: "caa",
        kind: FieldKind::Categorical { domain: &[0, 1, 2, 3, 4] },
    },
];

const fn count_numeric(schema: &[FieldSpec]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < schema.len() {
        if !schema[i].is_categorical() {
            count += 1;
        }
        i += 1;
    }
    count
}

const fn encoded_dimension(schema: &[FieldSpec]) -> usize {
    let mut width = 0;
    let mut i = 0;
    while i < schema.len() {
        width += schema[i].encoded_width();
        i += 1;
    }
    width
}

/// Number of standardized numeric columns
pub const NUMERIC_COUNT: usize = count_numeric(&FEATURE_SCHEMA);

/// Width of an encoded feature vector (16 for the declared schema)
pub const ENCODED_DIMENSION: usize = encoded_dimension(&FEATURE_SCHEMA);

/// Value of a single field, tagged with its kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Numeric(f64),
    Categorical(i64),
}

impl FieldValue {
    /// Numeric view of the value
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Numeric(v) => v,
            FieldValue::Categorical(c) => c as f64,
        }
    }

    /// Categorical code; non-integral numbers become [`UNKNOWN_CATEGORY`]
    pub fn as_code(self) -> i64 {
        match self {
            FieldValue::Categorical(c) => c,
            FieldValue::Numeric(v) if v.is_finite() && v.fract() == 0.0 => v as i64,
            FieldValue::Numeric(_) => UNKNOWN_CATEGORY,
        }
    }
}

/// One patient's ten clinical measurements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub age: f64,
    pub sex: i64,
    pub chest_pain_type: i64,
    pub resting_bp: f64,
    pub cholesterol: f64,
    pub fasting_blood_sugar: i64,
    pub resting_ecg: i64,
    pub max_heart_rate: f64,
    pub exercise_angina: i64,
    pub major_vessels: i64,
}

impl FeatureRow {
    /// Build a row from values in schema order
    pub fn from_values(values: &[FieldValue; FEATURE_COUNT]) -> Self {
        Self {
            age: values[0].as_f64(),
            sex: values[1].as_code(),
            chest_pain_type: values[2].as_code(),
            resting_bp: values[3].as_f64(),
            cholesterol: values[4].as_f64(),
            fasting_blood_sugar: values[5].as_code(),
            resting_ecg: values[6].as_code(),
            max_heart_rate: values[7].as_f64(),
            exercise_angina: values[8].as_code(),
            major_vessels: values[9].as_code(),
        }
    }

    /// Build a row from ten scalars in schema order
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(&values.map(FieldValue::Numeric))
    }

    /// Field values in schema order
    pub fn values(&self) -> [FieldValue; FEATURE_COUNT] {
        [
            FieldValue::Numeric(self.age),
            FieldValue::Categorical(self.sex),
            FieldValue::Categorical(self.chest_pain_type),
            FieldValue::Numeric(self.resting_bp),
            FieldValue::Numeric(self.cholesterol),
            FieldValue::Categorical(self.fasting_blood_sugar),
            FieldValue::Categorical(self.resting_ecg),
            FieldValue::Numeric(self.max_heart_rate),
            FieldValue::Categorical(self.exercise_angina),
            FieldValue::Categorical(self.major_vessels),
        ]
    }
}
