//! Support Vector Classifier
//!
//! Soft-margin binary SVC fitted with `linfa-svm`. The dual coefficients and
//! offset are copied out of the fitted solver, so the model serializes as
//! plain vectors and scores new rows without the training kernel matrix.
//!
//! - Linear kernel: k(a, b) = a·b
//! - RBF kernel: k(a, b) = exp(-γ‖a − b‖²)
//!
//! Probabilities come from a Platt sigmoid fitted to the training decision
//! values with linfa's Newton method.

use crate::error::ClassifierError;
use crate::{check_training_set, Classifier};
use linfa::composing::platt_scaling::{platt_newton_method, platt_predict, PlattParams};
use linfa::prelude::*;
use linfa::ParamGuard;
use linfa_svm::Svm;
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Alphas at or below this are not support vectors
const ALPHA_EPS: f64 = 1e-12;

/// Kernel function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kernel {
    Linear,
    Rbf,
}

impl Kernel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kernel::Linear => "linear",
            Kernel::Rbf => "rbf",
        }
    }
}

/// How the RBF coefficient is derived from the training matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GammaPolicy {
    /// 1 / (n_features · Var(X))
    Scale,
    /// 1 / n_features
    Auto,
}

impl GammaPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GammaPolicy::Scale => "scale",
            GammaPolicy::Auto => "auto",
        }
    }

    /// Resolve the coefficient for a training matrix
    pub fn resolve(&self, x: ArrayView2<f64>) -> f64 {
        let n_features = x.ncols().max(1) as f64;
        match self {
            GammaPolicy::Auto => 1.0 / n_features,
            GammaPolicy::Scale => {
                let count = x.len().max(1) as f64;
                let mean = x.sum() / count;
                let var = x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count;
                if var > 0.0 {
                    1.0 / (n_features * var)
                } else {
                    1.0
                }
            }
        }
    }
}

/// SVC hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvmParams {
    /// Regularization strength, applied to both classes
    pub c: f64,
    /// Kernel function
    pub kernel: Kernel,
    /// Kernel coefficient policy (ignored by the linear kernel)
    pub gamma: GammaPolicy,
    /// Solver stopping tolerance
    pub tolerance: f64,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: Kernel::Rbf,
            gamma: GammaPolicy::Scale,
            tolerance: 1e-3,
        }
    }
}

#[inline]
fn kernel_value(kernel: Kernel, gamma: f64, a: &[f64], b: ArrayView1<f64>) -> f64 {
    match kernel {
        Kernel::Linear => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        Kernel::Rbf => {
            let sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
            (-gamma * sq).exp()
        }
    }
}

/// Platt sigmoid P(class 1 | f) = 1 / (1 + exp(A·f + B))
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattScaler {
    pub a: f64,
    pub b: f64,
}

impl PlattScaler {
    /// Plain logistic of the decision value
    pub fn uncalibrated() -> Self {
        Self { a: -1.0, b: 0.0 }
    }

    /// Fit the sigmoid to decision values and their true classes
    pub fn fit(decision: &[f64], positive: &[bool]) -> Result<Self, ClassifierError> {
        let params = PlattParams::<f64, ()>::default()
            .check()
            .map_err(|e| ClassifierError::Solver(e.to_string()))?;
        let decision = Array1::from(decision.to_vec());
        let positive = Array1::from(positive.to_vec());
        let (a, b) = platt_newton_method(decision.view(), positive.view(), &params)
            .map_err(|e| ClassifierError::Solver(e.to_string()))?;
        Ok(Self { a, b })
    }

    /// Probability of class 1 for a decision value
    pub fn probability(&self, decision: f64) -> f64 {
        *platt_predict(decision, self.a, self.b) as f64
    }
}

/// Fitted support vector classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmClassifier {
    params: SvmParams,
    gamma: f64,
    dim: usize,
    /// Support vectors, row-major
    support: Vec<f64>,
    /// αᵢ·yᵢ for every support vector
    dual_coef: Vec<f64>,
    rho: f64,
    platt: PlattScaler,
}

impl SvmClassifier {
    pub fn fit(params: SvmParams, x: ArrayView2<f64>, y: &[u8]) -> Result<Self, ClassifierError> {
        check_training_set(x, y)?;
        if !(params.c > 0.0) {
            return Err(ClassifierError::InvalidParameter(format!(
                "C must be positive, got {}",
                params.c
            )));
        }
        if let Some(class) = single_class(y) {
            return Err(ClassifierError::SingleClass(class));
        }

        let gamma = params.gamma.resolve(x);
        let positive: Vec<bool> = y.iter().map(|&l| l == 1).collect();
        let dataset = Dataset::new(x.to_owned(), Array1::from(positive.clone()));

        let solver = Svm::<f64, bool>::params()
            .pos_neg_weights(params.c, params.c)
            .eps(params.tolerance);
        let solver = match params.kernel {
            Kernel::Linear => solver.linear_kernel(),
            // linfa parameterizes the Gaussian kernel by its width 1/γ
            Kernel::Rbf => solver.gaussian_kernel(1.0 / gamma),
        };
        let fitted = solver
            .fit(&dataset)
            .map_err(|e| ClassifierError::Solver(e.to_string()))?;

        let mut support = Vec::new();
        let mut dual_coef = Vec::new();
        for (row, &alpha) in x.rows().into_iter().zip(&fitted.alpha) {
            if alpha.abs() > ALPHA_EPS {
                support.extend(row.iter().copied());
                dual_coef.push(alpha);
            }
        }

        let mut model = Self {
            params,
            gamma,
            dim: x.ncols(),
            support,
            dual_coef,
            rho: fitted.rho,
            platt: PlattScaler::uncalibrated(),
        };

        let decision: Vec<f64> = x.rows().into_iter().map(|row| model.score(row)).collect();
        model.platt = PlattScaler::fit(&decision, &positive).unwrap_or_else(|e| {
            warn!("Platt calibration failed, using plain logistic: {}", e);
            PlattScaler::uncalibrated()
        });

        debug!(
            "Fitted SVC: {} support vectors of {} samples (C={}, kernel={})",
            model.n_support(),
            x.nrows(),
            params.c,
            params.kernel.as_str()
        );
        Ok(model)
    }

    pub fn params(&self) -> &SvmParams {
        &self.params
    }

    /// Resolved kernel coefficient
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn n_support(&self) -> usize {
        self.dual_coef.len()
    }

    fn score(&self, x: ArrayView1<f64>) -> f64 {
        self.dual_coef
            .iter()
            .zip(self.support.chunks_exact(self.dim.max(1)))
            .map(|(coef, sv)| coef * kernel_value(self.params.kernel, self.gamma, sv, x))
            .sum::<f64>()
            - self.rho
    }

    /// Signed distance-like score; positive means class 1
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.score(ArrayView1::from(x))
    }

    /// Predicted label for one row
    pub fn decide(&self, x: &[f64]) -> u8 {
        u8::from(self.decision_function(x) > 0.0)
    }

    /// Calibrated probability of class 1 for one row
    pub fn probability(&self, x: &[f64]) -> f64 {
        self.platt.probability(self.decision_function(x))
    }
}

impl Classifier for SvmClassifier {
    fn n_features(&self) -> usize {
        self.dim
    }

    fn decide_rows(&self, x: ArrayView2<f64>) -> Result<Vec<u8>, ClassifierError> {
        Ok(x
            .rows()
            .into_iter()
            .map(|row| u8::from(self.score(row) > 0.0))
            .collect())
    }

    fn probability_rows(&self, x: ArrayView2<f64>) -> Result<Vec<f64>, ClassifierError> {
        Ok(x
            .rows()
            .into_iter()
            .map(|row| self.platt.probability(self.score(row)))
            .collect())
    }
}

fn single_class(y: &[u8]) -> Option<u8> {
    let first = *y.first()?;
    y.iter().all(|&l| l == first).then_some(first)
}
