//! L2-regularised binary logistic regression fitted by damped Newton steps

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_linalg::{FactorizeC, SolveC, UPLO};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::PipelineError;

/// Optimiser settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionConfig {
    /// Inverse regularisation strength; the intercept is not penalised
    pub c: f64,
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 2000,
            tolerance: 1e-6,
        }
    }
}

/// Fitted logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Array1<f64>,
    intercept: f64,
    n_iter: usize,
    converged: bool,
}

const JITTER: f64 = 1e-10;
const MAX_HALVINGS: usize = 30;

impl LogisticRegression {
    /// Fit on design matrix `x` (without intercept column) and 0/1 targets `y`
    pub fn fit(
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        config: &LogisticRegressionConfig,
    ) -> Result<Self, PipelineError> {
        let (n, p) = x.dim();
        if n == 0 {
            return Err(PipelineError::EmptyTrainingSet);
        }
        let positives = y.iter().filter(|v| **v > 0.5).count();
        if positives == 0 || positives == n {
            return Err(PipelineError::SingleClass);
        }

        let design = with_intercept(x);
        let penalty = penalty_diagonal(p, config.c);
        let mut beta = Array1::<f64>::zeros(p + 1);
        let mut loss = objective(&design, y, &beta, &penalty);
        let mut converged = false;
        let mut n_iter = 0;

        while n_iter < config.max_iter {
            n_iter += 1;

            let probs = design.dot(&beta).mapv(sigmoid);
            let weights = probs.mapv(|q| (q * (1.0 - q)).max(JITTER));
            let gradient = design.t().dot(&(&probs - &y)) + &penalty * &beta;

            let weighted = &design * &weights.view().insert_axis(Axis(1));
            let mut hessian = design.t().dot(&weighted);
            for j in 0..=p {
                hessian[[j, j]] += penalty[j] + JITTER;
            }

            let step = newton_step(&hessian, &gradient)?;

            let mut scale = 1.0;
            let mut candidate = &beta - &step;
            let mut candidate_loss = objective(&design, y, &candidate, &penalty);
            let mut halvings = 0;
            while candidate_loss > loss && halvings < MAX_HALVINGS {
                scale *= 0.5;
                candidate = &beta - &(&step * scale);
                candidate_loss = objective(&design, y, &candidate, &penalty);
                halvings += 1;
            }

            let improvement = loss - candidate_loss;
            let max_step = step.iter().fold(0.0_f64, |m, s| m.max((s * scale).abs()));
            beta = candidate;
            loss = candidate_loss;

            if max_step < config.tolerance || improvement.abs() < config.tolerance * loss.max(1.0)
            {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(n_iter, "logistic regression did not converge");
        }

        Ok(Self {
            coefficients: beta.slice(ndarray::s![..p]).to_owned(),
            intercept: beta[p],
            n_iter,
            converged,
        })
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Probability of the positive class for each row of `x`
    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Array1<f64> {
        (x.dot(&self.coefficients) + self.intercept).mapv(sigmoid)
    }

    /// Probability of the positive class for one encoded row
    pub fn predict_proba_one(&self, x: ArrayView1<f64>) -> f64 {
        sigmoid(x.dot(&self.coefficients) + self.intercept)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// log(1 + exp(z)) without overflow
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn with_intercept(x: ArrayView2<f64>) -> Array2<f64> {
    let (n, p) = x.dim();
    let mut design = Array2::ones((n, p + 1));
    design.slice_mut(ndarray::s![.., ..p]).assign(&x);
    design
}

fn penalty_diagonal(p: usize, c: f64) -> Array1<f64> {
    let mut penalty = Array1::from_elem(p + 1, 1.0 / c);
    penalty[p] = 0.0;
    penalty
}

/// Negative log-likelihood plus half the weighted squared norm
fn objective(
    design: &Array2<f64>,
    y: ArrayView1<f64>,
    beta: &Array1<f64>,
    penalty: &Array1<f64>,
) -> f64 {
    let eta = design.dot(beta);
    let nll: f64 = eta
        .iter()
        .zip(y.iter())
        .map(|(z, t)| softplus(*z) - t * z)
        .sum();
    let reg: f64 = beta
        .iter()
        .zip(penalty.iter())
        .map(|(b, l)| 0.5 * l * b * b)
        .sum();
    nll + reg
}

/// Solve `hessian * step = gradient` through a Cholesky factorisation
fn newton_step(
    hessian: &Array2<f64>,
    gradient: &Array1<f64>,
) -> Result<Array1<f64>, PipelineError> {
    hessian
        .factorizec(UPLO::Lower)
        .and_then(|factor| factor.solvec(gradient))
        .map_err(|_| PipelineError::Singular)
}
