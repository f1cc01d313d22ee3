//! Pipeline domain - Preprocessing + logistic classifier, fitting and evaluation
//!
//! Categorical columns are one-hot encoded (unknown categories encode to all
//! zeros), numeric columns pass through unchanged, and a L2-regularised
//! logistic regression produces the probability of the positive outcome.

mod cross_validation;
mod encoder;
mod error;
mod logistic;
mod metrics;
mod pipeline;

pub use cross_validation::{cross_validate, CrossValidationReport, Fold, StratifiedKFold};
pub use encoder::{CategoricalEncoding, ColumnTransformer};
pub use error::PipelineError;
pub use logistic::{LogisticRegression, LogisticRegressionConfig};
pub use metrics::{accuracy, f1_score};
pub use pipeline::Pipeline;
