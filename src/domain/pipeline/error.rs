use thiserror::Error;

/// Errors raised while fitting or applying a pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("unknown features: {0:?}")]
    UnknownFeatures(Vec<String>),

    #[error("missing features: {0:?}")]
    MissingFeatures(Vec<String>),

    #[error("feature '{feature}' expects a number, got '{value}'")]
    NotNumeric { feature: String, value: String },

    #[error("feature '{0}' is not finite")]
    NonFinite(String),

    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("training labels contain a single class")]
    SingleClass,

    #[error(
        "{folds}-fold cross-validation needs at least {folds} samples per class, smallest class has {found}"
    )]
    TooFewSamples { folds: usize, found: usize },

    #[error("cross-validation needs at least 2 folds, got {0}")]
    InvalidFolds(usize),

    #[error("Newton system is not positive definite")]
    Singular,
}
