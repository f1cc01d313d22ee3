use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown scenario: {scenario}")]
    UnknownScenario { scenario: String },

    #[error("Model missing: {message}")]
    ModelMissing { message: String },

    #[error("Bad input payload: {message}")]
    InvalidInput { message: String },

    #[error("Logging failure: {message}")]
    Logging { message: String },

    #[error("Dataset error: {message}")]
    Dataset { message: String },

    #[error("Training failure: {scenario} - {message}")]
    Training { scenario: String, message: String },

    #[error("Tracking error: {message}")]
    Tracking { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn unknown_scenario(scenario: impl Into<String>) -> Self {
        Self::UnknownScenario {
            scenario: scenario.into(),
        }
    }

    pub fn model_missing(message: impl Into<String>) -> Self {
        Self::ModelMissing {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    pub fn training(scenario: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Training {
            scenario: scenario.into(),
            message: message.into(),
        }
    }

    pub fn tracking(message: impl Into<String>) -> Self {
        Self::Tracking {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller, not the server, is responsible for this error
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::Dataset { .. })
    }
}
