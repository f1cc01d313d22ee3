//! JSON error bodies and the mapping from domain errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

/// Error response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    param: None,
                    code: None,
                },
            },
        }
    }

    /// Add parameter info
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    /// Add error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    /// Not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    /// Service unavailable error, e.g. a model that was never trained
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        if !err.is_client_error() {
            tracing::error!(error = %message, "Request failed");
        }

        match &err {
            DomainError::UnknownScenario { .. } => {
                Self::not_found(message).with_code("unknown_scenario")
            }
            DomainError::ModelMissing { .. } => Self::unavailable(message).with_code("model_missing"),
            DomainError::InvalidInput { .. } => {
                Self::bad_request(message).with_param("payload").with_code("invalid_input")
            }
            DomainError::Dataset { .. } => Self::bad_request(message).with_code("dataset_error"),
            DomainError::Logging { .. } => Self::internal(message).with_code("logging_failure"),
            DomainError::Training { .. } => Self::internal(message).with_code("training_failure"),
            DomainError::Tracking { .. } => Self::internal(message).with_code("tracking_error"),
            DomainError::Configuration { .. } => {
                Self::internal(message).with_code("configuration_error")
            }
            DomainError::Storage { .. } => Self::internal(message).with_code("storage_error"),
            DomainError::Internal { .. } => Self::internal(message).with_code("internal_error"),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (DomainError::invalid_input("x"), StatusCode::BAD_REQUEST),
            (DomainError::dataset("x"), StatusCode::BAD_REQUEST),
            (DomainError::unknown_scenario("S9"), StatusCode::NOT_FOUND),
            (DomainError::model_missing("x"), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::logging("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::training("S2", "x"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::storage("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_invalid_input_body() {
        let err = ApiError::from(DomainError::invalid_input("unknown features: [\"x\"]"));
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["code"], "invalid_input");
        assert_eq!(json["error"]["param"], "payload");
        assert_eq!(
            json["error"]["message"],
            "Bad input payload: unknown features: [\"x\"]"
        );
    }

    #[test]
    fn test_optional_fields_omitted() {
        let json = serde_json::to_string(&ApiError::internal("boom").response).unwrap();
        assert!(!json.contains("param"));
        assert!(!json.contains("code"));
    }
}
