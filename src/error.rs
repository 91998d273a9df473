use crate::models::IncidentStatus;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use strum::Display;
use thiserror::Error;

/// External collaborators whose failures surface as `DependencyUnavailable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Dependency {
    Repository,
    Cache,
    EventBus,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Incident or referenced entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or malformed input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Status change not permitted by the lifecycle table
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: IncidentStatus,
        to: IncidentStatus,
    },

    /// Credential could not be resolved to an identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Identity lacks the required role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Repository, cache or event bus failure. `detail` is for logs only.
    #[error("Service temporarily unavailable")]
    DependencyUnavailable {
        dependency: Dependency,
        detail: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn dependency(dependency: Dependency, detail: impl Into<String>) -> Self {
        AppError::DependencyUnavailable {
            dependency,
            detail: detail.into(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::DependencyUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::DependencyUnavailable { .. } => "DEPENDENCY_UNAVAILABLE",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Domain errors are caused by the request itself and are never retried
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_) | AppError::InvalidArgument(_) | AppError::InvalidTransition { .. }
        )
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if let AppError::DependencyUnavailable { dependency, detail } = &self {
            tracing::error!(
                error_code = error_code,
                dependency = %dependency,
                detail = %detail,
                "Dependency unavailable"
            );
        } else if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request error"
            );
        } else {
            tracing::debug!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request rejected"
            );
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from validator::ValidationErrors
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidArgument(err.to_string())
    }
}

/// Conversion from a rejected JSON request body
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::NotFound("test".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidArgument("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidTransition {
                from: IncidentStatus::Resolved,
                to: IncidentStatus::Open,
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Unauthorized("test".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::dependency(Dependency::Repository, "down").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::NotFound("test".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            AppError::Forbidden("test".to_string()).error_code(),
            "FORBIDDEN"
        );
        assert_eq!(
            AppError::dependency(Dependency::Cache, "x").error_code(),
            "DEPENDENCY_UNAVAILABLE"
        );
    }

    #[test]
    fn test_transition_message_names_both_statuses() {
        let err = AppError::InvalidTransition {
            from: IncidentStatus::InProgress,
            to: IncidentStatus::Closed,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition from IN_PROGRESS to CLOSED"
        );
    }

    #[test]
    fn test_dependency_detail_not_in_message() {
        let err = AppError::dependency(Dependency::Repository, "connection refused at 10.0.0.5");
        assert!(!err.to_string().contains("10.0.0.5"));
        assert!(!err.is_domain_error());
        assert!(AppError::NotFound("x".into()).is_domain_error());
    }
}
