//! Error types for the lunch voting backend.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No such restaurant: {0}")]
    NoSuchRestaurant(i32),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Voting time has ended, try again tomorrow")]
    VotingClosed,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("You can vote only once per day")]
    DuplicateVote,

    #[error("Winner already computed for {0}")]
    AlreadyComputed(NaiveDate),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::NoSuchRestaurant(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::VotingClosed => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) | Self::DuplicateVote | Self::AlreadyComputed(_) => {
                StatusCode::CONFLICT
            }

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::NoSuchRestaurant(_) => "NO_SUCH_RESTAURANT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::VotingClosed => "VOTING_CLOSED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::DuplicateVote => "DUPLICATE_VOTE",
            Self::AlreadyComputed(_) => "ALREADY_COMPUTED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_errors_map_to_api_statuses() {
        assert_eq!(AppError::NoSuchRestaurant(7).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::DuplicateVote.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Conflict("name taken".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::VotingClosed.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Validation("days required".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_server_errors() {
        assert!(AppError::Database("boom".to_string()).is_server_error());
        assert!(AppError::Config("bad".to_string()).is_server_error());
        assert!(!AppError::DuplicateVote.is_server_error());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::DuplicateVote.error_code(), "DUPLICATE_VOTE");
        assert_eq!(AppError::NoSuchRestaurant(1).error_code(), "NO_SUCH_RESTAURANT");
        assert_eq!(AppError::VotingClosed.error_code(), "VOTING_CLOSED");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::DuplicateVote.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = AppError::NoSuchRestaurant(3).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_errors_convert() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("price", validator::ValidationError::new("range"));
        let err: AppError = errors.into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
