//! Error types for the circulation engine

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 3,
    NotFound = 5,
    InvalidTransition = 7,
    NoCopyAvailable = 8,
    CopyAvailable = 9,
    DuplicateActiveRequest = 10,
    BorrowLimitExceeded = 11,
    InvalidCopyState = 12,
    WrongSourceLibrary = 13,
    DuplicatePunishment = 14,
    DependentRecordsExist = 15,
    BadValue = 18,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("No copy of {isbn} is available at library {library_id}")]
    NoCopyAvailable { isbn: String, library_id: i32 },

    #[error("A copy of {isbn} is available at library {library_id}")]
    CopyAvailable { isbn: String, library_id: i32 },

    #[error("User {user_id} already holds an active request for {isbn}")]
    DuplicateActiveRequest { user_id: i32, isbn: String },

    #[error("User {user_id} already holds {limit} active requests")]
    BorrowLimitExceeded { user_id: i32, limit: i64 },

    #[error("Physical copy {copy_id} is {status}")]
    InvalidCopyState { copy_id: i32, status: String },

    #[error("Physical copy {copy_id} is not located at library {library_id}")]
    WrongSourceLibrary { copy_id: i32, library_id: i32 },

    #[error("Request {0} already has a punishment")]
    DuplicatePunishment(i32),

    #[error("Dependent records exist: {0}")]
    DependentRecordsExist(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        AppError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// HTTP status and error code for this error
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, ErrorCode::InvalidTransition)
            }
            AppError::NoCopyAvailable { .. } => (StatusCode::CONFLICT, ErrorCode::NoCopyAvailable),
            AppError::CopyAvailable { .. } => (StatusCode::CONFLICT, ErrorCode::CopyAvailable),
            AppError::DuplicateActiveRequest { .. } => {
                (StatusCode::CONFLICT, ErrorCode::DuplicateActiveRequest)
            }
            AppError::BorrowLimitExceeded { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::BorrowLimitExceeded,
            ),
            AppError::InvalidCopyState { .. } => {
                (StatusCode::CONFLICT, ErrorCode::InvalidCopyState)
            }
            AppError::WrongSourceLibrary { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::WrongSourceLibrary,
            ),
            AppError::DuplicatePunishment(_) => {
                (StatusCode::CONFLICT, ErrorCode::DuplicatePunishment)
            }
            AppError::DependentRecordsExist(_) => {
                (StatusCode::CONFLICT, ErrorCode::DependentRecordsExist)
            }
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circulation_errors_map_to_conflict_or_unprocessable() {
        let (status, code) = AppError::invalid_transition("Pending", "Returned").status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, ErrorCode::InvalidTransition);

        let (status, code) = AppError::BorrowLimitExceeded { user_id: 1, limit: 3 }.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, ErrorCode::BorrowLimitExceeded);
    }

    #[test]
    fn test_error_messages() {
        let err = AppError::NoCopyAvailable {
            isbn: "111".to_string(),
            library_id: 1,
        };
        assert_eq!(err.to_string(), "No copy of 111 is available at library 1");
        assert_eq!(
            AppError::invalid_transition("Requested", "Canceled").to_string(),
            "Invalid transition from Requested to Canceled"
        );
    }

    #[test]
    fn test_database_errors_are_opaque() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
