//! API error handling.
//!
//! This module provides error types and response formatting for the API.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::infrastructure::RepositoryError;

/// Field name under which the duplicate-name conflict is reported.
pub const DUPLICATE_NAME_FIELD: &str = "CustomError";

/// Message reported for a duplicate name on create.
pub const DUPLICATE_NAME_MESSAGE: &str = "Villa already exists!";

// =============================================================================
// API Error
// =============================================================================

/// API error structure for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional field-level errors for validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a validation error with field-level details.
    #[must_use]
    pub fn validation(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self {
            code: "VALIDATION_ERROR".to_string(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Field-level error for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field that failed validation.
    pub field: String,
    /// Error message for this field.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response for malformed input: a missing or
    /// unparsable body, or an identifier that is zero or does not match.
    #[must_use]
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::new("MALFORMED_INPUT", message),
        )
    }

    /// Creates a 400 Bad Request response for validation errors.
    #[must_use]
    pub fn validation_error(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::validation(message, details),
        )
    }

    /// Creates the 400 response for a name that is already taken.
    #[must_use]
    pub fn duplicate_name() -> Self {
        Self::validation_error(
            "Villa name must be unique",
            vec![FieldError::new(DUPLICATE_NAME_FIELD, DUPLICATE_NAME_MESSAGE)],
        )
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// Creates the 500 response for a create request that carried its own
    /// identifier.
    #[must_use]
    pub fn server_rejected(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("SERVER_REJECTED", message),
        )
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<RepositoryError> for ApiErrorResponse {
    /// Absence is reported by the repository as `None`/`false`, so every
    /// repository error is a server fault. Details stay in the log.
    fn from(error: RepositoryError) -> Self {
        tracing::error!(%error, "Repository operation failed");
        Self::internal_error("An internal error occurred")
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "Rejected request body");
        Self::malformed_input(rejection.body_text())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Validation error type for field validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    /// Field-level errors.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub const fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Creates a validation error with a single field error.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    /// Records one more field error.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Appends every error of `other`.
    pub fn extend(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    /// Returns true if there are no validation errors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts the collected errors into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `self` if at least one error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        Self::validation_error("Validation failed", error.errors)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_api_error_new() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.details.is_none());
    }

    #[rstest]
    fn test_api_error_validation() {
        let details = vec![FieldError::new("name", "Name is required")];
        let error = ApiError::validation("Validation failed", details);
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert_eq!(error.details.unwrap().len(), 1);
    }

    #[rstest]
    fn test_malformed_input() {
        let response = ApiErrorResponse::malformed_input("Villa id must not be 0");
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "MALFORMED_INPUT");
    }

    #[rstest]
    fn test_duplicate_name() {
        let response = ApiErrorResponse::duplicate_name();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "VALIDATION_ERROR");
        assert_eq!(
            response.error.details,
            Some(vec![FieldError::new("CustomError", "Villa already exists!")])
        );
    }

    #[rstest]
    fn test_server_rejected() {
        let response = ApiErrorResponse::server_rejected("Identifier is assigned by the server");
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "SERVER_REJECTED");
    }

    #[rstest]
    #[case(RepositoryError::DatabaseError("connection failed".to_string()))]
    #[case(RepositoryError::SerializationError("connection failed".to_string()))]
    fn test_repository_error_to_api_error_response(#[case] error: RepositoryError) {
        let response: ApiErrorResponse = error.into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "INTERNAL_ERROR");
        assert!(!response.error.message.contains("connection failed"));
    }

    #[rstest]
    fn test_validation_error_accumulates() {
        let mut error = ValidationError::default();
        assert!(error.clone().into_result().is_ok());

        error.push("name", "Name is required");
        error.extend(ValidationError::single("rate", "Rate must not be negative"));
        assert_eq!(error.errors.len(), 2);

        let response: ApiErrorResponse = error.into_result().unwrap_err().into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.details.unwrap().len(), 2);
    }
}
