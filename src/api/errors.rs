use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::auth::jwt::TokenError;
use crate::auth::password::PasswordError;
use crate::domain::repositories::{Constraint, RepositoryError};
use crate::domain::validation::FieldErrors;

/// API error type with HTTP status code and message
///
/// Serializes as `{"error": message}`, plus `fields` for validation failures
/// and `details` when extra context is attached.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub fields: Option<FieldErrors>,
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: None,
            details: None,
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 400 Bad Request carrying per-field messages
    pub fn validation(fields: FieldErrors) -> Self {
        Self {
            fields: Some(fields),
            ..Self::bad_request("Validation failed")
        }
    }

    /// Creates a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found.")
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Attaches extra detail to the response body
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(self.message));
        if let Some(fields) = self.fields {
            body.insert("fields".to_string(), json!(fields));
        }
        if let Some(details) = self.details {
            body.insert("details".to_string(), Value::String(details));
        }

        (self.status, Json(Value::Object(body))).into_response()
    }
}

impl From<FieldErrors> for ApiError {
    fn from(fields: FieldErrors) -> Self {
        Self::validation(fields)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Violation(constraint) => {
                let fields = FieldErrors::single(constraint.field(), constraint.message());
                match constraint {
                    Constraint::CompanyHasNoIpos => Self {
                        fields: Some(fields),
                        ..Self::conflict(constraint.message())
                    },
                    _ => Self::validation(fields),
                }
            }
            other => {
                tracing::error!(error = %other, "Repository failure");
                Self::internal_server_error(other.to_string())
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Encode(e) => {
                tracing::error!(error = %e, "Token signing failed");
                Self::internal_server_error(format!("Failed to create token: {}", e))
            }
            TokenError::Invalid(_) | TokenError::WrongType { .. } => {
                Self::unauthorized("Token is invalid or expired")
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(error: PasswordError) -> Self {
        tracing::error!(error = %error, "Password hashing failed");
        Self::internal_server_error(format!("Password processing failed: {}", error))
    }
}
