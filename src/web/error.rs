//! API error handling for the s3nav web API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::auth::AuthError;
use crate::NavError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Unauthorized (401).
    Unauthorized,
    /// Forbidden (403).
    Forbidden,
    /// Not found (404).
    NotFound,
    /// Conflict (409).
    Conflict,
    /// Validation error (422) - for field-level validation errors.
    ValidationError,
    /// Too many requests (429).
    TooManyRequests,
    /// Internal server error (500).
    InternalError,
    /// The object store or directory failed (502).
    BadGateway,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::BadGateway => StatusCode::BAD_GATEWAY,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Field-level validation error details (only present for validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TooManyRequests, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadGateway, message)
    }

    /// Create a validation error from validator::ValidationErrors.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut details: HashMap<String, Vec<String>> = HashMap::new();
        collect_validation_errors("", &errors, &mut details);

        Self {
            code: ErrorCode::ValidationError,
            message: "Validation failed".to_string(),
            details: Some(details),
        }
    }
}

/// Flatten nested and list errors into `items[0].sourceKey`-style paths.
fn collect_validation_errors(
    path: &str,
    errors: &validator::ValidationErrors,
    details: &mut HashMap<String, Vec<String>>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let name = if path.is_empty() {
            field.to_string()
        } else {
            format!("{path}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                });
                details.entry(name).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_errors(&name, inner, details);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_errors(&format!("{name}[{index}]"), inner, details);
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<NavError> for ApiError {
    fn from(err: NavError) -> Self {
        match err {
            NavError::NotFound(_) => ApiError::not_found(err.to_string()),
            NavError::Validation(msg) => ApiError::bad_request(msg),
            NavError::Conflict(msg) => ApiError::conflict(msg),
            NavError::Auth(auth) => auth.into(),
            NavError::Storage(e) => {
                tracing::error!(error = %e, "Object store request failed");
                ApiError::bad_gateway("Object storage request failed")
            }
            NavError::Io(_) | NavError::Config(_) => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::BadCredentials | AuthError::Disabled => ApiError::unauthorized(err.to_string()),
            AuthError::NotAuthorized => ApiError::forbidden(err.to_string()),
            AuthError::Directory(msg) => {
                tracing::error!(error = %msg, "Directory request failed");
                ApiError::bad_gateway("Directory request failed")
            }
            AuthError::Password(e) => {
                tracing::error!(error = %e, "Password verification failed");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}
