use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{
    auth::AuthError,
    repository::RepoError,
    role::AuthzError,
    validation::ValidationError,
};

/// ApiError
///
/// Every failure a handler can report. Each variant maps onto one HTTP status
/// and renders as `{"message": "..."}`. Internal failures never carry their
/// cause to the client; the cause is logged where the error is created.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    // 401
    #[error("No token provided")]
    NoToken,

    #[error("{0}")]
    Unauthorized(String),

    // 403
    #[error("Invalid token")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    // 404
    #[error("{0}")]
    NotFound(String),

    // 409
    #[error("{0}")]
    Conflict(String),

    // 500
    #[error("Server error.")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NoToken | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log a persistence failure under `context` and hide it behind a bare 500.
    pub fn internal(err: RepoError, context: &str) -> Self {
        tracing::error!("{} error: {:?}", context, err);
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "message": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NoToken => ApiError::NoToken,
            AuthError::InvalidToken => ApiError::InvalidToken,
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthorized => ApiError::Unauthorized(err.to_string()),
            AuthzError::Forbidden => ApiError::Forbidden(err.to_string()),
        }
    }
}

// Malformed bodies and query strings are client input errors, not 422s.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
