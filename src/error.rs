use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::Serialize;
use thiserror::Error;

/// ApiError
///
/// The error taxonomy for every repository and service operation. Each kind
/// maps to a distinct HTTP status and a stable machine-readable tag, so the
/// client can branch without parsing free-text messages.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input failed shape, required-field, or range checks at the boundary.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The requested entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A create or update collided with an existing unique key.
    #[error("{0}")]
    Conflict(String),

    /// Credential mismatch. Uniform regardless of which check failed.
    #[error("invalid credentials")]
    Auth,

    /// Underlying persistence fault, unrecoverable for this request.
    #[error("storage error")]
    Store(#[source] sqlx::Error),

    /// Non-database internal fault (e.g. hashing or token signing failed).
    #[error("internal error")]
    Internal(String),
}

/// Convenience alias used across handlers and the repository.
pub type ApiResult<T> = Result<T, ApiError>;

/// Wire shape for every error response.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Auth => "auth",
            ApiError::Store(_) | ApiError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Auth => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Internal faults are logged in full but reported generically.
            ApiError::Store(e) => {
                tracing::error!(error = ?e, "database operation failed");
                "internal server error".to_string()
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "internal operation failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: self.kind(),
            message,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    /// Classifies store faults: a unique-constraint violation (SQLSTATE 23505)
    /// becomes a Conflict the caller can act on; everything else is a Store
    /// fault for this request.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return ApiError::Conflict("unique key already in use".to_string());
            }
        }
        ApiError::Store(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
