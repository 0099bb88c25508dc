//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use logwarden_runtime::{ErrorKind, QueryError};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No admin token on the request.
    #[error("missing admin token")]
    MissingToken,

    /// A query parameter could not be parsed.
    #[error("invalid query parameter '{param}': {reason}")]
    BadParam { param: &'static str, reason: String },

    /// The pipeline rejected the request.
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::BadParam { .. } => StatusCode::BAD_REQUEST,
            ApiError::Query(e) => match e.kind() {
                ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
                ErrorKind::Decode => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::Transport => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// Machine-readable error code rendered in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingToken => ErrorKind::Unauthenticated.as_str(),
            ApiError::BadParam { .. } => ErrorKind::InvalidRequest.as_str(),
            ApiError::Query(e) => e.kind().as_str(),
        }
    }

    pub fn with_trace(self, trace_id: Uuid) -> ErrorResponse {
        ErrorResponse {
            trace_id,
            error: self,
        }
    }
}

/// An [`ApiError`] tied to the request it ended.
#[derive(Debug)]
pub struct ErrorResponse {
    pub trace_id: Uuid,
    pub error: ApiError,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error.code(),
            "message": self.error.to_string(),
            "trace_id": self.trace_id,
        });
        (self.error.status(), Json(body)).into_response()
    }
}
