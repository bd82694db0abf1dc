use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use txpeek_core::LookupError;

// ==============================================================================
// Error Type
// ==============================================================================

pub(crate) enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// HTTP status for a finished lookup that did not succeed.
pub(super) fn lookup_error_status(err: &LookupError) -> StatusCode {
    match err {
        err if err.is_validation() => StatusCode::BAD_REQUEST,
        LookupError::RemoteNotFound { .. } => StatusCode::NOT_FOUND,
        LookupError::Remote(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
