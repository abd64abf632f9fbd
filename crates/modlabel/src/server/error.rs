use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use modlabel_core::{CoreError, LabelError};

// ==============================================================================
// Error Type
// ==============================================================================

#[derive(Debug)]
pub(crate) enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub(super) fn map_label_error(err: LabelError) -> AppError {
    match err {
        LabelError::NotDebugging => AppError::Conflict(err.to_string()),
        LabelError::UnreadableAddress(_)
        | LabelError::TextTooLong { .. }
        | LabelError::ReservedCharacter => AppError::BadRequest(err.to_string()),
    }
}

pub(super) fn map_core_error(err: CoreError) -> AppError {
    match err {
        CoreError::Json { .. } | CoreError::InvalidDocument(_) | CoreError::InvalidSnapshot(_) => {
            AppError::BadRequest(err.to_string())
        }
        CoreError::Io(e) => AppError::Internal(format!("session I/O failed: {e}")),
    }
}
