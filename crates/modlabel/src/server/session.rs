use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use modlabel_core::session::{load_labels, save_labels};

use super::auth::check_auth;
use super::error::{map_core_error, AppError};
use super::SharedState;

#[derive(Serialize)]
pub(super) struct SaveResponse {
    path: String,
    labels: usize,
    manual: usize,
    automatic: usize,
}

#[derive(Serialize)]
pub(super) struct LoadResponse {
    path: String,
    manual: usize,
    automatic: usize,
    skipped: usize,
}

fn session_path(state: &SharedState) -> Result<&std::path::Path, AppError> {
    state
        .session_path
        .as_deref()
        .ok_or_else(|| AppError::Conflict("no session file configured (use --session)".into()))
}

pub(super) async fn save_session(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<SaveResponse>, AppError> {
    check_auth(&state.api_token, &headers)?;
    let path = session_path(&state)?;
    let summary = save_labels(&state.labels, path).map_err(map_core_error)?;
    Ok(Json(SaveResponse {
        path: path.display().to_string(),
        labels: summary.total(),
        manual: summary.manual,
        automatic: summary.automatic,
    }))
}

pub(super) async fn load_session(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<LoadResponse>, AppError> {
    check_auth(&state.api_token, &headers)?;
    let path = session_path(&state)?;
    let summary = load_labels(&state.labels, path).map_err(map_core_error)?;
    Ok(Json(LoadResponse {
        path: path.display().to_string(),
        manual: summary.manual,
        automatic: summary.automatic,
        skipped: summary.skipped,
    }))
}
