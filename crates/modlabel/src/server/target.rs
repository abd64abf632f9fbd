use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use modlabel_core::hex::serde_hex;
use modlabel_core::snapshot::ModuleInfo;
use modlabel_core::Address;

use super::auth::check_auth;
use super::error::AppError;
use super::SharedState;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RelocateRequest {
    #[serde(with = "serde_hex")]
    base: Address,
}

pub(super) async fn list_modules(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ModuleInfo>>, AppError> {
    check_auth(&state.api_token, &headers)?;
    Ok(Json(state.target.modules()))
}

pub(super) async fn relocate_module(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    req: Result<Json<RelocateRequest>, JsonRejection>,
) -> Result<Json<ModuleInfo>, AppError> {
    check_auth(&state.api_token, &headers)?;
    let Json(req) = req.map_err(|e| AppError::BadRequest(e.to_string()))?;

    if !state.target.relocate_module(&name, req.base) {
        return Err(AppError::NotFound(format!(
            "module `{name}` is not loaded or cannot move to that base"
        )));
    }
    state
        .target
        .modules()
        .into_iter()
        .find(|m| m.name.eq_ignore_ascii_case(&name))
        .map(Json)
        .ok_or_else(|| AppError::Internal("relocated module was not found".to_string()))
}

pub(super) async fn detach(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&state.api_token, &headers)?;
    state.target.detach();
    state.labels.on_target_changed();
    tracing::info!("target detached");
    Ok(Json(serde_json::json!({ "status": "detached" })))
}
