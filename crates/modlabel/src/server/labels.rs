use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use modlabel_core::hex::serde_hex;
use modlabel_core::{Address, LabelInfo};

use super::auth::check_auth;
use super::error::{map_label_error, AppError};
use super::SharedState;

// ==============================================================================
// DTOs
// ==============================================================================

#[derive(Serialize)]
pub(super) struct LabelResponse {
    #[serde(with = "serde_hex")]
    address: Address,
    text: String,
}

#[derive(Serialize)]
pub(super) struct AddressResponse {
    #[serde(with = "serde_hex")]
    address: Address,
}

#[derive(Serialize)]
pub(super) struct PurgeResponse {
    removed: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct SetLabelRequest {
    text: String,
    #[serde(default = "default_manual")]
    manual: bool,
}

fn default_manual() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct PurgeRequest {
    #[serde(with = "serde_hex")]
    start: Address,
    #[serde(with = "serde_hex")]
    end: Address,
}

#[derive(Deserialize)]
pub(super) struct LookupQuery {
    text: String,
}

// ==============================================================================
// Handlers
// ==============================================================================

pub(super) async fn list_labels(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<LabelInfo>>, AppError> {
    check_auth(&state.api_token, &headers)?;
    let mut labels = state.labels.enumerate().map_err(map_label_error)?;
    labels.sort_by_key(|info| info.address);
    Ok(Json(labels))
}

pub(super) async fn get_label(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(raw): Path<String>,
) -> Result<Json<LabelResponse>, AppError> {
    check_auth(&state.api_token, &headers)?;
    let address = parse_address(&raw)?;
    let text = state
        .labels
        .get_label(address)
        .ok_or_else(|| AppError::NotFound(format!("no label at {raw}")))?;
    Ok(Json(LabelResponse { address, text }))
}

pub(super) async fn set_label(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(raw): Path<String>,
    req: Result<Json<SetLabelRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&state.api_token, &headers)?;
    let address = parse_address(&raw)?;
    let Json(req) = req.map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .labels
        .set_label(address, &req.text, req.manual)
        .map_err(map_label_error)?;

    let status = if req.text.is_empty() { "deleted" } else { "set" };
    Ok(Json(serde_json::json!({ "status": status })))
}

pub(super) async fn delete_label(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(raw): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&state.api_token, &headers)?;
    let address = parse_address(&raw)?;
    if !state.labels.delete_label(address) {
        return Err(AppError::NotFound(format!("no label at {raw}")));
    }
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

pub(super) async fn clear_labels(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&state.api_token, &headers)?;
    state.labels.clear_all();
    Ok(Json(serde_json::json!({ "status": "cleared" })))
}

pub(super) async fn lookup_label(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<LookupQuery>,
) -> Result<Json<AddressResponse>, AppError> {
    check_auth(&state.api_token, &headers)?;
    let address = state
        .labels
        .find_label_by_text(&query.text)
        .ok_or_else(|| AppError::NotFound(format!("no label named `{}`", query.text)))?;
    Ok(Json(AddressResponse { address }))
}

pub(super) async fn purge_labels(
    State(state): State<SharedState>,
    headers: HeaderMap,
    req: Result<Json<PurgeRequest>, JsonRejection>,
) -> Result<Json<PurgeResponse>, AppError> {
    check_auth(&state.api_token, &headers)?;
    let Json(req) = req.map_err(|e| AppError::BadRequest(e.to_string()))?;
    let removed = state.labels.delete_labels_in_range(req.start, req.end);
    Ok(Json(PurgeResponse { removed }))
}

// ==============================================================================
// Helpers
// ==============================================================================

/// Parse a hex address from a path segment.
fn parse_address(raw: &str) -> Result<Address, AppError> {
    modlabel_core::hex::decode(raw)
        .ok_or_else(|| AppError::BadRequest(format!("invalid hex address `{raw}`")))
}
