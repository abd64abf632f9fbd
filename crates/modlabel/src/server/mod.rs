mod auth;
mod error;
mod labels;
mod session;
mod target;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get, post, put};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};

use modlabel_core::{LabelStore, ProcessSnapshot};

// ==============================================================================
// Application State
// ==============================================================================

pub struct AppState {
    pub labels: Arc<LabelStore>,
    pub target: Arc<ProcessSnapshot>,
    pub session_path: Option<PathBuf>,
    pub api_token: String,
}

type SharedState = Arc<AppState>;

// ==============================================================================
// Router
// ==============================================================================

pub fn build_router(state: AppState, origin: &str) -> eyre::Result<Router> {
    // Only reflect the allowed origin when the request's Origin header
    // actually matches.
    let allowed: axum::http::HeaderValue = origin.parse()?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |request_origin: &axum::http::HeaderValue, _| *request_origin == allowed,
        ))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            auth::API_TOKEN_HEADER,
        ]);

    let shared = Arc::new(state);

    // Label bodies are a short text plus a flag; anything bigger is abuse.
    const LABEL_BODY_LIMIT: usize = 16 * 1024;

    let label_routes = Router::new()
        .route(
            "/api/v1/labels",
            get(labels::list_labels).delete(labels::clear_labels),
        )
        .route("/api/v1/labels/lookup", get(labels::lookup_label))
        .route("/api/v1/labels/purge", post(labels::purge_labels))
        .route(
            "/api/v1/labels/{address}",
            put(labels::set_label)
                .get(labels::get_label)
                .delete(labels::delete_label),
        )
        .layer(DefaultBodyLimit::max(LABEL_BODY_LIMIT));

    let protected_api = Router::new()
        .route("/api/v1/session/save", post(session::save_session))
        .route("/api/v1/session/load", post(session::load_session))
        .route("/api/v1/target/modules", get(target::list_modules))
        .route(
            "/api/v1/target/modules/{name}/relocate",
            post(target::relocate_module),
        )
        .route("/api/v1/target/detach", post(target::detach))
        .merge(label_routes);

    Ok(Router::new()
        .route("/api/v1/health", get(health))
        .merge(protected_api)
        .route("/api", any(api_not_found))
        .route("/api/{*path}", any(api_not_found))
        .layer(cors)
        .with_state(shared))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn api_not_found() -> error::AppError {
    error::AppError::NotFound("API route not found".to_string())
}
