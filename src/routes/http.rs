// GET handlers: version, api/sessions, api/info

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use super::AppState;
use crate::assembler::build_system;
use crate::version::VersionInfo;

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(VersionInfo::current())
}

/// GET /api/sessions: live viewer sessions, oldest first.
pub(super) async fn sessions_handler(State(state): State<AppState>) -> impl IntoResponse {
    let sessions: Vec<serde_json::Value> = state
        .registry
        .list()
        .into_iter()
        .map(|(id, created_at)| {
            serde_json::json!({ "id": id, "createdAt": created_at.to_rfc3339() })
        })
        .collect();
    axum::Json(serde_json::json!({
        "activeSessions": sessions.len(),
        "sessions": sessions,
    }))
}

/// GET /api/info: host identity, read on demand.
pub(super) async fn api_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.source.read_system().await {
        Ok(raw) => axum::Json(build_system(raw)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, operation = "read_system", "api/info failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(serde_json::json!({ "error": format!("{e:#}") })),
            )
                .into_response()
        }
    }
}
