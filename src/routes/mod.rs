// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::counter_source::CounterSource;
use crate::registry::SessionRegistry;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) registry: Arc<SessionRegistry>,
    pub(crate) source: Arc<dyn CounterSource>,
    pub(crate) config: AppConfig,
}

pub fn app(
    registry: Arc<SessionRegistry>,
    source: Arc<dyn CounterSource>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        registry,
        source,
        config,
    };
    Router::new()
        .route("/", get(|| async { "resmon: host resource monitor" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/sessions", get(http::sessions_handler)) // GET /api/sessions
        .route("/api/info", get(http::api_info_handler)) // GET /api/info
        .route("/ws", get(ws::ws_metrics)) // WS /ws
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
