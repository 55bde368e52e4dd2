use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::broadcast::BroadcastPublisher;
use crate::api::websocket::websocket_handler;
use crate::metadata::registry::MetadataRegistry;

pub struct ApiState {
    pub publisher: Arc<BroadcastPublisher>,
    pub registry: Arc<MetadataRegistry>,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .route("/spreads", get(latest_spreads))
        .route("/ws/spreads", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Whether identity metadata has loaded at least once. Dashboards are
/// expected (but not forced) to hold off consuming spreads until then.
async fn readiness(State(state): State<Arc<ApiState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ready": state.registry.is_ready() }))
}

async fn latest_spreads(State(state): State<Arc<ApiState>>) -> Json<serde_json::Value> {
    let analyses = state.publisher.latest();
    Json(serde_json::json!({
        "generatedAt": chrono::Utc::now().to_rfc3339(),
        "symbols": &*analyses,
    }))
}
