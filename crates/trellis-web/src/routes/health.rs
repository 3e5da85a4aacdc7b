//! Health check endpoints

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use trellis_core::Registry;

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "trellis-web"
    }))
}

async fn ready_check(State(state): State<AppState>) -> Json<Value> {
    let status = if state.composers.is_empty() {
        "degraded"
    } else {
        "ready"
    };
    Json(json!({
        "status": status,
        "screens": state.composers.screen_ids(),
    }))
}
