//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Sorted IDs of the participants currently connected
pub async fn online_participants(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.registry.online().await)
}
