use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::web::AppState;

pub async fn stats(State(state): State<AppState>) -> Json<crate::queue::QueueStats> {
    Json(state.queue.stats())
}

/// Derived status: `"ok"` at or above the low watermark, `"degraded"` below.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let stats = state.queue.stats();
    let status = if stats.size >= state.worker.min_threshold() {
        "ok"
    } else {
        "degraded"
    };
    Json(json!({ "status": status, "size": stats.size, "capacity": stats.capacity }))
}
