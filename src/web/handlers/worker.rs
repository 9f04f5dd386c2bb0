use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::web::AppState;

pub async fn stats(State(state): State<AppState>) -> Json<crate::worker::WorkerStats> {
    Json(state.worker.stats())
}

pub async fn trigger_refill(State(state): State<AppState>) -> Json<Value> {
    let refilled = state.worker.trigger_refill().await;
    Json(json!({ "triggered": refilled }))
}
