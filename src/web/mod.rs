//! HTTP transport surface: routing and serialization for the candidate
//! supply pipeline. Thin handlers delegate to the Suggestions Service, the
//! Track Queue, and the Replenishment Worker.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::queue::TrackQueue;
use crate::rate_limit::RateLimiter;
use crate::suggestions::SuggestionsService;
use crate::worker::ReplenishmentWorker;

#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<TrackQueue>,
    pub worker: Arc<ReplenishmentWorker>,
    pub suggestions: Arc<SuggestionsService>,
    pub rate_limiter: Arc<RateLimiter>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/suggestions", get(handlers::suggestions::get_suggestions))
        .route("/queue/stats", get(handlers::queue::stats))
        .route("/queue/health", get(handlers::queue::health))
        .route("/worker/stats", get(handlers::worker::stats))
        .route("/worker/trigger-refill", post(handlers::worker::trigger_refill))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
