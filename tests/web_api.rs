//! HTTP-layer integration tests: routes, status codes, and the rate
//! limiter's interaction with the suggestions endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use otodoki_supply::catalog::{CatalogClient, CatalogClientConfig, Normalizer};
use otodoki_supply::models::Track;
use otodoki_supply::queue::TrackQueue;
use otodoki_supply::rate_limit::{RateLimiter, RateLimiterConfig};
use otodoki_supply::strategies::StrategyRotator;
use otodoki_supply::suggestions::SuggestionsService;
use otodoki_supply::web::{build_router, AppState};
use otodoki_supply::worker::{ReplenishmentWorker, ReplenishmentWorkerConfig};

fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        title: "title".to_string(),
        artist: "artist".to_string(),
        artwork_url: None,
        preview_url: Some("https://example.com/p.m4a".to_string()),
        album: None,
        genre: None,
        duration_ms: None,
    }
}

fn state_with(max_requests: usize) -> AppState {
    let queue = Arc::new(TrackQueue::new(100, 10));
    queue.enqueue((0..20).map(|i| track(&format!("t{i}"))).collect());

    let catalog = Arc::new(CatalogClient::new(CatalogClientConfig::default()).unwrap());
    let rotator = StrategyRotator::new(Vec::new());
    let normalizer = Normalizer::new(Duration::from_secs(60));
    let worker = Arc::new(ReplenishmentWorker::new(
        queue.clone(),
        catalog,
        rotator,
        normalizer,
        ReplenishmentWorkerConfig {
            min_threshold: 10,
            batch_size: 5,
            max_cap: 100,
            poll_interval: Duration::from_secs(3600),
            keyword_buffer_max: 20,
        },
    ));
    let suggestions = Arc::new(SuggestionsService::new(queue.clone(), Some(worker.clone()), 50));
    let rate_limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
        max_requests,
        window: Duration::from_secs(60),
    }));

    AppState {
        queue,
        worker,
        suggestions,
        rate_limiter,
    }
}

fn server_with(max_requests: usize) -> TestServer {
    let app = build_router(state_with(max_requests));
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let server = server_with(100);
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn suggestions_endpoint_returns_requested_count() {
    let server = server_with(100);
    let response = server.get("/suggestions?limit=5").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["meta"]["delivered"], 5);
}

#[tokio::test]
async fn suggestions_endpoint_rate_limits_after_threshold() {
    let server = server_with(1);
    let first = server.get("/suggestions").await;
    first.assert_status_ok();

    let second = server.get("/suggestions").await;
    second.assert_status(axum::http::StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn queue_stats_endpoint_reflects_enqueued_size() {
    let server = server_with(100);
    let response = server.get("/queue/stats").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["size"], 20);
    assert_eq!(body["capacity"], 100);
}

#[tokio::test]
async fn queue_health_endpoint_reports_degraded_below_threshold() {
    let server = server_with(100);
    let response = server.get("/queue/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn worker_stats_endpoint_reports_initial_state() {
    let server = server_with(100);
    let response = server.get("/worker/stats").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["tripped"], false);
    assert_eq!(body["consecutive_failures"], 0);
}

#[tokio::test]
async fn trigger_refill_endpoint_accepts_post() {
    let server = server_with(100);
    let response = server.post("/worker/trigger-refill").await;
    response.assert_status_ok();
}
