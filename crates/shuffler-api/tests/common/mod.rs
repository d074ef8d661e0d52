//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use shuffler_core::clock::Clock;
use shuffler_core::rng::SystemRng;
use shuffler_core::sink::ResultsSink;
use shuffler_engine::application::service::EngineService;
use shuffler_engine::domain::config::EngineConfig;
use shuffler_test_support::{FixedClock, RecordingResultsSink};
use tower::ServiceExt;

use shuffler_api::routes;
use shuffler_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router around a default engine and a recording sink.
pub fn build_test_app() -> (Router, Arc<RecordingResultsSink>) {
    let sink = Arc::new(RecordingResultsSink::new());
    let app = build_test_app_with(EngineConfig::default(), sink.clone());
    (app, sink)
}

/// Build the full app router with a custom engine configuration and sink.
/// Uses the same route structure as `main.rs`.
pub fn build_test_app_with(config: EngineConfig, sink: Arc<dyn ResultsSink>) -> Router {
    let engine = EngineService::spawn(
        config,
        fixed_clock(),
        Box::new(SystemRng::seeded(2026)),
        sink,
    )
    .unwrap();
    let app_state = AppState::new(Arc::new(engine));

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/shuffler", routes::shuffler::router())
        .with_state(app_state)
}

/// Send a POST request with an empty body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
