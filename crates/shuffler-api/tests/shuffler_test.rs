//! Integration tests for the selection engine routes.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use shuffler_engine::domain::config::{EngineConfig, GuardPolicy};
use shuffler_test_support::{FailingResultsSink, RecordingResultsSink};

const BASE: &str = "/api/v1/shuffler";

fn uri(path: &str) -> String {
    format!("{BASE}{path}")
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_initial_view_shows_pool_and_placeholders() {
    let (app, _) = common::build_test_app();

    let (status, json) = common::get_json(app, BASE).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "idle");
    assert_eq!(json["pool"], serde_json::json!([10, 20, 30]));
    let slots = json["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0]["label"], "FIRST PRIZE");
    assert!(slots.iter().all(|s| s["display"] == "?"));
    assert_eq!(json["can_pick"], true);
    assert_eq!(json["can_save"], false);
}

#[tokio::test(start_paused = true)]
async fn test_pick_reveals_third_second_first() {
    let (app, _) = common::build_test_app();

    let (status, json) = common::post_empty(app.clone(), &uri("/pick")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");
    assert_eq!(json["view"]["status"], "picking");

    sleep_ms(2000).await;
    let (_, json) = common::get_json(app.clone(), BASE).await;
    assert!(json["prizes"]["third"].is_i64());
    assert!(json["prizes"]["second"].is_null());
    assert!(json["prizes"]["first"].is_null());

    sleep_ms(1500).await;
    let (_, json) = common::get_json(app.clone(), BASE).await;
    assert!(json["prizes"]["second"].is_i64());
    assert!(json["prizes"]["first"].is_null());
    assert_eq!(json["status"], "picking");

    sleep_ms(1500).await;
    let (_, json) = common::get_json(app, BASE).await;
    assert_eq!(json["status"], "picked");
    let mut winners: Vec<i64> = ["first", "second", "third"]
        .iter()
        .map(|slot| json["prizes"][slot].as_i64().unwrap())
        .collect();
    winners.sort_unstable();
    assert_eq!(winners, vec![10, 20, 30]);
}

#[tokio::test(start_paused = true)]
async fn test_second_pick_while_picking_is_ignored() {
    let (app, _) = common::build_test_app();

    common::post_empty(app.clone(), &uri("/pick")).await;
    let (status, json) = common::post_empty(app, &uri("/pick")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "ignored");
    assert_eq!(json["view"]["status"], "picking");
}

#[tokio::test(start_paused = true)]
async fn test_shuffle_keeps_pool_values() {
    let (app, _) = common::build_test_app();

    let (_, json) = common::post_empty(app.clone(), &uri("/shuffle")).await;
    assert_eq!(json["view"]["status"], "shuffling");
    assert_eq!(json["view"]["can_pick"], false);

    sleep_ms(600).await;
    let (_, json) = common::get_json(app, BASE).await;
    assert_eq!(json["status"], "idle");
    let mut pool: Vec<i64> = json["pool"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    pool.sort_unstable();
    assert_eq!(pool, vec![10, 20, 30]);
}

#[tokio::test(start_paused = true)]
async fn test_save_before_pick_is_ignored() {
    let (app, sink) = common::build_test_app();

    let (status, json) = common::post_empty(app, &uri("/save")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "ignored");
    assert!(json["results"].is_null());
    assert!(sink.saved().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_save_after_pick_persists_results() {
    let mut config = EngineConfig::with_pool(vec![5]);
    config.prize_names.insert(5, "Grand Prize".to_owned());
    let sink = Arc::new(RecordingResultsSink::new());
    let app = common::build_test_app_with(config, sink.clone());

    common::post_empty(app.clone(), &uri("/pick")).await;
    sleep_ms(5000).await;
    let (status, json) = common::post_empty(app, &uri("/save")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");
    assert_eq!(json["message"], "Results saved.");
    assert_eq!(
        json["results"]["prizes"],
        serde_json::json!({ "first": 5, "second": 5, "third": 5 })
    );
    assert_eq!(json["results"]["prize_names"]["first"], "Grand Prize");

    let saved = sink.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].pool, vec![5]);
}

#[tokio::test(start_paused = true)]
async fn test_failing_sink_returns_502_and_keeps_results() {
    let app = common::build_test_app_with(EngineConfig::default(), Arc::new(FailingResultsSink));

    common::post_empty(app.clone(), &uri("/pick")).await;
    sleep_ms(5000).await;
    let (status, json) = common::post_empty(app.clone(), &uri("/save")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "persistence_error");

    let (_, json) = common::get_json(app, BASE).await;
    assert_eq!(json["status"], "picked");
}

#[tokio::test(start_paused = true)]
async fn test_reset_mid_pick_restores_idle() {
    let (app, _) = common::build_test_app();

    common::post_empty(app.clone(), &uri("/pick")).await;
    sleep_ms(2500).await;
    let (status, json) = common::post_empty(app.clone(), &uri("/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");
    assert_eq!(json["view"]["status"], "idle");

    sleep_ms(5000).await;
    let (_, json) = common::get_json(app.clone(), BASE).await;
    assert_eq!(json["status"], "idle");
    assert!(json["slots"].as_array().unwrap().iter().all(|s| s["display"] == "?"));

    let (_, json) = common::get_json(app, "/health").await;
    assert_eq!(json["pending_timers"], 0);
}

#[tokio::test(start_paused = true)]
async fn test_pick_on_empty_pool_returns_422() {
    let app = common::build_test_app_with(
        EngineConfig::with_pool(vec![]),
        Arc::new(RecordingResultsSink::new()),
    );

    let (status, json) = common::post_empty(app, &uri("/pick")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "empty_pool");
}

#[tokio::test(start_paused = true)]
async fn test_strict_guard_returns_409() {
    let config = EngineConfig {
        guard: GuardPolicy::Strict,
        ..EngineConfig::default()
    };
    let app = common::build_test_app_with(config, Arc::new(RecordingResultsSink::new()));

    common::post_empty(app.clone(), &uri("/shuffle")).await;
    let (status, json) = common::post_empty(app, &uri("/pick")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "precondition_violated");
}
