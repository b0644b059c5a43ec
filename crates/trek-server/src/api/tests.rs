use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{api, config::Config, persistence, state::AppState};

async fn setup_app(api_key: Option<&str>) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::from_env();
    config.api_key = api_key.map(str::to_string);

    let db = persistence::init_database(":memory:", 1)
        .await
        .expect("init db");
    let state = Arc::new(AppState::with_database(db, config.clone()));
    state.load_from_database().await.expect("load db");

    let app = api::routes(&config).with_state(state.clone());
    (app, state)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn log_body(id: &str, steps: u64, date: &str) -> Value {
    json!({
        "id": id,
        "memberId": "member-1",
        "steps": steps,
        "date": date,
        "timestamp": 0
    })
}

#[tokio::test]
async fn health_is_public() {
    let (app, _state) = setup_app(Some("secret")).await;
    let res = app.oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_and_list_logs_in_timestamp_order() {
    let (app, _state) = setup_app(None).await;

    let res = app
        .clone()
        .oneshot(json_request("POST", "/v1/logs", log_body("b", 3400, "2025-05-02T08:00:00Z")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = read_json(res).await;
    // Timestamp is derived from the date, whatever the client sent
    assert_eq!(created["timestamp"], 1_746_172_800_000i64);

    let res = app
        .clone()
        .oneshot(json_request("POST", "/v1/logs", log_body("a", 1200, "2025-05-01T08:00:00Z")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app.oneshot(empty_request("GET", "/v1/logs")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let logs = read_json(res).await;
    let ids: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn rejects_duplicate_and_zero_step_logs() {
    let (app, _state) = setup_app(None).await;
    let body = log_body("dup", 100, "2025-05-01T08:00:00Z");

    let res = app.clone().oneshot(json_request("POST", "/v1/logs", body.clone())).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = app.clone().oneshot(json_request("POST", "/v1/logs", body)).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .oneshot(json_request("POST", "/v1/logs", log_body("zero", 0, "2025-05-01T08:00:00Z")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejects_oversized_step_counts() {
    let (app, state) = setup_app(None).await;
    let huge = i64::MAX as u64;

    let res = app
        .clone()
        .oneshot(json_request("POST", "/v1/logs", log_body("huge", huge, "2025-05-01T08:00:00Z")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(state.get_log("huge").is_none());

    let res = app
        .clone()
        .oneshot(json_request("POST", "/v1/logs", log_body("ok", 1_000_000, "2025-05-01T08:00:00Z")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .oneshot(json_request("PATCH", "/v1/logs/ok", json!({ "steps": 1_000_001 })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.get_log("ok").unwrap().steps, 1_000_000);
}

#[tokio::test]
async fn patch_updates_fields() {
    let (app, state) = setup_app(None).await;
    app.clone()
        .oneshot(json_request("POST", "/v1/logs", log_body("p", 100, "2025-05-01T08:00:00Z")))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/v1/logs/p",
            json!({ "steps": 900, "date": "2025-05-03T10:00:00Z" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["steps"], 900);
    assert_eq!(body["memberId"], "member-1");

    let stored = state.get_log("p").unwrap();
    assert_eq!(stored.steps, 900);
    assert_eq!(stored.timestamp, stored.date.timestamp_millis());

    let res = app
        .clone()
        .oneshot(json_request("PATCH", "/v1/logs/p", json!({})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .oneshot(json_request("PATCH", "/v1/logs/missing", json!({ "steps": 5 })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_log_then_not_found() {
    let (app, _state) = setup_app(None).await;
    app.clone()
        .oneshot(json_request("POST", "/v1/logs", log_body("d", 100, "2025-05-01T08:00:00Z")))
        .await
        .unwrap();

    let res = app.clone().oneshot(empty_request("DELETE", "/v1/logs/d")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app.clone().oneshot(empty_request("DELETE", "/v1/logs/d")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.oneshot(empty_request("GET", "/v1/logs/d")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_key_is_enforced() {
    let (app, _state) = setup_app(Some("secret")).await;

    let res = app.clone().oneshot(empty_request("GET", "/v1/logs")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .uri("/v1/logs")
        .header("authorization", "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(wrong).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let right = Request::builder()
        .uri("/v1/logs")
        .header("authorization", "Bearer secret")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(right).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.oneshot(empty_request("GET", "/v1/logs?token=secret")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
