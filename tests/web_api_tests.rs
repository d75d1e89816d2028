//! Integration tests for the FingerMath Web API.
//!
//! These tests require the `web` feature to be enabled:
//! ```bash
//! cargo test --features web web_api
//! ```

#![cfg(feature = "web")]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use fingermath::config::Config;
use fingermath::web::{create_router, AppState};

mod fixtures;
use fixtures::{hand_landmarks, parse_prompt, record_showing};

/// Creates a test AppState with default settings and the given lock window.
fn create_test_state(lock_duration_ms: u64) -> AppState {
    let mut config = Config::new();
    config.session.lock_duration_ms = lock_duration_ms;
    AppState::new(config)
}

/// Sends a request and returns the status and JSON body.
async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a GET request and get the response body as JSON.
async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

/// Helper to make a POST request with a JSON body.
async fn post_json(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Starts a session and returns its JSON.
async fn create_session(app: &axum::Router) -> Value {
    let (status, json) = send(app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    json
}

/// Answer of the problem shown in a session snapshot.
fn answer_of(session: &Value) -> u8 {
    let prompt = session["display"]["problem_text"].as_str().unwrap();
    parse_prompt(prompt).answer()
}

// ============================================================================
// Health and Info
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router(create_test_state(1500));

    let (status, json) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_info_reports_detector_options_and_rules() {
    let app = create_router(create_test_state(1500));

    let (status, json) = get_json(&app, "/api/info").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["detector"]["max_num_hands"], 1);
    assert_eq!(json["detector"]["model_complexity"], 1);
    assert_eq!(json["capture"]["width"], 640);
    assert_eq!(json["capture"]["height"], 480);
    assert_eq!(json["lock_duration_ms"], 1500);
    assert_eq!(json["failure_threshold"], 3);
    assert_eq!(json["operators"], json!(["+", "-", "*", "/"]));
    assert_eq!(json["answer_range"], json!({"min": 0, "max": 5}));
    assert_eq!(json["count_range"], json!({"min": -1, "max": 4}));
    assert_eq!(json["max_reachable_count"], 4);
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
async fn test_pages_are_served() {
    let app = create_router(create_test_state(1500));

    for (uri, mime) in [
        ("/", "text/html"),
        ("/camera", "text/html"),
        ("/js/counting.js", "javascript"),
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.contains(mime), "{uri}: {content_type}");
    }
}

#[tokio::test]
async fn test_unknown_asset_is_not_found() {
    let app = create_router(create_test_state(1500));

    let response = app
        .oneshot(Request::builder().uri("/missing.js").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Session Lifecycle
// ============================================================================

#[tokio::test]
async fn test_create_and_get_session() {
    let app = create_router(create_test_state(1500));

    let created = create_session(&app).await;
    let id = created["id"].as_str().unwrap();
    assert!(created["display"]["finger_count"].is_null());
    assert_eq!(created["display"]["success_visible"], false);
    assert_eq!(created["is_locked"], false);
    assert!(created["problem"].get("answer").is_none());

    let (status, json) = get_json(&app, &format!("/api/sessions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id);
    assert_eq!(json["display"]["problem_text"], created["display"]["problem_text"]);
}

#[tokio::test]
async fn test_delete_session() {
    let app = create_router(create_test_state(1500));
    let created = create_session(&app).await;
    let uri = format!("/api/sessions/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("not found"));

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_session_id_rejected() {
    let app = create_router(create_test_state(1500));

    let (status, json) = get_json(&app, "/api/sessions/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid session id");

    let unknown = "/api/sessions/00000000-0000-4000-8000-000000000000";
    let (status, _) = get_json(&app, unknown).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_limit() {
    let app = create_router(AppState::with_session_limit(Config::new(), 1));
    create_session(&app).await;

    let (status, json) = send(&app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "Too many active sessions");
}

// ============================================================================
// Detections
// ============================================================================

#[tokio::test]
async fn test_no_hand_detection_shows_placeholder() {
    let app = create_router(create_test_state(1500));
    let created = create_session(&app).await;
    let uri = format!("/api/sessions/{}/detections", created["id"].as_str().unwrap());

    let (status, json) = post_json(&app, &uri, json!({ "landmarks": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["verdict"].is_null());
    assert!(json["session"]["display"]["finger_count"].is_null());
    assert_eq!(json["session"]["frames_received"], 1);
    assert_eq!(json["session"]["is_locked"], false);

    // Missing field means no hand as well
    let (status, json) = post_json(&app, &uri, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["session"]["frames_received"], 2);
}

#[tokio::test]
async fn test_wrong_then_locked() {
    let app = create_router(create_test_state(60_000));
    let created = create_session(&app).await;
    let uri = format!("/api/sessions/{}/detections", created["id"].as_str().unwrap());

    // Pick a count that is valid but wrong
    let answer = answer_of(&created);
    let wrong: i8 = if answer == 0 { 1 } else { 0 };
    let record = serde_json::to_value(record_showing(wrong)).unwrap();

    let (status, json) = post_json(&app, &uri, record.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["verdict"]["result"], "wrong");
    assert_eq!(json["verdict"]["consecutive_failures"], 1);
    assert_eq!(json["session"]["display"]["retry_visible"], true);
    assert_eq!(json["session"]["is_locked"], true);
    assert!(json["session"]["lock_remaining_ms"].as_u64().unwrap() > 0);

    // Suppressed while locked, but the count still follows the hand
    let (_, json) = post_json(&app, &uri, serde_json::to_value(record_showing(3)).unwrap()).await;
    assert!(json["verdict"].is_null());
    assert_eq!(json["session"]["display"]["finger_count"], 3);
    assert_eq!(json["session"]["attempts"], 1);
    assert_eq!(json["session"]["consecutive_failures"], 1);
}

#[tokio::test]
async fn test_correct_answer_then_next_problem() {
    let app = create_router(create_test_state(30));

    // Answers of 5 cannot be shown with one hand; start over until a
    // reachable one comes up.
    let (created, answer) = loop {
        let created = create_session(&app).await;
        let answer = answer_of(&created);
        if answer <= 4 {
            break (created, answer);
        }
        let uri = format!("/api/sessions/{}", created["id"].as_str().unwrap());
        send(&app, "DELETE", &uri, None).await;
    };
    let id = created["id"].as_str().unwrap();

    let record = serde_json::to_value(record_showing(i8::try_from(answer).unwrap())).unwrap();
    let (status, json) = post_json(&app, &format!("/api/sessions/{id}/detections"), record).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["verdict"]["result"], "correct");
    assert_eq!(json["session"]["display"]["success_visible"], true);
    assert_eq!(json["session"]["correct"], 1);

    tokio::time::sleep(std::time::Duration::from_millis(80)).await;

    let (_, json) = get_json(&app, &format!("/api/sessions/{id}")).await;
    assert_eq!(json["is_locked"], false);
    assert_eq!(json["display"]["success_visible"], false);
    assert_eq!(json["consecutive_failures"], 0);
    assert!(json.get("lock_remaining_ms").is_none());
}

#[tokio::test]
async fn test_malformed_landmarks_rejected() {
    let app = create_router(create_test_state(1500));
    let created = create_session(&app).await;
    let uri = format!("/api/sessions/{}/detections", created["id"].as_str().unwrap());

    let too_few: Vec<Value> = hand_landmarks(2)[..20]
        .iter()
        .map(|p| json!({"x": p.x, "y": p.y, "z": p.z}))
        .collect();
    let (status, json) = post_json(&app, &uri, json!({ "landmarks": too_few })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid detection");
    assert!(json["details"].as_str().unwrap().contains("21"));

    // The rejected frame was never counted
    let (_, json) = get_json(&app, &format!("/api/sessions/{}", created["id"].as_str().unwrap())).await;
    assert_eq!(json["frames_received"], 0);
}

#[tokio::test]
async fn test_detection_for_unknown_session() {
    let app = create_router(create_test_state(1500));

    let (status, _) = post_json(
        &app,
        "/api/sessions/00000000-0000-4000-8000-000000000000/detections",
        json!({ "landmarks": null }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
