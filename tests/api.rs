use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use perf_observatory::host::{HostEnvironment, ManualClock};
use perf_observatory::overlay::InMemorySurface;
use perf_observatory::{server, AppState, MetricsCollector, MonitorConfig};

fn app() -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0.0));
    let surface = Arc::new(InMemorySurface::new());
    let host = HostEnvironment::manual(clock.clone()).with_surface(surface.clone());
    let metrics = MetricsCollector::with_host(MonitorConfig::default(), host);
    let state = AppState::with_collector(metrics, surface);
    (server::create_router(state, "static"), clock)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn slow_blocks_come_back_slowest_first() {
    let (app, _) = app();
    for (name, ms) in [("A", 10.0), ("B", 20.0), ("C", 30.0), ("D", 15.0)] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/perf/blocks",
            Some(json!({ "name": name, "duration_ms": ms })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, body) = send_json(&app, "GET", "/api/perf/slow-blocks?threshold_ms=16", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["C", "B"]);

    // Default threshold is the configured 16 ms
    let (_, body) = send_json(&app, "GET", "/api/perf/slow-blocks", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn measure_between_marks() {
    let (app, clock) = app();
    send(&app, "POST", "/api/perf/marks", Some(json!({ "label": "a" }))).await;
    clock.advance(25.0);
    send(&app, "POST", "/api/perf/marks", Some(json!({ "label": "b" }))).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/perf/measures",
        Some(json!({ "label": "ab", "start": "a", "end": "b" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duration_ms"], json!(25.0));

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/perf/measures",
        Some(json!({ "label": "missing", "start": "a", "end": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["duration_ms"].is_null());

    let (_, report) = send_json(&app, "GET", "/api/perf/report", None).await;
    assert_eq!(report["measures"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let (app, _) = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/perf/blocks",
        Some(json!({ "name": "  ", "duration_ms": 3.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], json!(400));

    let (status, _) = send(
        &app,
        "POST",
        "/api/perf/renders",
        Some(json!({ "duration_ms": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/simulation/start",
        Some(json!({ "programs": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn start_stop_clear_cycle() {
    let (app, _) = app();
    let (_, body) = send_json(&app, "POST", "/api/perf/start", None).await;
    assert_eq!(body["active"], json!(true));
    assert_eq!(body["message"], json!("Monitoring started"));

    let (_, body) = send_json(&app, "POST", "/api/perf/start", None).await;
    assert_eq!(body["message"], json!("Monitoring already active"));

    send(&app, "POST", "/api/perf/renders", Some(json!({ "duration_ms": 4.0 }))).await;

    let (status, report) = send_json(&app, "POST", "/api/perf/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["active"], json!(false));
    assert_eq!(report["renders"], json!(1));
    assert!(report["session_id"].is_string());

    let (_, body) = send_json(&app, "POST", "/api/perf/clear", None).await;
    assert_eq!(body["active"], json!(false));
    let (_, export) = send_json(&app, "GET", "/api/perf/export", None).await;
    assert_eq!(export["report"]["renders"], json!(0));
    assert!(export["marks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn overlay_show_and_hide() {
    let (app, _) = app();
    let (status, _) = send(&app, "GET", "/api/perf/overlay", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send_json(&app, "POST", "/api/perf/overlay", None).await;
    assert_eq!(body["changed"], json!(true));
    let (_, body) = send_json(&app, "POST", "/api/perf/overlay", None).await;
    assert_eq!(body["changed"], json!(false));

    let (status, text) = send(&app, "GET", "/api/perf/overlay", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(text).unwrap().starts_with("FPS: "));

    let (_, body) = send_json(&app, "DELETE", "/api/perf/overlay", None).await;
    assert_eq!(body["changed"], json!(true));
    assert_eq!(body["visible"], json!(false));
}

#[tokio::test]
async fn responses_carry_server_timing() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/api/perf/report")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let header = response.headers()["server-timing"].to_str().unwrap();
    assert!(header.starts_with("handler;dur="));
}
