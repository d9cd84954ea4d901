//! Control API tests against the fully layered router.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use netswitch::config::{ConfigStore, Mode};
use netswitch::http::server::{build_router, AppState};

mod common;

fn router(store: Arc<ConfigStore>, api_key: Option<&str>) -> Router {
    build_router(
        AppState {
            store,
            api_key: api_key.map(Arc::from),
        },
        Duration::from_secs(5),
    )
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}

fn tuning(interval_ms: i64) -> Value {
    json!({
        "rtt_settings_ms": 80.0,
        "packet_loss_percent": 10.0,
        "pinger_count": 5,
        "pinger_interval_ms": interval_ms,
        "ping_blocks_num": 2,
    })
}

#[tokio::test]
async fn test_get_info() {
    let store = common::store(Mode::Auto);
    let (status, body) = send(router(store, None), get("/get_info")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rtt_settings"], 100.0);
    assert_eq!(body["packet_loss_settings_percent"], 5.0);
    assert_eq!(body["pinger_count"], 1);
    assert_eq!(body["pinger_interval_ms"], 20);
    assert_eq!(body["ping_blocks_num"], 1);
    assert_eq!(body["network_switch_mode"], "auto");
    assert_eq!(body["current_interface"], "eth0");
    assert_eq!(body["alive_main_network"], false);
    assert_eq!(body["alive_reserve_network"], false);
}

#[tokio::test]
async fn test_configure_applies_all_fields() {
    let store = common::store(Mode::Auto);
    let (status, body) = send(router(store.clone(), None), post("/configure", tuning(200))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rtt_settings"], 80.0);
    assert_eq!(body["pinger_interval_ms"], 200);

    let settings = store.snapshot();
    assert_eq!(settings.rtt_threshold_ms, 80.0);
    assert_eq!(settings.packet_loss_threshold_percent, 10.0);
    assert_eq!(settings.probe_count, 5);
    assert_eq!(settings.probe_interval_ms, 200);
    assert_eq!(settings.probe_rounds, 2);
}

#[tokio::test]
async fn test_configure_rejects_short_interval() {
    let store = common::store(Mode::Auto);
    let before = store.snapshot();

    let (status, body) = send(router(store.clone(), None), post("/configure", tuning(5))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body.as_str().unwrap();
    assert!(message.starts_with("validation: "), "{}", message);
    assert!(message.contains("pinger_interval_ms"), "{}", message);

    let after = store.snapshot();
    assert_eq!(after.probe_interval_ms, before.probe_interval_ms);
    assert_eq!(after.rtt_threshold_ms, before.rtt_threshold_ms);
}

#[tokio::test]
async fn test_configure_rejects_malformed_body() {
    let store = common::store(Mode::Auto);
    let (status, body) = send(
        router(store, None),
        post("/configure", json!({ "rtt_settings_ms": "fast" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap().starts_with("validation: "));
}

#[tokio::test]
async fn test_set_network_mode() {
    let store = common::store(Mode::Auto);
    let mut modes = store.subscribe_mode();

    let (status, body) = send(
        router(store.clone(), None),
        post("/set_network_mode", json!({ "network_switch_mode": "reserve" })),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, "network mode: reserve");
    assert_eq!(store.mode(), Mode::Reserve);
    assert!(modes.has_changed().unwrap());
}

#[tokio::test]
async fn test_set_network_mode_rejects_unknown() {
    let store = common::store(Mode::Auto);
    let (status, body) = send(
        router(store.clone(), None),
        post("/set_network_mode", json!({ "network_switch_mode": "backup" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap().contains("backup"));
    assert_eq!(store.mode(), Mode::Auto);
}

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let store = common::store(Mode::Auto);

    let (status, _) = send(router(store.clone(), Some("secret")), get("/get_info")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut request = get("/get_info");
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer wrong".parse().unwrap());
    let (status, _) = send(router(store.clone(), Some("secret")), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut request = get("/get_info");
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer secret".parse().unwrap());
    let (status, _) = send(router(store, Some("secret")), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let store = common::store(Mode::Auto);
    let response = router(store, None).oneshot(get("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
