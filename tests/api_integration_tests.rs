//! Integration Tests for API Endpoints
//!
//! Drives the full request/response cycle through the router, with the
//! service running local-only.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tiercache::{create_router, AppState, CacheService};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let cache = CacheService::local_only(100, Duration::from_secs(300));
    create_router(AppState::new(cache))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn put(app: &Router, key: &str, value: Value, ttl: Option<u64>) -> StatusCode {
    let mut body = json!({"key": key, "value": value});
    if let Some(ttl) = ttl {
        body["ttl"] = json!(ttl);
    }
    send(app, "PUT", "/set", Some(body)).await.0
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/set",
        Some(json!({"key": "test_key", "value": "test_value"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("test_key"));
    assert_eq!(json["key"], "test_key");
}

#[tokio::test]
async fn test_set_endpoint_empty_key() {
    let app = create_test_app();

    let (status, json) = send(&app, "PUT", "/set", Some(json!({"key": "", "value": 1}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_set_endpoint_invalid_json() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from("not valid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_returns_structured_value() {
    let app = create_test_app();
    let value = json!({"customer": "acme", "lines": [1, 2, 3], "paid": false});

    assert_eq!(put(&app, "invoice:7", value.clone(), None).await, StatusCode::OK);

    let (status, json) = send(&app, "GET", "/get/invoice:7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "invoice:7");
    assert_eq!(json["value"], value);
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/get/nonexistent", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nonexistent"));
}

#[tokio::test(start_paused = true)]
async fn test_get_after_ttl_expiry() {
    let app = create_test_app();
    put(&app, "short", json!("lived"), Some(1)).await;

    let (status, _) = send(&app, "GET", "/get/short", None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::advance(Duration::from_millis(1100)).await;

    let (status, _) = send(&app, "GET", "/get/short", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn test_zero_ttl_never_expires() {
    let app = create_test_app();
    put(&app, "forever", json!(true), Some(0)).await;

    tokio::time::advance(Duration::from_secs(10 * 24 * 3600)).await;

    let (status, json) = send(&app, "GET", "/get/forever", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], true);
}

#[tokio::test]
async fn test_max_u64_ttl_is_accepted() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "PUT",
        "/set",
        Some(json!({"key": "k", "value": 1, "ttl": u64::MAX})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "GET", "/get/k", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], 1);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();
    put(&app, "to_delete", json!(1), None).await;

    let (status, json) = send(&app, "DELETE", "/del/to_delete", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("deleted"));

    let (status, _) = send(&app, "GET", "/get/to_delete", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/del/to_delete", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == KEYS / CLEAR Endpoint Tests ==

#[tokio::test]
async fn test_keys_in_lru_order() {
    let app = create_test_app();
    for key in ["a", "b", "c"] {
        put(&app, key, json!(key), None).await;
    }
    // Reading "a" makes it most recently used
    send(&app, "GET", "/get/a", None).await;

    let (status, json) = send(&app, "GET", "/keys", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 3);
    assert_eq!(json["keys"], json!(["b", "c", "a"]));
}

#[tokio::test]
async fn test_keys_with_pattern() {
    let app = create_test_app();
    for key in ["user:1", "user:2", "order:1"] {
        put(&app, key, json!(0), None).await;
    }

    let (_, json) = send(&app, "GET", "/keys?pattern=user:*", None).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["keys"], json!(["user:1", "user:2"]));
}

#[tokio::test]
async fn test_clear_with_pattern_keeps_others() {
    let app = create_test_app();
    for key in ["report:2024:q1", "report:2024:q2", "profile:9"] {
        put(&app, key, json!(0), None).await;
    }

    let (status, json) = send(&app, "DELETE", "/clear?pattern=report:*", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pattern"], "report:*");

    let (_, json) = send(&app, "GET", "/keys", None).await;
    assert_eq!(json["keys"], json!(["profile:9"]));
}

#[tokio::test]
async fn test_clear_everything() {
    let app = create_test_app();
    put(&app, "x", json!(1), None).await;
    put(&app, "y", json!(2), None).await;

    let (status, json) = send(&app, "DELETE", "/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Cache cleared");

    let (_, json) = send(&app, "GET", "/keys", None).await;
    assert_eq!(json["count"], 0);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_track_hits_and_misses() {
    let app = create_test_app();
    put(&app, "k", json!("v"), None).await;
    send(&app, "GET", "/get/k", None).await;
    send(&app, "GET", "/get/k", None).await;
    send(&app, "GET", "/get/missing", None).await;

    let (status, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"], 2);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["sets"], 1);
    assert_eq!(json["remote_enabled"], false);
    assert_eq!(json["local"]["size"], 1);
    assert_eq!(json["local"]["max_size"], 100);

    let hit_rate = json["hit_rate"].as_f64().unwrap();
    assert!((hit_rate - 2.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_stats_counts_evictions() {
    let cache = CacheService::local_only(2, Duration::from_secs(300));
    let app = create_router(AppState::new(cache));

    for key in ["one", "two", "three"] {
        put(&app, key, json!(key), None).await;
    }

    let (_, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(json["local"]["size"], 2);
    assert_eq!(json["local"]["evictions"], 1);

    let (status, _) = send(&app, "GET", "/get/one", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["remote_enabled"], false);
    assert!(json.get("timestamp").is_some());
}
