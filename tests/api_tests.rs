//! API tests driving the router in process

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use library_circulation::{
    api::create_router, clock::ManualClock, config::AppConfig, repository::MemoryStore, AppState,
};

fn app() -> Router {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    let state = AppState::new(
        AppConfig::default(),
        Arc::new(MemoryStore::new()),
        Arc::new(clock),
    );
    create_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_borrow_and_return_over_http() {
    let app = app();

    let (status, copy) = send(
        &app,
        Method::POST,
        "/api/v1/copies",
        Some(json!({ "isbn": "111", "library_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["status"], "AtLibrary");

    let (status, request) = send(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(json!({ "user_id": 1, "isbn": "111", "library_id": 1, "status": "Requested" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["physical_copy_id"], copy["id"]);

    let (_, availability) = send(
        &app,
        Method::GET,
        "/api/v1/books/111/libraries/1/available",
        None,
    )
    .await;
    assert_eq!(availability["available"], 0);
    assert!(availability["copy"].is_null());

    let uri = format!("/api/v1/requests/{}/status", request["id"]);
    let (status, returned) = send(&app, Method::PUT, &uri, Some(json!({ "status": "Returned" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], "Returned");

    let (_, availability) = send(&app, Method::GET, "/api/v1/books/111/availability", None).await;
    assert_eq!(availability, json!([{ "library_id": 1, "available": 1 }]));
}

#[tokio::test]
async fn test_errors_carry_status_and_code() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/requests/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(json!({ "user_id": 1, "isbn": "222", "library_id": 1, "status": "Requested" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "NoCopyAvailable");
    assert_eq!(body["code"], 8);
}

#[tokio::test]
async fn test_transfer_flow_over_http() {
    let app = app();

    let (_, copy) = send(
        &app,
        Method::POST,
        "/api/v1/copies",
        Some(json!({ "isbn": "333", "library_id": 1 })),
    )
    .await;

    let (status, transfer) = send(
        &app,
        Method::POST,
        "/api/v1/transfers",
        Some(json!({
            "physical_copy_id": copy["id"],
            "source_library_id": 1,
            "destination_library_id": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(transfer["status"], "Pending");

    let (_, notifications) = send(&app, Method::GET, "/api/v1/libraries/1/notifications", None).await;
    assert_eq!(notifications[0]["title"], "Transfer requested");

    let accept = format!("/api/v1/transfers/{}/accept", transfer["id"]);
    let (status, accepted) = send(&app, Method::POST, &accept, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "Accepted");

    let (status, _) = send(&app, Method::POST, &accept, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let receive = format!("/api/v1/copies/{}/receive", copy["id"]);
    let (status, received) = send(&app, Method::POST, &receive, Some(json!({ "library_id": 2 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(received["library_id"], 2);
    assert_eq!(received["status"], "AtLibrary");
}

#[tokio::test]
async fn test_punishment_level_bounds() {
    let app = app();

    send(
        &app,
        Method::POST,
        "/api/v1/copies",
        Some(json!({ "isbn": "111", "library_id": 1 })),
    )
    .await;
    let (_, request) = send(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(json!({ "user_id": 4, "isbn": "111", "library_id": 1, "status": "Requested" })),
    )
    .await;

    let (status, punishment) = send(
        &app,
        Method::POST,
        "/api/v1/punishments",
        Some(json!({ "request_id": request["id"], "reason": "Late" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(punishment["level"], 1);

    let uri = format!("/api/v1/punishments/{}/level", punishment["id"]);
    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "level": 6 }))).await;
    assert!(status.is_client_error());

    let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({ "level": 3 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["level"], 3);
}
