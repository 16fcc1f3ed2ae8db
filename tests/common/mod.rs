// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use trainlog::config::Config;
use trainlog::db::{MemorySessionStore, SessionStore, SqlSessionStore};
use trainlog::models::{CreateSessionRequest, NewTrainingSession};
use trainlog::routes::create_router;
use trainlog::AppState;

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    build_app(Arc::new(MemorySessionStore::new()))
}

/// Create a test app backed by SQLite in memory through Sea-ORM.
#[allow(dead_code)]
pub async fn create_sql_test_app() -> (axum::Router, Arc<AppState>) {
    build_app(Arc::new(test_sql_store().await))
}

/// Router over an arbitrary store.
#[allow(dead_code)]
pub fn build_app(store: Arc<dyn SessionStore>) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), store));
    (create_router(state.clone()), state)
}

/// Fresh SQLite in-memory store with schema.
#[allow(dead_code)]
pub async fn test_sql_store() -> SqlSessionStore {
    test_sql_store_pooled(1).await
}

/// Like `test_sql_store`, with `max_connections` pooled connections sharing
/// the one in-memory database.
#[allow(dead_code)]
pub async fn test_sql_store_pooled(max_connections: u32) -> SqlSessionStore {
    let mut config = Config::test_default();
    config.db_max_connections = max_connections;
    let store = SqlSessionStore::connect("sqlite::memory:", &config)
        .await
        .expect("Failed to open in-memory SQLite");
    store.ensure_schema().await.expect("Failed to create schema");
    store
}

/// Create a JWT the way the identity service does (`id` claim).
#[allow(dead_code)]
pub fn create_test_jwt(client_id: i64, signing_key: &[u8]) -> String {
    sign(json!({"id": client_id, "exp": now() + 3600}), signing_key)
}

/// Correctly signed token whose expiry is an hour in the past.
#[allow(dead_code)]
pub fn create_expired_jwt(client_id: i64, signing_key: &[u8]) -> String {
    sign(json!({"id": client_id, "exp": now() - 3600}), signing_key)
}

fn sign(claims: Value, signing_key: &[u8]) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .expect("Failed to create JWT")
}

/// Create-session body for `client_id`.
#[allow(dead_code)]
pub fn session_payload(client_id: i64, is_ready: bool) -> Value {
    json!({
        "client_id": client_id,
        "typetrain": "legs",
        "date_train_time": "2024-01-01T10:00:00Z",
        "time_train": "10:00",
        "end_time": "11:00",
        "exercises": [{"name": "squat", "sets": 3, "reps": 10}],
        "is_ready": is_ready
    })
}

/// Validated domain input for store-level tests.
#[allow(dead_code)]
pub fn new_session(client_id: i64, is_ready: bool) -> NewTrainingSession {
    let request: CreateSessionRequest =
        serde_json::from_value(session_payload(client_id, is_ready)).unwrap();
    request.try_into().expect("payload should validate")
}

/// Send a request and decode the JSON body.
#[allow(dead_code)]
pub async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be JSON")
    };
    (status, body)
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

#[allow(dead_code)]
pub fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Create a session over HTTP and return its id.
#[allow(dead_code)]
pub async fn create_via_api(app: &axum::Router, client_id: i64, is_ready: bool) -> i64 {
    let (status, body) = send(
        app,
        post_json("/client/new_trainer", &session_payload(client_id, is_ready)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    body["id"].as_i64().expect("id should be an integer")
}
