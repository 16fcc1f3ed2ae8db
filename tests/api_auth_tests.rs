// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token handling on the protected client routes.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

mod common;
use common::{authed, create_expired_jwt, create_test_jwt, create_via_api, send};

const PROTECTED: &[(&str, &str)] = &[
    ("GET", "/client/my_trains"),
    ("GET", "/client/my_trains/1"),
    ("PUT", "/client/toggle_ready/1"),
];

#[tokio::test]
async fn test_missing_header_is_rejected_everywhere() {
    let (app, _) = common::create_test_app();

    for (method, uri) in PROTECTED {
        let request = Request::builder()
            .method(*method)
            .uri(*uri)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"], "auth_header_missing", "{method} {uri}");
    }
}

#[tokio::test]
async fn test_non_bearer_scheme_is_malformed() {
    let (app, _) = common::create_test_app();

    for value in ["Basic dXNlcjpwYXNz", "Token abc", "bearer"] {
        let request = Request::builder()
            .uri("/client/my_trains")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{value}");
        assert_eq!(body["error"], "auth_header_malformed", "{value}");
    }
}

#[tokio::test]
async fn test_expired_token() {
    let (app, state) = common::create_test_app();
    let token = create_expired_jwt(1, &state.config.jwt_secret);

    let (status, body) = send(&app, authed("GET", "/client/my_trains", &token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_expired");
}

#[tokio::test]
async fn test_wrong_key_is_invalid() {
    let (app, _) = common::create_test_app();
    let token = create_test_jwt(1, b"some_other_key_that_is_long_enough");

    let (status, body) = send(&app, authed("GET", "/client/my_trains", &token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_invalid");
}

#[tokio::test]
async fn test_garbage_token_is_invalid() {
    let (app, _) = common::create_test_app();

    let (status, body) = send(&app, authed("GET", "/client/my_trains", "not.a.jwt")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_invalid");
}

#[tokio::test]
async fn test_rejection_carries_bearer_challenge() {
    let (app, _) = common::create_test_app();
    let request = Request::builder()
        .uri("/client/my_trains")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn test_rejected_toggle_leaves_session_alone() {
    let (app, state) = common::create_test_app();
    let id = create_via_api(&app, 1, false).await;
    let expired = create_expired_jwt(1, &state.config.jwt_secret);

    let (status, _) = send(
        &app,
        authed("PUT", &format!("/client/toggle_ready/{id}"), &expired),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let session = state.store.find_by_id_for_owner(id, 1).await.unwrap();
    assert!(!session.is_ready);
}

#[tokio::test]
async fn test_create_does_not_need_a_token() {
    let (app, _) = common::create_test_app();
    let id = create_via_api(&app, 7, false).await;
    assert!(id > 0);
}

#[tokio::test]
async fn test_cors_preflight_from_localhost() {
    let (app, _) = common::create_test_app();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/client/my_trains")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let (app, _) = common::create_test_app();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/client/my_trains")
        .header(header::ORIGIN, "https://evil.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
