// SPDX-License-Identifier: MIT

//! OTP endpoint tests.
//!
//! Exercise the wire contract end to end against an offline app:
//! exact success/error bodies, challenge overwrite semantics, and the
//! delivery-failure rollback.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;
use common::{create_test_app, seed_identity};

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_send_otp_success_body() {
    let (app, state, mailer) = create_test_app();
    seed_identity(&state.store, "u1", "a@gmail.com", "94771234567");

    let response = app
        .oneshot(post_json(
            "/api/send-otp",
            serde_json::json!({"email": "a@gmail.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "OTP sent");

    let sent = mailer.sent_mail();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@gmail.com");
}

#[tokio::test]
async fn test_send_otp_unknown_handle() {
    let (app, state, _mailer) = create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/send-otp",
            serde_json::json!({"email": "nobody@gmail.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Email or Phone not found");
    assert!(state.store.get_challenge("nobody@gmail.com").is_none());
}

#[tokio::test]
async fn test_send_otp_delivery_failure_is_500_and_rolls_back() {
    let (app, state, mailer) = create_test_app();
    seed_identity(&state.store, "u1", "a@gmail.com", "");

    mailer.fail_next_send();
    let response = app
        .oneshot(post_json(
            "/api/send-otp",
            serde_json::json!({"email": "a@gmail.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "Failed to send OTP");
    // No challenge survives a failed dispatch.
    assert!(state.store.get_challenge("a@gmail.com").is_none());
}

#[tokio::test]
async fn test_verify_otp_cycle() {
    let (app, state, _mailer) = create_test_app();
    seed_identity(&state.store, "u1", "a@gmail.com", "");

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/send-otp",
            serde_json::json!({"email": "a@gmail.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let code = state.store.get_challenge("a@gmail.com").unwrap().code;

    // Wrong code: 400, challenge kept for retry.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/verify-otp",
            serde_json::json!({"email": "a@gmail.com", "otp": "000000"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid or expired OTP");
    assert!(state.store.get_challenge("a@gmail.com").is_some());

    // Right code: 200, challenge consumed.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/verify-otp",
            serde_json::json!({"email": "a@gmail.com", "otp": code.clone()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "OTP verified");
    assert!(state.store.get_challenge("a@gmail.com").is_none());

    // Same code again: already consumed.
    let response = app
        .oneshot(post_json(
            "/api/verify-otp",
            serde_json::json!({"email": "a@gmail.com", "otp": code}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_re_request_overwrites_challenge() {
    let (app, state, _mailer) = create_test_app();
    seed_identity(&state.store, "u1", "a@gmail.com", "");

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/send-otp",
                serde_json::json!({"email": "a@gmail.com"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Exactly one challenge is live for the handle.
    let challenge = state.store.get_challenge("a@gmail.com").unwrap();

    let response = app
        .oneshot(post_json(
            "/api/verify-otp",
            serde_json::json!({"email": "a@gmail.com", "otp": challenge.code}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_check() {
    let (app, _state, _mailer) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}
