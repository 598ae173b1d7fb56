//! Middleware and error shapes checked with bare `oneshot` requests.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use simsy_core::api::routes::v1;
use tower::ServiceExt;

#[path = "support/mod.rs"]
mod support;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_storage() {
    let (app, _state, _media) = support::router();
    let response = app
        .oneshot(Request::get(v1::HEALTH).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn malformed_bearer_is_rejected_as_json() {
    let (app, _state, _media) = support::router();
    let response = app
        .oneshot(
            Request::get(v1::users::CURRENT)
                .header(header::AUTHORIZATION, "Token abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Authentication required");
}

#[tokio::test]
async fn invalid_token_on_public_routes_is_ignored() {
    let (app, _state, _media) = support::router();
    let response = app
        .oneshot(
            Request::get(v1::shows::COLLECTION)
                .header(header::AUTHORIZATION, "Bearer not-a-session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], Value::Array(vec![]));
}

#[tokio::test]
async fn malformed_json_uses_the_error_shape() {
    let (app, _state, _media) = support::router();
    let response = app
        .oneshot(
            Request::post(v1::auth::LOGIN)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"username\":"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["status"], 400);
}
