//! Common test utilities and helpers
//!
//! - an app over the in-memory store with a known JWT secret
//! - token helpers
//! - a request helper that drives the router with `oneshot`
//! - assertion macros for the error body

#![allow(dead_code)]

pub mod assertions;
pub mod auth_helpers;

pub use auth_helpers::*;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use userhub::backend::server::{build_state, AppState};
use userhub::backend::routes::create_router;
use userhub::backend::store::Store;
use userhub::shared::AppConfig;

/// State over a fresh in-memory store
pub fn test_state() -> AppState {
    let config = AppConfig::builder()
        .jwt_secret(TEST_SECRET)
        .stale_check(false)
        .build()
        .unwrap();
    build_state(config, Store::memory()).unwrap()
}

pub fn test_app() -> Router {
    create_router(test_state())
}

/// Send one request; the response body is parsed as JSON (`Null` when empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

/// Authenticated admin request
pub async fn admin(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send(app, method, uri, Some(&admin_token()), body).await
}

/// Create a permission through the API and return its body
pub async fn create_permission(app: &Router, name: &str) -> Value {
    let (status, body) = admin(
        app,
        Method::POST,
        "/coroutine/permissions",
        Some(serde_json::json!({ "name": name, "description": format!("{} description", name) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create permission failed: {}", body);
    body
}

/// Create a user through the API and return its body
pub async fn create_user(app: &Router, email: &str, roles: Value) -> Value {
    let (status, body) = admin(
        app,
        Method::POST,
        "/coroutine/users",
        Some(serde_json::json!({ "name": "Test User", "email": email, "role": roles })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create user failed: {}", body);
    body
}
