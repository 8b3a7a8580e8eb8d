// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use bootcamp_api::config::Config;
use bootcamp_api::db::{Db, FirestoreDb, MemoryDb};
use bootcamp_api::routes::create_router;
use bootcamp_api::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Test configuration with a private upload directory.
#[allow(dead_code)]
pub fn test_config() -> Config {
    let mut config = Config::test_default();
    config.file_upload_path =
        std::env::temp_dir().join(format!("bootcamp-api-test-{}", uuid::Uuid::new_v4()));
    config
}

/// Create a test app backed by a fresh in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(test_config())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, Db::Memory(MemoryDb::new())));
    (create_router(state.clone()), state)
}

/// Send one request through a clone of the router.
#[allow(dead_code)]
pub async fn send(app: &axum::Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

/// Build a JSON request, optionally with a bearer token.
#[allow(dead_code)]
pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a body-less request, optionally with a bearer token.
#[allow(dead_code)]
pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!(
            "body is not JSON ({e}): {:?}",
            String::from_utf8_lossy(&bytes)
        )
    })
}

/// Register a user and log in, returning the session token.
#[allow(dead_code)]
pub async fn register_and_login(app: &axum::Router, email: &str) -> String {
    let response = send(
        app,
        json_request(
            Method::POST,
            "/register",
            None,
            serde_json::json!({ "name": "Tester", "email": email, "password": "secret123" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        app,
        json_request(
            Method::POST,
            "/login",
            None,
            serde_json::json!({ "email": email, "password": "secret123" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    body_json(response).await["token"]
        .as_str()
        .expect("login returns a token")
        .to_string()
}

/// Create a bootcamp as the token's user, returning its ID.
#[allow(dead_code)]
pub async fn create_bootcamp(app: &axum::Router, token: &str, name: &str) -> String {
    let response = send(
        app,
        json_request(
            Method::POST,
            "/bootcamps",
            Some(token),
            serde_json::json!({
                "name": name,
                "description": "Full stack web development",
                "careers": ["Web Development"],
                "housing": true,
                "averageCost": 10000,
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    body_json(response).await["data"]["id"]
        .as_str()
        .expect("created bootcamp has an id")
        .to_string()
}
