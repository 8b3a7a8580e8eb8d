// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use bootcamp_api::error::AppError;
use serde_json::{json, Value};

async fn render(err: AppError) -> (StatusCode, Vec<u8>) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .unwrap()
        .to_vec();
    (status, bytes)
}

#[tokio::test]
async fn test_authorization_errors_have_no_body() {
    let (status, body) = render(AppError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_empty());

    let (status, body) = render(AppError::DuplicateOwner).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_client_errors_carry_message() {
    let (status, body) = render(AppError::resource_not_found("abc123")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap(),
        json!({ "success": false, "error": "Resource abc123 not found" })
    );

    let (status, body) = render(AppError::Conflict("Email is already registered".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap()["error"],
        "Email is already registered"
    );
}

#[tokio::test]
async fn test_server_errors_hide_details() {
    let (status, body) = render(AppError::Database("connection reset by peer".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body).unwrap();
    assert!(!text.contains("connection reset"));

    let (status, body) = render(AppError::Storage("/srv/uploads: disk full".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert!(!json["error"].as_str().unwrap().contains("/srv/uploads"));
}
