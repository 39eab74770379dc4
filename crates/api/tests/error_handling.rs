//! Tests for `AppError` → HTTP response mapping.
//!
//! These verify that each error variant produces the correct status code,
//! error code, and body. They do not need an HTTP server; they call
//! `IntoResponse` directly on `AppError` values.

use axum::response::IntoResponse;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use herdbook_api::error::AppError;
use herdbook_core::error::CoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (axum::http::StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_maps_to_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Cattle",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Cattle with id 42 not found");
}

#[tokio::test]
async fn forbidden_maps_to_403() {
    let err = AppError::Core(CoreError::Forbidden("Cattle is not assigned to you".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn unauthorized_maps_to_401() {
    let err = AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn invalid_state_maps_to_409() {
    let err = AppError::Core(CoreError::InvalidState(
        "Pregnancy record cannot move from SEPARATED to DELIVERED".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_STATE");
}

#[tokio::test]
async fn too_early_carries_the_eligible_date() {
    let err = AppError::Core(CoreError::TooEarly {
        eligible_on: NaiveDate::from_ymd_opt(2024, 10, 18).unwrap(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "TOO_EARLY");
    assert_eq!(json["eligible_on"], "2024-10-18");
}

#[tokio::test]
async fn bad_request_maps_to_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[tokio::test]
async fn validation_maps_to_400() {
    let err = AppError::Core(CoreError::Validation("Calf gender must be FEMALE or MALE".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn conflict_maps_to_409() {
    let err = AppError::Core(CoreError::Conflict("Tag number A-001 is already in use".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn internal_error_is_sanitized() {
    let err = AppError::Core(CoreError::Internal("connection pool exhausted".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(
        json["error"], "An internal error occurred",
        "internal detail must not leak to the client"
    );
}
