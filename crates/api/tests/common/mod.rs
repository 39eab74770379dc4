//! Shared fixtures for the HTTP-level integration tests.
#![allow(dead_code)] // not every test binary uses every fixture

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use herdbook_api::auth::jwt::{generate_token, JwtConfig};
use herdbook_api::auth::password::hash_password;
use herdbook_api::config::ServerConfig;
use herdbook_api::router::build_app_router;
use herdbook_api::state::AppState;
use herdbook_breeding::LifecycleEngine;
use herdbook_core::roles::Role;
use herdbook_core::types::DbId;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        push_gateway_url: None,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            token_expiry_days: 7,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This goes through [`build_app_router`] so integration tests exercise the
/// same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        engine: Arc::new(LifecycleEngine::new(pool)),
    };
    build_app_router(state, &config)
}

/// Bearer token for the given user, signed with the test secret.
pub fn token_for(user_id: DbId, role: Role, organization_id: DbId) -> String {
    generate_token(user_id, role.as_str(), organization_id, &test_config().jwt)
        .expect("token generation")
}

// ---------------------------------------------------------------------------
// Database seeds
// ---------------------------------------------------------------------------

/// Insert an organization and return its id.
pub async fn seed_org(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO organizations (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("seed organization")
}

/// Insert a user with a real Argon2 hash of `password` and return its id.
pub async fn seed_user(
    pool: &PgPool,
    org: DbId,
    username: &str,
    password: &str,
    role: Role,
) -> DbId {
    let hash = hash_password(password).expect("hash password");
    sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, role, organization_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(username)
    .bind(format!("{username}@example.com"))
    .bind(hash)
    .bind(role.as_str())
    .bind(org)
    .fetch_one(pool)
    .await
    .expect("seed user")
}

/// Insert a cattle row and return its id.
pub async fn seed_cattle(
    pool: &PgPool,
    org: DbId,
    tag: &str,
    assigned_user_id: Option<DbId>,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO cattle \
            (tag_number, name, breed, gender, date_of_birth, organization_id, assigned_user_id) \
         VALUES ($1, $2, 'Holstein', 'FEMALE', '2020-01-01', $3, $4) RETURNING id",
    )
    .bind(tag)
    .bind(format!("cow-{tag}"))
    .bind(org)
    .bind(assigned_user_id)
    .fetch_one(pool)
    .await
    .expect("seed cattle")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without authentication.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    app.oneshot(request).await.expect("send request")
}

/// Send a GET request with a bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("build request");
    app.oneshot(request).await.expect("send request")
}

/// Send a POST request with a JSON body, without authentication.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    app.oneshot(request).await.expect("send request")
}

/// Send a POST request with a JSON body and a bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("build request");
    app.oneshot(request).await.expect("send request")
}

/// Send a PUT request with a JSON body and a bearer token.
pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("build request");
    app.oneshot(request).await.expect("send request")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("JSON body")
}
