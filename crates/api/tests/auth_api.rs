//! HTTP-level integration tests for the auth endpoints.
//!
//! Uses Axum's `tower::ServiceExt` to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, post_json_auth, seed_org, seed_user, token_for};
use sqlx::PgPool;
use herdbook_core::roles::Role;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_returns_token_and_user_info(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let user = seed_user(&pool, org, "alice", "correct-password", Role::Admin).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": "alice", "password": "correct-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["token"].is_string(), "response must contain a token");
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["id"], user);
    assert_eq!(json["user"]["username"], "alice");
    assert_eq!(json["user"]["role"], "ADMIN");
    assert_eq!(json["user"]["organization_id"], org);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_wrong_password_returns_401(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    seed_user(&pool, org, "alice", "correct-password", Role::Admin).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": "alice", "password": "wrong" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_unknown_username_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": "ghost", "password": "whatever" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn me_requires_a_bearer_token(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = common::get(app, "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let org = seed_org(&pool, "farm-a").await;
    let user = seed_user(&pool, org, "alice", "correct-password", Role::User).await;
    let token = token_for(user, Role::User, org);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "alice");
    assert!(
        json["data"].get("password_hash").is_none(),
        "password hash must never be serialized"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn garbage_token_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn register_is_admin_only(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let hand = seed_user(&pool, org, "hand", "hand-password", Role::User).await;
    let token = token_for(hand, Role::User, org);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/auth/register",
        &token,
        serde_json::json!({
            "username": "newbie",
            "email": "newbie@example.com",
            "password": "long-enough-password",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_registers_user_in_own_org(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let admin = seed_user(&pool, org, "admin", "admin-password", Role::Admin).await;
    let token = token_for(admin, Role::Admin, org);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/auth/register",
        &token,
        serde_json::json!({
            "username": "newbie",
            "email": "newbie@example.com",
            "password": "long-enough-password",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "newbie");
    assert_eq!(json["data"]["role"], "USER");
    assert_eq!(json["data"]["organization_id"], org);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_short_passwords(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let admin = seed_user(&pool, org, "admin", "admin-password", Role::Admin).await;
    let token = token_for(admin, Role::Admin, org);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/auth/register",
        &token,
        serde_json::json!({
            "username": "newbie",
            "email": "newbie@example.com",
            "password": "short",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
