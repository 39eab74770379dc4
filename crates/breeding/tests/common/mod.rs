//! Shared fixtures for the lifecycle and sweep integration tests.
#![allow(dead_code)] // not every test binary uses every fixture

use chrono::NaiveDate;
use sqlx::PgPool;
use herdbook_core::roles::{Actor, Role};
use herdbook_core::types::DbId;

/// Insert an organization and return its id.
pub async fn seed_org(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO organizations (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("seed organization")
}

/// Insert a user and return its id.
pub async fn seed_user(pool: &PgPool, org: DbId, username: &str, role: Role) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, role, organization_id) \
         VALUES ($1, $2, 'x', $3, $4) RETURNING id",
    )
    .bind(username)
    .bind(format!("{username}@example.com"))
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

pub fn actor(user_id: DbId, role: Role, organization_id: DbId) -> Actor {
    Actor {
        user_id,
        role,
        organization_id,
    }
}

/// Current cattle status as stored.
pub async fn cattle_status(pool: &PgPool, id: DbId) -> String {
    sqlx::query_scalar("SELECT status FROM cattle WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("cattle status")
}

/// Number of cattle rows in an organization.
pub async fn cattle_count(pool: &PgPool, org: DbId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM cattle WHERE organization_id = $1")
        .bind(org)
        .fetch_one(pool)
        .await
        .expect("cattle count")
}

/// Set a pregnancy record's delivery date directly (to place it inside or
/// outside the separation window for a test).
pub async fn set_delivery_date(pool: &PgPool, record_id: DbId, date: NaiveDate) {
    sqlx::query("UPDATE pregnancy_records SET actual_delivery_date = $2 WHERE id = $1")
        .bind(record_id)
        .bind(date)
        .execute(pool)
        .await
        .expect("set delivery date");
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
