//! Repository for the `users` table.

use sqlx::PgPool;
use herdbook_core::types::DbId;

use crate::models::user::{NewUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, username, email, password_hash, role, organization_id, \
    device_token, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user (password already hashed by the caller).
    pub async fn create(pool: &PgPool, input: &NewUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role, organization_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(input.organization_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (the login key, globally unique).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Whether a username or email is already taken within an organization.
    pub async fn exists_in_org(
        pool: &PgPool,
        organization_id: DbId,
        username: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users \
             WHERE username = $1 OR (organization_id = $2 AND email = $3)",
        )
        .bind(username)
        .bind(organization_id)
        .bind(email)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    /// Find a user by ID restricted to one organization.
    pub async fn find_in_org(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND organization_id = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List all users in an organization.
    pub async fn list_for_org(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE organization_id = $1 \
             ORDER BY username"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Store the push registration token for a user's current device.
    pub async fn set_device_token(
        pool: &PgPool,
        user_id: DbId,
        device_token: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET device_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(device_token)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Fetch the push registration token for a user, if any.
    pub async fn device_token(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT device_token FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map(Option::flatten)
    }
}
