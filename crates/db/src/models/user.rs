//! User entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use herdbook_core::types::{DbId, Timestamp};

/// A row from the `users` table.
///
/// `password_hash` and `device_token` are intentionally excluded from
/// serialized output.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub organization_id: DbId,
    #[serde(skip_serializing)]
    pub device_token: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for `users` (hash computed by the caller).
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub organization_id: DbId,
}
