//! Cattle entity models and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use herdbook_core::types::{DbId, Timestamp};

/// A row from the `cattle` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cattle {
    pub id: DbId,
    pub tag_number: String,
    pub name: String,
    pub breed: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub status: String,
    pub parent_id: Option<DbId>,
    pub organization_id: DbId,
    pub assigned_user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a cattle individual.
#[derive(Debug, Deserialize)]
pub struct CreateCattle {
    pub tag_number: String,
    pub name: String,
    pub breed: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub parent_id: Option<DbId>,
    pub assigned_user_id: Option<DbId>,
}

/// DTO for updating cattle details. Only non-`None` fields are applied.
#[derive(Debug, Deserialize)]
pub struct UpdateCattle {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub status: Option<String>,
    pub assigned_user_id: Option<DbId>,
}

/// Filters for the cattle listing query.
#[derive(Debug, Default)]
pub struct CattleFilter {
    /// Restrict to cattle assigned to this user (regular-user scoping).
    pub assigned_user_id: Option<DbId>,
    pub status: Option<String>,
    /// Case-insensitive substring match over name, tag number, and breed.
    pub search: Option<String>,
}
