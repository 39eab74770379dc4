//! Organization (tenant) entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use herdbook_core::types::{DbId, Timestamp};

/// A row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an organization.
#[derive(Debug, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
}

/// DTO for renaming an organization.
#[derive(Debug, Deserialize)]
pub struct UpdateOrganization {
    pub name: Option<String>,
}

/// Aggregate record counts for one organization.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrganizationStats {
    pub users: i64,
    pub cattle: i64,
    pub semination_records: i64,
    pub pregnancy_records: i64,
}
