//! Repository for the `organizations` table.

use sqlx::PgPool;
use herdbook_core::types::DbId;

use crate::models::organization::{
    CreateOrganization, Organization, OrganizationStats, UpdateOrganization,
};

/// Column list for `organizations` queries.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for organizations.
pub struct OrganizationRepo;

impl OrganizationRepo {
    /// Insert a new organization.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrganization,
    ) -> Result<Organization, sqlx::Error> {
        let query = format!("INSERT INTO organizations (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Organization>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find an organization by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update an organization. Returns the updated row, or `None` if not found.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrganization,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!(
            "UPDATE organizations SET \
                name = COALESCE($2, name), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .bind(&input.name)
            .fetch_optional(pool)
            .await
    }

    /// Delete an organization. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign-key violation when users or cattle still
    /// reference it; callers check [`Self::stats`] first.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Aggregate user/cattle/record counts for one organization.
    pub async fn stats(pool: &PgPool, id: DbId) -> Result<OrganizationStats, sqlx::Error> {
        sqlx::query_as::<_, OrganizationStats>(
            "SELECT \
                (SELECT COUNT(*) FROM users WHERE organization_id = $1) AS users, \
                (SELECT COUNT(*) FROM cattle WHERE organization_id = $1) AS cattle, \
                (SELECT COUNT(*) FROM semination_records sr \
                    JOIN cattle c ON c.id = sr.cattle_id \
                    WHERE c.organization_id = $1) AS semination_records, \
                (SELECT COUNT(*) FROM pregnancy_records pr \
                    JOIN cattle c ON c.id = pr.cattle_id \
                    WHERE c.organization_id = $1) AS pregnancy_records",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
