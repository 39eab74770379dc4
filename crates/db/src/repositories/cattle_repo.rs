//! Repository for the `cattle` table.
//!
//! Every read is scoped by organization; the registry never leaks rows
//! across the tenant boundary.

use sqlx::PgPool;
use herdbook_core::breeding::CattleStatus;
use herdbook_core::types::DbId;

use crate::models::cattle::{Cattle, CattleFilter, CreateCattle, UpdateCattle};

/// Column list for `cattle` queries.
const COLUMNS: &str = "id, tag_number, name, breed, gender, date_of_birth, status, \
    parent_id, organization_id, assigned_user_id, created_at, updated_at";

/// Provides CRUD and status operations for the cattle registry.
pub struct CattleRepo;

impl CattleRepo {
    /// Register a new cattle individual in an organization.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        input: &CreateCattle,
    ) -> Result<Cattle, sqlx::Error> {
        let query = format!(
            "INSERT INTO cattle \
                (tag_number, name, breed, gender, date_of_birth, parent_id, \
                 organization_id, assigned_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cattle>(&query)
            .bind(&input.tag_number)
            .bind(&input.name)
            .bind(&input.breed)
            .bind(&input.gender)
            .bind(input.date_of_birth)
            .bind(input.parent_id)
            .bind(organization_id)
            .bind(input.assigned_user_id)
            .fetch_one(pool)
            .await
    }

    /// Find a cattle row by ID, unscoped.
    ///
    /// Callers must apply the tenant/assignment access check before acting
    /// on the returned row.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Cattle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cattle WHERE id = $1");
        sqlx::query_as::<_, Cattle>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a cattle row by ID within one organization.
    pub async fn find_in_org(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Cattle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cattle WHERE id = $1 AND organization_id = $2");
        sqlx::query_as::<_, Cattle>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a tag number is already used within an organization.
    pub async fn tag_exists(
        pool: &PgPool,
        organization_id: DbId,
        tag_number: &str,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cattle WHERE organization_id = $1 AND tag_number = $2",
        )
        .bind(organization_id)
        .bind(tag_number)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    /// List cattle in an organization with optional filters, newest first.
    pub async fn list(
        pool: &PgPool,
        organization_id: DbId,
        filter: &CattleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Cattle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cattle \
             WHERE organization_id = $1 \
               AND ($2::bigint IS NULL OR assigned_user_id = $2) \
               AND ($3::text IS NULL OR status = $3) \
               AND ($4::text IS NULL OR name ILIKE $4 OR tag_number ILIKE $4 OR breed ILIKE $4) \
             ORDER BY created_at DESC \
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Cattle>(&query)
            .bind(organization_id)
            .bind(filter.assigned_user_id)
            .bind(&filter.status)
            .bind(filter.search.as_ref().map(|s| format!("%{s}%")))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count cattle matching the same filters as [`Self::list`].
    pub async fn count(
        pool: &PgPool,
        organization_id: DbId,
        filter: &CattleFilter,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM cattle \
             WHERE organization_id = $1 \
               AND ($2::bigint IS NULL OR assigned_user_id = $2) \
               AND ($3::text IS NULL OR status = $3) \
               AND ($4::text IS NULL OR name ILIKE $4 OR tag_number ILIKE $4 OR breed ILIKE $4)",
        )
        .bind(organization_id)
        .bind(filter.assigned_user_id)
        .bind(&filter.status)
        .bind(filter.search.as_ref().map(|s| format!("%{s}%")))
        .fetch_one(pool)
        .await
    }

    /// Update cattle details. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCattle,
    ) -> Result<Option<Cattle>, sqlx::Error> {
        let query = format!(
            "UPDATE cattle SET \
                name = COALESCE($2, name), \
                breed = COALESCE($3, breed), \
                status = COALESCE($4, status), \
                assigned_user_id = COALESCE($5, assigned_user_id), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cattle>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.breed)
            .bind(&input.status)
            .bind(input.assigned_user_id)
            .fetch_optional(pool)
            .await
    }

    /// Set the lifecycle status of a cattle row. Returns `true` when a row
    /// was updated.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: CattleStatus,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE cattle SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Tombstone a cattle row (status DECEASED). Rows are never hard-deleted.
    pub async fn mark_deceased(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        Self::update_status(pool, id, CattleStatus::Deceased).await
    }

    /// Reassign a cattle row to a user. Returns the updated row.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Cattle>, sqlx::Error> {
        let query = format!(
            "UPDATE cattle SET assigned_user_id = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cattle>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List the direct offspring of a cattle row.
    pub async fn list_children(pool: &PgPool, parent_id: DbId) -> Result<Vec<Cattle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cattle \
             WHERE parent_id = $1 \
             ORDER BY date_of_birth DESC"
        );
        sqlx::query_as::<_, Cattle>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }
}
