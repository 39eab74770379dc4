//! Repository for the `semination_records` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use herdbook_core::types::DbId;

use crate::models::semination::{DuePregnancyCheck, SeminationRecord};

/// Column list for `semination_records` queries.
const COLUMNS: &str = "id, cattle_id, semination_date, check_date, is_pregnant, \
    checked_at, last_reminded_on, notes, created_by_id, created_at";

/// Provides read and sweep-support operations for semination records.
///
/// Creation and outcome recording run inside the lifecycle engine's
/// transactions and are not exposed here.
pub struct SeminationRepo;

impl SeminationRepo {
    /// List all semination records for a cattle, newest first.
    pub async fn list_for_cattle(
        pool: &PgPool,
        cattle_id: DbId,
    ) -> Result<Vec<SeminationRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM semination_records \
             WHERE cattle_id = $1 \
             ORDER BY semination_date DESC"
        );
        sqlx::query_as::<_, SeminationRecord>(&query)
            .bind(cattle_id)
            .fetch_all(pool)
            .await
    }

    /// Pregnancy checks due on or before `today` that have not been resolved,
    /// optionally restricted to cattle assigned to one user.
    pub async fn list_pending_checks(
        pool: &PgPool,
        organization_id: DbId,
        assigned_user_id: Option<DbId>,
        today: NaiveDate,
    ) -> Result<Vec<SeminationRecord>, sqlx::Error> {
        sqlx::query_as::<_, SeminationRecord>(
            "SELECT sr.id, sr.cattle_id, sr.semination_date, sr.check_date, \
                    sr.is_pregnant, sr.checked_at, sr.last_reminded_on, sr.notes, \
                    sr.created_by_id, sr.created_at \
             FROM semination_records sr \
             JOIN cattle c ON c.id = sr.cattle_id \
             WHERE c.organization_id = $1 \
               AND ($2::bigint IS NULL OR c.assigned_user_id = $2) \
               AND sr.check_date <= $3 \
               AND sr.is_pregnant IS NULL \
             ORDER BY sr.check_date ASC",
        )
            .bind(organization_id)
            .bind(assigned_user_id)
            .bind(today)
            .fetch_all(pool)
            .await
    }

    /// Due pregnancy checks across all organizations, joined with their
    /// cattle, excluding records already reminded today. Consumed by the
    /// daily pregnancy-check sweep.
    pub async fn list_due_checks(
        pool: &PgPool,
        today: NaiveDate,
    ) -> Result<Vec<DuePregnancyCheck>, sqlx::Error> {
        sqlx::query_as::<_, DuePregnancyCheck>(
            "SELECT sr.id AS record_id, c.id AS cattle_id, sr.check_date, \
                    c.name AS cattle_name, c.tag_number, c.assigned_user_id, \
                    sr.created_by_id \
             FROM semination_records sr \
             JOIN cattle c ON c.id = sr.cattle_id \
             WHERE sr.check_date <= $1 \
               AND sr.is_pregnant IS NULL \
               AND sr.last_reminded_on IS DISTINCT FROM $1 \
             ORDER BY sr.check_date ASC",
        )
        .bind(today)
        .fetch_all(pool)
        .await
    }

    /// Stamp a record as reminded on the given day so the sweep does not
    /// repeat it until tomorrow.
    pub async fn mark_reminded(
        pool: &PgPool,
        record_id: DbId,
        on: NaiveDate,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE semination_records SET last_reminded_on = $2 WHERE id = $1")
            .bind(record_id)
            .bind(on)
            .execute(pool)
            .await?;
        Ok(())
    }
}
