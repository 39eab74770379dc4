//! Repository for the `pregnancy_records` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use herdbook_core::types::DbId;

use crate::models::pregnancy::{DueSeparation, PregnancyRecord, PregnancyStats, UpcomingDelivery};

/// Column list for `pregnancy_records` queries.
const COLUMNS: &str = "id, cattle_id, semination_record_id, expected_delivery_date, \
    actual_delivery_date, calf_id, status, separation_reminded_on, notes, \
    created_by_id, created_at, updated_at";

/// Provides read and sweep-support operations for pregnancy records.
///
/// Record creation and status transitions run inside the lifecycle engine's
/// transactions and are not exposed here.
pub struct PregnancyRepo;

impl PregnancyRepo {
    /// List all pregnancy records for a cattle, newest first.
    pub async fn list_for_cattle(
        pool: &PgPool,
        cattle_id: DbId,
    ) -> Result<Vec<PregnancyRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pregnancy_records \
             WHERE cattle_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, PregnancyRecord>(&query)
            .bind(cattle_id)
            .fetch_all(pool)
            .await
    }

    /// Counts by status, scoped to an organization and optionally to cattle
    /// assigned to one user. `overdue` counts IN_PROGRESS records whose
    /// expected delivery date is on or before `today`.
    pub async fn stats(
        pool: &PgPool,
        organization_id: DbId,
        assigned_user_id: Option<DbId>,
        today: NaiveDate,
    ) -> Result<PregnancyStats, sqlx::Error> {
        sqlx::query_as::<_, PregnancyStats>(
            "SELECT \
                COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE pr.status = 'IN_PROGRESS') AS in_progress, \
                COUNT(*) FILTER (WHERE pr.status = 'DELIVERED') AS delivered, \
                COUNT(*) FILTER (WHERE pr.status = 'SEPARATED') AS separated, \
                COUNT(*) FILTER ( \
                    WHERE pr.status = 'IN_PROGRESS' AND pr.expected_delivery_date <= $3 \
                ) AS overdue \
             FROM pregnancy_records pr \
             JOIN cattle c ON c.id = pr.cattle_id \
             WHERE c.organization_id = $1 \
               AND ($2::bigint IS NULL OR c.assigned_user_id = $2)",
        )
        .bind(organization_id)
        .bind(assigned_user_id)
        .bind(today)
        .fetch_one(pool)
        .await
    }

    /// Delivered pregnancies whose separation window has opened (15 or more
    /// days since delivery) and that have not yet been reminded. Consumed by
    /// the daily separation sweep.
    ///
    /// The window is deliberately `<=` rather than an exact-day match so a
    /// sweep missed during downtime still picks the record up on the next
    /// run.
    pub async fn list_due_separations(
        pool: &PgPool,
        delivered_on_or_before: NaiveDate,
    ) -> Result<Vec<DueSeparation>, sqlx::Error> {
        sqlx::query_as::<_, DueSeparation>(
            "SELECT pr.id AS record_id, dam.id AS cattle_id, pr.actual_delivery_date, \
                    dam.name AS dam_name, dam.tag_number AS dam_tag_number, \
                    dam.assigned_user_id, pr.created_by_id, \
                    calf.id AS calf_id, calf.name AS calf_name \
             FROM pregnancy_records pr \
             JOIN cattle dam ON dam.id = pr.cattle_id \
             JOIN cattle calf ON calf.id = pr.calf_id \
             WHERE pr.status = 'DELIVERED' \
               AND pr.actual_delivery_date <= $1 \
               AND pr.separation_reminded_on IS NULL \
             ORDER BY pr.actual_delivery_date ASC",
        )
        .bind(delivered_on_or_before)
        .fetch_all(pool)
        .await
    }

    /// Stamp a record as separation-reminded so the daily sweep emits the
    /// reminder once.
    pub async fn mark_separation_reminded(
        pool: &PgPool,
        record_id: DbId,
        on: NaiveDate,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE pregnancy_records SET separation_reminded_on = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(record_id)
        .bind(on)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// In-progress pregnancies expected to deliver within the given window,
    /// joined with their cattle. Consumed by the weekly milestone sweep.
    pub async fn list_upcoming_deliveries(
        pool: &PgPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<UpcomingDelivery>, sqlx::Error> {
        sqlx::query_as::<_, UpcomingDelivery>(
            "SELECT pr.id AS record_id, c.id AS cattle_id, pr.expected_delivery_date, \
                    c.name AS cattle_name, c.tag_number, c.assigned_user_id, \
                    pr.created_by_id \
             FROM pregnancy_records pr \
             JOIN cattle c ON c.id = pr.cattle_id \
             WHERE pr.status = 'IN_PROGRESS' \
               AND pr.expected_delivery_date BETWEEN $1 AND $2 \
             ORDER BY pr.expected_delivery_date ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }
}
