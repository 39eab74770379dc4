//! Breeding lifecycle engine.
//!
//! [`LifecycleEngine`] applies the four user-facing lifecycle operations.
//! Each operation executes its reads and writes inside ONE transaction, so a
//! reader can never observe a half-applied delivery (calf created without
//! the record update, or vice versa). The dam's row is locked `FOR UPDATE`
//! first, which serializes concurrent operations on the same cattle: the
//! loser of a delivery race re-reads an already-advanced status and fails
//! with `InvalidState`.
//!
//! Access control is re-verified inside every operation against the cattle
//! reachable from the record, not just at the HTTP entry point.

use chrono::{NaiveDate, Utc};
use sqlx::FromRow;
use herdbook_core::breeding::{
    check_date, effects_for, expected_delivery_date, validate_separation_date, CattleStatus,
    LifecycleEvent, PregnancyStatus,
};
use herdbook_core::error::CoreError;
use herdbook_core::roles::Actor;
use herdbook_core::types::DbId;
use herdbook_db::models::cattle::Cattle;
use herdbook_db::models::pregnancy::{MarkSeparation, PregnancyRecord, RecordDelivery};
use herdbook_db::models::semination::{RecordPregnancyCheck, RecordSemination, SeminationRecord};
use herdbook_db::DbPool;

/// Column list used when returning semination rows from engine statements.
const SEMINATION_COLUMNS: &str = "id, cattle_id, semination_date, check_date, is_pregnant, \
    checked_at, last_reminded_on, notes, created_by_id, created_at";

/// Column list used when returning pregnancy rows from engine statements.
const PREGNANCY_COLUMNS: &str = "id, cattle_id, semination_record_id, expected_delivery_date, \
    actual_delivery_date, calf_id, status, separation_reminded_on, notes, \
    created_by_id, created_at, updated_at";

/// Column list used when returning cattle rows from engine statements.
const CATTLE_COLUMNS: &str = "id, tag_number, name, breed, gender, date_of_birth, status, \
    parent_id, organization_id, assigned_user_id, created_at, updated_at";

/// Accepted values for the calf's gender at delivery.
const GENDERS: [&str; 2] = ["FEMALE", "MALE"];

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level failure (not found, forbidden, invalid state, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for engine return values.
pub type EngineResult<T> = Result<T, EngineError>;

// ---------------------------------------------------------------------------
// Internal row shapes
// ---------------------------------------------------------------------------

/// The slice of a cattle row the engine locks and inspects.
#[derive(Debug, FromRow)]
struct DamRow {
    id: DbId,
    organization_id: DbId,
    assigned_user_id: Option<DbId>,
    status: String,
}

/// Result of a recorded delivery: the advanced record plus the newborn.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub record: PregnancyRecord,
    pub calf: Cattle,
}

// ---------------------------------------------------------------------------
// LifecycleEngine
// ---------------------------------------------------------------------------

/// Transactional application of breeding lifecycle events.
///
/// Constructed once with the connection pool and shared via the application
/// state; holds no other state.
pub struct LifecycleEngine {
    pool: DbPool,
}

impl LifecycleEngine {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Record a semination on a dam.
    ///
    /// Enforces at most one open reproductive thread per cattle: fails with
    /// `Conflict` when an unresolved semination record or an in-progress
    /// pregnancy already exists. A dam left flagged PREGNANT without an
    /// in-progress pregnancy record is repaired back to ACTIVE in the same
    /// transaction.
    pub async fn record_semination(
        &self,
        actor: &Actor,
        input: &RecordSemination,
    ) -> EngineResult<SeminationRecord> {
        let mut tx = self.pool.begin().await?;

        let dam = lock_dam(&mut tx, input.cattle_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Cattle",
                id: input.cattle_id,
            })?;
        actor.ensure_cattle_access(dam.id, dam.organization_id, dam.assigned_user_id)?;

        let dam_status = parse_cattle_status(&dam)?;
        if dam_status == CattleStatus::Deceased {
            return Err(CoreError::InvalidState(
                "Cannot record a semination on deceased cattle".into(),
            )
            .into());
        }

        let open_seminations: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM semination_records \
             WHERE cattle_id = $1 AND is_pregnant IS NULL",
        )
        .bind(dam.id)
        .fetch_one(&mut *tx)
        .await?;
        if open_seminations > 0 {
            return Err(CoreError::Conflict(
                "An unresolved semination record already exists for this cattle".into(),
            )
            .into());
        }

        let open_pregnancies: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pregnancy_records \
             WHERE cattle_id = $1 AND status = 'IN_PROGRESS'",
        )
        .bind(dam.id)
        .fetch_one(&mut *tx)
        .await?;
        if open_pregnancies > 0 {
            return Err(CoreError::Conflict(
                "An in-progress pregnancy already exists for this cattle".into(),
            )
            .into());
        }

        let query = format!(
            "INSERT INTO semination_records \
                (cattle_id, semination_date, check_date, notes, created_by_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {SEMINATION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, SeminationRecord>(&query)
            .bind(dam.id)
            .bind(input.semination_date)
            .bind(check_date(input.semination_date))
            .bind(&input.notes)
            .bind(actor.user_id)
            .fetch_one(&mut *tx)
            .await?;

        let effects = effects_for(LifecycleEvent::SeminationRecorded {
            dam_status,
            has_open_pregnancy: false,
        });
        if let Some(status) = effects.dam_status {
            update_status(&mut tx, dam.id, status).await?;
            tracing::warn!(
                cattle_id = dam.id,
                "Repaired stale PREGNANT status while recording semination"
            );
        }

        tx.commit().await?;

        tracing::info!(
            cattle_id = dam.id,
            record_id = record.id,
            check_date = %record.check_date,
            "Semination recorded"
        );
        Ok(record)
    }

    /// Record the outcome of a pregnancy check.
    ///
    /// Strictly one-shot: a record whose outcome is already set fails with
    /// `InvalidState`. A positive outcome opens the pregnancy record and
    /// marks the dam PREGNANT atomically.
    pub async fn check_pregnancy(
        &self,
        actor: &Actor,
        record_id: DbId,
        input: &RecordPregnancyCheck,
    ) -> EngineResult<SeminationRecord> {
        let mut tx = self.pool.begin().await?;

        let query =
            format!("SELECT {SEMINATION_COLUMNS} FROM semination_records WHERE id = $1 FOR UPDATE");
        let record = sqlx::query_as::<_, SeminationRecord>(&query)
            .bind(record_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "SeminationRecord",
                id: record_id,
            })?;

        let dam = lock_dam(&mut tx, record.cattle_id)
            .await?
            .ok_or_else(|| internal_missing_cattle(record.cattle_id))?;
        actor.ensure_cattle_access(dam.id, dam.organization_id, dam.assigned_user_id)?;

        if record.is_pregnant.is_some() {
            return Err(CoreError::InvalidState(
                "Pregnancy check outcome has already been recorded".into(),
            )
            .into());
        }

        let query = format!(
            "UPDATE semination_records \
             SET is_pregnant = $2, checked_at = NOW(), notes = COALESCE($3, notes) \
             WHERE id = $1 \
             RETURNING {SEMINATION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, SeminationRecord>(&query)
            .bind(record.id)
            .bind(input.is_pregnant)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        let effects = effects_for(LifecycleEvent::CheckRecorded {
            is_pregnant: input.is_pregnant,
        });
        if effects.opens_pregnancy {
            sqlx::query(
                "INSERT INTO pregnancy_records \
                    (cattle_id, semination_record_id, expected_delivery_date, created_by_id) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(dam.id)
            .bind(record.id)
            .bind(expected_delivery_date(record.semination_date))
            .bind(actor.user_id)
            .execute(&mut *tx)
            .await?;
        }
        if let Some(status) = effects.dam_status {
            update_status(&mut tx, dam.id, status).await?;
        }

        tx.commit().await?;

        tracing::info!(
            cattle_id = dam.id,
            record_id = record.id,
            is_pregnant = input.is_pregnant,
            "Pregnancy check recorded"
        );
        Ok(updated)
    }

    /// Record a delivery on an in-progress pregnancy.
    ///
    /// Creates the calf's registry entry (lineage back-reference to the dam,
    /// assignment inherited, dependency-period status), advances the record
    /// to DELIVERED, and frees the dam, all in one transaction.
    pub async fn record_delivery(
        &self,
        actor: &Actor,
        record_id: DbId,
        input: &RecordDelivery,
    ) -> EngineResult<DeliveryOutcome> {
        let mut tx = self.pool.begin().await?;

        let record = lock_pregnancy(&mut tx, record_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "PregnancyRecord",
                id: record_id,
            })?;

        let dam = lock_dam(&mut tx, record.cattle_id)
            .await?
            .ok_or_else(|| internal_missing_cattle(record.cattle_id))?;
        actor.ensure_cattle_access(dam.id, dam.organization_id, dam.assigned_user_id)?;

        parse_pregnancy_status(&record)?.validate_transition(PregnancyStatus::Delivered)?;

        if !GENDERS.contains(&input.calf_gender.as_str()) {
            return Err(
                CoreError::Validation("Calf gender must be FEMALE or MALE".into()).into(),
            );
        }

        let tag_taken: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cattle WHERE organization_id = $1 AND tag_number = $2",
        )
        .bind(dam.organization_id)
        .bind(&input.calf_tag_number)
        .fetch_one(&mut *tx)
        .await?;
        if tag_taken > 0 {
            return Err(CoreError::Conflict(format!(
                "Tag number {} is already in use",
                input.calf_tag_number
            ))
            .into());
        }

        let effects = effects_for(LifecycleEvent::DeliveryRecorded);
        let calf_status = effects
            .calf_status
            .unwrap_or(CattleStatus::SeparatedPending);

        let query = format!(
            "INSERT INTO cattle \
                (tag_number, name, breed, gender, date_of_birth, status, parent_id, \
                 organization_id, assigned_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {CATTLE_COLUMNS}"
        );
        let calf = sqlx::query_as::<_, Cattle>(&query)
            .bind(&input.calf_tag_number)
            .bind(&input.calf_name)
            .bind(&input.calf_breed)
            .bind(&input.calf_gender)
            .bind(input.actual_delivery_date)
            .bind(calf_status.as_str())
            .bind(dam.id)
            .bind(dam.organization_id)
            .bind(dam.assigned_user_id)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE pregnancy_records \
             SET status = $2, actual_delivery_date = $3, calf_id = $4, \
                 notes = COALESCE($5, notes), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PREGNANCY_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, PregnancyRecord>(&query)
            .bind(record.id)
            .bind(PregnancyStatus::Delivered.as_str())
            .bind(input.actual_delivery_date)
            .bind(calf.id)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(status) = effects.dam_status {
            update_status(&mut tx, dam.id, status).await?;
        }

        tx.commit().await?;

        tracing::info!(
            cattle_id = dam.id,
            record_id = record.id,
            calf_id = calf.id,
            "Delivery recorded"
        );
        Ok(DeliveryOutcome {
            record: updated,
            calf,
        })
    }

    /// Mark the calf separation on a delivered pregnancy.
    ///
    /// Only allowed 15 days or more after the actual delivery date; earlier
    /// attempts fail with `TooEarly` carrying the first eligible date. The
    /// calf is promoted out of its dependency-period status.
    pub async fn mark_separation(
        &self,
        actor: &Actor,
        record_id: DbId,
        input: &MarkSeparation,
    ) -> EngineResult<PregnancyRecord> {
        let mut tx = self.pool.begin().await?;

        let record = lock_pregnancy(&mut tx, record_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "PregnancyRecord",
                id: record_id,
            })?;

        let dam = lock_dam(&mut tx, record.cattle_id)
            .await?
            .ok_or_else(|| internal_missing_cattle(record.cattle_id))?;
        actor.ensure_cattle_access(dam.id, dam.organization_id, dam.assigned_user_id)?;

        parse_pregnancy_status(&record)?.validate_transition(PregnancyStatus::Separated)?;

        let delivered_on = record.actual_delivery_date.ok_or_else(|| {
            CoreError::Internal(format!(
                "Pregnancy record {} is DELIVERED but has no delivery date",
                record.id
            ))
        })?;
        validate_separation_date(Self::today(), delivered_on)?;

        let calf_id = record.calf_id.ok_or_else(|| {
            CoreError::Internal(format!(
                "Pregnancy record {} is DELIVERED but has no calf",
                record.id
            ))
        })?;
        let calf = lock_dam(&mut tx, calf_id)
            .await?
            .ok_or_else(|| internal_missing_cattle(calf_id))?;

        let query = format!(
            "UPDATE pregnancy_records \
             SET status = $2, notes = COALESCE($3, notes), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PREGNANCY_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, PregnancyRecord>(&query)
            .bind(record.id)
            .bind(PregnancyStatus::Separated.as_str())
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        let effects = effects_for(LifecycleEvent::SeparationMarked {
            calf_status: parse_cattle_status(&calf)?,
        });
        if let Some(status) = effects.calf_status {
            update_status(&mut tx, calf.id, status).await?;
        }

        tx.commit().await?;

        tracing::info!(
            cattle_id = dam.id,
            record_id = record.id,
            calf_id,
            "Separation marked"
        );
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lock a cattle row for the duration of the transaction.
async fn lock_dam(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    cattle_id: DbId,
) -> Result<Option<DamRow>, sqlx::Error> {
    sqlx::query_as::<_, DamRow>(
        "SELECT id, organization_id, assigned_user_id, status \
         FROM cattle WHERE id = $1 FOR UPDATE",
    )
    .bind(cattle_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Lock a pregnancy record row for the duration of the transaction.
async fn lock_pregnancy(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    record_id: DbId,
) -> Result<Option<PregnancyRecord>, sqlx::Error> {
    let query = format!("SELECT {PREGNANCY_COLUMNS} FROM pregnancy_records WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, PregnancyRecord>(&query)
        .bind(record_id)
        .fetch_optional(&mut **tx)
        .await
}

async fn update_status(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    cattle_id: DbId,
    status: CattleStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE cattle SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(cattle_id)
        .bind(status.as_str())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

fn parse_cattle_status(row: &DamRow) -> Result<CattleStatus, CoreError> {
    CattleStatus::parse(&row.status).ok_or_else(|| {
        CoreError::Internal(format!(
            "Cattle {} has unknown status {}",
            row.id, row.status
        ))
    })
}

fn parse_pregnancy_status(record: &PregnancyRecord) -> Result<PregnancyStatus, CoreError> {
    PregnancyStatus::parse(&record.status).ok_or_else(|| {
        CoreError::Internal(format!(
            "Pregnancy record {} has unknown status {}",
            record.id, record.status
        ))
    })
}

fn internal_missing_cattle(cattle_id: DbId) -> CoreError {
    CoreError::Internal(format!("Cattle row {cattle_id} referenced by record is missing"))
}
