//! Semination record entity models and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use herdbook_core::types::{DbId, Timestamp};

/// A row from the `semination_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeminationRecord {
    pub id: DbId,
    pub cattle_id: DbId,
    pub semination_date: NaiveDate,
    pub check_date: NaiveDate,
    pub is_pregnant: Option<bool>,
    pub checked_at: Option<Timestamp>,
    pub last_reminded_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by_id: DbId,
    pub created_at: Timestamp,
}

/// Request body for recording a semination.
#[derive(Debug, Deserialize)]
pub struct RecordSemination {
    pub cattle_id: DbId,
    pub semination_date: NaiveDate,
    pub notes: Option<String>,
}

/// Request body for recording a pregnancy check outcome.
#[derive(Debug, Deserialize)]
pub struct RecordPregnancyCheck {
    pub is_pregnant: bool,
    pub notes: Option<String>,
}

/// A due pregnancy check joined with the cattle it belongs to, as consumed
/// by the reminder sweep.
#[derive(Debug, Clone, FromRow)]
pub struct DuePregnancyCheck {
    pub record_id: DbId,
    pub cattle_id: DbId,
    pub check_date: NaiveDate,
    pub cattle_name: String,
    pub tag_number: String,
    pub assigned_user_id: Option<DbId>,
    pub created_by_id: DbId,
}
