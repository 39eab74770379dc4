//! Pregnancy record entity models and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use herdbook_core::types::{DbId, Timestamp};

/// A row from the `pregnancy_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PregnancyRecord {
    pub id: DbId,
    pub cattle_id: DbId,
    pub semination_record_id: DbId,
    pub expected_delivery_date: NaiveDate,
    pub actual_delivery_date: Option<NaiveDate>,
    pub calf_id: Option<DbId>,
    pub status: String,
    pub separation_reminded_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for recording a delivery. The calf attributes become a new
/// cattle row linked to the dam.
#[derive(Debug, Deserialize)]
pub struct RecordDelivery {
    pub actual_delivery_date: NaiveDate,
    pub calf_tag_number: String,
    pub calf_name: String,
    pub calf_breed: String,
    pub calf_gender: String,
    pub notes: Option<String>,
}

/// Request body for marking the calf separation.
#[derive(Debug, Deserialize)]
pub struct MarkSeparation {
    pub notes: Option<String>,
}

/// Counts by status for the pregnancy stats endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PregnancyStats {
    pub total: i64,
    pub in_progress: i64,
    pub delivered: i64,
    pub separated: i64,
    /// IN_PROGRESS records whose expected delivery date has passed.
    pub overdue: i64,
}

/// A delivered pregnancy due for separation, joined with dam and calf,
/// as consumed by the reminder sweep.
#[derive(Debug, Clone, FromRow)]
pub struct DueSeparation {
    pub record_id: DbId,
    pub cattle_id: DbId,
    pub actual_delivery_date: NaiveDate,
    pub dam_name: String,
    pub dam_tag_number: String,
    pub assigned_user_id: Option<DbId>,
    pub created_by_id: DbId,
    pub calf_id: DbId,
    pub calf_name: String,
}

/// An in-progress pregnancy expected to deliver soon, as consumed by the
/// weekly milestone sweep.
#[derive(Debug, Clone, FromRow)]
pub struct UpcomingDelivery {
    pub record_id: DbId,
    pub cattle_id: DbId,
    pub expected_delivery_date: NaiveDate,
    pub cattle_name: String,
    pub tag_number: String,
    pub assigned_user_id: Option<DbId>,
    pub created_by_id: DbId,
}
