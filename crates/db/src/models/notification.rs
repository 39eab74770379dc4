//! Notification entity models and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use herdbook_core::types::{DbId, Timestamp};

/// Notification kind for a due pregnancy check.
pub const KIND_PREGNANCY_CHECK_DUE: &str = "PREGNANCY_CHECK_DUE";
/// Notification kind for a due calf separation.
pub const KIND_SEPARATION_DUE: &str = "SEPARATION_DUE";
/// Notification kind for an upcoming-delivery milestone.
pub const KIND_DELIVERY_MILESTONE: &str = "DELIVERY_MILESTONE";

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub cattle_id: DbId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// Insert payload for `notifications`.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: DbId,
    pub cattle_id: DbId,
    pub kind: &'static str,
    pub title: String,
    pub message: String,
}
