//! Reminder scheduler.
//!
//! Three independent periodic sweeps discover records that have crossed a
//! date threshold without a follow-up action and emit one reminder per due
//! item:
//!
//! - pregnancy checks due (daily)
//! - calf separations due (daily)
//! - upcoming-delivery milestones (weekly)
//!
//! Every reminder is persisted as a `notifications` row and then pushed
//! through the configured [`NotificationSink`]. Push failures are logged and
//! never abort the sweep or roll back the persisted row; a failure on one
//! record does not prevent the remaining records from being processed.
//!
//! The daily sweeps stamp a reminded-on marker so an untaken action nags at
//! most once per day (checks) or once overall (separations) instead of on
//! every cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;
use herdbook_core::breeding::{days_until, DELIVERY_MILESTONE_WINDOW_DAYS, SEPARATION_WAIT_DAYS};
use herdbook_core::types::DbId;
use herdbook_db::models::notification::{
    NewNotification, KIND_DELIVERY_MILESTONE, KIND_PREGNANCY_CHECK_DUE, KIND_SEPARATION_DUE,
};
use herdbook_db::repositories::{NotificationRepo, PregnancyRepo, SeminationRepo, UserRepo};
use herdbook_db::DbPool;

use crate::notify::NotificationSink;

/// Cadence of the pregnancy-check and separation sweeps.
const DAILY_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cadence of the upcoming-delivery milestone sweep.
const WEEKLY_SWEEP_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

// ---------------------------------------------------------------------------
// ReminderScheduler
// ---------------------------------------------------------------------------

/// Background service that runs the reminder sweeps on a periodic basis.
pub struct ReminderScheduler {
    pool: DbPool,
    sink: Arc<dyn NotificationSink>,
}

impl ReminderScheduler {
    /// Create a new scheduler with the given database pool and push sink.
    pub fn new(pool: DbPool, sink: Arc<dyn NotificationSink>) -> Self {
        Self { pool, sink }
    }

    /// Run the daily pregnancy-check sweep loop until `cancel` is triggered.
    pub async fn run_pregnancy_check_loop(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(DAILY_SWEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Pregnancy-check sweep stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.sweep_pregnancy_checks(Utc::now().date_naive()).await {
                        Ok(count) if count > 0 => {
                            tracing::info!(count, "Pregnancy-check sweep emitted reminders");
                        }
                        Ok(_) => tracing::debug!("Pregnancy-check sweep: nothing due"),
                        Err(e) => tracing::error!(error = %e, "Pregnancy-check sweep failed"),
                    }
                }
            }
        }
    }

    /// Run the daily separation sweep loop until `cancel` is triggered.
    pub async fn run_separation_loop(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(DAILY_SWEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Separation sweep stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.sweep_separations(Utc::now().date_naive()).await {
                        Ok(count) if count > 0 => {
                            tracing::info!(count, "Separation sweep emitted reminders");
                        }
                        Ok(_) => tracing::debug!("Separation sweep: nothing due"),
                        Err(e) => tracing::error!(error = %e, "Separation sweep failed"),
                    }
                }
            }
        }
    }

    /// Run the weekly milestone sweep loop until `cancel` is triggered.
    pub async fn run_milestone_loop(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(WEEKLY_SWEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Milestone sweep stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.sweep_milestones(Utc::now().date_naive()).await {
                        Ok(count) if count > 0 => {
                            tracing::info!(count, "Milestone sweep emitted reminders");
                        }
                        Ok(_) => tracing::debug!("Milestone sweep: nothing due"),
                        Err(e) => tracing::error!(error = %e, "Milestone sweep failed"),
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Single sweep executions
    // -----------------------------------------------------------------------

    /// Find semination records whose check date has passed without an
    /// outcome and remind the responsible user. Returns the number of
    /// records processed.
    pub async fn sweep_pregnancy_checks(&self, today: NaiveDate) -> Result<u64, sqlx::Error> {
        let due = SeminationRepo::list_due_checks(&self.pool, today).await?;
        let mut processed = 0;

        for item in &due {
            let target = item.assigned_user_id.unwrap_or(item.created_by_id);
            let notification = NewNotification {
                user_id: target,
                cattle_id: item.cattle_id,
                kind: KIND_PREGNANCY_CHECK_DUE,
                title: "Pregnancy Check Due".into(),
                message: format!(
                    "Pregnancy check is due for {} ({})",
                    item.cattle_name, item.tag_number
                ),
            };
            let data = serde_json::json!({
                "kind": KIND_PREGNANCY_CHECK_DUE,
                "cattle_id": item.cattle_id,
                "record_id": item.record_id,
                "check_date": item.check_date,
            });

            match self.emit(&notification, &data).await {
                Ok(()) => {
                    SeminationRepo::mark_reminded(&self.pool, item.record_id, today).await?;
                    processed += 1;
                }
                Err(e) => {
                    tracing::error!(
                        record_id = item.record_id,
                        tag_number = %item.tag_number,
                        error = %e,
                        "Failed to emit pregnancy-check reminder"
                    );
                }
            }
        }

        Ok(processed)
    }

    /// Find delivered pregnancies 15 or more days past delivery that have
    /// not been separated or reminded, and remind the dam's user. Returns
    /// the number of records processed.
    pub async fn sweep_separations(&self, today: NaiveDate) -> Result<u64, sqlx::Error> {
        let threshold = today
            .checked_sub_days(Days::new(SEPARATION_WAIT_DAYS))
            .unwrap_or(NaiveDate::MIN);
        let due = PregnancyRepo::list_due_separations(&self.pool, threshold).await?;
        let mut processed = 0;

        for item in &due {
            let target = item.assigned_user_id.unwrap_or(item.created_by_id);
            let notification = NewNotification {
                user_id: target,
                cattle_id: item.cattle_id,
                kind: KIND_SEPARATION_DUE,
                title: "Separation Due".into(),
                message: format!(
                    "Time to separate calf {} from {} ({})",
                    item.calf_name, item.dam_name, item.dam_tag_number
                ),
            };
            let data = serde_json::json!({
                "kind": KIND_SEPARATION_DUE,
                "cattle_id": item.cattle_id,
                "calf_id": item.calf_id,
                "record_id": item.record_id,
                "delivered_on": item.actual_delivery_date,
            });

            match self.emit(&notification, &data).await {
                Ok(()) => {
                    PregnancyRepo::mark_separation_reminded(&self.pool, item.record_id, today)
                        .await?;
                    processed += 1;
                }
                Err(e) => {
                    tracing::error!(
                        record_id = item.record_id,
                        dam_tag_number = %item.dam_tag_number,
                        error = %e,
                        "Failed to emit separation reminder"
                    );
                }
            }
        }

        Ok(processed)
    }

    /// Find in-progress pregnancies expected to deliver within the next
    /// seven days and remind the responsible user how many days remain.
    /// Returns the number of records processed.
    pub async fn sweep_milestones(&self, today: NaiveDate) -> Result<u64, sqlx::Error> {
        let horizon = today
            .checked_add_days(Days::new(DELIVERY_MILESTONE_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MAX);
        let due = PregnancyRepo::list_upcoming_deliveries(&self.pool, today, horizon).await?;
        let mut processed = 0;

        for item in &due {
            let remaining = days_until(today, item.expected_delivery_date);
            let target = item.assigned_user_id.unwrap_or(item.created_by_id);
            let notification = NewNotification {
                user_id: target,
                cattle_id: item.cattle_id,
                kind: KIND_DELIVERY_MILESTONE,
                title: "Pregnancy Milestone".into(),
                message: format!(
                    "{} ({}) is expected to deliver in {} day(s)",
                    item.cattle_name, item.tag_number, remaining
                ),
            };
            let data = serde_json::json!({
                "kind": KIND_DELIVERY_MILESTONE,
                "cattle_id": item.cattle_id,
                "record_id": item.record_id,
                "expected_delivery_date": item.expected_delivery_date,
                "days_remaining": remaining,
            });

            match self.emit(&notification, &data).await {
                Ok(()) => processed += 1,
                Err(e) => {
                    tracing::error!(
                        record_id = item.record_id,
                        tag_number = %item.tag_number,
                        error = %e,
                        "Failed to emit milestone reminder"
                    );
                }
            }
        }

        Ok(processed)
    }

    // -----------------------------------------------------------------------
    // Emission
    // -----------------------------------------------------------------------

    /// Persist one notification row, then attempt the push leg.
    ///
    /// The push attempt is fire-and-forget: a delivery failure is logged and
    /// does not undo the persisted row or fail the item.
    async fn emit(
        &self,
        notification: &NewNotification,
        data: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        NotificationRepo::create(&self.pool, notification).await?;

        match self.push_to_user(notification.user_id, notification, data).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(
                    user_id = notification.user_id,
                    "No device token registered, skipping push"
                );
            }
            Err(e) => {
                tracing::warn!(
                    user_id = notification.user_id,
                    error = %e,
                    "Push delivery failed"
                );
            }
        }

        Ok(())
    }

    /// Push to the user's registered device, if any. Returns `Ok(false)`
    /// when the user has no device token.
    async fn push_to_user(
        &self,
        user_id: DbId,
        notification: &NewNotification,
        data: &serde_json::Value,
    ) -> Result<bool, crate::notify::DeliveryError> {
        let token = match UserRepo::device_token(&self.pool, user_id).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Device token lookup failed");
                return Ok(false);
            }
        };
        let Some(token) = token else {
            return Ok(false);
        };

        self.sink
            .deliver(&token, &notification.title, &notification.message, data)
            .await?;
        Ok(true)
    }
}
