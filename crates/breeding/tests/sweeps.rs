//! Integration tests for the reminder sweeps.
//!
//! Each sweep runs once against seeded data with a pinned "today", using a
//! recording sink in place of the push gateway.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use sqlx::PgPool;
use herdbook_breeding::notify::DeliveryError;
use herdbook_breeding::{NotificationSink, ReminderScheduler};
use herdbook_core::roles::Role;
use herdbook_core::types::DbId;

use common::*;

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Records every delivered push; never fails.
#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        _data: &serde_json::Value,
    ) -> Result<(), DeliveryError> {
        self.delivered.lock().unwrap().push((
            device_token.to_string(),
            title.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}

/// Fails every delivery attempt.
struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn deliver(
        &self,
        _device_token: &str,
        _title: &str,
        _body: &str,
        _data: &serde_json::Value,
    ) -> Result<(), DeliveryError> {
        Err(DeliveryError::HttpStatus(500))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

async fn set_device_token(pool: &PgPool, user_id: DbId, token: &str) {
    sqlx::query("UPDATE users SET device_token = $2 WHERE id = $1")
        .bind(user_id)
        .bind(token)
        .execute(pool)
        .await
        .expect("set device token");
}

/// Insert an unresolved semination record with the given check date.
async fn seed_open_semination(
    pool: &PgPool,
    cattle_id: DbId,
    created_by: DbId,
    check_date: NaiveDate,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO semination_records \
            (cattle_id, semination_date, check_date, created_by_id) \
         VALUES ($1, $2 - 15, $2, $3) RETURNING id",
    )
    .bind(cattle_id)
    .bind(check_date)
    .bind(created_by)
    .fetch_one(pool)
    .await
    .expect("seed semination")
}

/// Insert a pregnancy record in the given status.
async fn seed_pregnancy(
    pool: &PgPool,
    cattle_id: DbId,
    semination_id: DbId,
    created_by: DbId,
    status: &str,
    expected: NaiveDate,
    delivered: Option<NaiveDate>,
    calf_id: Option<DbId>,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO pregnancy_records \
            (cattle_id, semination_record_id, expected_delivery_date, \
             actual_delivery_date, calf_id, status, created_by_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
    )
    .bind(cattle_id)
    .bind(semination_id)
    .bind(expected)
    .bind(delivered)
    .bind(calf_id)
    .bind(status)
    .bind(created_by)
    .fetch_one(pool)
    .await
    .expect("seed pregnancy")
}

async fn notifications_for(pool: &PgPool, user_id: DbId) -> Vec<(String, String)> {
    sqlx::query_as("SELECT kind, message FROM notifications WHERE user_id = $1 ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .expect("notifications")
}

// ---------------------------------------------------------------------------
// Pregnancy-check sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn check_sweep_reminds_assigned_user_once_per_day(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let admin = seed_user(&pool, org, "admin", Role::Admin).await;
    let hand = seed_user(&pool, org, "hand", Role::User).await;
    set_device_token(&pool, hand, "token-hand").await;
    let cow = seed_cattle(&pool, org, "A-001", Some(hand)).await;

    let today = date(2024, 3, 1);
    seed_open_semination(&pool, cow, admin, date(2024, 2, 25)).await;

    let sink = Arc::new(RecordingSink::default());
    let scheduler = ReminderScheduler::new(pool.clone(), Arc::clone(&sink) as Arc<dyn NotificationSink>);

    let processed = scheduler.sweep_pregnancy_checks(today).await.unwrap();
    assert_eq!(processed, 1);

    let rows = notifications_for(&pool, hand).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "PREGNANCY_CHECK_DUE");
    assert!(rows[0].1.contains("A-001"));

    let pushes = sink.delivered.lock().unwrap().clone();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].0, "token-hand");

    // Same day again: the reminded-on marker suppresses the repeat.
    let processed = scheduler.sweep_pregnancy_checks(today).await.unwrap();
    assert_eq!(processed, 0);
    assert_eq!(notifications_for(&pool, hand).await.len(), 1);

    // The next day it nags again because the check is still unresolved.
    let processed = scheduler
        .sweep_pregnancy_checks(today + Days::new(1))
        .await
        .unwrap();
    assert_eq!(processed, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn check_sweep_falls_back_to_record_creator(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let admin = seed_user(&pool, org, "admin", Role::Admin).await;
    let cow = seed_cattle(&pool, org, "A-001", None).await;

    seed_open_semination(&pool, cow, admin, date(2024, 2, 25)).await;

    let scheduler = ReminderScheduler::new(pool.clone(), Arc::new(RecordingSink::default()));
    let processed = scheduler.sweep_pregnancy_checks(date(2024, 3, 1)).await.unwrap();
    assert_eq!(processed, 1);

    assert_eq!(notifications_for(&pool, admin).await.len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn check_sweep_skips_resolved_and_future_checks(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let admin = seed_user(&pool, org, "admin", Role::Admin).await;
    let cow_due = seed_cattle(&pool, org, "A-001", None).await;
    let cow_future = seed_cattle(&pool, org, "A-002", None).await;
    let cow_resolved = seed_cattle(&pool, org, "A-003", None).await;

    let today = date(2024, 3, 1);
    seed_open_semination(&pool, cow_due, admin, today).await;
    seed_open_semination(&pool, cow_future, admin, today + Days::new(3)).await;
    let resolved = seed_open_semination(&pool, cow_resolved, admin, today - Days::new(1)).await;
    sqlx::query("UPDATE semination_records SET is_pregnant = false WHERE id = $1")
        .bind(resolved)
        .execute(&pool)
        .await
        .unwrap();

    let scheduler = ReminderScheduler::new(pool.clone(), Arc::new(RecordingSink::default()));
    let processed = scheduler.sweep_pregnancy_checks(today).await.unwrap();
    assert_eq!(processed, 1, "only the due unresolved record is picked up");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn check_sweep_survives_push_failures(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let admin = seed_user(&pool, org, "admin", Role::Admin).await;
    set_device_token(&pool, admin, "token-admin").await;
    let cow_a = seed_cattle(&pool, org, "A-001", None).await;
    let cow_b = seed_cattle(&pool, org, "A-002", None).await;

    let today = date(2024, 3, 1);
    seed_open_semination(&pool, cow_a, admin, today).await;
    seed_open_semination(&pool, cow_b, admin, today).await;

    let scheduler = ReminderScheduler::new(pool.clone(), Arc::new(FailingSink));
    let processed = scheduler.sweep_pregnancy_checks(today).await.unwrap();

    // Push delivery is fire-and-forget: both items complete and both
    // notification rows survive the failed pushes.
    assert_eq!(processed, 2);
    assert_eq!(notifications_for(&pool, admin).await.len(), 2);
}

// ---------------------------------------------------------------------------
// Separation sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn separation_sweep_uses_widened_window_and_reminds_once(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let admin = seed_user(&pool, org, "admin", Role::Admin).await;
    let hand = seed_user(&pool, org, "hand", Role::User).await;
    let dam = seed_cattle(&pool, org, "A-001", Some(hand)).await;
    let calf = seed_cattle(&pool, org, "C-001", Some(hand)).await;

    let today = date(2024, 3, 1);
    let semination = seed_open_semination(&pool, dam, admin, date(2023, 7, 1)).await;
    // Delivered 22 days ago: an exact-day sweep would have missed this one.
    seed_pregnancy(
        &pool,
        dam,
        semination,
        admin,
        "DELIVERED",
        date(2024, 2, 1),
        Some(today - Days::new(22)),
        Some(calf),
    )
    .await;

    let scheduler = ReminderScheduler::new(pool.clone(), Arc::new(RecordingSink::default()));
    let processed = scheduler.sweep_separations(today).await.unwrap();
    assert_eq!(processed, 1);

    let rows = notifications_for(&pool, hand).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "SEPARATION_DUE");
    assert!(rows[0].1.contains("cow-C-001"));

    // Reminded once, not every day.
    let processed = scheduler.sweep_separations(today + Days::new(1)).await.unwrap();
    assert_eq!(processed, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn separation_sweep_skips_recent_deliveries(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let admin = seed_user(&pool, org, "admin", Role::Admin).await;
    let dam = seed_cattle(&pool, org, "A-001", None).await;
    let calf = seed_cattle(&pool, org, "C-001", None).await;

    let today = date(2024, 3, 1);
    let semination = seed_open_semination(&pool, dam, admin, date(2023, 7, 1)).await;
    seed_pregnancy(
        &pool,
        dam,
        semination,
        admin,
        "DELIVERED",
        date(2024, 2, 25),
        Some(today - Days::new(10)),
        Some(calf),
    )
    .await;

    let scheduler = ReminderScheduler::new(pool.clone(), Arc::new(RecordingSink::default()));
    let processed = scheduler.sweep_separations(today).await.unwrap();
    assert_eq!(processed, 0, "ten days post-delivery is inside the window");
}

// ---------------------------------------------------------------------------
// Milestone sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn milestone_sweep_reports_days_until_delivery(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let admin = seed_user(&pool, org, "admin", Role::Admin).await;
    let hand = seed_user(&pool, org, "hand", Role::User).await;
    set_device_token(&pool, hand, "token-hand").await;
    let near = seed_cattle(&pool, org, "A-001", Some(hand)).await;
    let far = seed_cattle(&pool, org, "A-002", Some(hand)).await;

    let today = date(2024, 9, 26);
    let sem_near = seed_open_semination(&pool, near, admin, date(2024, 1, 16)).await;
    let sem_far = seed_open_semination(&pool, far, admin, date(2024, 2, 16)).await;
    // Expected in five days: inside the seven-day window.
    seed_pregnancy(
        &pool, near, sem_near, admin, "IN_PROGRESS",
        today + Days::new(5), None, None,
    )
    .await;
    // Expected in ten days: outside the window.
    seed_pregnancy(
        &pool, far, sem_far, admin, "IN_PROGRESS",
        today + Days::new(10), None, None,
    )
    .await;

    let sink = Arc::new(RecordingSink::default());
    let scheduler = ReminderScheduler::new(pool.clone(), Arc::clone(&sink) as Arc<dyn NotificationSink>);

    let processed = scheduler.sweep_milestones(today).await.unwrap();
    assert_eq!(processed, 1);

    let rows = notifications_for(&pool, hand).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "DELIVERY_MILESTONE");
    assert!(rows[0].1.contains("5 day(s)"), "message was: {}", rows[0].1);

    let pushes = sink.delivered.lock().unwrap().clone();
    assert_eq!(pushes.len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn milestone_sweep_ignores_delivered_records(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let admin = seed_user(&pool, org, "admin", Role::Admin).await;
    let dam = seed_cattle(&pool, org, "A-001", None).await;
    let calf = seed_cattle(&pool, org, "C-001", None).await;

    let today = date(2024, 9, 26);
    let semination = seed_open_semination(&pool, dam, admin, date(2024, 1, 16)).await;
    seed_pregnancy(
        &pool,
        dam,
        semination,
        admin,
        "DELIVERED",
        today + Days::new(3),
        Some(today - Days::new(1)),
        Some(calf),
    )
    .await;

    let scheduler = ReminderScheduler::new(pool.clone(), Arc::new(RecordingSink::default()));
    let processed = scheduler.sweep_milestones(today).await.unwrap();
    assert_eq!(processed, 0);
}
