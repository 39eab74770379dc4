//! Handlers for the `/pregnancies` resource.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use herdbook_core::error::CoreError;
use herdbook_core::types::DbId;
use herdbook_db::models::pregnancy::{MarkSeparation, RecordDelivery};
use herdbook_db::repositories::{CattleRepo, PregnancyRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/pregnancies/cattle/{cattle_id}
///
/// Pregnancy records for one cattle, newest first.
pub async fn pregnancy_records(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(cattle_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let cattle = CattleRepo::find_by_id(&state.pool, cattle_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Cattle",
            id: cattle_id,
        }))?;
    auth.actor()
        .ensure_cattle_access(cattle.id, cattle.organization_id, cattle.assigned_user_id)?;

    let records = PregnancyRepo::list_for_cattle(&state.pool, cattle_id).await?;
    Ok(Json(serde_json::json!({ "data": records })))
}

/// PUT /api/v1/pregnancies/{id}/delivery
///
/// Record the delivery: advances the record, creates the calf, frees the dam.
pub async fn record_delivery(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RecordDelivery>,
) -> AppResult<Json<serde_json::Value>> {
    let outcome = state
        .engine
        .record_delivery(&auth.actor(), id, &input)
        .await?;

    Ok(Json(serde_json::json!({
        "data": {
            "record": outcome.record,
            "calf": outcome.calf,
        }
    })))
}

/// PUT /api/v1/pregnancies/{id}/separation
///
/// Mark the calf separation, 15 or more days after delivery.
pub async fn mark_separation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MarkSeparation>,
) -> AppResult<Json<serde_json::Value>> {
    let record = state
        .engine
        .mark_separation(&auth.actor(), id, &input)
        .await?;

    Ok(Json(serde_json::json!({ "data": record })))
}

/// GET /api/v1/pregnancies/stats
///
/// Counts by status. Admins see the whole organization; regular users only
/// their cattle.
pub async fn pregnancy_stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let assigned_user_id = (!auth.actor().is_admin()).then_some(auth.user_id);

    let stats = PregnancyRepo::stats(
        &state.pool,
        auth.organization_id,
        assigned_user_id,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(serde_json::json!({ "data": stats })))
}
