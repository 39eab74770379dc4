//! Handlers for the `/seminations` resource.
//!
//! Recording and checking go through the lifecycle engine; reads apply the
//! same access rules directly.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use herdbook_core::error::CoreError;
use herdbook_core::types::DbId;
use herdbook_db::models::semination::{RecordPregnancyCheck, RecordSemination};
use herdbook_db::repositories::{CattleRepo, SeminationRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/seminations
///
/// Record a semination on a dam.
pub async fn record_semination(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RecordSemination>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let record = state
        .engine
        .record_semination(&auth.actor(), &input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": record })),
    ))
}

/// PUT /api/v1/seminations/{id}/check
///
/// Record the pregnancy check outcome for a semination record.
pub async fn check_pregnancy(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RecordPregnancyCheck>,
) -> AppResult<Json<serde_json::Value>> {
    let record = state
        .engine
        .check_pregnancy(&auth.actor(), id, &input)
        .await?;

    Ok(Json(serde_json::json!({ "data": record })))
}

/// GET /api/v1/seminations/cattle/{cattle_id}
///
/// Semination history for one cattle, newest first.
pub async fn semination_history(
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

    let records = SeminationRepo::list_for_cattle(&state.pool, cattle_id).await?;
    Ok(Json(serde_json::json!({ "data": records })))
}

/// GET /api/v1/seminations/pending-checks
///
/// Pregnancy checks due today or earlier that have not been resolved.
/// Admins see the whole organization; regular users only their cattle.
pub async fn pending_checks(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let assigned_user_id = (!auth.actor().is_admin()).then_some(auth.user_id);

    let records = SeminationRepo::list_pending_checks(
        &state.pool,
        auth.organization_id,
        assigned_user_id,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(serde_json::json!({ "data": records })))
}
