//! Handlers for the `/cattle` resource.
//!
//! Listing is tenant scoped: admins see the whole organization, regular
//! users only the cattle assigned to them. Deletion is a tombstone (status
//! DECEASED); rows are never removed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use herdbook_core::error::CoreError;
use herdbook_core::types::DbId;
use herdbook_db::models::cattle::{CattleFilter, CreateCattle, UpdateCattle};
use herdbook_db::repositories::{CattleRepo, PregnancyRepo, SeminationRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum page size for cattle listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for cattle listing.
const DEFAULT_LIMIT: i64 = 20;

/// Accepted values for a cattle gender.
const GENDERS: [&str; 2] = ["FEMALE", "MALE"];

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /cattle`.
#[derive(Debug, Deserialize)]
pub struct CattleQuery {
    pub status: Option<String>,
    /// Case-insensitive substring match over name, tag number, and breed.
    pub search: Option<String>,
    /// Maximum number of results. Defaults to 20, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Request body for `POST /cattle/{id}/assign`.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub user_id: DbId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/cattle
///
/// List cattle in the caller's organization with optional filtering.
pub async fn list_cattle(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CattleQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);

    let filter = CattleFilter {
        // Regular users only see cattle assigned to them.
        assigned_user_id: (!auth.actor().is_admin()).then_some(auth.user_id),
        status: params.status,
        search: params.search,
    };

    let cattle = CattleRepo::list(&state.pool, auth.organization_id, &filter, limit, offset).await?;
    let total = CattleRepo::count(&state.pool, auth.organization_id, &filter).await?;

    Ok(Json(serde_json::json!({
        "data": cattle,
        "total": total,
    })))
}

/// GET /api/v1/cattle/{id}
///
/// Fetch one cattle with its lineage and full breeding history.
pub async fn get_cattle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let cattle = CattleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Cattle",
            id,
        }))?;
    auth.actor()
        .ensure_cattle_access(cattle.id, cattle.organization_id, cattle.assigned_user_id)?;

    let parent = match cattle.parent_id {
        Some(parent_id) => CattleRepo::find_by_id(&state.pool, parent_id).await?,
        None => None,
    };
    let children = CattleRepo::list_children(&state.pool, cattle.id).await?;
    let semination_records = SeminationRepo::list_for_cattle(&state.pool, cattle.id).await?;
    let pregnancy_records = PregnancyRepo::list_for_cattle(&state.pool, cattle.id).await?;

    Ok(Json(serde_json::json!({
        "data": {
            "cattle": cattle,
            "parent": parent,
            "children": children,
            "semination_records": semination_records,
            "pregnancy_records": pregnancy_records,
        }
    })))
}

/// POST /api/v1/cattle
///
/// Register a cattle individual. Admin only.
pub async fn create_cattle(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCattle>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    auth.require_admin()?;

    if input.tag_number.trim().is_empty() || input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Tag number and name are required".into(),
        )));
    }
    if !GENDERS.contains(&input.gender.as_str()) {
        return Err(AppError::Core(CoreError::Validation(
            "Gender must be FEMALE or MALE".into(),
        )));
    }

    if CattleRepo::tag_exists(&state.pool, auth.organization_id, &input.tag_number).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Tag number {} is already in use",
            input.tag_number
        ))));
    }

    // Parent and assignee, when given, must belong to the same organization.
    if let Some(parent_id) = input.parent_id {
        CattleRepo::find_in_org(&state.pool, parent_id, auth.organization_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Cattle",
                id: parent_id,
            }))?;
    }
    if let Some(user_id) = input.assigned_user_id {
        UserRepo::find_in_org(&state.pool, user_id, auth.organization_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }))?;
    }

    let cattle = CattleRepo::create(&state.pool, auth.organization_id, &input).await?;
    tracing::info!(cattle_id = cattle.id, tag_number = %cattle.tag_number, "Cattle registered");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": cattle })),
    ))
}

/// PUT /api/v1/cattle/{id}
///
/// Update cattle details. Admins may update any cattle in the organization;
/// regular users only cattle assigned to them.
pub async fn update_cattle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCattle>,
) -> AppResult<Json<serde_json::Value>> {
    let cattle = CattleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Cattle",
            id,
        }))?;
    auth.actor()
        .ensure_cattle_access(cattle.id, cattle.organization_id, cattle.assigned_user_id)?;

    if let Some(status) = &input.status {
        if herdbook_core::breeding::CattleStatus::parse(status).is_none() {
            return Err(AppError::Core(CoreError::Validation(
                "Unknown cattle status".into(),
            )));
        }
    }
    if let Some(user_id) = input.assigned_user_id {
        UserRepo::find_in_org(&state.pool, user_id, auth.organization_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }))?;
    }

    let updated = CattleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Cattle",
            id,
        }))?;

    Ok(Json(serde_json::json!({ "data": updated })))
}

/// DELETE /api/v1/cattle/{id}
///
/// Tombstone a cattle row (status DECEASED). Admin only.
pub async fn delete_cattle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;

    let cattle = CattleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Cattle",
            id,
        }))?;
    auth.actor()
        .ensure_cattle_access(cattle.id, cattle.organization_id, cattle.assigned_user_id)?;

    CattleRepo::mark_deceased(&state.pool, id).await?;
    tracing::info!(cattle_id = id, "Cattle marked deceased");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/cattle/{id}/assign
///
/// Assign a cattle to a user. Admin only.
pub async fn assign_cattle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AssignRequest>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    let cattle = CattleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Cattle",
            id,
        }))?;
    auth.actor()
        .ensure_cattle_access(cattle.id, cattle.organization_id, cattle.assigned_user_id)?;

    UserRepo::find_in_org(&state.pool, input.user_id, auth.organization_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    let updated = CattleRepo::assign(&state.pool, id, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Cattle",
            id,
        }))?;

    tracing::info!(cattle_id = id, user_id = input.user_id, "Cattle assigned");
    Ok(Json(serde_json::json!({ "data": updated })))
}
