//! Handlers for the `/organizations` resource.
//!
//! All endpoints are admin only. Reads and writes are restricted to the
//! caller's own organization; other tenants' rows are reported as not found.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use herdbook_core::error::CoreError;
use herdbook_core::types::DbId;
use herdbook_db::models::organization::{CreateOrganization, UpdateOrganization};
use herdbook_db::repositories::{OrganizationRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Reject access to any organization other than the caller's own.
fn ensure_own_org(auth: &AuthUser, id: DbId) -> Result<(), AppError> {
    if id != auth.organization_id {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Organization",
            id,
        }));
    }
    Ok(())
}

/// POST /api/v1/organizations
///
/// Create a new organization (tenant bootstrap).
pub async fn create_organization(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateOrganization>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    auth.require_admin()?;

    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Organization name is required".into(),
        )));
    }

    let organization = OrganizationRepo::create(&state.pool, &input).await?;
    tracing::info!(organization_id = organization.id, "Organization created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": organization })),
    ))
}

/// GET /api/v1/organizations/{id}
///
/// The organization row together with its members.
pub async fn get_organization(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;
    ensure_own_org(&auth, id)?;

    let organization = OrganizationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Organization",
            id,
        }))?;
    let users = UserRepo::list_for_org(&state.pool, id).await?;

    Ok(Json(serde_json::json!({
        "data": {
            "organization": organization,
            "users": users,
        }
    })))
}

/// PUT /api/v1/organizations/{id}
pub async fn update_organization(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrganization>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;
    ensure_own_org(&auth, id)?;

    let organization = OrganizationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Organization",
            id,
        }))?;

    Ok(Json(serde_json::json!({ "data": organization })))
}

/// DELETE /api/v1/organizations/{id}
///
/// Only an empty organization (no users beyond the caller, no cattle) can be
/// removed.
pub async fn delete_organization(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;
    ensure_own_org(&auth, id)?;

    let stats = OrganizationRepo::stats(&state.pool, id).await?;
    if stats.cattle > 0 || stats.users > 1 {
        return Err(AppError::Core(CoreError::Conflict(
            "Organization still has users or cattle".into(),
        )));
    }

    let removed = OrganizationRepo::delete(&state.pool, id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Organization",
            id,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/organizations/{id}/stats
pub async fn organization_stats(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;
    ensure_own_org(&auth, id)?;

    let stats = OrganizationRepo::stats(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "data": stats })))
}
