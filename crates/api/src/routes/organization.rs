//! Route definitions for the `/organizations` resource. Admin only.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::organization;
use crate::state::AppState;

/// Routes mounted at `/organizations`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(organization::create_organization))
        .route("/{id}", get(organization::get_organization))
        .route("/{id}", put(organization::update_organization))
        .route("/{id}", delete(organization::delete_organization))
        .route("/{id}/stats", get(organization::organization_stats))
}
