//! Route definitions for the `/seminations` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::semination;
use crate::state::AppState;

/// Routes mounted at `/seminations`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(semination::record_semination))
        .route("/{id}/check", put(semination::check_pregnancy))
        .route("/cattle/{cattle_id}", get(semination::semination_history))
        .route("/pending-checks", get(semination::pending_checks))
}
