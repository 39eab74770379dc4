//! Route definitions for the `/pregnancies` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::pregnancy;
use crate::state::AppState;

/// Routes mounted at `/pregnancies`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cattle/{cattle_id}", get(pregnancy::pregnancy_records))
        .route("/{id}/delivery", put(pregnancy::record_delivery))
        .route("/{id}/separation", put(pregnancy::mark_separation))
        .route("/stats", get(pregnancy::pregnancy_stats))
}
