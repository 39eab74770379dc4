//! Route definitions for the `/cattle` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::cattle;
use crate::state::AppState;

/// Routes mounted at `/cattle`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cattle::list_cattle))
        .route("/", post(cattle::create_cattle))
        .route("/{id}", get(cattle::get_cattle))
        .route("/{id}", put(cattle::update_cattle))
        .route("/{id}", delete(cattle::delete_cattle))
        .route("/{id}/assign", post(cattle::assign_cattle))
}
