//! Route definitions, one module per resource.

pub mod auth;
pub mod cattle;
pub mod health;
pub mod notification;
pub mod organization;
pub mod pregnancy;
pub mod semination;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                    register user (admin)
/// /auth/login                       login (public)
/// /auth/me                          profile
/// /auth/device                      register push token
///
/// /organizations                    create (admin)
/// /organizations/{id}               get, update, delete (admin)
/// /organizations/{id}/stats         counts (admin)
///
/// /cattle                           list, create
/// /cattle/{id}                      get, update, delete
/// /cattle/{id}/assign               assign to user (admin)
///
/// /seminations                      record semination
/// /seminations/{id}/check           record pregnancy check
/// /seminations/cattle/{cattle_id}   history
/// /seminations/pending-checks       due checks
///
/// /pregnancies/cattle/{cattle_id}   records
/// /pregnancies/{id}/delivery        record delivery
/// /pregnancies/{id}/separation      mark separation
/// /pregnancies/stats                counts by status
///
/// /notifications                    list
/// /notifications/{id}/read          mark read
/// /notifications/unread-count       unread count
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/organizations", organization::router())
        .nest("/cattle", cattle::router())
        .nest("/seminations", semination::router())
        .nest("/pregnancies", pregnancy::router())
        .nest("/notifications", notification::router())
}
