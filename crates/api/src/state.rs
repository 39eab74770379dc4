use std::sync::Arc;

use herdbook_breeding::LifecycleEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: herdbook_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Breeding lifecycle engine.
    pub engine: Arc<LifecycleEngine>,
}
