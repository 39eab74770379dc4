use chrono::NaiveDate;

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The operation is not permitted from the record's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The operation was attempted before its waiting period elapsed.
    /// Carries the first date on which the operation becomes eligible.
    #[error("Too early: allowed on or after {eligible_on}")]
    TooEarly { eligible_on: NaiveDate },

    #[error("Internal error: {0}")]
    Internal(String),
}
