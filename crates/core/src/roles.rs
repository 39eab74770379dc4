//! Actor roles and the tenant/assignment access rules.
//!
//! Every lifecycle and registry operation receives an [`Actor`] resolved by
//! the HTTP layer; the rules here are the single place that decides which
//! cattle an actor may touch.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Role name stored in `users.role` and embedded in JWT claims.
pub const ROLE_ADMIN: &str = "ADMIN";
/// Role name for regular farm hands.
pub const ROLE_USER: &str = "USER";

/// Actor role. Admins manage an entire organization; users only the cattle
/// assigned to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::User => ROLE_USER,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            ROLE_ADMIN => Some(Role::Admin),
            ROLE_USER => Some(Role::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated principal on whose behalf an operation runs.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
    pub organization_id: DbId,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Check that this actor may operate on a cattle row.
    ///
    /// Rows outside the actor's organization are reported as `NotFound`, not
    /// `Forbidden`, so cross-tenant probing cannot confirm a row exists.
    /// Within the organization, admins may touch any cattle; a regular user
    /// only cattle assigned to them.
    pub fn ensure_cattle_access(
        &self,
        cattle_id: DbId,
        cattle_organization_id: DbId,
        assigned_user_id: Option<DbId>,
    ) -> Result<(), CoreError> {
        if cattle_organization_id != self.organization_id {
            return Err(CoreError::NotFound {
                entity: "Cattle",
                id: cattle_id,
            });
        }
        if self.is_admin() {
            return Ok(());
        }
        if assigned_user_id == Some(self.user_id) {
            return Ok(());
        }
        Err(CoreError::Forbidden(
            "Cattle is not assigned to you".into(),
        ))
    }
}
