//! Role authority: who may change roles, list users, and manage events.
//!
//! - No IO
//! - No panics
//! - No state (callers pass every fact the decision needs)

use serde::Serialize;
use thiserror::Error;

use eventdesk_core::UserId;

use crate::{Principal, Role};

/// Reason a policy check refused an action.
///
/// Display strings are user-facing and returned verbatim by the HTTP layer.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    #[error("invalid role")]
    InvalidRole,

    #[error("cannot change own role")]
    SelfRoleChange,

    #[error("event owners can only manage regular users")]
    OwnerScope,

    #[error("insufficient permissions")]
    InsufficientPermissions,
}

impl Denial {
    /// Malformed input rather than a refused principal.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Denial::InvalidRole)
    }
}

/// Parse a requested role from untrusted input.
pub fn parse_requested_role(raw: &str) -> Result<Role, Denial> {
    raw.parse::<Role>().map_err(|_| Denial::InvalidRole)
}

/// Decide whether `acting_role` may move a target from `target_current_role`
/// to `requested_role`.
///
/// Checks run in a fixed order; the first failing one is reported.
pub fn can_change_role(
    acting_role: Role,
    target_current_role: Role,
    requested_role: Role,
    is_self: bool,
) -> Result<(), Denial> {
    let decision = if is_self {
        Err(Denial::SelfRoleChange)
    } else {
        match acting_role {
            Role::Admin => Ok(()),
            Role::EventOwner => {
                if requested_role == Role::User && target_current_role == Role::User {
                    Ok(())
                } else {
                    Err(Denial::OwnerScope)
                }
            }
            Role::User => Err(Denial::InsufficientPermissions),
        }
    };

    tracing::debug!(
        acting = %acting_role,
        target_current = %target_current_role,
        requested = %requested_role,
        is_self,
        allowed = decision.is_ok(),
        "role change evaluated"
    );

    decision
}

/// Admins and event owners may see the user list.
pub fn can_view_user_list(acting_role: Role) -> Result<(), Denial> {
    match acting_role {
        Role::Admin | Role::EventOwner => Ok(()),
        Role::User => {
            tracing::debug!(acting = %acting_role, "user list denied");
            Err(Denial::InsufficientPermissions)
        }
    }
}

/// Whether mutating controls for an event are exposed / honoured.
pub fn can_manage_event(acting_role: Role, is_owner_of_event: bool) -> bool {
    matches!(acting_role, Role::Admin | Role::EventOwner) || is_owner_of_event
}

/// A single role mutation, constructed per request and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChangeRequest {
    pub acting: Principal,
    pub target_id: UserId,
    pub target_current_role: Role,
    pub requested_role: String,
}

impl RoleChangeRequest {
    pub fn is_self(&self) -> bool {
        self.acting.id == self.target_id
    }

    /// Evaluate the request, returning the role to persist on success.
    pub fn evaluate(&self) -> Result<Role, Denial> {
        let requested = parse_requested_role(&self.requested_role)?;
        can_change_role(
            self.acting.role,
            self.target_current_role,
            requested,
            self.is_self(),
        )?;
        Ok(requested)
    }
}
