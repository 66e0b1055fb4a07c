use serde::{Deserialize, Serialize};

use eventdesk_core::UserId;

use crate::Role;

/// A fully resolved principal for authorization decisions.
///
/// Built by the caller from the authenticated session plus the stored
/// profile; the policy never looks anything up on its own.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
