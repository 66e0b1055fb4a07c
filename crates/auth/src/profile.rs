//! User profile: the stored half of a principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::{DomainError, Entity, UserId};

use crate::{Principal, Role};

/// Profile row kept alongside the identity provider's account.
///
/// # Invariants
/// - `id` equals the identity provider's `sub` for the same account.
/// - `role` changes only through [`crate::policy`] checked requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Register a profile for a freshly signed-up account.
    pub fn register(
        id: UserId,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        Ok(Self {
            id,
            email,
            role,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.role)
    }
}

impl Entity for Profile {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
