use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global permission tier of a principal.
///
/// Closed set: anything that is not one of these three is rejected when the
/// string is parsed, so policy code never sees an "unknown" role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    EventOwner,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::EventOwner, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::EventOwner => "event_owner",
            Role::Admin => "admin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    /// Case-insensitive: `EVENT_OWNER` and `event_owner` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseRoleError(trimmed.to_string()))
    }
}
