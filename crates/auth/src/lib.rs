//! `eventdesk-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod jwt;
pub mod policy;
pub mod principal;
pub mod profile;
pub mod roles;

pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use policy::{
    Denial, RoleChangeRequest, can_change_role, can_manage_event, can_view_user_list,
    parse_requested_role,
};
pub use principal::Principal;
pub use profile::Profile;
pub use roles::{ParseRoleError, Role};
