//! Admin routes for role management.
//!
//! Every decision goes through the RoleAuthority policy in `eventdesk_auth`;
//! this module only resolves the inputs and persists the outcome.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use eventdesk_auth::{can_view_user_list, parse_requested_role, RoleChangeRequest, Role};
use eventdesk_core::UserId;
use eventdesk_infra::StoreError;

use crate::app::dto::{parse_user_id, ChangeRoleRequest, UserSummary};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::SessionContext;

// ─────────────────────────────────────────────────────────────────────────────
// Response DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct RoleChangedResponse {
    pub message: &'static str,
    pub user_id: UserId,
    pub role: Role,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new().route("/users", get(list_users).patch(change_role))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /admin/users - every profile except the caller, newest first
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<UserListResponse>, ApiError> {
    let principal = services.resolve_principal(&session).await?;

    if let Err(denial) = can_view_user_list(principal.role) {
        tracing::info!(user_id = %principal.id, role = %principal.role, "user list denied");
        return Err(denial.into());
    }

    let users = services
        .store
        .list_profiles_except(principal.id)
        .await?
        .into_iter()
        .map(UserSummary::from)
        .collect();

    Ok(Json(UserListResponse { users }))
}

/// PATCH /admin/users - change another user's role
pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<ChangeRoleRequest>, JsonRejection>,
) -> Result<Json<RoleChangedResponse>, ApiError> {
    let Json(body) = body?;
    let (Some(raw_user_id), Some(raw_role)) = (body.user_id, body.new_role) else {
        return Err(ApiError::invalid("user ID and new role are required"));
    };

    // Rule 1 runs before anything touches the store.
    parse_requested_role(&raw_role)?;
    let target_id = parse_user_id(&raw_user_id)?;

    let acting = services.resolve_principal(&session).await?;

    let target = services
        .store
        .get_profile(target_id)
        .await?
        .ok_or_else(|| ApiError::not_found("target user not found"))?;

    let request = RoleChangeRequest {
        acting,
        target_id,
        target_current_role: target.role,
        requested_role: raw_role,
    };

    let new_role = request.evaluate().inspect_err(|denial| {
        tracing::info!(
            acting = %acting.id,
            target = %target_id,
            reason = %denial,
            "role change denied"
        );
    })?;

    let updated = match services
        .store
        .update_role(target_id, target.role, new_role)
        .await
    {
        Ok(profile) => profile,
        Err(StoreError::Conflict(_)) => {
            tracing::warn!(target = %target_id, "role changed concurrently");
            return Err(ApiError::Conflict(
                "role was changed by another request; reload and retry".to_string(),
            ));
        }
        Err(StoreError::NotFound) => return Err(ApiError::not_found("target user not found")),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        acting = %acting.id,
        target = %target_id,
        from = %target.role,
        to = %updated.role,
        "role updated"
    );

    Ok(Json(RoleChangedResponse {
        message: "role updated successfully",
        user_id: updated.id,
        role: updated.role,
    }))
}
