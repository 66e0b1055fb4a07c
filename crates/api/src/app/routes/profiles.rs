//! Profile registration for accounts created at the identity provider.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use eventdesk_auth::Profile;
use eventdesk_infra::StoreError;

use crate::app::dto::CreateProfileRequest;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_profile))
        .route("/me", get(my_profile))
}

/// POST /profiles - register the caller with the configured signup role
pub async fn create_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    body: Option<Json<CreateProfileRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let email = body
        .email
        .as_deref()
        .or(session.email())
        .ok_or_else(|| ApiError::invalid("email is required"))?;

    let profile = Profile::register(
        session.user_id(),
        email,
        services.default_signup_role,
        Utc::now(),
    )?;

    match services.store.insert_profile(profile.clone()).await {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => {
            return Err(ApiError::Conflict("profile already registered".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %profile.id, role = %profile.role, "profile registered");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /profiles/me
pub async fn my_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Profile>, ApiError> {
    services
        .session_profile(&session)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("profile not registered"))
}
