use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /api/ping - round-trip to the backing store
pub async fn ping(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "store ping successful",
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "store ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "message": "ping failed",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// GET /whoami - session identity plus the stored role, if any
pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = services.session_profile(&session).await?;
    Ok(Json(serde_json::json!({
        "user_id": session.user_id().to_string(),
        "email": profile.as_ref().map(|p| p.email.clone()).or_else(|| session.email().map(str::to_string)),
        "role": profile.map(|p| p.role),
    })))
}
