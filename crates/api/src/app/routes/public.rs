//! Unauthenticated routes behind an event's share link.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use eventdesk_events::{Event, Rsvp};
use eventdesk_infra::StoreError;

use crate::app::dto::RsvpRequest;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/:key", get(public_event))
        .route("/:key/rsvps", post(submit_rsvp))
}

#[derive(Debug, Serialize)]
pub struct PublicEventResponse {
    pub event: Event,
    pub rsvp_count: u64,
    pub share_url: String,
}

/// GET /public/events/:key - key is the event id or its public slug
pub async fn public_event(
    Extension(services): Extension<Arc<AppServices>>,
    Path(key): Path<String>,
) -> Result<Json<PublicEventResponse>, ApiError> {
    let event = services
        .find_event(&key)
        .await?
        .ok_or_else(|| ApiError::not_found("event not found"))?;

    let rsvp_count = services.store.count_rsvps(event.id).await?;

    Ok(Json(PublicEventResponse {
        share_url: services.share_url(&event),
        event,
        rsvp_count,
    }))
}

/// POST /public/events/:key/rsvps
pub async fn submit_rsvp(
    Extension(services): Extension<Arc<AppServices>>,
    Path(key): Path<String>,
    body: Result<Json<RsvpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Rsvp>), ApiError> {
    let Json(body) = body?;
    let event = services
        .find_event(&key)
        .await?
        .ok_or_else(|| ApiError::not_found("event not found"))?;

    let rsvp = Rsvp::new(event.id, body.into(), Utc::now())?;

    match services.store.insert_rsvp(rsvp.clone()).await {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => {
            return Err(ApiError::Conflict("already RSVP'd to this event".to_string()));
        }
        Err(StoreError::NotFound) => return Err(ApiError::not_found("event not found")),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(event_id = %event.id, rsvp_id = %rsvp.id, "rsvp recorded");
    Ok((StatusCode::CREATED, Json(rsvp)))
}
