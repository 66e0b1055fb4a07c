//! Organiser routes: the caller's own events, their calendar, and CRUD.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use eventdesk_auth::{can_manage_event, Principal};
use eventdesk_core::EventId;
use eventdesk_events::{attendee_csv, calendar, export_filename, slug, Event};
use eventdesk_infra::{EventOrder, StoreError};

use crate::app::dto::{EventListQuery, EventRequest, EventResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/calendar", get(calendar_days))
        .route(
            "/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/:id/export", get(export_attendees))
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub days: BTreeMap<String, usize>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn parse_event_id(raw: &str) -> Result<EventId, ApiError> {
    raw.parse::<EventId>()
        .map_err(|_| ApiError::invalid("invalid event id"))
}

/// Load an event and check the caller may manage it.
async fn managed_event(
    services: &AppServices,
    principal: &Principal,
    id: EventId,
) -> Result<Event, ApiError> {
    let event = services
        .store
        .get_event(id)
        .await?
        .ok_or_else(|| ApiError::not_found("event not found"))?;

    if !can_manage_event(principal.role, event.is_owned_by(principal.id)) {
        tracing::info!(user_id = %principal.id, event_id = %id, "event management denied");
        return Err(ApiError::forbidden("insufficient permissions"));
    }

    Ok(event)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /events - the caller's events, soonest first
pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let principal = services.resolve_principal(&session).await?;
    let day = query.day()?;

    let events = services
        .store
        .list_events_by_owner(principal.id, EventOrder::Ascending)
        .await?;

    let events = match day {
        Some(day) => calendar::events_on(&events, day).into_iter().cloned().collect(),
        None => events,
    };

    Ok(Json(
        events
            .into_iter()
            .map(|event| EventResponse {
                share_url: services.share_url(&event),
                event,
            })
            .collect(),
    ))
}

/// GET /events/calendar - number of events per UTC day
pub async fn calendar_days(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<CalendarResponse>, ApiError> {
    let principal = services.resolve_principal(&session).await?;
    let events = services
        .store
        .list_events_by_owner(principal.id, EventOrder::Ascending)
        .await?;

    let days = calendar::day_counts(&events)
        .into_iter()
        .map(|(day, count)| (day.format("%Y-%m-%d").to_string(), count))
        .collect();

    Ok(Json(CalendarResponse { days }))
}

/// POST /events
pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let principal = services.resolve_principal(&session).await?;
    let mut event = Event::create(principal.id, body.into_draft()?, Utc::now())?;

    match services.store.insert_event(event.clone()).await {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => {
            event.public_slug = slug::disambiguate(&event.public_slug, &event.id.to_string());
            tracing::debug!(slug = %event.public_slug, "public slug taken, retrying");
            services.store.insert_event(event.clone()).await?;
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(event_id = %event.id, owner = %principal.id, slug = %event.public_slug, "event created");

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            share_url: services.share_url(&event),
            event,
        }),
    ))
}

/// GET /events/:id
pub async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let principal = services.resolve_principal(&session).await?;
    let event = managed_event(&services, &principal, parse_event_id(&id)?).await?;

    Ok(Json(EventResponse {
        share_url: services.share_url(&event),
        event,
    }))
}

/// PUT /events/:id
pub async fn update_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> Result<Json<EventResponse>, ApiError> {
    let Json(body) = body?;
    let principal = services.resolve_principal(&session).await?;
    let mut event = managed_event(&services, &principal, parse_event_id(&id)?).await?;

    event.apply_update(body.into_draft()?)?;
    services.store.update_event(event.clone()).await?;

    tracing::info!(event_id = %event.id, user_id = %principal.id, "event updated");

    Ok(Json(EventResponse {
        share_url: services.share_url(&event),
        event,
    }))
}

/// DELETE /events/:id - removes the event and its RSVPs
pub async fn delete_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let principal = services.resolve_principal(&session).await?;
    let event = managed_event(&services, &principal, parse_event_id(&id)?).await?;

    services.store.delete_event(event.id).await?;
    tracing::info!(event_id = %event.id, user_id = %principal.id, "event deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /events/:id/export - attendee list as CSV, owner only
pub async fn export_attendees(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = services.resolve_principal(&session).await?;

    // Attendee data is released to the event's owner only, whatever the role.
    // Denial and absence look the same to the caller.
    let hidden = || ApiError::not_found("event not found or unauthorized");
    let id = id.parse::<EventId>().map_err(|_| hidden())?;
    let event = services
        .store
        .get_event(id)
        .await?
        .filter(|event| event.is_owned_by(principal.id))
        .ok_or_else(|| {
            tracing::info!(user_id = %principal.id, event_id = %id, "attendee export denied");
            hidden()
        })?;

    let rsvps = services.store.list_rsvps(event.id).await?;
    if rsvps.is_empty() {
        return Err(ApiError::not_found("no RSVPs found"));
    }

    let body = attendee_csv(&rsvps)?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(&event.title));

    tracing::info!(event_id = %event.id, rows = rsvps.len(), "attendees exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
