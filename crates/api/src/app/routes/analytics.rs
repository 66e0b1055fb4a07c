use std::sync::Arc;

use axum::{extract::Extension, Json};
use chrono::Utc;
use serde::Serialize;

use eventdesk_core::EventId;
use eventdesk_events::EventAnalytics;
use eventdesk_infra::EventOrder;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::SessionContext;

#[derive(Debug, Serialize)]
pub struct AnalyticsCounts {
    pub upcoming: usize,
    pub past: usize,
    pub total: usize,
    pub attendees: usize,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub counts: AnalyticsCounts,
    #[serde(flatten)]
    pub analytics: EventAnalytics,
}

/// GET /analytics - attendance for every event the caller owns
pub async fn overview(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let principal = services.resolve_principal(&session).await?;

    let events = services
        .store
        .list_events_by_owner(principal.id, EventOrder::Descending)
        .await?;
    let ids: Vec<EventId> = events.iter().map(|e| e.id).collect();
    let rsvps = services.store.list_rsvps_for_events(&ids).await?;

    let analytics = EventAnalytics::build(events, rsvps, Utc::now());

    Ok(Json(AnalyticsResponse {
        counts: AnalyticsCounts {
            upcoming: analytics.upcoming.len(),
            past: analytics.past.len(),
            total: analytics.all.len(),
            attendees: analytics.total_attendees(),
        },
        analytics,
    }))
}
