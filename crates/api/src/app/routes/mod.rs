use axum::{Router, routing::get};

pub mod admin;
pub mod analytics;
pub mod events;
pub mod profiles;
pub mod public;
pub mod system;

/// Endpoints reachable without a bearer token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/ping", get(system::ping))
        .nest("/public/events", public::router())
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/analytics", get(analytics::overview))
        .nest("/profiles", profiles::router())
        .nest("/events", events::router())
        .nest("/admin", admin::router())
}
