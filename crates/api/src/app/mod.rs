//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the shared store and the settings handlers read
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and parsing helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use eventdesk_auth::{Hs256JwtValidator, JwtValidator};
use eventdesk_infra::SharedStore;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(config: &ApiConfig, store: SharedStore) -> Router {
    let mut validator = Hs256JwtValidator::new(config.jwt_secret.as_bytes());
    if let Some(aud) = &config.jwt_audience {
        validator = validator.with_audience(aud);
    }
    let jwt: Arc<dyn JwtValidator> = Arc::new(validator);
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::AppServices::new(
        store,
        config.app_url.clone(),
        config.default_signup_role,
    ));

    // Protected routes: require a valid bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
