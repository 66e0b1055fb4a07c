//! Process configuration, read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use eventdesk_auth::Role;

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("EVENTDESK_BIND is not a socket address: {0}")]
    InvalidBind(String),

    #[error("DEFAULT_SIGNUP_ROLE is not a known role: {0}")]
    InvalidSignupRole(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    /// `None` runs on the in-memory store.
    pub database_url: Option<String>,
    /// Base of public share links.
    pub app_url: String,
    /// Role given to newly registered profiles.
    pub default_signup_role: Role,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map instead of the real env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("EVENTDESK_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBind(bind_raw.clone()))?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let default_signup_role = match get("DEFAULT_SIGNUP_ROLE") {
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|_| ConfigError::InvalidSignupRole(raw.clone()))?,
            None => Role::EventOwner,
        };

        Ok(Self {
            bind,
            jwt_secret,
            jwt_audience: get("JWT_AUDIENCE"),
            database_url: get("DATABASE_URL"),
            app_url: get("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
            default_signup_role,
        })
    }

    /// Defaults with an explicit secret; handy for tests.
    pub fn for_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: jwt_secret.into(),
            jwt_audience: None,
            database_url: None,
            app_url: DEFAULT_APP_URL.to_string(),
            default_signup_role: Role::EventOwner,
        }
    }
}
