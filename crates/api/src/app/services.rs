//! Shared request-handling services: the store plus the few settings handlers need.

use eventdesk_auth::{Principal, Profile, Role};
use eventdesk_core::EventId;
use eventdesk_events::{Event, share_url};
use eventdesk_infra::SharedStore;

use crate::app::errors::ApiError;
use crate::context::SessionContext;

pub struct AppServices {
    pub store: SharedStore,
    pub app_url: String,
    pub default_signup_role: Role,
}

impl AppServices {
    pub fn new(store: SharedStore, app_url: impl Into<String>, default_signup_role: Role) -> Self {
        Self {
            store,
            app_url: app_url.into(),
            default_signup_role,
        }
    }

    /// Stored profile of the caller, if registered.
    pub async fn session_profile(&self, session: &SessionContext) -> Result<Option<Profile>, ApiError> {
        Ok(self.store.get_profile(session.user_id()).await?)
    }

    /// Resolve the acting principal. Callers without a profile are refused.
    pub async fn resolve_principal(&self, session: &SessionContext) -> Result<Principal, ApiError> {
        match self.session_profile(session).await? {
            Some(profile) => Ok(profile.principal()),
            None => {
                tracing::info!(user_id = %session.user_id(), "request from unregistered profile");
                Err(ApiError::forbidden("profile not registered"))
            }
        }
    }

    /// Look up an event by UUID or public slug.
    pub async fn find_event(&self, key: &str) -> Result<Option<Event>, ApiError> {
        if let Ok(id) = key.parse::<EventId>() {
            if let Some(event) = self.store.get_event(id).await? {
                return Ok(Some(event));
            }
        }
        Ok(self.store.get_event_by_slug(key).await?)
    }

    pub fn share_url(&self, event: &Event) -> String {
        share_url(&self.app_url, &event.public_slug)
    }
}
