//! Identity & data store abstractions.
//!
//! Every HTTP handler translates into one (occasionally two) calls on these
//! traits. Implementations must be `Send + Sync`; the API shares a single
//! `Arc<dyn DataStore>` across all requests.

use std::sync::Arc;

use thiserror::Error;

use eventdesk_auth::{Profile, Role};
use eventdesk_core::{EventId, UserId};
use eventdesk_events::{Event, Rsvp};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Storage operation error.
///
/// These are **infrastructure errors**; validation failures never reach the
/// store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// Unique constraint or compare-and-set failure.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Ordering of an owner's events by `date_time`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventOrder {
    Ascending,
    Descending,
}

#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fails with `Conflict` if a profile with the same id exists.
    async fn insert_profile(&self, profile: Profile) -> Result<(), StoreError>;

    async fn get_profile(&self, id: UserId) -> Result<Option<Profile>, StoreError>;

    /// Every profile except `id`, newest `created_at` first.
    async fn list_profiles_except(&self, id: UserId) -> Result<Vec<Profile>, StoreError>;

    /// Compare-and-set role update.
    ///
    /// Writes only if the stored role still equals `expected_current`;
    /// otherwise returns `Conflict`. Returns `NotFound` for unknown ids.
    async fn update_role(
        &self,
        id: UserId,
        expected_current: Role,
        new_role: Role,
    ) -> Result<Profile, StoreError>;
}

#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Fails with `Conflict` if the public slug is already taken.
    async fn insert_event(&self, event: Event) -> Result<(), StoreError>;

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError>;

    async fn get_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError>;

    async fn list_events_by_owner(
        &self,
        owner: UserId,
        order: EventOrder,
    ) -> Result<Vec<Event>, StoreError>;

    /// Overwrite an existing event. `NotFound` if it does not exist.
    async fn update_event(&self, event: Event) -> Result<(), StoreError>;

    /// Remove the event and every RSVP attached to it.
    async fn delete_event(&self, id: EventId) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
pub trait RsvpStore: Send + Sync {
    /// Fails with `Conflict` if the event already has an RSVP for this email.
    async fn insert_rsvp(&self, rsvp: Rsvp) -> Result<(), StoreError>;

    /// Oldest first.
    async fn list_rsvps(&self, event_id: EventId) -> Result<Vec<Rsvp>, StoreError>;

    /// Newest first.
    async fn list_rsvps_for_events(&self, event_ids: &[EventId]) -> Result<Vec<Rsvp>, StoreError>;

    async fn count_rsvps(&self, event_id: EventId) -> Result<u64, StoreError>;
}

/// Everything the API needs from the backing service.
#[async_trait::async_trait]
pub trait DataStore: ProfileStore + EventStore + RsvpStore {
    /// Lightweight liveness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Shared handle used by the HTTP layer.
pub type SharedStore = Arc<dyn DataStore>;
