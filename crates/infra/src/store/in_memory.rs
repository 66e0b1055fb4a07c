//! In-memory store for tests/dev.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use eventdesk_auth::{Profile, Role};
use eventdesk_core::{Entity, EventId, UserId};
use eventdesk_events::{Event, Rsvp};

use super::{DataStore, EventOrder, EventStore, ProfileStore, RsvpStore, StoreError};

/// A single table keyed by the entity id.
#[derive(Debug)]
struct Table<T: Entity> {
    rows: RwLock<HashMap<T::Id, T>>,
}

impl<T> Table<T>
where
    T: Entity,
    T::Id: Hash,
{
    fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<T::Id, T>>, StoreError> {
        self.rows
            .read()
            .map_err(|_| StoreError::Backend("in-memory table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<T::Id, T>>, StoreError> {
        self.rows
            .write()
            .map_err(|_| StoreError::Backend("in-memory table lock poisoned".to_string()))
    }
}

/// Process-local store with the same constraints as the Postgres schema:
/// unique profile ids, unique event slugs, one RSVP per email per event.
#[derive(Debug)]
pub struct InMemoryStore {
    profiles: Table<Profile>,
    events: Table<Event>,
    rsvps: Table<Rsvp>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            profiles: Table::new(),
            events: Table::new(),
            rsvps: Table::new(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryStore {
    async fn insert_profile(&self, profile: Profile) -> Result<(), StoreError> {
        let mut rows = self.profiles.write()?;
        if rows.contains_key(&profile.id) {
            return Err(StoreError::Conflict(format!("profile {} already exists", profile.id)));
        }
        rows.insert(profile.id, profile);
        Ok(())
    }

    async fn get_profile(&self, id: UserId) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.read()?.get(&id).cloned())
    }

    async fn list_profiles_except(&self, id: UserId) -> Result<Vec<Profile>, StoreError> {
        let mut out: Vec<Profile> = self
            .profiles
            .read()?
            .values()
            .filter(|p| p.id != id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn update_role(
        &self,
        id: UserId,
        expected_current: Role,
        new_role: Role,
    ) -> Result<Profile, StoreError> {
        let mut rows = self.profiles.write()?;
        let profile = rows.get_mut(&id).ok_or(StoreError::NotFound)?;
        if profile.role != expected_current {
            return Err(StoreError::Conflict(format!(
                "role of {id} changed concurrently (now {})",
                profile.role
            )));
        }
        profile.role = new_role;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }
}

#[async_trait::async_trait]
impl EventStore for InMemoryStore {
    async fn insert_event(&self, event: Event) -> Result<(), StoreError> {
        let mut rows = self.events.write()?;
        if rows.values().any(|e| e.public_slug == event.public_slug) {
            return Err(StoreError::Conflict(format!("slug '{}' is taken", event.public_slug)));
        }
        if rows.contains_key(&event.id) {
            return Err(StoreError::Conflict(format!("event {} already exists", event.id)));
        }
        rows.insert(event.id, event);
        Ok(())
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read()?.get(&id).cloned())
    }

    async fn get_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError> {
        Ok(self
            .events
            .read()?
            .values()
            .find(|e| e.public_slug == slug)
            .cloned())
    }

    async fn list_events_by_owner(
        &self,
        owner: UserId,
        order: EventOrder,
    ) -> Result<Vec<Event>, StoreError> {
        let mut out: Vec<Event> = self
            .events
            .read()?
            .values()
            .filter(|e| e.owner_id == owner)
            .cloned()
            .collect();
        out.sort_by(|a, b| match order {
            EventOrder::Ascending => a.date_time.cmp(&b.date_time),
            EventOrder::Descending => b.date_time.cmp(&a.date_time),
        });
        Ok(out)
    }

    async fn update_event(&self, event: Event) -> Result<(), StoreError> {
        let mut rows = self.events.write()?;
        match rows.get_mut(&event.id) {
            Some(slot) => {
                *slot = event;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_event(&self, id: EventId) -> Result<(), StoreError> {
        if self.events.write()?.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        self.rsvps.write()?.retain(|_, r| r.event_id != id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl RsvpStore for InMemoryStore {
    async fn insert_rsvp(&self, rsvp: Rsvp) -> Result<(), StoreError> {
        if !self.events.read()?.contains_key(&rsvp.event_id) {
            return Err(StoreError::NotFound);
        }
        let mut rows = self.rsvps.write()?;
        let duplicate = rows
            .values()
            .any(|r| r.event_id == rsvp.event_id && r.attendee_email == rsvp.attendee_email);
        if duplicate {
            return Err(StoreError::Conflict("already RSVP'd to this event".to_string()));
        }
        rows.insert(rsvp.id, rsvp);
        Ok(())
    }

    async fn list_rsvps(&self, event_id: EventId) -> Result<Vec<Rsvp>, StoreError> {
        let mut out: Vec<Rsvp> = self
            .rsvps
            .read()?
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(out)
    }

    async fn list_rsvps_for_events(&self, event_ids: &[EventId]) -> Result<Vec<Rsvp>, StoreError> {
        let mut out: Vec<Rsvp> = self
            .rsvps
            .read()?
            .values()
            .filter(|r| event_ids.contains(&r.event_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(out)
    }

    async fn count_rsvps(&self, event_id: EventId) -> Result<u64, StoreError> {
        let count = self
            .rsvps
            .read()?
            .values()
            .filter(|r| r.event_id == event_id)
            .count();
        Ok(count as u64)
    }
}

#[async_trait::async_trait]
impl DataStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.profiles.read().map(|_| ())
    }
}
