use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::{DomainError, Entity, EventId, UserId};

use crate::slug::slugify;

const MIN_TITLE_CHARS: usize = 3;

/// An organised event.
///
/// # Invariants
/// - `title` is trimmed and at least three characters long.
/// - `public_slug` is fixed at creation; edits never change the shared link.
/// - `description` / `location` are `None` rather than blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date_time: DateTime<Utc>,
    pub public_slug: String,
    pub created_at: DateTime<Utc>,
}

/// Organiser-supplied fields, used for both create and edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub date_time: DateTime<Utc>,
}

impl EventDraft {
    /// Normalise and check the draft.
    pub fn validate(self) -> Result<Self, DomainError> {
        let title = self.title.trim().to_string();
        if title.chars().count() < MIN_TITLE_CHARS {
            return Err(DomainError::validation("title must be at least 3 characters"));
        }
        Ok(Self {
            title,
            description: non_blank(self.description),
            location: non_blank(self.location),
            date_time: self.date_time,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Event {
    /// Create a new event owned by `owner_id`.
    pub fn create(owner_id: UserId, draft: EventDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let draft = draft.validate()?;
        Ok(Self {
            id: EventId::new(),
            owner_id,
            public_slug: slugify(&draft.title),
            title: draft.title,
            description: draft.description,
            location: draft.location,
            date_time: draft.date_time,
            created_at: now,
        })
    }

    /// Replace the editable fields. The slug is kept.
    pub fn apply_update(&mut self, draft: EventDraft) -> Result<(), DomainError> {
        let draft = draft.validate()?;
        self.title = draft.title;
        self.description = draft.description;
        self.location = draft.location;
        self.date_time = draft.date_time;
        Ok(())
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.date_time >= now
    }
}

impl Entity for Event {
    type Id = EventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
