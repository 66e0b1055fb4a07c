use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::{DomainError, Entity, EventId, RsvpId};

const MIN_NAME_CHARS: usize = 2;

/// One attendee's reply to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rsvp {
    pub id: RsvpId,
    pub event_id: EventId,
    pub attendee_name: String,
    /// Stored lowercased; one RSVP per email per event.
    pub attendee_email: String,
    pub timestamp: DateTime<Utc>,
}

/// Public RSVP form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpDraft {
    pub name: String,
    pub email: String,
}

impl RsvpDraft {
    pub fn validate(self) -> Result<Self, DomainError> {
        let name = self.name.trim().to_string();
        if name.chars().count() < MIN_NAME_CHARS {
            return Err(DomainError::validation("name must be at least 2 characters"));
        }

        let email = self.email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(DomainError::validation("please enter a valid email address"));
        }

        Ok(Self { name, email })
    }
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

impl Rsvp {
    pub fn new(event_id: EventId, draft: RsvpDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let draft = draft.validate()?;
        Ok(Self {
            id: RsvpId::new(),
            event_id,
            attendee_name: draft.name,
            attendee_email: draft.email,
            timestamp: now,
        })
    }
}

impl Entity for Rsvp {
    type Id = RsvpId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
