//! Attendance analytics for an organiser's events.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use eventdesk_core::EventId;

use crate::{Event, Rsvp};

/// One event with the replies it has collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventAttendance {
    pub event: Event,
    pub attendee_count: usize,
    /// Newest first.
    pub rsvps: Vec<Rsvp>,
}

/// Events split around `now`, each list ordered by date, latest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventAnalytics {
    pub upcoming: Vec<EventAttendance>,
    pub past: Vec<EventAttendance>,
    pub all: Vec<EventAttendance>,
}

impl EventAnalytics {
    /// Join `rsvps` onto `events`. RSVPs for events not in `events` are ignored.
    pub fn build(mut events: Vec<Event>, rsvps: Vec<Rsvp>, now: DateTime<Utc>) -> Self {
        let mut by_event: HashMap<EventId, Vec<Rsvp>> = HashMap::new();
        for rsvp in rsvps {
            by_event.entry(rsvp.event_id).or_default().push(rsvp);
        }

        events.sort_by(|a, b| b.date_time.cmp(&a.date_time));

        let all: Vec<EventAttendance> = events
            .into_iter()
            .map(|event| {
                let mut rsvps = by_event.remove(&event.id).unwrap_or_default();
                rsvps.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                EventAttendance {
                    attendee_count: rsvps.len(),
                    rsvps,
                    event,
                }
            })
            .collect();

        let (upcoming, past): (Vec<_>, Vec<_>) = all
            .iter()
            .cloned()
            .partition(|a| a.event.is_upcoming(now));

        Self { upcoming, past, all }
    }

    pub fn total_attendees(&self) -> usize {
        self.all.iter().map(|a| a.attendee_count).sum()
    }
}
