//! `eventdesk-events`: organised events and their RSVPs.
//!
//! Pure domain logic: validation, public slugs, calendar bucketing,
//! attendance analytics and attendee export. Persistence lives in
//! `eventdesk-infra`.

pub mod analytics;
pub mod calendar;
pub mod event;
pub mod export;
pub mod rsvp;
pub mod slug;

pub use analytics::{EventAnalytics, EventAttendance};
pub use event::{Event, EventDraft};
pub use export::{ExportError, attendee_csv, export_filename};
pub use rsvp::{Rsvp, RsvpDraft};
pub use slug::{share_url, slugify};
