//! Infrastructure layer: profile, event and RSVP persistence.

pub mod store;

pub use store::{
    DataStore, EventOrder, EventStore, InMemoryStore, PostgresStore, ProfileStore, RsvpStore,
    SharedStore, StoreError,
};
