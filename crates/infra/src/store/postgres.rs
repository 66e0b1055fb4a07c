//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | SQLx error | SQLSTATE | `StoreError` |
//! |------------|----------|--------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `NotFound` |
//! | Anything else | any | `Backend` |
//!
//! Queries are checked at runtime (`sqlx::query`), so building the crate
//! does not need a live database.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

use eventdesk_auth::{Profile, Role};
use eventdesk_core::{EventId, RsvpId, UserId};
use eventdesk_events::{Event, Rsvp};

use super::{DataStore, EventOrder, EventStore, ProfileStore, RsvpStore, StoreError};

/// Schema applied by [`PostgresStore::migrate`]. Idempotent.
pub const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Postgres store over a shared SQLx pool.
///
/// ## Thread Safety
///
/// `PgPool` is internally reference counted; `PostgresStore` is `Send + Sync`
/// and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Connect with a small pool suitable for a single API process.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and constraints if they are missing.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => {
                return StoreError::Conflict(format!(
                    "{operation}: unique constraint {} violated",
                    db.constraint().unwrap_or("unknown")
                ));
            }
            Some("23503") => return StoreError::NotFound,
            _ => {}
        }
    }
    tracing::error!(operation, error = %err, "postgres operation failed");
    StoreError::Backend(format!("{operation}: {err}"))
}

fn decode_err(operation: &'static str, err: impl core::fmt::Display) -> StoreError {
    StoreError::Backend(format!("{operation}: failed to decode row: {err}"))
}

fn profile_from_row(row: &PgRow) -> Result<Profile, StoreError> {
    let role: String = row.try_get("role").map_err(|e| decode_err("profile", e))?;
    Ok(Profile {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(|e| decode_err("profile", e))?),
        email: row.try_get("email").map_err(|e| decode_err("profile", e))?,
        role: role.parse::<Role>().map_err(|e| decode_err("profile", e))?,
        created_at: row.try_get("created_at").map_err(|e| decode_err("profile", e))?,
        updated_at: row.try_get("updated_at").map_err(|e| decode_err("profile", e))?,
    })
}

fn event_from_row(row: &PgRow) -> Result<Event, StoreError> {
    let get_err = |e: sqlx::Error| decode_err("event", e);
    Ok(Event {
        id: EventId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get_err)?),
        owner_id: UserId::from_uuid(row.try_get::<Uuid, _>("owner_id").map_err(get_err)?),
        title: row.try_get("title").map_err(get_err)?,
        description: row.try_get("description").map_err(get_err)?,
        location: row.try_get("location").map_err(get_err)?,
        date_time: row.try_get::<DateTime<Utc>, _>("date_time").map_err(get_err)?,
        public_slug: row.try_get("public_slug").map_err(get_err)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(get_err)?,
    })
}

fn rsvp_from_row(row: &PgRow) -> Result<Rsvp, StoreError> {
    let get_err = |e: sqlx::Error| decode_err("rsvp", e);
    Ok(Rsvp {
        id: RsvpId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get_err)?),
        event_id: EventId::from_uuid(row.try_get::<Uuid, _>("event_id").map_err(get_err)?),
        attendee_name: row.try_get("attendee_name").map_err(get_err)?,
        attendee_email: row.try_get("attendee_email").map_err(get_err)?,
        timestamp: row.try_get::<DateTime<Utc>, _>("timestamp").map_err(get_err)?,
    })
}

const PROFILE_COLUMNS: &str = "id, email, role, created_at, updated_at";
const EVENT_COLUMNS: &str =
    "id, owner_id, title, description, location, date_time, public_slug, created_at";
const RSVP_COLUMNS: &str = "id, event_id, attendee_name, attendee_email, \"timestamp\"";

#[async_trait::async_trait]
impl ProfileStore for PostgresStore {
    #[instrument(skip(self, profile), fields(user_id = %profile.id), err)]
    async fn insert_profile(&self, profile: Profile) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO profiles (id, email, role, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(profile.id.as_uuid())
        .bind(&profile.email)
        .bind(profile.role.as_str())
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_profile", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get_profile(&self, id: UserId) -> Result<Option<Profile>, StoreError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_profile", e))?;
        row.as_ref().map(profile_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn list_profiles_except(&self, id: UserId) -> Result<Vec<Profile>, StoreError> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id <> $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_profiles_except", e))?;
        rows.iter().map(profile_from_row).collect()
    }

    #[instrument(skip(self), fields(user_id = %id, expected = %expected_current, new = %new_role), err)]
    async fn update_role(
        &self,
        id: UserId,
        expected_current: Role,
        new_role: Role,
    ) -> Result<Profile, StoreError> {
        let sql = format!(
            "UPDATE profiles SET role = $3, updated_at = now() \
             WHERE id = $1 AND role = $2 RETURNING {PROFILE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(expected_current.as_str())
            .bind(new_role.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_role", e))?;

        match row {
            Some(row) => profile_from_row(&row),
            // Distinguish a lost race from an unknown id.
            None => match self.get_profile(id).await? {
                Some(current) => Err(StoreError::Conflict(format!(
                    "role of {id} changed concurrently (now {})",
                    current.role
                ))),
                None => Err(StoreError::NotFound),
            },
        }
    }
}

#[async_trait::async_trait]
impl EventStore for PostgresStore {
    #[instrument(skip(self, event), fields(event_id = %event.id, slug = %event.public_slug), err)]
    async fn insert_event(&self, event: Event) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO events (id, owner_id, title, description, location, date_time, public_slug, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(event.id.as_uuid())
        .bind(event.owner_id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.date_time)
        .bind(&event.public_slug)
        .bind(event.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_event", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(event_id = %id), err)]
    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_event", e))?;
        row.as_ref().map(event_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE public_slug = $1");
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_event_by_slug", e))?;
        row.as_ref().map(event_from_row).transpose()
    }

    #[instrument(skip(self), fields(owner_id = %owner), err)]
    async fn list_events_by_owner(
        &self,
        owner: UserId,
        order: EventOrder,
    ) -> Result<Vec<Event>, StoreError> {
        let direction = match order {
            EventOrder::Ascending => "ASC",
            EventOrder::Descending => "DESC",
        };
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE owner_id = $1 ORDER BY date_time {direction}"
        );
        let rows = sqlx::query(&sql)
            .bind(owner.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_events_by_owner", e))?;
        rows.iter().map(event_from_row).collect()
    }

    #[instrument(skip(self, event), fields(event_id = %event.id), err)]
    async fn update_event(&self, event: Event) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE events SET title = $2, description = $3, location = $4, date_time = $5 WHERE id = $1",
        )
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.date_time)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_event", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(event_id = %id), err)]
    async fn delete_event(&self, id: EventId) -> Result<(), StoreError> {
        // RSVPs go with the event via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_event", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RsvpStore for PostgresStore {
    #[instrument(skip(self, rsvp), fields(event_id = %rsvp.event_id), err)]
    async fn insert_rsvp(&self, rsvp: Rsvp) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO rsvps (id, event_id, attendee_name, attendee_email, \"timestamp\") \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(rsvp.id.as_uuid())
        .bind(rsvp.event_id.as_uuid())
        .bind(&rsvp.attendee_name)
        .bind(&rsvp.attendee_email)
        .bind(rsvp.timestamp)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_rsvp", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(event_id = %event_id), err)]
    async fn list_rsvps(&self, event_id: EventId) -> Result<Vec<Rsvp>, StoreError> {
        let sql = format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE event_id = $1 ORDER BY \"timestamp\" ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(event_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_rsvps", e))?;
        rows.iter().map(rsvp_from_row).collect()
    }

    #[instrument(skip(self, event_ids), fields(event_count = event_ids.len()), err)]
    async fn list_rsvps_for_events(&self, event_ids: &[EventId]) -> Result<Vec<Rsvp>, StoreError> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = event_ids.iter().map(|id| *id.as_uuid()).collect();
        let sql = format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE event_id = ANY($1) ORDER BY \"timestamp\" DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(&ids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_rsvps_for_events", e))?;
        rows.iter().map(rsvp_from_row).collect()
    }

    #[instrument(skip(self), fields(event_id = %event_id), err)]
    async fn count_rsvps(&self, event_id: EventId) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rsvps WHERE event_id = $1")
            .bind(event_id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_rsvps", e))?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait::async_trait]
impl DataStore for PostgresStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }
}
