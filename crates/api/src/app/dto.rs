use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_auth::{Profile, Role};
use eventdesk_core::UserId;
use eventdesk_events::{Event, EventDraft, RsvpDraft};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CreateProfileRequest {
    pub email: Option<String>,
}

/// Body of `PATCH /admin/users`. Fields are optional so a missing one is a
/// 400 with a useful message rather than a JSON rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    pub user_id: Option<String>,
    pub new_role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// RFC 3339, or `YYYY-MM-DDTHH:MM` as produced by `datetime-local` inputs (read as UTC).
    pub date_time: Option<String>,
}

impl EventRequest {
    pub fn into_draft(self) -> Result<EventDraft, ApiError> {
        let raw = self
            .date_time
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::invalid("date and time is required"))?;

        Ok(EventDraft {
            title: self.title,
            description: self.description,
            location: self.location,
            date_time: parse_date_time(raw)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RsvpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl From<RsvpRequest> for RsvpDraft {
    fn from(value: RsvpRequest) -> Self {
        RsvpDraft {
            name: value.name,
            email: value.email,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    /// `YYYY-MM-DD`, UTC day.
    pub date: Option<String>,
}

impl EventListQuery {
    pub fn day(&self) -> Result<Option<NaiveDate>, ApiError> {
        self.date
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| ApiError::invalid("date must be YYYY-MM-DD"))
            })
            .transpose()
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub share_url: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for UserSummary {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            role: p.role,
            created_at: p.created_at,
        }
    }
}

// -------------------------
// Parsing helpers
// -------------------------

pub fn parse_date_time(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::invalid("date_time must be RFC 3339 or YYYY-MM-DDTHH:MM"))
}

pub fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse::<UserId>()
        .map_err(|_| ApiError::invalid("invalid user id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_and_datetime_local() {
        let expected = Utc.with_ymd_and_hms(2030, 6, 1, 18, 30, 0).unwrap();
        assert_eq!(parse_date_time("2030-06-01T18:30:00Z").unwrap(), expected);
        assert_eq!(parse_date_time("2030-06-01T20:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_date_time("2030-06-01T18:30").unwrap(), expected);
        assert!(parse_date_time("next tuesday").is_err());
    }

    #[test]
    fn missing_date_is_invalid() {
        let req = EventRequest {
            title: "Party".into(),
            description: None,
            location: None,
            date_time: Some("  ".into()),
        };
        assert!(matches!(req.into_draft(), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn change_role_body_uses_camel_case() {
        let body: ChangeRoleRequest =
            serde_json::from_str(r#"{"userId":"abc","newRole":"admin"}"#).unwrap();
        assert_eq!(body.user_id.as_deref(), Some("abc"));
        assert_eq!(body.new_role.as_deref(), Some("admin"));
    }

    #[test]
    fn list_query_day() {
        let q = EventListQuery { date: Some("2030-01-02".into()) };
        assert_eq!(q.day().unwrap(), NaiveDate::from_ymd_opt(2030, 1, 2));
        let bad = EventListQuery { date: Some("02/01/2030".into()) };
        assert!(bad.day().is_err());
        assert_eq!(EventListQuery::default().day().unwrap(), None);
    }
}
