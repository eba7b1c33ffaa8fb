//! # Meetup Model
//!
//! A meetup is a scheduled event owned by its organizer. The `starts_at`
//! instant drives every temporal rule in the system: creation, update and
//! deletion are only allowed while it is still in the future, and the
//! subscription engine compares it against the injected clock.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Meetup {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    pub banner_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Meetup {
    /// Returns true if the meetup has not happened yet relative to `now`.
    ///
    /// A meetup starting exactly at `now` is already considered past; every
    /// caller shares this boundary.
    #[inline]
    pub fn is_future(&self, now: OffsetDateTime) -> bool {
        self.starts_at > now
    }
}

/// Field changes for a partial meetup update. `None` leaves a field untouched.
#[derive(Debug, Default, Clone)]
pub struct MeetupChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<OffsetDateTime>,
    pub banner_id: Option<Uuid>,
}
