//! # Subscription Model
//!
//! A subscription records a user's intent to attend a meetup. Rows are only
//! ever created through the eligibility engine's accept path; there is no
//! update operation.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::Meetup;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meetup_id: Uuid,
    /// Copy of the meetup instant, kept on the row so the storage layer can
    /// enforce the one-subscription-per-time-slot rule with a unique index.
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The `(meetup_id, starts_at)` projection of a user's existing
/// subscriptions, joined with their meetups. This is the only input the
/// eligibility engine needs about prior subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct SubscribedSlot {
    pub meetup_id: Uuid,
    pub starts_at: OffsetDateTime,
}

/// A subscription with its meetup nested, as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionWithMeetup {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub meetup: Meetup,
}
