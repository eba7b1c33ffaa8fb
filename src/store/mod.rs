//! # Storage Contract
//!
//! This module defines the query contract the rest of the application depends
//! on, with two implementations behind the same trait:
//!
//! - [`PgStore`] - PostgreSQL-backed store for production
//! - [`InMemoryStore`] - In-process store for tests and database-free development
//!
//! The contract deliberately includes the race backstop required around
//! concurrent subscription requests: `insert_subscription` must reject a
//! second subscription for the same `(user, meetup)` pair or the same
//! `(user, time slot)` pair with a typed error, even when the caller's
//! read-then-decide check passed. `PgStore` relies on unique indexes for
//! this; `InMemoryStore` serializes subscription writes.

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Meetup, MeetupChanges, SubscribedSlot, Subscription, SubscriptionWithMeetup, UserRef};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by store implementations.
///
/// The two uniqueness variants are the storage-level translation of the
/// subscription invariants; callers map them onto the same user-facing
/// rejection reasons the eligibility engine produces.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("subscription already exists for this user and meetup")]
    DuplicateSubscription,

    #[error("subscription already exists for this user and time slot")]
    TimeConflict,

    #[error("row not found")]
    RowNotFound,

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

/// Query contract over meetups, subscriptions, users and banners.
///
/// Identifiers and timestamps are assigned by the caller; implementations
/// persist rows as given.
#[async_trait]
pub trait Store: Send + Sync {
    /// Looks up the `{id, name, email}` projection of a user.
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>, StoreError>;

    /// Returns true if a banner asset with this id exists.
    async fn banner_exists(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn insert_meetup(&self, meetup: Meetup) -> Result<Meetup, StoreError>;

    async fn find_meetup(&self, id: Uuid) -> Result<Option<Meetup>, StoreError>;

    /// All meetups organized by the given user, earliest first.
    async fn meetups_by_organizer(&self, organizer_id: Uuid) -> Result<Vec<Meetup>, StoreError>;

    /// Applies the non-`None` fields of `changes`; fails with
    /// [`StoreError::RowNotFound`] if the meetup vanished.
    async fn update_meetup(&self, id: Uuid, changes: MeetupChanges) -> Result<Meetup, StoreError>;

    async fn delete_meetup(&self, id: Uuid) -> Result<(), StoreError>;

    /// Persists an accepted subscription, enforcing the `(user, meetup)` and
    /// `(user, time slot)` uniqueness backstops.
    async fn insert_subscription(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, StoreError>;

    /// The `(meetup_id, starts_at)` slots of every subscription the user
    /// holds, fed to the eligibility engine.
    async fn slots_for_user(&self, user_id: Uuid) -> Result<Vec<SubscribedSlot>, StoreError>;

    /// The user's subscriptions joined with their meetups, ordered by
    /// subscription creation time ascending.
    async fn subscriptions_with_meetups(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<SubscriptionWithMeetup>, StoreError>;
}
