//! # In-Memory Store
//!
//! DashMap-backed [`Store`] implementation used by the integration tests and
//! by development mode without a database. It enforces the same subscription
//! uniqueness semantics as the Postgres unique indexes so that constraint
//! translation is exercised on every backend.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{
    Meetup, MeetupChanges, SubscribedSlot, Subscription, SubscriptionWithMeetup, UserRef,
};

#[derive(Default)]
pub struct InMemoryStore {
    users: DashMap<Uuid, UserRef>,
    banners: DashSet<Uuid>,
    meetups: DashMap<Uuid, Meetup>,
    // Subscription writes go through one lock: the duplicate and time-slot
    // checks must be atomic with the insert (the storage-level backstop for
    // the read-then-decide race).
    subscriptions: Mutex<Vec<Subscription>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user row. Provisioning is external in production; tests use this.
    pub fn seed_user(&self, user: UserRef) {
        self.users.insert(user.id, user);
    }

    /// Seeds a banner asset id.
    pub fn seed_banner(&self, id: Uuid) {
        self.banners.insert(id);
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>, StoreError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn banner_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.banners.contains(&id))
    }

    async fn insert_meetup(&self, meetup: Meetup) -> Result<Meetup, StoreError> {
        self.meetups.insert(meetup.id, meetup.clone());
        Ok(meetup)
    }

    async fn find_meetup(&self, id: Uuid) -> Result<Option<Meetup>, StoreError> {
        Ok(self.meetups.get(&id).map(|entry| entry.value().clone()))
    }

    async fn meetups_by_organizer(&self, organizer_id: Uuid) -> Result<Vec<Meetup>, StoreError> {
        let mut meetups: Vec<Meetup> = self
            .meetups
            .iter()
            .filter(|entry| entry.organizer_id == organizer_id)
            .map(|entry| entry.value().clone())
            .collect();
        meetups.sort_by_key(|m| m.starts_at);
        Ok(meetups)
    }

    async fn update_meetup(&self, id: Uuid, changes: MeetupChanges) -> Result<Meetup, StoreError> {
        let mut entry = self.meetups.get_mut(&id).ok_or(StoreError::RowNotFound)?;

        if let Some(title) = changes.title {
            entry.title = title;
        }
        if let Some(description) = changes.description {
            entry.description = description;
        }
        if let Some(location) = changes.location {
            entry.location = location;
        }
        if let Some(starts_at) = changes.starts_at {
            entry.starts_at = starts_at;
        }
        if let Some(banner_id) = changes.banner_id {
            entry.banner_id = banner_id;
        }

        Ok(entry.value().clone())
    }

    async fn delete_meetup(&self, id: Uuid) -> Result<(), StoreError> {
        self.meetups
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::RowNotFound)
    }

    async fn insert_subscription(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, StoreError> {
        let mut subscriptions = self.subscriptions.lock().unwrap();

        for existing in subscriptions.iter() {
            if existing.user_id != subscription.user_id {
                continue;
            }
            if existing.meetup_id == subscription.meetup_id {
                return Err(StoreError::DuplicateSubscription);
            }
            if existing.starts_at == subscription.starts_at {
                return Err(StoreError::TimeConflict);
            }
        }

        subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn slots_for_user(&self, user_id: Uuid) -> Result<Vec<SubscribedSlot>, StoreError> {
        let subscriptions = self.subscriptions.lock().unwrap();

        Ok(subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| SubscribedSlot {
                meetup_id: s.meetup_id,
                starts_at: s.starts_at,
            })
            .collect())
    }

    async fn subscriptions_with_meetups(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<SubscriptionWithMeetup>, StoreError> {
        let mut rows: Vec<Subscription> = {
            let subscriptions = self.subscriptions.lock().unwrap();
            subscriptions
                .iter()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect()
        };
        rows.sort_by_key(|s| s.created_at);

        let mut joined = Vec::with_capacity(rows.len());
        for row in rows {
            // A subscription without its meetup means the meetup was deleted
            // underneath it; skip the orphan instead of failing the listing.
            if let Some(meetup) = self.meetups.get(&row.meetup_id) {
                joined.push(SubscriptionWithMeetup {
                    id: row.id,
                    created_at: row.created_at,
                    meetup: meetup.value().clone(),
                });
            }
        }

        Ok(joined)
    }
}
