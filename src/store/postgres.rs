//! # PostgreSQL Store
//!
//! Production [`Store`] implementation on top of a `PgPool`. The
//! `subscriptions` table carries unique indexes on `(user_id, meetup_id)` and
//! `(user_id, starts_at)`; a violation of either is translated into the typed
//! [`StoreError`] variant callers map onto the matching rejection reason.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{
    Meetup, MeetupChanges, SubscribedSlot, Subscription, SubscriptionWithMeetup, UserRef,
};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique-index violation onto the rejection it backstops; everything
/// else stays a database error.
fn translate_unique_violation(err: sqlx::Error) -> StoreError {
    let constraint = match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            db_err.constraint().map(str::to_owned)
        }
        _ => None,
    };

    match constraint.as_deref() {
        Some("subscriptions_user_meetup_key") => StoreError::DuplicateSubscription,
        Some("subscriptions_user_slot_key") => StoreError::TimeConflict,
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>, StoreError> {
        let user = sqlx::query_as::<_, UserRef>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn banner_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 AS one FROM banners WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn insert_meetup(&self, meetup: Meetup) -> Result<Meetup, StoreError> {
        let meetup = sqlx::query_as::<_, Meetup>(
            r#"
            INSERT INTO meetups (id, organizer_id, title, description, location, starts_at, banner_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, organizer_id, title, description, location, starts_at, banner_id, created_at
            "#,
        )
        .bind(meetup.id)
        .bind(meetup.organizer_id)
        .bind(meetup.title)
        .bind(meetup.description)
        .bind(meetup.location)
        .bind(meetup.starts_at)
        .bind(meetup.banner_id)
        .bind(meetup.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(meetup)
    }

    async fn find_meetup(&self, id: Uuid) -> Result<Option<Meetup>, StoreError> {
        let meetup = sqlx::query_as::<_, Meetup>(
            r#"
            SELECT id, organizer_id, title, description, location, starts_at, banner_id, created_at
            FROM meetups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(meetup)
    }

    async fn meetups_by_organizer(&self, organizer_id: Uuid) -> Result<Vec<Meetup>, StoreError> {
        let meetups = sqlx::query_as::<_, Meetup>(
            r#"
            SELECT id, organizer_id, title, description, location, starts_at, banner_id, created_at
            FROM meetups
            WHERE organizer_id = $1
            ORDER BY starts_at ASC
            "#,
        )
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(meetups)
    }

    async fn update_meetup(&self, id: Uuid, changes: MeetupChanges) -> Result<Meetup, StoreError> {
        let meetup = sqlx::query_as::<_, Meetup>(
            r#"
            UPDATE meetups
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                starts_at = COALESCE($5, starts_at),
                banner_id = COALESCE($6, banner_id)
            WHERE id = $1
            RETURNING id, organizer_id, title, description, location, starts_at, banner_id, created_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.location)
        .bind(changes.starts_at)
        .bind(changes.banner_id)
        .fetch_optional(&self.pool)
        .await?;

        meetup.ok_or(StoreError::RowNotFound)
    }

    async fn delete_meetup(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM meetups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound);
        }

        Ok(())
    }

    async fn insert_subscription(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, StoreError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (id, user_id, meetup_id, starts_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, meetup_id, starts_at, created_at
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(subscription.meetup_id)
        .bind(subscription.starts_at)
        .bind(subscription.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(translate_unique_violation)?;

        Ok(subscription)
    }

    async fn slots_for_user(&self, user_id: Uuid) -> Result<Vec<SubscribedSlot>, StoreError> {
        let slots = sqlx::query_as::<_, SubscribedSlot>(
            "SELECT meetup_id, starts_at FROM subscriptions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }

    async fn subscriptions_with_meetups(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<SubscriptionWithMeetup>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.created_at,
                   m.id AS meetup_id, m.organizer_id, m.title, m.description,
                   m.location, m.starts_at, m.banner_id,
                   m.created_at AS meetup_created_at
            FROM subscriptions s
            JOIN meetups m ON m.id = s.meetup_id
            WHERE s.user_id = $1
            ORDER BY s.created_at ASC
            "#,
        )
        .bind(user_id)
        .map(|row: PgRow| SubscriptionWithMeetup {
            id: row.get("id"),
            created_at: row.get("created_at"),
            meetup: Meetup {
                id: row.get("meetup_id"),
                organizer_id: row.get("organizer_id"),
                title: row.get("title"),
                description: row.get("description"),
                location: row.get("location"),
                starts_at: row.get("starts_at"),
                banner_id: row.get("banner_id"),
                created_at: row.get("meetup_created_at"),
            },
        })
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
