//! # Subscription Service
//!
//! Orchestrates the pure eligibility decision against live data and manages
//! the side effects around it. The ordering is deliberate: the subscription
//! row is committed before the notification job is enqueued, so a persistence
//! failure never leaves an orphaned notification, and an enqueue failure
//! costs at most an email, never the subscription.

use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{AppState, Subscription, SubscriptionWithMeetup};
use crate::services::eligibility::{self, Decision};
use crate::services::notification::NotificationJob;
use crate::store::StoreError;

/// Subscribes `user_id` to the meetup, returning the created row.
///
/// Fails with the specific rejection reason when the eligibility engine
/// refuses, or with the same reasons when the storage uniqueness backstop
/// fires under a concurrent race.
#[instrument(skip(state), fields(user_id = %user_id, meetup_id = %meetup_id))]
pub async fn subscribe(
    state: &AppState,
    user_id: Uuid,
    meetup_id: Uuid,
) -> AppResult<Subscription> {
    // 1. Resolve the meetup and its organizer projection
    let meetup = state
        .store
        .find_meetup(meetup_id)
        .await?
        .ok_or(AppError::NotFound("Meetup does not exist"))?;

    let organizer = state
        .store
        .find_user(meetup.organizer_id)
        .await?
        .ok_or_else(|| {
            error!(organizer_id = %meetup.organizer_id, "Meetup organizer row is missing");
            AppError::Internal
        })?;

    // 2. Load the user's existing subscription slots and decide
    let slots = state.store.slots_for_user(user_id).await?;

    if let Decision::Rejected(reason) =
        eligibility::decide(state.clock.now(), &meetup, user_id, &slots)
    {
        return Err(reason.into());
    }

    // 3. Persist; a concurrent duplicate surfaces here as the same rejection
    let subscription = Subscription {
        id: Uuid::new_v4(),
        user_id,
        meetup_id,
        starts_at: meetup.starts_at,
        created_at: state.clock.now(),
    };
    let subscription = state
        .store
        .insert_subscription(subscription)
        .await
        .map_err(|err| match err {
            StoreError::DuplicateSubscription => AppError::DuplicateSubscription,
            StoreError::TimeConflict => AppError::TimeConflict,
            other => AppError::Store(other),
        })?;

    // 4. Notify the organizer out-of-band; the row wins over the email
    let subscriber = state.store.find_user(user_id).await?.ok_or_else(|| {
        error!("Authenticated user row is missing");
        AppError::Internal
    })?;

    let job = NotificationJob::subscription_mail(meetup, organizer, subscriber);
    if state.notifications.enqueue(job).is_err() {
        warn!("Notification enqueue failed; subscription is persisted without it");
    }

    Ok(subscription)
}

/// Lists the user's subscriptions whose meetup has not happened yet, ordered
/// by subscription creation time ascending.
#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn list_upcoming(
    state: &AppState,
    user_id: Uuid,
) -> AppResult<Vec<SubscriptionWithMeetup>> {
    let now = state.clock.now();
    let subscriptions = state.store.subscriptions_with_meetups(user_id).await?;

    Ok(subscriptions
        .into_iter()
        .filter(|s| s.meetup.is_future(now))
        .collect())
}
