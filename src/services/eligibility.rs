//! # Subscription Eligibility Engine
//!
//! Pure decision logic for subscription requests. Given the current instant,
//! the target meetup and the candidate's existing subscription slots, it
//! produces an accept/reject decision with a specific reason. No I/O, no
//! side effects; identical inputs always yield the identical decision, which
//! is what keeps the rules unit-testable without a store.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{Meetup, SubscribedSlot};

/// Outcome of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected(RejectionReason),
}

/// Why a subscription request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The candidate organizes the target meetup.
    SelfSubscription,
    /// The meetup's start instant is not strictly in the future.
    MeetupAlreadyHappened,
    /// The candidate already holds a subscription to this meetup.
    DuplicateSubscription,
    /// The candidate already holds a subscription to another meetup at the
    /// exact same instant.
    TimeConflict,
}

/// Decides whether `candidate_user_id` may subscribe to `meetup`.
///
/// The caller must have resolved the meetup already; a missing meetup is a
/// not-found failure upstream, never an input here. `existing` is the
/// `(meetup_id, starts_at)` projection of every subscription the candidate
/// currently holds.
///
/// Checks run in a fixed order and stop at the first failure, so repeated
/// attempts against unchanged state report the same reason:
///
/// 1. organizer self-subscription
/// 2. meetup already happened (`starts_at <= now` — a meetup starting at
///    exactly `now` is already not future)
/// 3. duplicate subscription to the same meetup
/// 4. another subscription at the exact same instant
pub fn decide(
    now: OffsetDateTime,
    meetup: &Meetup,
    candidate_user_id: Uuid,
    existing: &[SubscribedSlot],
) -> Decision {
    if candidate_user_id == meetup.organizer_id {
        return Decision::Rejected(RejectionReason::SelfSubscription);
    }

    if meetup.starts_at <= now {
        return Decision::Rejected(RejectionReason::MeetupAlreadyHappened);
    }

    if existing.iter().any(|slot| slot.meetup_id == meetup.id) {
        return Decision::Rejected(RejectionReason::DuplicateSubscription);
    }

    if existing.iter().any(|slot| slot.starts_at == meetup.starts_at) {
        return Decision::Rejected(RejectionReason::TimeConflict);
    }

    Decision::Accepted
}

#[cfg(test)]
mod tests {
    use time::Duration;
    use time::macros::datetime;

    use super::*;

    const NOW: OffsetDateTime = datetime!(2024-01-10 10:00 UTC);

    fn meetup_at(starts_at: OffsetDateTime, organizer_id: Uuid) -> Meetup {
        Meetup {
            id: Uuid::new_v4(),
            organizer_id,
            title: "Rust meetup".into(),
            description: "Monthly get-together".into(),
            location: "Room 101".into(),
            starts_at,
            banner_id: Uuid::new_v4(),
            created_at: NOW - Duration::days(7),
        }
    }

    fn slot(meetup_id: Uuid, starts_at: OffsetDateTime) -> SubscribedSlot {
        SubscribedSlot {
            meetup_id,
            starts_at,
        }
    }

    #[test]
    fn accepts_a_plain_future_meetup() {
        let meetup = meetup_at(datetime!(2024-02-01 18:00 UTC), Uuid::new_v4());

        let decision = decide(NOW, &meetup, Uuid::new_v4(), &[]);

        assert_eq!(decision, Decision::Accepted);
    }

    #[test]
    fn organizer_cannot_subscribe_to_own_meetup() {
        let organizer = Uuid::new_v4();
        let meetup = meetup_at(datetime!(2024-02-01 18:00 UTC), organizer);

        let decision = decide(NOW, &meetup, organizer, &[]);

        assert_eq!(
            decision,
            Decision::Rejected(RejectionReason::SelfSubscription)
        );
    }

    #[test]
    fn past_meetup_is_rejected_regardless_of_other_conditions() {
        let meetup = meetup_at(datetime!(2024-01-01 00:00 UTC), Uuid::new_v4());

        let decision = decide(NOW, &meetup, Uuid::new_v4(), &[]);

        assert_eq!(
            decision,
            Decision::Rejected(RejectionReason::MeetupAlreadyHappened)
        );
    }

    #[test]
    fn meetup_starting_exactly_now_is_already_past() {
        let meetup = meetup_at(NOW, Uuid::new_v4());

        let decision = decide(NOW, &meetup, Uuid::new_v4(), &[]);

        assert_eq!(
            decision,
            Decision::Rejected(RejectionReason::MeetupAlreadyHappened)
        );
    }

    #[test]
    fn meetup_one_second_in_the_future_is_accepted() {
        let meetup = meetup_at(NOW + Duration::seconds(1), Uuid::new_v4());

        let decision = decide(NOW, &meetup, Uuid::new_v4(), &[]);

        assert_eq!(decision, Decision::Accepted);
    }

    #[test]
    fn existing_subscription_to_same_meetup_is_a_duplicate() {
        let meetup = meetup_at(datetime!(2024-02-01 18:00 UTC), Uuid::new_v4());
        let existing = [slot(meetup.id, meetup.starts_at)];

        let decision = decide(NOW, &meetup, Uuid::new_v4(), &existing);

        assert_eq!(
            decision,
            Decision::Rejected(RejectionReason::DuplicateSubscription)
        );
    }

    #[test]
    fn other_meetup_at_same_instant_is_a_time_conflict() {
        let meetup = meetup_at(datetime!(2024-02-01 18:00 UTC), Uuid::new_v4());
        let existing = [slot(Uuid::new_v4(), meetup.starts_at)];

        let decision = decide(NOW, &meetup, Uuid::new_v4(), &existing);

        assert_eq!(decision, Decision::Rejected(RejectionReason::TimeConflict));
    }

    #[test]
    fn other_meetup_one_second_apart_does_not_conflict() {
        let meetup = meetup_at(datetime!(2024-02-01 18:00 UTC), Uuid::new_v4());
        let existing = [slot(Uuid::new_v4(), meetup.starts_at + Duration::seconds(1))];

        let decision = decide(NOW, &meetup, Uuid::new_v4(), &existing);

        assert_eq!(decision, Decision::Accepted);
    }

    #[test]
    fn self_subscription_wins_over_every_other_reason() {
        // Organizer, past date, duplicate and conflicting slot all at once:
        // the first check in the order decides the reported reason.
        let organizer = Uuid::new_v4();
        let meetup = meetup_at(datetime!(2024-01-01 00:00 UTC), organizer);
        let existing = [slot(meetup.id, meetup.starts_at)];

        let decision = decide(NOW, &meetup, organizer, &existing);

        assert_eq!(
            decision,
            Decision::Rejected(RejectionReason::SelfSubscription)
        );
    }

    #[test]
    fn past_date_wins_over_duplicate() {
        let meetup = meetup_at(datetime!(2024-01-01 00:00 UTC), Uuid::new_v4());
        let existing = [slot(meetup.id, meetup.starts_at)];

        let decision = decide(NOW, &meetup, Uuid::new_v4(), &existing);

        assert_eq!(
            decision,
            Decision::Rejected(RejectionReason::MeetupAlreadyHappened)
        );
    }

    #[test]
    fn duplicate_wins_over_time_conflict() {
        let meetup = meetup_at(datetime!(2024-02-01 18:00 UTC), Uuid::new_v4());
        // Same meetup and a second slot at the same instant: check 3 fires first.
        let existing = [
            slot(meetup.id, meetup.starts_at),
            slot(Uuid::new_v4(), meetup.starts_at),
        ];

        let decision = decide(NOW, &meetup, Uuid::new_v4(), &existing);

        assert_eq!(
            decision,
            Decision::Rejected(RejectionReason::DuplicateSubscription)
        );
    }

    #[test]
    fn rejection_is_idempotent_for_unchanged_state() {
        let meetup = meetup_at(datetime!(2024-02-01 18:00 UTC), Uuid::new_v4());
        let existing = [slot(meetup.id, meetup.starts_at)];
        let candidate = Uuid::new_v4();

        let first = decide(NOW, &meetup, candidate, &existing);
        let second = decide(NOW, &meetup, candidate, &existing);

        assert_eq!(first, second);
    }
}
