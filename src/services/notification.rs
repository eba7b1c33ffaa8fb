//! # Notification Queue & Worker
//!
//! Decouples request latency from email delivery. The subscription service
//! enqueues a job describing the accepted subscription and returns
//! immediately; a background worker drains the queue, renders the organizer
//! notification and hands it to the email transport.
//!
//! The queue is a first-class owned component: the producer half
//! ([`NotificationQueue`]) lives in the application state, the consumer half
//! is owned by the worker task spawned at startup.
//!
//! ## Delivery semantics
//!
//! Per job: claimed by the single worker, then either delivered, re-enqueued
//! after a backoff on transient failure, or dead-lettered once the attempt
//! budget is exhausted (or immediately on a permanent transport failure).
//! Redelivery means a job can be processed more than once; sending the same
//! email twice is accepted over losing it.

use std::sync::Arc;

use thiserror::Error;
use time::macros::format_description;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::models::{Meetup, UserRef};
use crate::services::email::{EmailError, EmailService};
use crate::utils::constant::{DELIVERY_RETRY_BACKOFF, MAX_DELIVERY_ATTEMPTS};

/// A unit of work: notify a meetup's organizer about a new subscriber.
///
/// Carries full snapshots of everything the rendered email needs, so the
/// worker never reads the store.
#[derive(Debug, Clone)]
pub struct NotificationJob {
    pub meetup: Meetup,
    pub organizer: UserRef,
    pub subscriber: UserRef,
    /// Delivery attempts already completed for this job.
    pub attempts: u32,
}

impl NotificationJob {
    /// Builds a fresh subscription-mail job.
    pub fn subscription_mail(meetup: Meetup, organizer: UserRef, subscriber: UserRef) -> Self {
        Self {
            meetup,
            organizer,
            subscriber,
            attempts: 0,
        }
    }
}

/// Error returned when a job cannot be accepted into the queue.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("notification queue is closed")]
    Closed,
}

/// Producer half of the notification queue.
///
/// Enqueueing is fire-and-forget: acceptance into the queue is confirmed,
/// delivery is not awaited.
#[derive(Clone)]
pub struct NotificationQueue {
    sender: mpsc::UnboundedSender<NotificationJob>,
}

impl NotificationQueue {
    /// Creates the queue, returning the producer and the consumer half to
    /// hand to [`spawn_notification_worker`].
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NotificationJob>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Accepts a job for later delivery.
    pub fn enqueue(&self, job: NotificationJob) -> Result<(), QueueError> {
        self.sender.send(job).map_err(|_| QueueError::Closed)
    }
}

/// Spawns the background task that drains the notification queue.
///
/// The worker holds a producer clone so it can re-enqueue jobs that failed
/// transiently; it runs for the lifetime of the application.
pub fn spawn_notification_worker(
    mut jobs: mpsc::UnboundedReceiver<NotificationJob>,
    queue: NotificationQueue,
    email_service: Arc<dyn EmailService>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Notification worker started");

        while let Some(job) = jobs.recv().await {
            process_job(job, &queue, email_service.as_ref()).await;
        }

        info!("Notification queue closed, worker stopping");
    })
}

/// Runs one claimed job through render + send and settles its outcome.
#[instrument(
    skip_all,
    fields(
        meetup_id = %job.meetup.id,
        organizer = %job.organizer.email,
        attempt = job.attempts + 1
    )
)]
async fn process_job(job: NotificationJob, queue: &NotificationQueue, emailer: &dyn EmailService) {
    let attempt = job.attempts + 1;
    let (subject, body) = render_subscription_mail(&job);

    match emailer
        .send_email(&job.organizer.email, &subject, &body)
        .await
    {
        Ok(()) => {
            info!("Organizer notification delivered");
        }
        Err(EmailError::Permanent(e)) => {
            error!(error = %e, "Permanent delivery failure, dead-lettering job");
        }
        Err(EmailError::Transient(e)) => {
            if attempt >= MAX_DELIVERY_ATTEMPTS {
                error!(
                    error = %e,
                    attempts = attempt,
                    "Delivery budget exhausted, dead-lettering job"
                );
                return;
            }

            warn!(error = %e, "Transient delivery failure, scheduling redelivery");

            let queue = queue.clone();
            let retry = NotificationJob {
                attempts: attempt,
                ..job
            };
            tokio::spawn(async move {
                tokio::time::sleep(DELIVERY_RETRY_BACKOFF).await;
                if queue.enqueue(retry).is_err() {
                    error!("Notification queue closed before redelivery");
                }
            });
        }
    }
}

/// Renders the organizer-facing notification email.
///
/// The meetup instant is spelled out in long form, e.g.
/// "February 1, 2024 at 18:00 UTC".
fn render_subscription_mail(job: &NotificationJob) -> (String, String) {
    let format = format_description!(
        "[month repr:long] [day padding:none], [year] at [hour]:[minute] UTC"
    );
    let when = job
        .meetup
        .starts_at
        .format(&format)
        .unwrap_or_else(|_| job.meetup.starts_at.to_string());

    let subject = format!("New subscription to {}", job.meetup.title);
    let body = format!(
        r#"<div>
    <p>Hi {organizer},</p>
    <p><strong>{subscriber}</strong> just subscribed to <strong>{title}</strong>, happening on {when} at {location}.</p>
</div>"#,
        organizer = job.organizer.name,
        subscriber = job.subscriber.name,
        title = job.meetup.title,
        when = when,
        location = job.meetup.location,
    );

    (subject, body)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use time::macros::datetime;
    use uuid::Uuid;

    use super::*;

    /// Emailer scripted to fail the first `failures` calls with a transient
    /// error (or every call permanently), recording each call it sees.
    struct ScriptedEmailer {
        failures: Mutex<u32>,
        permanent: bool,
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl ScriptedEmailer {
        fn failing_times(failures: u32) -> Self {
            Self {
                failures: Mutex::new(failures),
                permanent: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn permanent_failure() -> Self {
            Self {
                failures: Mutex::new(0),
                permanent: true,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailService for ScriptedEmailer {
        async fn send_email(
            &self,
            recipient: &str,
            subject: &str,
            body_html: &str,
        ) -> Result<(), EmailError> {
            self.calls.lock().unwrap().push((
                recipient.to_string(),
                subject.to_string(),
                body_html.to_string(),
            ));

            if self.permanent {
                return Err(EmailError::Permanent("mailbox does not exist".into()));
            }

            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(EmailError::Transient("connection reset".into()));
            }

            Ok(())
        }
    }

    fn job() -> NotificationJob {
        let organizer = UserRef {
            id: Uuid::new_v4(),
            name: "Diego".into(),
            email: "diego@example.com".into(),
        };
        let meetup = Meetup {
            id: Uuid::new_v4(),
            organizer_id: organizer.id,
            title: "Rust meetup".into(),
            description: "Monthly get-together".into(),
            location: "Room 101".into(),
            starts_at: datetime!(2024-02-01 18:00 UTC),
            banner_id: Uuid::new_v4(),
            created_at: datetime!(2024-01-01 00:00 UTC),
        };
        let subscriber = UserRef {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
        };

        NotificationJob::subscription_mail(meetup, organizer, subscriber)
    }

    /// Polls until the emailer has seen `expected` calls and no more arrive.
    /// Runs under paused time, so the retry backoffs elapse instantly.
    async fn settle(emailer: &ScriptedEmailer, expected: usize) {
        for _ in 0..1000 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if emailer.calls().len() >= expected {
                break;
            }
        }
        // Let any pending redelivery fire before counting.
        tokio::time::sleep(2 * DELIVERY_RETRY_BACKOFF).await;
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_rendered_notification_to_organizer() {
        let emailer = Arc::new(ScriptedEmailer::failing_times(0));
        let (queue, rx) = NotificationQueue::channel();
        spawn_notification_worker(rx, queue.clone(), emailer.clone());

        queue.enqueue(job()).unwrap();
        settle(&emailer, 1).await;

        let calls = emailer.calls();
        assert_eq!(calls.len(), 1);
        let (recipient, subject, body) = &calls[0];
        assert_eq!(recipient, "diego@example.com");
        assert_eq!(subject, "New subscription to Rust meetup");
        assert!(body.contains("Ada"));
        assert!(body.contains("Diego"));
        assert!(body.contains("February 1, 2024 at 18:00 UTC"));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried_until_success() {
        let emailer = Arc::new(ScriptedEmailer::failing_times(2));
        let (queue, rx) = NotificationQueue::channel();
        spawn_notification_worker(rx, queue.clone(), emailer.clone());

        queue.enqueue(job()).unwrap();
        settle(&emailer, 3).await;

        assert_eq!(emailer.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn job_is_dead_lettered_after_the_attempt_budget() {
        let emailer = Arc::new(ScriptedEmailer::failing_times(u32::MAX));
        let (queue, rx) = NotificationQueue::channel();
        spawn_notification_worker(rx, queue.clone(), emailer.clone());

        queue.enqueue(job()).unwrap();
        settle(&emailer, MAX_DELIVERY_ATTEMPTS as usize).await;

        assert_eq!(emailer.calls().len(), MAX_DELIVERY_ATTEMPTS as usize);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_failure_is_not_retried() {
        let emailer = Arc::new(ScriptedEmailer::permanent_failure());
        let (queue, rx) = NotificationQueue::channel();
        spawn_notification_worker(rx, queue.clone(), emailer.clone());

        queue.enqueue(job()).unwrap();
        settle(&emailer, 1).await;

        assert_eq!(emailer.calls().len(), 1);
    }
}
