#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use meetapp::{
    app_with_services,
    models::{Meetup, UserRef},
    services::email::{EmailError, EmailService},
    services::jwt::JwtService,
    store::InMemoryStore,
    utils::clock::SystemClock,
};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::net::TcpListener;
use uuid::Uuid;

const TEST_JWT_SECRET: &[u8] = b"meetapp-test-secret";

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("meetapp=debug")
            .with_test_writer()
            .init();
    });
}

/// A mock email service that stores sent emails for testing purposes.
/// This is ideal for integration tests as it doesn't produce console output.
#[derive(Debug, Default)]
pub struct MockEmailer {
    sent_emails: Mutex<Vec<SentEmail>>,
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body_html: String,
}

impl MockEmailer {
    pub fn new() -> Self {
        Self {
            sent_emails: Mutex::new(Vec::new()),
        }
    }

    /// Get all sent emails for testing verification
    pub fn get_sent_emails(&self) -> Vec<SentEmail> {
        self.sent_emails.lock().unwrap().clone()
    }

    /// Get the count of sent emails
    pub fn sent_count(&self) -> usize {
        self.sent_emails.lock().unwrap().len()
    }

    /// Get the last sent email
    pub fn last_sent_email(&self) -> Option<SentEmail> {
        self.sent_emails.lock().unwrap().last().cloned()
    }

    /// Polls until `expected` emails have been delivered by the worker, then
    /// settles briefly to catch any extras.
    pub async fn wait_for_emails(&self, expected: usize) {
        for _ in 0..200 {
            if self.sent_count() >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[async_trait]
impl EmailService for MockEmailer {
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError> {
        let email = SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body_html: body_html.to_string(),
        };

        self.sent_emails.lock().unwrap().push(email);
        Ok(())
    }
}

/// A running application instance plus handles for observing it from tests.
pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub emailer: Arc<MockEmailer>,
    jwt_service: JwtService,
}

impl TestApp {
    /// Mints a valid access token for the given user.
    pub fn token_for(&self, user: &UserRef) -> String {
        self.jwt_service
            .create_access_token(user.id)
            .expect("Failed to mint test access token")
    }

    /// Seeds a user row and returns its projection.
    pub fn seed_user(&self, name: &str, email: &str) -> UserRef {
        let user = UserRef {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
        };
        self.store.seed_user(user.clone());
        user
    }

    /// Seeds a banner asset and returns its id.
    pub fn seed_banner(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.store.seed_banner(id);
        id
    }

    /// Seeds a meetup row directly in the store, bypassing the API guards.
    /// Used for fixtures the API itself refuses to create, e.g. past meetups.
    pub async fn seed_meetup(&self, organizer: &UserRef, starts_at: OffsetDateTime) -> Meetup {
        use meetapp::store::Store;

        let meetup = Meetup {
            id: Uuid::new_v4(),
            organizer_id: organizer.id,
            title: "Seeded meetup".into(),
            description: "Seeded for tests".into(),
            location: "Room 101".into(),
            starts_at,
            banner_id: self.seed_banner(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.store
            .insert_meetup(meetup.clone())
            .await
            .expect("Failed to seed meetup");
        meetup
    }
}

/// Spawns the application on a random port with an in-memory store and a
/// mock emailer, returning handles for test assertions.
pub async fn spawn_app() -> TestApp {
    init_tracing_once();

    let store = Arc::new(InMemoryStore::new());
    let emailer = Arc::new(MockEmailer::new());

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    let app = app_with_services(
        store.clone(),
        emailer.clone(),
        JwtService::from_secret(TEST_JWT_SECRET),
        Arc::new(SystemClock),
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");

    // Wait for server to be ready
    let client = reqwest::Client::new();
    for _ in 0..10 {
        if client
            .get(format!("{address}/health-check"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    TestApp {
        address,
        store,
        emailer,
        jwt_service: JwtService::from_secret(TEST_JWT_SECRET),
    }
}

/// Creates a meetup through the API as the given organizer.
pub async fn create_meetup_via_api(
    client: &reqwest::Client,
    app: &TestApp,
    organizer: &UserRef,
    starts_at: OffsetDateTime,
) -> Meetup {
    let banner_id = app.seed_banner();
    let response = client
        .post(format!("{}/api/meetups", app.address))
        .header(
            "Authorization",
            format!("Bearer {}", app.token_for(organizer)),
        )
        .json(&json!({
            "title": "Rust meetup",
            "description": "Monthly get-together",
            "location": "Room 101",
            "starts_at": starts_at.format(&Rfc3339).unwrap(),
            "banner_id": banner_id,
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 201);
    response.json().await.expect("Failed to parse meetup body")
}
