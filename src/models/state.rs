use std::sync::Arc;

use tracing::info;

use crate::services::jwt::JwtService;
use crate::services::notification::NotificationQueue;
use crate::store::Store;
use crate::utils::clock::Clock;

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// Query contract over meetups, subscriptions, users and banners.
    pub store: Arc<dyn Store>,
    /// Producer half of the notification queue; the worker owns the consumer.
    pub notifications: NotificationQueue,
    /// JWT service for access token validation.
    pub jwt_service: JwtService,
    /// Time source for every is-future decision.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates a new application state with the provided services.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence backend (Postgres in production, in-memory in tests)
    /// * `notifications` - Queue producer wired to a running notification worker
    /// * `jwt_service` - Service for access token operations
    /// * `clock` - Injected time source
    pub fn new(
        store: Arc<dyn Store>,
        notifications: NotificationQueue,
        jwt_service: JwtService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!("Initializing application state");

        Self {
            store,
            notifications,
            jwt_service,
            clock,
        }
    }
}
