//! # Meetapp - Meetup Scheduling Backend
//!
//! ## Modules
//!
//! - [`handlers`] - HTTP request handlers for various endpoints
//! - [`middleware`] - Custom middleware for authentication and other cross-cutting concerns
//! - [`services`] - Business logic services (eligibility, subscriptions, notifications, email)
//! - [`store`] - Storage contract with Postgres and in-memory implementations
//! - [`utils`] - Utility types and constants

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::env;
use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use sqlx::PgPool;
use tracing::info;

use crate::handlers::{
    create_meetup, create_subscription, delete_meetup, health_check, list_meetups,
    list_subscriptions, update_meetup,
};
use crate::middleware::auth_middleware;
use crate::models::AppState;
use crate::services::email::{EmailService, ExternalEmailer, LogEmailer};
use crate::services::jwt::JwtService;
use crate::services::notification::{NotificationQueue, spawn_notification_worker};
use crate::store::{PgStore, Store};
use crate::utils::clock::{Clock, SystemClock};

/// Creates an Axum router with production wiring around the given pool.
///
/// The email service is auto-detected from the `APP_ENV` environment
/// variable and the JWT secret is read from `JWT_SECRET`; see
/// [`app_with_services`] for explicit wiring.
///
/// # Environment Variables
///
/// - `APP_ENV` - "production" uses ExternalEmailer, otherwise uses LogEmailer (mock)
/// - `MAIL_API_URL` - Required in production for external email service
/// - `MAIL_API_KEY` - Required in production for external email service
/// - `SENDER_EMAIL` - Required in production for external email service
/// - `JWT_SECRET` - Required for JWT token validation
pub fn app(db_pool: PgPool) -> Router {
    let email_service: Arc<dyn EmailService> = {
        let app_env = env::var("APP_ENV")
            .expect("Env variable `APP_ENV` should be set")
            .to_ascii_lowercase();

        if app_env == "production" {
            info!("Running in production mode with [ExternalEmailer]");
            let api_url =
                env::var("MAIL_API_URL").expect("Env variable `MAIL_API_URL` should be set");
            let api_key =
                env::var("MAIL_API_KEY").expect("Env variable `MAIL_API_KEY` should be set");
            let sender =
                env::var("SENDER_EMAIL").expect("Env variable `SENDER_EMAIL` should be set");
            Arc::new(ExternalEmailer::new(api_url, api_key, sender))
        } else {
            info!("Running in development mode with [LogEmailer (Mock)]");
            Arc::new(LogEmailer)
        }
    };

    let jwt_secret = env::var("JWT_SECRET").expect("Env variable `JWT_SECRET` should be set");
    let jwt_service = JwtService::from_secret(jwt_secret.as_bytes());

    app_with_services(
        Arc::new(PgStore::new(db_pool)),
        email_service,
        jwt_service,
        Arc::new(SystemClock),
    )
}

/// Creates an Axum router with explicitly provided services.
///
/// Spawns the notification worker that drains the queue for the lifetime of
/// the application; the producer half lands in the shared state.
///
/// # Arguments
///
/// * `store` - Persistence backend
/// * `email_service` - Transport used by the notification worker
/// * `jwt_service` - Access token validation
/// * `clock` - Time source for every is-future decision
///
/// # Returns
///
/// A configured Axum router with all application routes and middleware
pub fn app_with_services(
    store: Arc<dyn Store>,
    email_service: Arc<dyn EmailService>,
    jwt_service: JwtService,
    clock: Arc<dyn Clock>,
) -> Router {
    let (notifications, jobs) = NotificationQueue::channel();
    spawn_notification_worker(jobs, notifications.clone(), email_service);

    let state = Arc::new(AppState::new(store, notifications, jwt_service, clock));

    let protected_routes = Router::new()
        .route("/api/meetups", get(list_meetups))
        .route("/api/meetups", post(create_meetup))
        .route("/api/meetups/{id}", put(update_meetup))
        .route("/api/meetups/{id}", axum::routing::delete(delete_meetup))
        .route("/api/subscriptions", get(list_subscriptions))
        .route("/api/subscriptions", post(create_subscription))
        .route_layer(from_fn_with_state(Arc::clone(&state), auth_middleware));

    let public_routes = Router::new().route("/health-check", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
