//! # Subscription Handlers
//!
//! Thin HTTP layer over the subscription service: a create endpoint that
//! surfaces the engine's specific rejection reasons and a listing endpoint
//! for the user's upcoming subscriptions.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::AppState;
use crate::services::subscription;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub meetup_id: Uuid,
}

/// Subscribes the authenticated user to a meetup.
///
/// POST /api/subscriptions SubscribeRequest
///
/// # Returns
///
/// - `201 Created` with the subscription - Request accepted
/// - `400 Bad Request` - Self-subscription, past meetup, duplicate, or time conflict
/// - `404 Not Found` - No such meetup
/// - `401 Unauthorized` - Missing or invalid authentication token
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        meetup_id = %payload.meetup_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn create_subscription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SubscribeRequest>,
) -> AppResult<impl IntoResponse> {
    let created = subscription::subscribe(&state, user.user_id, payload.meetup_id).await?;

    debug!(subscription_id = %created.id, "Subscription created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Lists the authenticated user's subscriptions to upcoming meetups, each
/// with its meetup nested, ordered by subscription creation time.
///
/// GET /api/subscriptions
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let subscriptions = subscription::list_upcoming(&state, user.user_id).await?;

    debug!("Found {} upcoming subscriptions", subscriptions.len());
    Ok(Json(subscriptions))
}
