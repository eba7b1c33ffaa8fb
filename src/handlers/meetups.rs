//! # Meetup Handlers
//!
//! CRUD endpoints for meetups. The temporal guard clauses here share the
//! same is-future predicate the subscription engine uses: creation requires
//! a strictly future date, updates and deletes are organizer-only and
//! refused once the meetup has happened.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{AppState, Meetup, MeetupChanges};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMeetupRequest {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    pub banner_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeetupRequest {
    #[validate(length(min = 1, max = 120))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub starts_at: Option<OffsetDateTime>,
    pub banner_id: Option<Uuid>,
}

impl From<UpdateMeetupRequest> for MeetupChanges {
    fn from(request: UpdateMeetupRequest) -> Self {
        MeetupChanges {
            title: request.title,
            description: request.description,
            location: request.location,
            starts_at: request.starts_at,
            banner_id: request.banner_id,
        }
    }
}

/// Lists the meetups organized by the authenticated user.
///
/// GET /api/meetups
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn list_meetups(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let meetups = state.store.meetups_by_organizer(user.user_id).await?;

    debug!("Found {} organized meetups", meetups.len());
    Ok(Json(meetups))
}

/// Creates a meetup organized by the authenticated user.
///
/// POST /api/meetups CreateMeetupRequest
///
/// # Returns
///
/// - `201 Created` with the meetup - Meetup created
/// - `400 Bad Request` - Invalid fields, missing banner, or past date
/// - `401 Unauthorized` - Missing or invalid authentication token
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn create_meetup(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateMeetupRequest>,
) -> AppResult<impl IntoResponse> {
    // 1. Validate field constraints
    if let Err(e) = payload.validate() {
        warn!(error = %e, "Meetup payload failed validation");
        return Err(AppError::Validation("Validation fails"));
    }

    // 2. The banner asset must already exist
    if !state.store.banner_exists(payload.banner_id).await? {
        warn!(banner_id = %payload.banner_id, "Banner does not exist");
        return Err(AppError::Validation("Banner does not exist"));
    }

    // 3. The date must still be in the future
    let meetup = Meetup {
        id: Uuid::new_v4(),
        organizer_id: user.user_id,
        title: payload.title,
        description: payload.description,
        location: payload.location,
        starts_at: payload.starts_at,
        banner_id: payload.banner_id,
        created_at: state.clock.now(),
    };
    if !meetup.is_future(state.clock.now()) {
        warn!(starts_at = %meetup.starts_at, "Rejected meetup with past date");
        return Err(AppError::Validation("Cannot create meetups with past dates"));
    }

    let meetup = state.store.insert_meetup(meetup).await?;

    Ok((StatusCode::CREATED, Json(meetup)))
}

/// Updates a meetup the authenticated user organizes.
///
/// PUT /api/meetups/{id} UpdateMeetupRequest
///
/// # Returns
///
/// - `200 OK` with the updated meetup
/// - `400 Bad Request` - Invalid fields or the meetup already happened
/// - `403 Forbidden` - Caller is not the organizer
/// - `404 Not Found` - No such meetup
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        meetup_id = %meetup_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn update_meetup(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(meetup_id): Path<Uuid>,
    Json(payload): Json<UpdateMeetupRequest>,
) -> AppResult<impl IntoResponse> {
    if let Err(e) = payload.validate() {
        warn!(error = %e, "Meetup update payload failed validation");
        return Err(AppError::Validation("Validation fails"));
    }

    let meetup = state
        .store
        .find_meetup(meetup_id)
        .await?
        .ok_or(AppError::NotFound("Meetup not found"))?;

    if meetup.organizer_id != user.user_id {
        warn!("User attempted to update a meetup they do not organize");
        return Err(AppError::Forbidden(
            "You can only update meetups that you have created",
        ));
    }

    if !meetup.is_future(state.clock.now()) {
        return Err(AppError::Validation(
            "You cannot update meetups that already happened",
        ));
    }

    let updated = state
        .store
        .update_meetup(meetup_id, payload.into())
        .await?;

    Ok(Json(updated))
}

/// Deletes a meetup the authenticated user organizes.
///
/// DELETE /api/meetups/{id}
///
/// # Returns
///
/// - `204 No Content` - Meetup deleted
/// - `400 Bad Request` - The meetup already happened
/// - `403 Forbidden` - Caller is not the organizer
/// - `404 Not Found` - No such meetup
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        meetup_id = %meetup_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn delete_meetup(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(meetup_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let meetup = state
        .store
        .find_meetup(meetup_id)
        .await?
        .ok_or(AppError::NotFound("Meetup not found"))?;

    if meetup.organizer_id != user.user_id {
        warn!("User attempted to delete a meetup they do not organize");
        return Err(AppError::Forbidden(
            "You can only delete meetups that you have created",
        ));
    }

    if !meetup.is_future(state.clock.now()) {
        return Err(AppError::Validation(
            "You cannot delete meetups that already happened",
        ));
    }

    state.store.delete_meetup(meetup_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
