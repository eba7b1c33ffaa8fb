//! # Centralized Error Handling
//!
//! This module provides a unified error handling system for the application.
//! It centralizes error logging and HTTP response generation, eliminating
//! repetitive error handling patterns throughout the codebase.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::services::eligibility::RejectionReason;
use crate::store::StoreError;

/// Central application error type that encompasses all possible error conditions.
///
/// Subscription rejections carry their specific reason all the way to the
/// client; they are never collapsed into a generic failure. _Store errors are
/// logged automatically, while other errors should be logged at the point of
/// creation if needed._
#[derive(Error, Debug)]
pub enum AppError {
    #[error("store error")]
    Store(#[from] StoreError),

    #[error("validation failed: {0}")]
    Validation(&'static str),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("self subscription")]
    SelfSubscription,

    #[error("meetup already happened")]
    MeetupAlreadyHappened,

    #[error("duplicate subscription")]
    DuplicateSubscription,

    #[error("time conflict")]
    TimeConflict,

    #[error("internal server error")]
    Internal,
}

impl From<RejectionReason> for AppError {
    fn from(reason: RejectionReason) -> Self {
        match reason {
            RejectionReason::SelfSubscription => AppError::SelfSubscription,
            RejectionReason::MeetupAlreadyHappened => AppError::MeetupAlreadyHappened,
            RejectionReason::DuplicateSubscription => AppError::DuplicateSubscription,
            RejectionReason::TimeConflict => AppError::TimeConflict,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Store(e) = &self {
            // Log detailed store errors for internal tracking
            error!(?e, "Store error occurred");
        }

        // Central logging - log details for internal errors, minimal for client errors
        let (status, message) = match self {
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Store error"),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::SelfSubscription => (
                StatusCode::BAD_REQUEST,
                "You cannot subscribe to meetups that you are organizing",
            ),
            AppError::MeetupAlreadyHappened => (
                StatusCode::BAD_REQUEST,
                "You cannot subscribe to a meetup that has already happened",
            ),
            AppError::DuplicateSubscription => (
                StatusCode::BAD_REQUEST,
                "You cannot subscribe to the same meetup more than once",
            ),
            AppError::TimeConflict => (
                StatusCode::BAD_REQUEST,
                "You cannot subscribe to two meetups that happen at the same time",
            ),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        let body = Json(ErrorBody { message });
        (status, body).into_response()
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;
