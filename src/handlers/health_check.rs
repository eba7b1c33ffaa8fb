//! # Health Check Handler
//!
//! Liveness probe for load balancers and deployment tooling.

use axum::http::StatusCode;
use tracing::instrument;

/// Health check endpoint that returns 200 OK.
///
/// Indicates the application is running and able to respond to HTTP
/// requests; performs no store access.
#[instrument]
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
