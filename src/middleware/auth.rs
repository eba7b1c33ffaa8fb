//! # Authentication Middleware
//!
//! Binds an authenticated user to each protected request. Token issuance
//! lives outside this service; the middleware only validates already-issued
//! bearer tokens and exposes the user id to downstream handlers.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::AppState;
use crate::services::jwt::Claims;

/// Authentication middleware for protecting routes.
///
/// Extracts the `Authorization: Bearer <token>` header, validates the token
/// signature and expiration, and inserts an [`AuthUser`] into the request
/// extensions. Requests without a valid token are refused with
/// `401 Unauthorized` before any handler runs.
#[instrument(
    skip_all,
    fields(
        method = %req.method(),
        uri = %req.uri(),
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let Some(auth_header) = auth_header else {
        warn!("Missing Authorization header");
        return Err(AppError::Unauthorized("Missing Authorization header"));
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        warn!("Invalid Authorization header format");
        return Err(AppError::Unauthorized("Invalid Authorization header"));
    };

    let claims = state.jwt_service.validate_access_token(token).map_err(|e| {
        warn!(error = %e, "Token validation failed");
        AppError::Unauthorized("Invalid or expired token")
    })?;

    let user_id = Uuid::try_parse(&claims.sub).map_err(|e| {
        error!(error = %e, "Failed to parse user ID from token claims");
        AppError::Unauthorized("Invalid token subject")
    })?;

    debug!(user_id = %user_id, "Authentication successful");
    req.extensions_mut().insert(AuthUser { user_id, claims });

    Ok(next.run(req).await)
}

/// Authenticated user information available to handlers.
///
/// Inserted into request extensions by the authentication middleware;
/// extracted by route handlers that need user context.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Unique identifier for the authenticated user
    pub user_id: Uuid,
    /// JWT claims containing additional token metadata
    pub claims: Claims,
}
