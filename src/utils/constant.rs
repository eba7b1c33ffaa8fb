//! # Application Constants
//!
//! This module defines configuration constants used throughout the Meetapp
//! application. These constants control notification delivery behavior and
//! security settings.

use std::time::Duration;

/// Maximum number of delivery attempts for a notification job
///
/// A job that keeps failing with transient errors is retried until this
/// budget is exhausted, then dead-lettered.
pub const MAX_DELIVERY_ATTEMPTS: u32 = 5;

/// Delay before a failed notification job becomes eligible for redelivery
pub const DELIVERY_RETRY_BACKOFF: Duration = Duration::from_secs(30);

/// Expiration time for JWT access tokens
///
/// Access tokens are short-lived for security and must be refreshed regularly.
pub const ACCESS_TOKEN_EXPIRY: Duration = Duration::from_secs(15 * 60);
